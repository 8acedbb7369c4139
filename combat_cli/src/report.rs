//! Result rendering - read-only consumers of simulation results

use combat_core::{DamageSource, DamageType, SimulationResult};
use serde::Serialize;
use std::error::Error;
use std::path::Path;

/// Print the per-build summaries and the comparison footer
pub fn print_comparison(labeled: &[(String, SimulationResult)]) {
    for (name, result) in labeled {
        print_build(name, result);
    }

    if labeled.len() < 2 {
        return;
    }

    println!("\n=== Build Comparison ===");
    let best = labeled
        .iter()
        .max_by(|a, b| a.1.dps.total_cmp(&b.1.dps));
    for (name, result) in labeled {
        println!("  {:<32} {:>10.1} DPS", name, result.dps);
    }
    if let Some((name, _)) = best {
        println!("  best: {name}");
    }
}

fn print_build(name: &str, result: &SimulationResult) {
    println!("\n=== Build: {name} ===");
    println!("  Total Damage: {:.1}", result.total_damage);
    println!("  DPS: {:.1}", result.dps);
    println!(
        "  Attacks: {} ({} casts), crit rate {:.1}%",
        result.attack_count,
        result.ability_count,
        result.crit_rate * 100.0
    );

    println!("  Damage Breakdown:");
    for damage_type in [DamageType::Physical, DamageType::Magic, DamageType::True] {
        let amount = result
            .damage_by_type
            .get(&damage_type)
            .copied()
            .unwrap_or(0.0);
        if amount > 0.0 {
            println!(
                "    {:?}: {:.1} ({:.1}%)",
                damage_type,
                amount,
                result.type_share(damage_type) * 100.0
            );
        }
    }
    for source in [DamageSource::AutoAttack, DamageSource::Ability] {
        let amount = result
            .damage_by_source
            .get(&source)
            .copied()
            .unwrap_or(0.0);
        if amount > 0.0 {
            println!(
                "    {:?}: {:.1} ({:.1}%)",
                source,
                amount,
                result.source_share(source) * 100.0
            );
        }
    }

    for (target, ttk) in &result.time_to_kill {
        match ttk {
            Some(at) => println!("  {target}: killed at {:.2}s", at.as_secs_f64()),
            None => {
                let hp = result.final_health.get(target).copied().unwrap_or(0.0);
                println!("  {target}: survived with {hp:.0} HP");
            }
        }
    }

    println!(
        "  Final: {:.0}/{:.0} mana, {:.2} AS, {:.1} AD, {:.2} AP",
        result.summary.final_mana,
        result.summary.max_mana,
        result.summary.attack_speed,
        result.summary.attack_damage,
        result.summary.ability_power
    );
}

#[derive(Serialize)]
struct LabeledResult<'a> {
    name: &'a str,
    result: &'a SimulationResult,
}

/// Dump the full labeled results as pretty JSON
pub fn write_json(path: &Path, labeled: &[(String, SimulationResult)]) -> Result<(), Box<dyn Error>> {
    let rows: Vec<LabeledResult<'_>> = labeled
        .iter()
        .map(|(name, result)| LabeledResult { name, result })
        .collect();
    let file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(file, &rows)?;
    Ok(())
}
