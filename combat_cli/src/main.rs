//! combat-sim - Build comparison runner for the combat simulator

mod report;

use clap::Parser;
use combat_core::content;
use combat_core::{
    BuildSpec, BuildsFile, ContentRegistry, CritRoller, SimulationResult, Simulator, TargetSpec,
    Unit,
};
use std::error::Error;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "combat-sim", version, about = "Compare item builds in a deterministic combat simulation")]
struct Cli {
    /// TOML build file; a built-in comparison runs when omitted
    #[arg(short, long)]
    builds: Option<PathBuf>,

    /// Override the simulation window in seconds
    #[arg(short, long)]
    duration: Option<u64>,

    /// Crit roller seed; every build shares it so comparisons are fair
    #[arg(short, long)]
    seed: Option<u64>,

    /// Write full results as JSON to this path
    #[arg(long)]
    json: Option<PathBuf>,

    /// Log every damage event
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    if let Err(err) = run(Cli::parse()) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let mut file = match &cli.builds {
        Some(path) => combat_core::load_builds(path)?,
        None => default_builds(),
    };
    if let Some(secs) = cli.duration {
        file.duration_secs = secs;
    }

    let registry = content::default_registry();
    let config = file.simulation_config(cli.verbose);

    let mut labeled: Vec<(String, SimulationResult)> = Vec::new();
    for build in &file.builds {
        tracing::info!(build = %build.name, "running simulation");
        let unit = assemble(&registry, build, cli.seed)?;
        let targets = file.targets.iter().map(TargetSpec::to_target).collect();
        let result = Simulator::with_config(unit, targets, config.clone()).run();
        labeled.push((build.name.clone(), result));
    }

    report::print_comparison(&labeled);

    if let Some(path) = &cli.json {
        report::write_json(path, &labeled)?;
        tracing::info!(path = %path.display(), "results written");
    }

    Ok(())
}

/// Resolve a build spec against the registry into a ready unit
fn assemble(
    registry: &ContentRegistry,
    build: &BuildSpec,
    seed: Option<u64>,
) -> Result<Unit, Box<dyn Error>> {
    let mut unit = registry
        .build_unit(&build.unit, build.star_level)
        .ok_or_else(|| format!("unknown unit '{}'", build.unit))?;

    if let Some(seed) = seed {
        unit.crits = CritRoller::with_seed(seed);
    }

    for name in &build.items {
        let def = registry
            .item(name)
            .ok_or_else(|| format!("unknown item '{name}'"))?;
        unit.equip(def);
    }
    for name in &build.augments {
        let augment = registry
            .augment(name)
            .ok_or_else(|| format!("unknown augment '{name}'"))?;
        unit.add_augment(augment);
    }

    Ok(unit)
}

/// The stock comparison: one carry, one tank, four loadouts
fn default_builds() -> BuildsFile {
    let build = |name: &str, items: &[&str]| BuildSpec {
        name: name.to_string(),
        unit: "Yunara".to_string(),
        star_level: 2,
        items: items.iter().map(|s| s.to_string()).collect(),
        augments: Vec::new(),
    };

    BuildsFile {
        duration_secs: 30,
        tick_ms: 17,
        targets: vec![TargetSpec {
            name: "Frontline Tank".to_string(),
            hp: 50_000.0,
            armor: 100.0,
            magic_resist: 50.0,
            flat_reduction: 0.0,
        }],
        builds: vec![
            build(
                "Yunara - Rageblade Kraken's IE",
                &["Guinsoo's Rageblade", "Kraken's Fury", "Infinity Edge"],
            ),
            build(
                "Yunara - Rageblade Titan's IE",
                &["Guinsoo's Rageblade", "Titan's Resolve", "Infinity Edge"],
            ),
            build(
                "Yunara - 2x Kraken's IE",
                &["Kraken's Fury", "Kraken's Fury", "Infinity Edge"],
            ),
            build(
                "Yunara - 5x Deathblade",
                &[
                    "Deathblade",
                    "Deathblade",
                    "Deathblade",
                    "Deathblade",
                    "Deathblade",
                ],
            ),
        ],
    }
}
