//! Run configuration - defaults and TOML build files
//!
//! A build file declares the simulation window, the target roster, and one
//! or more builds (unit + star level + items + augments) to run against
//! it. Content names are resolved against a [`ContentRegistry`] by the
//! caller; this module only parses and validates shape.
//!
//! [`ContentRegistry`]: crate::registry::ContentRegistry

use crate::simulator::SimulationConfig;
use crate::target::Target;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Default simulation window
pub const DEFAULT_DURATION: Duration = Duration::from_secs(30);

/// Default fixed tick step
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(17);

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Validation(String),
}

/// One build to simulate: a unit with its loadout
#[derive(Debug, Clone, Deserialize)]
pub struct BuildSpec {
    pub name: String,
    pub unit: String,
    #[serde(default = "default_star_level")]
    pub star_level: u8,
    #[serde(default)]
    pub items: Vec<String>,
    #[serde(default)]
    pub augments: Vec<String>,
}

fn default_star_level() -> u8 {
    1
}

/// A stationary target declaration
#[derive(Debug, Clone, Deserialize)]
pub struct TargetSpec {
    pub name: String,
    pub hp: f64,
    #[serde(default)]
    pub armor: f64,
    #[serde(default)]
    pub magic_resist: f64,
    #[serde(default)]
    pub flat_reduction: f64,
}

impl TargetSpec {
    pub fn to_target(&self) -> Target {
        Target::new(&self.name, self.hp, self.armor, self.magic_resist)
            .with_flat_reduction(self.flat_reduction)
    }
}

/// Parsed build file
#[derive(Debug, Clone, Deserialize)]
pub struct BuildsFile {
    #[serde(default = "default_duration_secs")]
    pub duration_secs: u64,
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    #[serde(rename = "target", default)]
    pub targets: Vec<TargetSpec>,
    #[serde(rename = "build", default)]
    pub builds: Vec<BuildSpec>,
}

fn default_duration_secs() -> u64 {
    DEFAULT_DURATION.as_secs()
}

fn default_tick_ms() -> u64 {
    DEFAULT_TICK_INTERVAL.as_millis() as u64
}

impl BuildsFile {
    pub fn simulation_config(&self, verbose: bool) -> SimulationConfig {
        SimulationConfig {
            duration: Duration::from_secs(self.duration_secs),
            tick_interval: Duration::from_millis(self.tick_ms),
            verbose,
        }
        .sanitized()
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.builds.is_empty() {
            return Err(ConfigError::Validation(
                "at least one [[build]] is required".to_string(),
            ));
        }
        if self.targets.is_empty() {
            return Err(ConfigError::Validation(
                "at least one [[target]] is required".to_string(),
            ));
        }
        for build in &self.builds {
            if !(1..=3).contains(&build.star_level) {
                return Err(ConfigError::Validation(format!(
                    "build '{}': star_level must be 1..=3, got {}",
                    build.name, build.star_level
                )));
            }
        }
        for target in &self.targets {
            if target.hp <= 0.0 {
                return Err(ConfigError::Validation(format!(
                    "target '{}': hp must be positive",
                    target.name
                )));
            }
            if !(0.0..1.0).contains(&target.flat_reduction) {
                return Err(ConfigError::Validation(format!(
                    "target '{}': flat_reduction must be in 0..1",
                    target.name
                )));
            }
        }
        Ok(self)
    }
}

/// Parse and validate a build file from a TOML string
pub fn parse_builds(content: &str) -> Result<BuildsFile, ConfigError> {
    let file: BuildsFile = toml::from_str(content)?;
    file.validate()
}

/// Load a build file from disk
pub fn load_builds(path: impl AsRef<Path>) -> Result<BuildsFile, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_builds(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
duration_secs = 20
tick_ms = 17

[[target]]
name = "Frontline Tank"
hp = 50000
armor = 100
magic_resist = 50

[[build]]
name = "Crit carry"
unit = "Yunara"
star_level = 2
items = ["Infinity Edge", "Deathblade"]
augments = ["Combat Training"]

[[build]]
name = "Bare"
unit = "Yunara"
"#;

    #[test]
    fn test_parse_sample_file() {
        let file = parse_builds(SAMPLE).expect("parses");
        assert_eq!(file.duration_secs, 20);
        assert_eq!(file.builds.len(), 2);
        assert_eq!(file.builds[0].items.len(), 2);
        assert_eq!(file.builds[1].star_level, 1);
        assert!(file.builds[1].items.is_empty());
        assert_eq!(file.targets[0].name, "Frontline Tank");
    }

    #[test]
    fn test_defaults_fill_missing_window() {
        let file = parse_builds(
            r#"
[[target]]
name = "dummy"
hp = 1000

[[build]]
name = "b"
unit = "u"
"#,
        )
        .expect("parses");
        let config = file.simulation_config(false);
        assert_eq!(config.duration, DEFAULT_DURATION);
        assert_eq!(config.tick_interval, DEFAULT_TICK_INTERVAL);
    }

    #[test]
    fn test_missing_builds_rejected() {
        let err = parse_builds("[[target]]\nname = \"d\"\nhp = 10.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_bad_star_level_rejected() {
        let err = parse_builds(
            r#"
[[target]]
name = "d"
hp = 10.0

[[build]]
name = "b"
unit = "u"
star_level = 4
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let err = parse_builds("not toml at all [").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
