use std::path::Path;

use config::{Config, ConfigError, Environment, FileFormat};
use ridematch_core::{spatial::SAME_PLACE_KM, temporal::Fuzziness};
use serde::{Deserialize, Serialize};

/// prefix for environment variable overrides, e.g. `RIDEMATCH_OFFER_RADIUS_KM`.
pub const ENV_PREFIX: &str = "RIDEMATCH";

/// tunables for matching and the ride workflows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// an offer matches point-to-point when both its start and end lie closer
    /// than this many kilometers to the searched start and end
    pub offer_radius_km: f64,
    /// locations closer than this are treated as the same place
    pub same_place_km: f64,
    /// fuzziness applied when a search form leaves it blank
    pub default_fuzziness: Fuzziness,
    /// longest listing message accepted, in characters
    pub message_max_len: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        MatchConfig {
            offer_radius_km: 5.0,
            same_place_km: SAME_PLACE_KM,
            default_fuzziness: Fuzziness::default(),
            message_max_len: 300,
        }
    }
}

impl MatchConfig {
    /// reads the configuration from an optional TOML file, then applies
    /// `RIDEMATCH_`-prefixed environment overrides. unset keys keep their defaults.
    pub fn load(filepath: Option<&Path>) -> Result<MatchConfig, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = filepath {
            builder = builder.add_source(config::File::new(
                &path.to_string_lossy(),
                FileFormat::Toml,
            ));
        }
        let config = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;
        let match_config: MatchConfig = config.try_deserialize()?;
        match_config.validate()?;
        Ok(match_config)
    }

    pub fn from_toml_str(contents: &str) -> Result<MatchConfig, ConfigError> {
        let match_config: MatchConfig = Config::builder()
            .add_source(config::File::from_str(contents, FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        match_config.validate()?;
        Ok(match_config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.offer_radius_km.is_finite() || self.offer_radius_km < 0.0 {
            return Err(ConfigError::Message(format!(
                "offer_radius_km must be a non-negative number, found {}",
                self.offer_radius_km
            )));
        }
        if !self.same_place_km.is_finite() || self.same_place_km < 0.0 {
            return Err(ConfigError::Message(format!(
                "same_place_km must be a non-negative number, found {}",
                self.same_place_km
            )));
        }
        Ok(())
    }
}
