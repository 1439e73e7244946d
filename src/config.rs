use crate::analytics_core::indices::{DEFAULT_ATKINSON_EPSILON, DEFAULT_SHANNON_SCALE};
use crate::analytics_core::types::Category;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::env;
use std::path::Path;

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    InvalidValue(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error reading configuration: {}", e),
            ConfigError::Parse(e) => write!(f, "Invalid configuration file: {}", e),
            ConfigError::InvalidValue(msg) => write!(f, "Invalid configuration value: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

fn default_weight() -> f64 {
    1.0
}

pub const DEFAULT_KEY_FIELD: &str = "key";
pub const DEFAULT_VALUE_FIELD: &str = "value";

fn default_key_field() -> String {
    DEFAULT_KEY_FIELD.to_string()
}

fn default_value_field() -> String {
    DEFAULT_VALUE_FIELD.to_string()
}

/// Per-category settings as found in the category config file
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CategorySettings {
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default)]
    pub cumulative: bool,
    /// Field holding the observation key in list-shaped snapshot entries
    #[serde(default = "default_key_field")]
    pub key_field: String,
    /// Field holding the observation value in list-shaped snapshot entries
    #[serde(default = "default_value_field")]
    pub value_field: String,
}

impl Default for CategorySettings {
    fn default() -> Self {
        Self {
            weight: default_weight(),
            cumulative: false,
            key_field: default_key_field(),
            value_field: default_value_field(),
        }
    }
}

/// Engine configuration: category table plus calculator parameters
///
/// File format (JSON):
/// ```json
/// {
///   "atkinson_epsilon": 0.5,
///   "shannon_scale": 10,
///   "categories": {
///     "amountStakedByPool": { "weight": 1.0, "key_field": "entity", "value_field": "amount_staked" },
///     "nativeAssetsByAddress": { "weight": 1.0, "cumulative": true }
///   }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub categories: BTreeMap<String, CategorySettings>,
    #[serde(default = "default_epsilon")]
    pub atkinson_epsilon: f64,
    #[serde(default = "default_shannon_scale")]
    pub shannon_scale: f64,
}

fn default_epsilon() -> f64 {
    DEFAULT_ATKINSON_EPSILON
}

fn default_shannon_scale() -> f64 {
    DEFAULT_SHANNON_SCALE
}

impl Default for EngineConfig {
    /// The deployed category table
    fn default() -> Self {
        // name, weight, cumulative, key field, value field
        let table: [(&str, f64, bool, &str, &str); 12] = [
            ("executionNodesByCountry", 1.0, false, "key", "value"),
            ("executionNodesByClientBase", 1.0, false, "key", "value"),
            ("consensusNodesByCountry", 1.0, false, "key", "value"),
            ("consensusNodesByClient", 1.0, false, "key", "value"),
            ("amountStakedByPool", 1.0, false, "entity", "amount_staked"),
            ("blocksByRelays", 0.7, false, "name", "value"),
            ("blocksByBuilder", 0.7, false, "name", "count"),
            ("nativeAssetsByAddress", 1.0, true, "key", "value"),
            ("exchangeBySupply", 0.7, false, "key", "value"),
            ("activityByBundler", 0.2, false, "bundler", "numberTransactions"),
            ("stablecoinsByTvl", 0.3, false, "symbol", "TVL"),
            ("rollupsByTvl", 0.5, false, "name", "tvl"),
        ];

        let categories = table
            .iter()
            .map(|(name, weight, cumulative, key_field, value_field)| {
                (
                    name.to_string(),
                    CategorySettings {
                        weight: *weight,
                        cumulative: *cumulative,
                        key_field: key_field.to_string(),
                        value_field: value_field.to_string(),
                    },
                )
            })
            .collect();

        Self {
            categories,
            atkinson_epsilon: DEFAULT_ATKINSON_EPSILON,
            shannon_scale: DEFAULT_SHANNON_SCALE,
        }
    }
}

impl EngineConfig {
    /// Parse a category config document and validate it
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        log::info!("Loaded category configuration from {}", path.as_ref().display());
        Self::from_json_str(&json)
    }

    /// Load from `DISTMETRICS_CATEGORY_CONFIG` if set (defaults otherwise), then
    /// apply `ATKINSON_EPSILON` and `SHANNON_SCALE` overrides
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = match env::var("DISTMETRICS_CATEGORY_CONFIG") {
            Ok(path) if !path.trim().is_empty() => Self::from_file(path.trim())?,
            _ => Self::default(),
        };

        if let Ok(raw) = env::var("ATKINSON_EPSILON") {
            config.atkinson_epsilon = raw.trim().parse().map_err(|_| {
                ConfigError::InvalidValue(format!("ATKINSON_EPSILON '{}' is not a number", raw))
            })?;
        }

        if let Ok(raw) = env::var("SHANNON_SCALE") {
            config.shannon_scale = raw.trim().parse().map_err(|_| {
                ConfigError::InvalidValue(format!("SHANNON_SCALE '{}' is not a number", raw))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.atkinson_epsilon.is_finite() || self.atkinson_epsilon < 0.0 {
            return Err(ConfigError::InvalidValue(format!(
                "atkinson_epsilon must be finite and >= 0, got {}",
                self.atkinson_epsilon
            )));
        }

        if !self.shannon_scale.is_finite() || self.shannon_scale <= 0.0 {
            return Err(ConfigError::InvalidValue(format!(
                "shannon_scale must be finite and > 0, got {}",
                self.shannon_scale
            )));
        }

        for (name, settings) in &self.categories {
            if !settings.weight.is_finite() || settings.weight <= 0.0 {
                return Err(ConfigError::InvalidValue(format!(
                    "weight for {} must be a positive number, got {}",
                    name, settings.weight
                )));
            }
        }

        Ok(())
    }

    /// Resolve a category by name; unknown categories get default settings
    pub fn category(&self, name: &str) -> Category {
        let settings = self.categories.get(name).cloned().unwrap_or_default();
        Category {
            name: name.to_string(),
            weight: settings.weight,
            cumulative: settings.cumulative,
        }
    }

    /// Key and value field names of list-shaped entries for a category
    pub fn fields(&self, name: &str) -> (&str, &str) {
        match self.categories.get(name) {
            Some(settings) => (settings.key_field.as_str(), settings.value_field.as_str()),
            None => (DEFAULT_KEY_FIELD, DEFAULT_VALUE_FIELD),
        }
    }

    /// Whether snapshot data for `name` is analyzed
    ///
    /// An empty category table accepts every category.
    pub fn accepts(&self, name: &str) -> bool {
        self.categories.is_empty() || self.categories.contains_key(name)
    }

    /// Configured weight table; empty when no categories are configured
    pub fn weights(&self) -> BTreeMap<String, f64> {
        self.categories
            .iter()
            .map(|(name, settings)| (name.clone(), settings.weight))
            .collect()
    }

    pub fn with_category(mut self, name: &str, weight: f64, cumulative: bool) -> Self {
        self.categories.insert(
            name.to_string(),
            CategorySettings {
                weight,
                cumulative,
                ..CategorySettings::default()
            },
        );
        self
    }

    /// Configuration with no categories (every category gets default settings)
    pub fn empty() -> Self {
        Self {
            categories: BTreeMap::new(),
            atkinson_epsilon: DEFAULT_ATKINSON_EPSILON,
            shannon_scale: DEFAULT_SHANNON_SCALE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table() {
        let config = EngineConfig::default();
        assert_eq!(config.categories.len(), 12);
        assert_eq!(config.atkinson_epsilon, 0.5);
        assert_eq!(config.shannon_scale, 10.0);

        let assets = config.category("nativeAssetsByAddress");
        assert!(assets.cumulative);
        assert_eq!(assets.weight, 1.0);

        let bundlers = config.category("activityByBundler");
        assert!(!bundlers.cumulative);
        assert_eq!(bundlers.weight, 0.2);
    }

    #[test]
    fn test_default_table_maps_entry_fields() {
        let config = EngineConfig::default();
        assert_eq!(config.fields("amountStakedByPool"), ("entity", "amount_staked"));
        assert_eq!(config.fields("blocksByBuilder"), ("name", "count"));
        assert_eq!(config.fields("activityByBundler"), ("bundler", "numberTransactions"));
        assert_eq!(config.fields("stablecoinsByTvl"), ("symbol", "TVL"));
        assert_eq!(config.fields("somethingNew"), ("key", "value"));
    }

    #[test]
    fn test_weights_and_accepted_categories() {
        let config = EngineConfig::default();
        let weights = config.weights();
        assert_eq!(weights.len(), 12);
        assert_eq!(weights["blocksByRelays"], 0.7);
        assert!(config.accepts("rollupsByTvl"));
        assert!(!config.accepts("somethingNew"));

        let empty = EngineConfig::empty();
        assert!(empty.weights().is_empty());
        assert!(empty.accepts("somethingNew"));
    }

    #[test]
    fn test_unknown_category_uses_defaults() {
        let category = EngineConfig::default().category("somethingNew");
        assert_eq!(category.weight, 1.0);
        assert!(!category.cumulative);
    }

    #[test]
    fn test_parse_category_file() {
        let json = r#"{
            "atkinson_epsilon": 1.0,
            "categories": {
                "pools": { "weight": 0.5 },
                "holders": { "cumulative": true, "key_field": "threshold" }
            }
        }"#;

        let config = EngineConfig::from_json_str(json).unwrap();
        assert_eq!(config.atkinson_epsilon, 1.0);
        assert_eq!(config.shannon_scale, 10.0);
        assert_eq!(config.category("pools").weight, 0.5);
        assert!(config.category("holders").cumulative);
        assert_eq!(config.category("holders").weight, 1.0);
        assert_eq!(config.fields("holders"), ("threshold", "value"));
    }

    #[test]
    fn test_rejects_negative_epsilon() {
        let err = EngineConfig::from_json_str(r#"{"atkinson_epsilon": -1}"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_)));
    }

    #[test]
    fn test_rejects_non_positive_weight() {
        let json = r#"{"categories": {"pools": {"weight": 0}}}"#;
        assert!(EngineConfig::from_json_str(json).is_err());
    }

    #[test]
    fn test_rejects_malformed_file() {
        let err = EngineConfig::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
