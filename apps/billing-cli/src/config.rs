//! # Outlet Configuration
//!
//! Settings for the outlet printing the bills.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     RASOI_OUTLET_NAME="Rasoi Kitchen"                                  │
//! │     RASOI_OUTLET_GSTIN=27AAPFU0939F1ZV                                 │
//! │     RASOI_HOME_STATE=27                                                │
//! │     RASOI_SERVICE_CHARGE=10                                            │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     --config <path>, or                                                │
//! │     ~/.config/pos/billing.toml (Linux)                                 │
//! │     ~/Library/Application Support/com.rasoi.pos/billing.toml (macOS)   │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     no GSTIN, no home state, 0% service charge                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # billing.toml
//! [outlet]
//! name = "Rasoi Kitchen"
//! gstin = "27AAPFU0939F1ZV"
//! home_state = "27"
//!
//! [billing]
//! service_charge = "10%"
//! ```

use std::path::PathBuf;

use rasoi_core::validation::validate_tax_rate_bps;
use rasoi_core::{Gstin, StateCode, TaxRate};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{ConfigError, ConfigResult};

// =============================================================================
// Outlet Settings
// =============================================================================

/// Identity of the outlet, printed in the bill header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutletSettings {
    /// Name printed at the top of every bill.
    #[serde(default = "default_outlet_name")]
    pub name: String,

    /// Outlet GSTIN. Its state code doubles as the home state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gstin: Option<Gstin>,

    /// Home state, when the outlet has no GSTIN on file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_state: Option<StateCode>,
}

fn default_outlet_name() -> String {
    "Rasoi POS".to_string()
}

impl Default for OutletSettings {
    fn default() -> Self {
        OutletSettings {
            name: default_outlet_name(),
            gstin: None,
            home_state: None,
        }
    }
}

// =============================================================================
// Billing Settings
// =============================================================================

/// Defaults applied to every bill unless a command overrides them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingSettings {
    /// Service charge on the taxable amount, written as a percentage.
    #[serde(default, with = "percent")]
    pub service_charge: TaxRate,
}

/// Reads and writes a `TaxRate` as percentage text (`"10%"`).
mod percent {
    use rasoi_core::TaxRate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(rate: &TaxRate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(rate)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<TaxRate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Main Outlet Configuration
// =============================================================================

/// Complete outlet configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutletConfig {
    #[serde(default)]
    pub outlet: OutletSettings,

    #[serde(default)]
    pub billing: BillingSettings,
}

impl OutletConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (billing.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading outlet config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load outlet config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ConfigResult<PathBuf> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or(ConfigError::NoConfigPath)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Outlet config saved");
        Ok(path)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.outlet.name.trim().is_empty() {
            return Err(ConfigError::MissingRequired("outlet.name".into()));
        }

        if let (Some(gstin), Some(home)) = (&self.outlet.gstin, self.outlet.home_state) {
            if gstin.state_code() != home {
                return Err(ConfigError::InvalidValue(format!(
                    "outlet.home_state {} does not match GSTIN state {}",
                    home,
                    gstin.state_code()
                )));
            }
        }

        validate_tax_rate_bps(self.billing.service_charge.bps())
            .map_err(|e| ConfigError::InvalidValue(format!("billing.service_charge: {}", e)))?;

        Ok(())
    }

    /// Applies `RASOI_*` environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from any key lookup. Unparseable values are skipped.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(name) = lookup("RASOI_OUTLET_NAME") {
            debug!(name = %name, "Overriding outlet name from environment");
            self.outlet.name = name;
        }

        if let Some(raw) = lookup("RASOI_OUTLET_GSTIN") {
            match Gstin::parse(&raw) {
                Ok(gstin) => {
                    debug!(gstin = %gstin, "Overriding outlet GSTIN from environment");
                    self.outlet.gstin = Some(gstin);
                }
                Err(e) => warn!(value = %raw, "Ignoring RASOI_OUTLET_GSTIN: {}", e),
            }
        }

        if let Some(raw) = lookup("RASOI_HOME_STATE") {
            match raw.parse::<StateCode>() {
                Ok(code) => {
                    debug!(state = %code, "Overriding home state from environment");
                    self.outlet.home_state = Some(code);
                }
                Err(e) => warn!(value = %raw, "Ignoring RASOI_HOME_STATE: {}", e),
            }
        }

        if let Some(raw) = lookup("RASOI_SERVICE_CHARGE") {
            match raw.parse::<TaxRate>() {
                Ok(rate) => {
                    debug!(rate = %rate, "Overriding service charge from environment");
                    self.billing.service_charge = rate;
                }
                Err(e) => warn!(value = %raw, "Ignoring RASOI_SERVICE_CHARGE: {}", e),
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "rasoi", "pos")
            .map(|dirs| dirs.config_dir().join("billing.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// The outlet's state: explicit setting first, then the GSTIN prefix.
    pub fn home_state(&self) -> Option<StateCode> {
        self.outlet
            .home_state
            .or_else(|| self.outlet.gstin.as_ref().map(Gstin::state_code))
    }

    /// Default service-charge rate.
    pub fn service_charge(&self) -> TaxRate {
        self.billing.service_charge
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = OutletConfig::default();
        assert_eq!(config.outlet.name, "Rasoi POS");
        assert!(config.outlet.gstin.is_none());
        assert!(config.home_state().is_none());
        assert!(config.service_charge().is_zero());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = OutletConfig::default();

        config.outlet.name = "  ".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingRequired(_))
        ));

        config.outlet.name = "Rasoi Kitchen".to_string();
        config.outlet.gstin = Some(Gstin::parse("27AAPFU0939F1ZV").unwrap());
        config.outlet.home_state = Some(StateCode::new(29).unwrap());
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue(_))));

        config.outlet.home_state = Some(StateCode::new(27).unwrap());
        assert!(config.validate().is_ok());

        config.billing.service_charge = TaxRate::from_bps(10_001);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_home_state_falls_back_to_gstin() {
        let mut config = OutletConfig::default();
        config.outlet.gstin = Some(Gstin::parse("29ABCDE1234F1Z5").unwrap());
        assert_eq!(config.home_state(), Some(StateCode::new(29).unwrap()));
    }

    #[test]
    fn test_overrides() {
        let mut config = OutletConfig::default();
        config.apply_overrides(lookup(&[
            ("RASOI_OUTLET_NAME", "Dakshin Cafe"),
            ("RASOI_HOME_STATE", "33"),
            ("RASOI_SERVICE_CHARGE", "7.5"),
        ]));

        assert_eq!(config.outlet.name, "Dakshin Cafe");
        assert_eq!(config.home_state(), Some(StateCode::new(33).unwrap()));
        assert_eq!(config.service_charge(), TaxRate::from_bps(750));
    }

    #[test]
    fn test_bad_overrides_are_ignored() {
        let mut config = OutletConfig::default();
        config.apply_overrides(lookup(&[
            ("RASOI_OUTLET_GSTIN", "not-a-gstin"),
            ("RASOI_HOME_STATE", "0"),
            ("RASOI_SERVICE_CHARGE", "ten"),
        ]));
        assert_eq!(config, OutletConfig::default());
    }

    #[test]
    fn test_toml_serialization() {
        let mut config = OutletConfig::default();
        config.outlet.gstin = Some(Gstin::parse("27AAPFU0939F1ZV").unwrap());
        config.billing.service_charge = TaxRate::from_bps(1000);

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[outlet]"));
        assert!(toml_str.contains("[billing]"));
        assert!(toml_str.contains("gstin = \"27AAPFU0939F1ZV\""));
        assert!(toml_str.contains("service_charge = \"10%\""));
        assert!(!toml_str.contains("home_state"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("billing.toml");
        std::fs::write(
            &path,
            "[outlet]\nname = \"Rasoi Kitchen\"\nhome_state = \"27\"\n\n[billing]\nservice_charge = \"5\"\n",
        )
        .unwrap();

        let config = OutletConfig::load(Some(path)).unwrap();
        assert_eq!(config.outlet.name, "Rasoi Kitchen");
        assert_eq!(config.home_state(), Some(StateCode::new(27).unwrap()));
        assert_eq!(config.service_charge(), TaxRate::from_bps(500));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("billing.toml");

        let mut config = OutletConfig::default();
        config.outlet.name = "Rasoi Kitchen".to_string();
        config.outlet.home_state = Some(StateCode::new(7).unwrap());

        let written = config.save(Some(path.clone())).unwrap();
        assert_eq!(written, path);

        let contents = std::fs::read_to_string(&path).unwrap();
        let back: OutletConfig = toml::from_str(&contents).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_invalid_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("billing.toml");
        std::fs::write(&path, "[billing]\nservice_charge = \"lots\"\n").unwrap();

        assert!(matches!(
            OutletConfig::load(Some(path.clone())),
            Err(ConfigError::Parse(_))
        ));
        assert_eq!(
            OutletConfig::load_or_default(Some(path)).outlet.name,
            "Rasoi POS"
        );
    }
}
