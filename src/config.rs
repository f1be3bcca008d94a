//! Configuration loading for the RMI driver

use std::fs;

use serde::{Deserialize, Serialize};

use crate::{util::DEFAULT_PRECISION, Result, RmiError};

/// Environment variable consulted when no config path is given
pub const CONFIG_PATH_ENV: &str = "RMI_DRIVER_CONFIG";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DriverConfig {
    #[serde(default)]
    pub driver: DriverSection,
    #[serde(default)]
    pub formatting: FormattingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DriverSection {
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FormattingConfig {
    pub float_precision: Option<usize>,
    pub append_newline: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub filter: Option<String>,
}

impl Default for DriverSection {
    fn default() -> Self {
        Self {
            name: "rmi_driver".to_string(),
        }
    }
}

impl DriverConfig {
    /// Load configuration from a YAML file
    pub fn load_from_path(config_path: &str) -> Result<Self> {
        let contents = fs::read_to_string(config_path)
            .map_err(|e| RmiError::Config(format!("Failed to read {}: {}", config_path, e)))?;
        Self::load_from_str(&contents)
    }

    /// Parse configuration from YAML text
    pub fn load_from_str(contents: &str) -> Result<Self> {
        let config: DriverConfig = serde_yaml::from_str(contents)?;
        if let Some(precision) = config.formatting.float_precision {
            if precision > 17 {
                return Err(RmiError::Config(format!(
                    "float_precision {} is out of range (0-17)",
                    precision
                )));
            }
        }
        Ok(config)
    }

    /// Load from `path`, then the environment variable, else use defaults
    pub fn resolve(path: Option<&str>) -> Result<Self> {
        match path.map(str::to_string).or_else(|| std::env::var(CONFIG_PATH_ENV).ok()) {
            Some(path) => Self::load_from_path(&path),
            None => Ok(Self::default()),
        }
    }
}

impl FormattingConfig {
    /// Get float precision with default fallback
    pub fn precision(&self) -> usize {
        self.float_precision.unwrap_or(DEFAULT_PRECISION)
    }

    /// Get newline termination with default fallback
    pub fn newline(&self) -> bool {
        self.append_newline.unwrap_or(true)
    }
}

impl LoggingConfig {
    /// Get log filter with default fallback
    pub fn filter(&self) -> &str {
        self.filter.as_deref().unwrap_or("info")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DriverConfig::default();
        assert_eq!(config.driver.name, "rmi_driver");
        assert_eq!(config.formatting.precision(), 4);
        assert!(config.formatting.newline());
        assert_eq!(config.logging.filter(), "info");
    }

    #[test]
    fn test_partial_yaml() {
        let yaml = "driver:\n  name: keba\nformatting:\n  float_precision: 2\n";
        let config = DriverConfig::load_from_str(yaml).unwrap();

        assert_eq!(config.driver.name, "keba");
        assert_eq!(config.formatting.precision(), 2);
        assert!(config.formatting.newline());
        assert_eq!(config.logging.filter(), "info");
    }

    #[test]
    fn test_full_yaml() {
        let yaml = r#"
driver:
  name: cell_1
formatting:
  float_precision: 6
  append_newline: false
logging:
  filter: "rmi_driver=debug"
"#;
        let config = DriverConfig::load_from_str(yaml).unwrap();
        assert_eq!(config.formatting.precision(), 6);
        assert!(!config.formatting.newline());
        assert_eq!(config.logging.filter(), "rmi_driver=debug");
    }

    #[test]
    fn test_rejects_bad_precision() {
        let yaml = "formatting:\n  float_precision: 40\n";
        assert!(matches!(DriverConfig::load_from_str(yaml), Err(RmiError::Config(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = DriverConfig::load_from_path("/nonexistent/rmi_driver.yaml");
        assert!(matches!(result, Err(RmiError::Config(_))));
    }
}
