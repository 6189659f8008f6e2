use crate::datasources::LocalFiles;
use crate::error::{Result, TurfPlanError};
use crate::models::{MonitorOverrides, WeatherMonitorConfig};
use dialoguer::Input;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub monitor: MonitorOverrides,
    #[serde(default)]
    pub data: DataConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DataConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedules_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forecast_path: Option<PathBuf>,
}

impl Config {
    pub fn load(config_override: Option<PathBuf>) -> Result<Self> {
        let config_path = match config_override {
            Some(p) => p,
            None => Self::find_config_path()?,
        };

        if !config_path.exists() {
            return Err(TurfPlanError::Config(format!(
                "Config file not found at {:?}. Run `turfplan init` to set up.",
                config_path
            )));
        }

        let config_str = std::fs::read_to_string(&config_path)
            .map_err(|e| TurfPlanError::Config(format!("Failed to read config: {}", e)))?;

        Self::parse(&config_str)
    }

    /// Parse config text, substituting `${VAR}` references from the environment first.
    pub fn parse(content: &str) -> Result<Self> {
        let content = Self::substitute_env_vars(content);
        serde_yaml::from_str(&content)
            .map_err(|e| TurfPlanError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Monitor settings merged over the defaults and validated.
    pub fn monitor_config(&self) -> Result<WeatherMonitorConfig> {
        Ok(WeatherMonitorConfig::from_overrides(self.monitor)?)
    }

    /// Schedule and forecast files, defaulting to the data directory.
    pub fn local_files(&self) -> Result<LocalFiles> {
        let schedules_path = match &self.data.schedules_path {
            Some(p) => p.clone(),
            None => Self::data_dir()?.join("schedules.yaml"),
        };
        let forecast_path = match &self.data.forecast_path {
            Some(p) => p.clone(),
            None => Self::data_dir()?.join("forecast.yaml"),
        };
        Ok(LocalFiles::new(schedules_path, forecast_path))
    }

    /// Search for config.yaml in standard locations.
    /// Returns the path of the first found config, or the XDG default path if none found.
    fn find_config_path() -> Result<PathBuf> {
        let local_config = PathBuf::from("config/config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let default_path = Self::default_config_path()?;
        Ok(default_path)
    }

    /// Returns true if a config file can be found in any standard location.
    pub fn exists(config_override: Option<&PathBuf>) -> bool {
        match config_override {
            Some(p) => p.exists(),
            None => Self::find_config_path()
                .map(|p| p.exists())
                .unwrap_or(false),
        }
    }

    /// Default path for writing new config files (~/.config/turfplan/config.yaml).
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| TurfPlanError::Config("Cannot determine config directory".into()))?
            .join("turfplan");
        Ok(config_dir.join("config.yaml"))
    }

    /// Run interactive setup prompts and write config to disk.
    /// Returns the loaded Config and the path it was written to.
    pub fn setup_interactive() -> Result<(Self, PathBuf)> {
        println!();
        println!("Let's set up TurfPlan!");
        println!();

        let defaults = WeatherMonitorConfig::default();

        println!("Weather monitor");
        let check_interval: i64 = Input::new()
            .with_prompt("  Check interval (minutes, 15-360)")
            .default(defaults.check_interval)
            .interact_text()
            .map_err(|e| TurfPlanError::Config(format!("Input error: {}", e)))?;

        let alert_threshold: i64 = Input::new()
            .with_prompt("  Alert threshold (1-5)")
            .default(defaults.alert_threshold)
            .interact_text()
            .map_err(|e| TurfPlanError::Config(format!("Input error: {}", e)))?;

        let forecast_hours: i64 = Input::new()
            .with_prompt("  Forecast hours (24-168)")
            .default(defaults.forecast_hours)
            .interact_text()
            .map_err(|e| TurfPlanError::Config(format!("Input error: {}", e)))?;

        let monitor = MonitorOverrides {
            check_interval: Some(check_interval),
            alert_threshold: Some(alert_threshold),
            forecast_hours: Some(forecast_hours),
        };
        // Refuse to write settings the monitor would reject at startup
        WeatherMonitorConfig::from_overrides(monitor)?;

        println!();

        println!("Data files (leave blank for the data directory)");
        let schedules_path: String = Input::new()
            .with_prompt("  Schedules file")
            .default(String::new())
            .allow_empty(true)
            .interact_text()
            .map_err(|e| TurfPlanError::Config(format!("Input error: {}", e)))?;

        let forecast_path: String = Input::new()
            .with_prompt("  Forecast file")
            .default(String::new())
            .allow_empty(true)
            .interact_text()
            .map_err(|e| TurfPlanError::Config(format!("Input error: {}", e)))?;

        println!();

        let config = Config {
            monitor,
            data: DataConfig {
                schedules_path: non_empty_path(schedules_path),
                forecast_path: non_empty_path(forecast_path),
            },
        };

        let config_path = Self::default_config_path()?;
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml::to_string(&config)
            .map_err(|e| TurfPlanError::Config(format!("Failed to serialize config: {}", e)))?;

        let content = format!(
            "# TurfPlan Configuration\n# Generated by `turfplan init`\n# Environment variable substitution (${{VAR}}) is supported.\n\n{}",
            yaml
        );
        std::fs::write(&config_path, content)?;

        println!("Configuration saved to {}", config_path.display());
        println!();

        Ok((config, config_path))
    }

    fn substitute_env_vars(content: &str) -> String {
        let mut result = content.to_string();

        // Find all ${VAR_NAME} patterns and substitute
        let Ok(re) = regex_lite::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}") else {
            return result;
        };

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let placeholder = &cap[0];
            if let Ok(value) = std::env::var(var_name) {
                result = result.replace(placeholder, &value);
            }
        }

        result
    }

    pub fn data_dir() -> Result<PathBuf> {
        if let Ok(dir) = std::env::var("TURFPLAN_DATA_DIR") {
            return Ok(PathBuf::from(dir));
        }

        let data_dir = dirs::data_dir()
            .ok_or_else(|| TurfPlanError::Config("Cannot determine data directory".into()))?
            .join("turfplan");
        Ok(data_dir)
    }
}

fn non_empty_path(value: String) -> Option<PathBuf> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(PathBuf::from(trimmed))
    }
}
