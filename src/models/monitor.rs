use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_CHECK_INTERVAL_MINUTES: i64 = 30;
pub const DEFAULT_ALERT_THRESHOLD: i64 = 3;
pub const DEFAULT_FORECAST_HOURS: i64 = 48;

/// Bound violations for [`WeatherMonitorConfig`]. The messages are shown to users
/// verbatim.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorConfigError {
    #[error("Check interval must be positive")]
    CheckIntervalNotPositive,

    #[error("Check interval must be at least 15 minutes")]
    CheckIntervalTooShort,

    #[error("Check interval must not exceed 6 hours")]
    CheckIntervalTooLong,

    #[error("Alert threshold must be between 1 and 5")]
    AlertThresholdOutOfRange,

    #[error("Forecast hours must be at least 24")]
    ForecastHoursTooShort,

    #[error("Forecast hours must not exceed 168")]
    ForecastHoursTooLong,
}

/// Operational tuning for the weather monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherMonitorConfig {
    /// Minutes between forecast checks (15-360)
    pub check_interval: i64,
    /// Minimum alert priority that gets delivered (1-5)
    pub alert_threshold: i64,
    /// How far ahead occurrences are checked (24-168)
    pub forecast_hours: i64,
}

/// Partial monitor settings, shallow-merged over the defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_interval: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert_threshold: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forecast_hours: Option<i64>,
}

impl WeatherMonitorConfig {
    /// Checks every bound in a fixed order and reports the first one broken.
    pub fn validate(&self) -> Result<(), MonitorConfigError> {
        if self.check_interval <= 0 {
            return Err(MonitorConfigError::CheckIntervalNotPositive);
        }
        if self.check_interval < 15 {
            return Err(MonitorConfigError::CheckIntervalTooShort);
        }
        if self.check_interval > 360 {
            return Err(MonitorConfigError::CheckIntervalTooLong);
        }
        if !(1..=5).contains(&self.alert_threshold) {
            return Err(MonitorConfigError::AlertThresholdOutOfRange);
        }
        if self.forecast_hours < 24 {
            return Err(MonitorConfigError::ForecastHoursTooShort);
        }
        if self.forecast_hours > 168 {
            return Err(MonitorConfigError::ForecastHoursTooLong);
        }
        Ok(())
    }

    /// Defaults with `overrides` applied on top, validated.
    pub fn from_overrides(overrides: MonitorOverrides) -> Result<Self, MonitorConfigError> {
        let defaults = Self::default();
        let config = Self {
            check_interval: overrides.check_interval.unwrap_or(defaults.check_interval),
            alert_threshold: overrides.alert_threshold.unwrap_or(defaults.alert_threshold),
            forecast_hours: overrides.forecast_hours.unwrap_or(defaults.forecast_hours),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn check_period(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.check_interval.max(1) as u64 * 60)
    }
}

impl Default for WeatherMonitorConfig {
    fn default() -> Self {
        Self {
            check_interval: DEFAULT_CHECK_INTERVAL_MINUTES,
            alert_threshold: DEFAULT_ALERT_THRESHOLD,
            forecast_hours: DEFAULT_FORECAST_HOURS,
        }
    }
}
