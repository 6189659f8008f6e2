use crate::error::{Result, TurfPlanError};
use crate::models::{AlertSeverity, AlertType, TreatmentConditions, TreatmentType, WeatherData};
use serde::{Deserialize, Serialize};

/// Event keywords checked first; any hit is severe.
const SEVERE_KEYWORDS: &[&str] = &["tornado", "hurricane", "thunderstorm", "flood"];

/// Checked only when no severe keyword matched.
const WARNING_KEYWORDS: &[&str] = &["rain", "snow", "wind", "extreme"];

/// A hard weather limit that a forecast broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintViolation {
    TemperatureLow,
    TemperatureHigh,
    Wind,
    Precipitation,
}

impl ConstraintViolation {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConstraintViolation::TemperatureLow => "temperature_low",
            ConstraintViolation::TemperatureHigh => "temperature_high",
            ConstraintViolation::Wind => "wind",
            ConstraintViolation::Precipitation => "precipitation",
        }
    }

    pub fn category(&self) -> AlertType {
        match self {
            ConstraintViolation::TemperatureLow | ConstraintViolation::TemperatureHigh => {
                AlertType::Temperature
            }
            ConstraintViolation::Wind => AlertType::Wind,
            ConstraintViolation::Precipitation => AlertType::Precipitation,
        }
    }

    pub fn describe(&self, weather: &WeatherData, limits: &TreatmentConditions) -> String {
        match self {
            ConstraintViolation::TemperatureLow => format!(
                "temperature {:.1}°C is below the {:.1}°C minimum",
                weather.temperature, limits.min_temp
            ),
            ConstraintViolation::TemperatureHigh => format!(
                "temperature {:.1}°C is above the {:.1}°C maximum",
                weather.temperature, limits.max_temp
            ),
            ConstraintViolation::Wind => format!(
                "wind {:.1} km/h exceeds the {:.1} km/h limit",
                weather.wind_speed, limits.max_wind_speed
            ),
            ConstraintViolation::Precipitation => format!(
                "precipitation {:.1} mm exceeds the {:.1} mm limit",
                weather.precipitation, limits.max_precipitation
            ),
        }
    }
}

impl std::fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuitabilityVerdict {
    pub suitable: bool,
    pub violated_constraints: Vec<ConstraintViolation>,
    /// Ranking hint only; never affects `suitable`.
    pub score: u32,
}

/// Check `weather` against the hard limits for `treatment`.
///
/// Limits are inclusive. A NaN reading fails its check. The score is 1 when the sky
/// conditions are one of the treatment's ideal ones, otherwise 0.
pub fn evaluate(treatment: TreatmentType, weather: &WeatherData) -> SuitabilityVerdict {
    let limits = treatment.conditions();
    let mut violated = Vec::new();

    if weather.temperature.is_nan() || weather.temperature < limits.min_temp {
        violated.push(ConstraintViolation::TemperatureLow);
    } else if weather.temperature > limits.max_temp {
        violated.push(ConstraintViolation::TemperatureHigh);
    }

    if weather.wind_speed.is_nan() || weather.wind_speed > limits.max_wind_speed {
        violated.push(ConstraintViolation::Wind);
    }

    if weather.precipitation.is_nan() || weather.precipitation > limits.max_precipitation {
        violated.push(ConstraintViolation::Precipitation);
    }

    let score = if limits
        .ideal_conditions
        .iter()
        .any(|c| c.matches(&weather.conditions))
    {
        1
    } else {
        0
    };

    SuitabilityVerdict {
        suitable: violated.is_empty(),
        violated_constraints: violated,
        score,
    }
}

/// [`evaluate`] for a treatment given by name. Unknown names are an error.
pub fn evaluate_named(treatment: &str, weather: &WeatherData) -> Result<SuitabilityVerdict> {
    let treatment = TreatmentType::from_str(treatment)
        .ok_or_else(|| TurfPlanError::UnknownTreatment(treatment.to_string()))?;
    Ok(evaluate(treatment, weather))
}

/// Classify a weather event description by keyword, severe terms first.
pub fn determine_severity(event_description: &str) -> AlertSeverity {
    let description = event_description.to_lowercase();

    if SEVERE_KEYWORDS.iter().any(|k| description.contains(k)) {
        AlertSeverity::Severe
    } else if WARNING_KEYWORDS.iter().any(|k| description.contains(k)) {
        AlertSeverity::Warning
    } else {
        AlertSeverity::Info
    }
}
