use super::{RecurrenceException, TreatmentType};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Info,
    Warning,
    Severe,
}

impl AlertSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertSeverity::Info => "info",
            AlertSeverity::Warning => "warning",
            AlertSeverity::Severe => "severe",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            AlertSeverity::Info => "ℹ",
            AlertSeverity::Warning => "⚠",
            AlertSeverity::Severe => "!",
        }
    }

    /// Base priority on the 1-5 scale used by `alert_threshold`.
    pub fn base_priority(&self) -> u8 {
        match self {
            AlertSeverity::Info => 2,
            AlertSeverity::Warning => 3,
            AlertSeverity::Severe => 5,
        }
    }
}

impl std::fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Category of the weather limit an alert is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertType {
    Temperature,
    Wind,
    Precipitation,
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::Temperature => "temperature",
            AlertType::Wind => "wind",
            AlertType::Precipitation => "precipitation",
        }
    }
}

impl std::fmt::Display for AlertType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Payload handed to the notification collaborator for an unsuitable occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreatmentAlert {
    pub treatment_id: i64,
    #[serde(deserialize_with = "super::deserialize_treatment_type")]
    pub treatment_type: TreatmentType,
    pub occurrence_date: NaiveDate,
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub severity: AlertSeverity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_date: Option<NaiveDate>,
    /// Number of hard limits the forecast breaks.
    #[serde(default)]
    pub violation_count: usize,
}

impl TreatmentAlert {
    pub fn new(
        treatment_id: i64,
        treatment_type: TreatmentType,
        occurrence_date: NaiveDate,
        alert_type: AlertType,
        severity: AlertSeverity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            treatment_id,
            treatment_type,
            occurrence_date,
            alert_type,
            severity,
            message: message.into(),
            suggested_date: None,
            violation_count: 1,
        }
    }

    pub fn with_suggested_date(mut self, date: NaiveDate) -> Self {
        self.suggested_date = Some(date);
        self
    }

    pub fn with_violation_count(mut self, count: usize) -> Self {
        self.violation_count = count;
        self
    }

    /// Priority on the 1-5 scale: the severity's base, one higher when several
    /// limits are broken at once.
    pub fn priority(&self) -> u8 {
        let bump = if self.violation_count > 1 { 1 } else { 0 };
        (self.severity.base_priority() + bump).min(5)
    }

    /// Exception that would move the occurrence to the suggested date.
    pub fn as_exception(&self) -> Option<RecurrenceException> {
        self.suggested_date
            .map(|to| RecurrenceException::reschedule(self.occurrence_date, to))
    }
}
