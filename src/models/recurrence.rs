use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Some(Frequency::Daily),
            "weekly" => Some(Frequency::Weekly),
            "monthly" => Some(Frequency::Monthly),
            _ => None,
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a recurrence terminates. Only the field matching the variant is consulted;
/// the others are ignored even when present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndType {
    #[default]
    Never,
    AfterOccurrences,
    OnDate,
}

impl EndType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EndType::Never => "never",
            EndType::AfterOccurrences => "after_occurrences",
            EndType::OnDate => "on_date",
        }
    }
}

impl std::fmt::Display for EndType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A validated recurrence rule.
///
/// Weekday indices run 0 (Sunday) through 6 (Saturday). `weekdays` only matters for
/// weekly patterns and `month_day` only for monthly ones; a pattern missing the field
/// its frequency needs simply generates nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrencePattern {
    pub frequency: Frequency,
    pub interval: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekdays: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month_day: Option<u32>,
    #[serde(default)]
    pub end_type: EndType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occurrences: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

impl RecurrencePattern {
    pub fn daily(interval: u32) -> Self {
        Self {
            frequency: Frequency::Daily,
            interval,
            weekdays: None,
            month_day: None,
            end_type: EndType::Never,
            occurrences: None,
            end_date: None,
        }
    }

    pub fn weekly(weekdays: &[u8]) -> Self {
        Self {
            frequency: Frequency::Weekly,
            weekdays: Some(weekdays.to_vec()),
            ..Self::daily(1)
        }
    }

    pub fn monthly(month_day: u32, interval: u32) -> Self {
        Self {
            frequency: Frequency::Monthly,
            month_day: Some(month_day),
            ..Self::daily(interval)
        }
    }

    pub fn ending_after(mut self, occurrences: u32) -> Self {
        self.end_type = EndType::AfterOccurrences;
        self.occurrences = Some(occurrences);
        self
    }

    pub fn ending_on(mut self, date: NaiveDate) -> Self {
        self.end_type = EndType::OnDate;
        self.end_date = Some(date);
        self
    }
}

/// The loosely-typed form of a recurrence pattern as it arrives from forms and files.
/// Every field is optional so that validation can report everything that is missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternDraft {
    pub frequency: Option<Frequency>,
    pub interval: Option<u32>,
    pub weekdays: Option<Vec<u8>>,
    pub month_day: Option<u32>,
    pub end_type: Option<EndType>,
    pub occurrences: Option<u32>,
    pub end_date: Option<NaiveDate>,
}

impl From<RecurrencePattern> for PatternDraft {
    fn from(pattern: RecurrencePattern) -> Self {
        Self {
            frequency: Some(pattern.frequency),
            interval: Some(pattern.interval),
            weekdays: pattern.weekdays,
            month_day: pattern.month_day,
            end_type: Some(pattern.end_type),
            occurrences: pattern.occurrences,
            end_date: pattern.end_date,
        }
    }
}

/// Override for a single generated occurrence, matched on calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceException {
    pub original_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_cancelled: bool,
}

impl RecurrenceException {
    pub fn cancel(original_date: NaiveDate) -> Self {
        Self {
            original_date,
            new_date: None,
            is_cancelled: true,
        }
    }

    pub fn reschedule(original_date: NaiveDate, new_date: NaiveDate) -> Self {
        Self {
            original_date,
            new_date: Some(new_date),
            is_cancelled: false,
        }
    }
}
