//! Recurrence expansion for treatment schedules.
//!
//! A pattern is expanded by walking a cursor forward from the requested start date,
//! testing each cursor value against the frequency's rule, until the resolved bound
//! says stop. Exceptions are applied afterwards as a separate pass.

use crate::error::TurfPlanError;
use crate::models::{EndType, Frequency, PatternDraft, RecurrenceException, RecurrencePattern};
use chrono::{Datelike, Days, Months, NaiveDate};

/// Upper limit on generated dates when neither the pattern nor the caller bounds the
/// expansion. Callers needing more must pass an explicit bound.
pub const MAX_UNBOUNDED_OCCURRENCES: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerateOptions {
    /// First date considered, inclusive
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub max_occurrences: Option<usize>,
}

impl GenerateOptions {
    pub fn starting(start_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date: None,
            max_occurrences: None,
        }
    }

    pub fn until(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    pub fn limit(mut self, max_occurrences: usize) -> Self {
        self.max_occurrences = Some(max_occurrences);
        self
    }
}

/// Stop condition for one expansion, resolved once up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bound {
    Count(usize),
    Until(NaiveDate),
}

impl Bound {
    /// Pattern end conditions win over caller bounds, and the caller's end date wins
    /// over its occurrence limit.
    fn resolve(pattern: &RecurrencePattern, options: &GenerateOptions) -> Self {
        match (pattern.end_type, pattern.occurrences, pattern.end_date) {
            (EndType::AfterOccurrences, Some(n), _) => return Bound::Count(n as usize),
            (EndType::OnDate, _, Some(end)) => return Bound::Until(end),
            _ => {}
        }

        if let Some(end) = options.end_date {
            Bound::Until(end)
        } else if let Some(max) = options.max_occurrences {
            Bound::Count(max)
        } else {
            Bound::Count(MAX_UNBOUNDED_OCCURRENCES)
        }
    }

    fn allows(&self, emitted: usize, cursor: NaiveDate) -> bool {
        match *self {
            Bound::Count(max) => emitted < max,
            Bound::Until(end) => cursor <= end,
        }
    }
}

/// Expand `pattern` into ordered occurrence dates starting at `options.start_date`.
///
/// Generation is total: a pattern missing the field its frequency depends on, or
/// with a zero interval, yields no dates instead of an error. Run
/// [`validate_recurrence_pattern`] first to get the reasons.
pub fn generate_occurrences(
    pattern: &RecurrencePattern,
    options: &GenerateOptions,
) -> Vec<NaiveDate> {
    if pattern.interval == 0 {
        tracing::debug!("Recurrence interval is zero, nothing to generate");
        return Vec::new();
    }

    let bound = Bound::resolve(pattern, options);
    let start = options.start_date;

    let dates = match pattern.frequency {
        Frequency::Daily => expand_daily(start, pattern.interval, bound),
        Frequency::Weekly => {
            expand_weekly(start, pattern.weekdays.as_deref().unwrap_or(&[]), bound)
        }
        Frequency::Monthly => match pattern.month_day {
            Some(day) => expand_monthly(start, day, pattern.interval, bound),
            None => Vec::new(),
        },
    };

    tracing::trace!(
        frequency = %pattern.frequency,
        start = %start,
        count = dates.len(),
        "Expanded recurrence pattern"
    );

    dates
}

fn expand_daily(start: NaiveDate, interval: u32, bound: Bound) -> Vec<NaiveDate> {
    let step = Days::new(u64::from(interval));
    let mut dates = Vec::new();
    let mut cursor = Some(start);

    while let Some(date) = cursor {
        if !bound.allows(dates.len(), date) {
            break;
        }
        dates.push(date);
        cursor = date.checked_add_days(step);
    }

    dates
}

// Walks one calendar day at a time and keeps the days whose weekday is selected.
// The pattern interval does not space weekly occurrences apart.
fn expand_weekly(start: NaiveDate, weekdays: &[u8], bound: Bound) -> Vec<NaiveDate> {
    let selected: Vec<u32> = weekdays
        .iter()
        .filter(|d| **d <= 6)
        .map(|d| u32::from(*d))
        .collect();
    if selected.is_empty() {
        return Vec::new();
    }

    let mut dates = Vec::new();
    let mut cursor = Some(start);

    while let Some(date) = cursor {
        if !bound.allows(dates.len(), date) {
            break;
        }
        if selected.contains(&date.weekday().num_days_from_sunday()) {
            dates.push(date);
        }
        cursor = date.succ_opt();
    }

    dates
}

// The cursor is the first of a month. A month that has `month_day` (on or after the
// start date) emits it and moves `interval` months ahead; a month without it (e.g. the
// 31st in April) is skipped by moving a single month. Short months are never clamped.
fn expand_monthly(start: NaiveDate, month_day: u32, interval: u32, bound: Bound) -> Vec<NaiveDate> {
    if !(1..=31).contains(&month_day) {
        return Vec::new();
    }
    // From the start date itself a month_day earlier in the month would never match.
    let Some(mut month) = start.with_day(1) else {
        return Vec::new();
    };

    let mut dates = Vec::new();
    loop {
        let candidate = month.with_day(month_day);
        if !bound.allows(dates.len(), candidate.unwrap_or(month)) {
            break;
        }

        let step = match candidate {
            Some(date) if date >= start => {
                dates.push(date);
                interval
            }
            _ => 1,
        };

        match month.checked_add_months(Months::new(step)) {
            Some(next) => month = next,
            None => break,
        }
    }

    dates
}

/// Apply per-date overrides. Cancelled occurrences are dropped; moved ones keep their
/// position in the sequence even when the new date sorts elsewhere.
pub fn apply_exceptions(
    dates: &[NaiveDate],
    exceptions: &[RecurrenceException],
) -> Vec<NaiveDate> {
    dates
        .iter()
        .filter_map(|date| {
            match exceptions.iter().find(|e| e.original_date == *date) {
                None => Some(*date),
                Some(e) if e.is_cancelled => None,
                Some(e) => Some(e.new_date.unwrap_or(*date)),
            }
        })
        .collect()
}

/// First occurrence on or after `after`.
pub fn get_next_occurrence(pattern: &RecurrencePattern, after: NaiveDate) -> Option<NaiveDate> {
    generate_occurrences(pattern, &GenerateOptions::starting(after).limit(1))
        .into_iter()
        .next()
}

/// Every problem with a draft pattern, in a stable order. Empty means valid.
pub fn validate_recurrence_pattern(draft: &PatternDraft) -> Vec<String> {
    let mut errors = Vec::new();

    if draft.frequency.is_none() {
        errors.push("Frequency is required".to_string());
    }

    match draft.interval {
        None => errors.push("Interval is required".to_string()),
        Some(0) => errors.push("Interval must be at least 1".to_string()),
        Some(_) => {}
    }

    match draft.frequency {
        Some(Frequency::Weekly) => match draft.weekdays.as_deref() {
            None | Some([]) => errors.push(
                "At least one weekday must be selected for weekly recurrence".to_string(),
            ),
            Some(days) if days.iter().any(|d| *d > 6) => errors.push(
                "Weekdays must be between 0 (Sunday) and 6 (Saturday)".to_string(),
            ),
            Some(_) => {}
        },
        Some(Frequency::Monthly) => match draft.month_day {
            None => errors.push("Day of month is required for monthly recurrence".to_string()),
            Some(day) if !(1..=31).contains(&day) => {
                errors.push("Day of month must be between 1 and 31".to_string())
            }
            Some(_) => {}
        },
        _ => {}
    }

    match draft.end_type {
        Some(EndType::AfterOccurrences) if draft.occurrences.unwrap_or(0) < 1 => {
            errors.push("Number of occurrences must be at least 1".to_string());
        }
        Some(EndType::OnDate) if draft.end_date.is_none() => {
            errors.push("End date is required when ending on a date".to_string());
        }
        _ => {}
    }

    errors
}

impl TryFrom<PatternDraft> for RecurrencePattern {
    type Error = TurfPlanError;

    fn try_from(draft: PatternDraft) -> Result<Self, Self::Error> {
        let errors = validate_recurrence_pattern(&draft);
        let (Some(frequency), Some(interval), true) =
            (draft.frequency, draft.interval, errors.is_empty())
        else {
            return Err(TurfPlanError::InvalidPattern(errors));
        };

        Ok(Self {
            frequency,
            interval,
            weekdays: draft.weekdays,
            month_day: draft.month_day,
            end_type: draft.end_type.unwrap_or_default(),
            occurrences: draft.occurrences,
            end_date: draft.end_date,
        })
    }
}
