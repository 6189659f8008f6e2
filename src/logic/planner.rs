use super::suitability::{determine_severity, evaluate, SuitabilityVerdict};
use crate::error::Result;
use crate::models::{ForecastSnapshot, TreatmentAlert, TreatmentSchedule};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;

/// Inclusive range of dates an occurrence plan covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlanWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl PlanWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// From today through the date `forecast_hours` from now.
    pub fn from_horizon(now: DateTime<Utc>, forecast_hours: i64) -> Self {
        let end = now + Duration::hours(forecast_hours.max(0));
        Self {
            start: now.date_naive(),
            end: end.date_naive(),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PlannedAction {
    /// Forecast meets every limit
    Proceed,
    /// No forecast covers the date yet
    NoForecast,
    /// Unsuitable, and a later suitable date exists in the window
    Reschedule { alert: TreatmentAlert },
    /// Unsuitable with nowhere better to go
    Alert { alert: TreatmentAlert },
}

impl PlannedAction {
    pub fn alert(&self) -> Option<&TreatmentAlert> {
        match self {
            PlannedAction::Reschedule { alert } | PlannedAction::Alert { alert } => Some(alert),
            PlannedAction::Proceed | PlannedAction::NoForecast => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OccurrencePlan {
    pub schedule_id: i64,
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verdict: Option<SuitabilityVerdict>,
    #[serde(flatten)]
    pub action: PlannedAction,
}

/// Decide what should happen to every occurrence of `schedule` inside `window`.
pub fn plan_schedule(
    schedule: &TreatmentSchedule,
    forecast: &ForecastSnapshot,
    window: PlanWindow,
) -> Result<Vec<OccurrencePlan>> {
    let dates: Vec<NaiveDate> = schedule
        .occurrences(Some(schedule.generation_end(window.end)), None)?
        .into_iter()
        .filter(|d| window.contains(*d))
        .collect();

    let plans = dates
        .iter()
        .map(|date| plan_occurrence(schedule, forecast, window, &dates, *date))
        .collect();

    Ok(plans)
}

fn plan_occurrence(
    schedule: &TreatmentSchedule,
    forecast: &ForecastSnapshot,
    window: PlanWindow,
    occupied: &[NaiveDate],
    date: NaiveDate,
) -> OccurrencePlan {
    let Some(weather) = forecast.for_date(date) else {
        tracing::debug!(schedule = schedule.id, %date, "No forecast for occurrence");
        return OccurrencePlan {
            schedule_id: schedule.id,
            date,
            verdict: None,
            action: PlannedAction::NoForecast,
        };
    };

    let verdict = evaluate(schedule.treatment_type, weather);
    if verdict.suitable {
        return OccurrencePlan {
            schedule_id: schedule.id,
            date,
            verdict: Some(verdict),
            action: PlannedAction::Proceed,
        };
    }

    let limits = schedule.treatment_type.conditions();
    let reasons: Vec<String> = verdict
        .violated_constraints
        .iter()
        .map(|v| v.describe(weather, limits))
        .collect();

    // evaluate() only reports unsuitable when something was violated
    let alert_type = verdict
        .violated_constraints
        .first()
        .map(|v| v.category())
        .unwrap_or(crate::models::AlertType::Temperature);

    let alert = TreatmentAlert::new(
        schedule.id,
        schedule.treatment_type,
        date,
        alert_type,
        determine_severity(&weather.conditions),
        format!(
            "{} ({}) on {}: {}",
            schedule.name,
            schedule.treatment_type,
            date.format("%b %d"),
            reasons.join(", ")
        ),
    )
    .with_violation_count(verdict.violated_constraints.len());

    let action = match suggest_alternative(schedule, forecast, window, occupied, date) {
        Some(suggested) => {
            tracing::debug!(schedule = schedule.id, %date, %suggested, "Suggesting reschedule");
            PlannedAction::Reschedule {
                alert: alert.with_suggested_date(suggested),
            }
        }
        None => PlannedAction::Alert { alert },
    };

    OccurrencePlan {
        schedule_id: schedule.id,
        date,
        verdict: Some(verdict),
        action,
    }
}

/// Best later forecast day in the window that passes every limit and is not already
/// an occurrence. Higher score wins; ties go to the earliest date.
fn suggest_alternative(
    schedule: &TreatmentSchedule,
    forecast: &ForecastSnapshot,
    window: PlanWindow,
    occupied: &[NaiveDate],
    date: NaiveDate,
) -> Option<NaiveDate> {
    let first = date.succ_opt()?;
    forecast
        .between(first, window.end)
        .into_iter()
        .filter(|day| !occupied.contains(&day.date))
        .filter_map(|day| {
            let verdict = evaluate(schedule.treatment_type, &day.weather);
            verdict.suitable.then_some((day.date, verdict.score))
        })
        .max_by(|(a_date, a_score), (b_date, b_score)| {
            a_score.cmp(b_score).then_with(|| b_date.cmp(a_date))
        })
        .map(|(d, _)| d)
}
