use super::{
    deserialize_treatment_type, Frequency, PatternDraft, RecurrenceException, RecurrencePattern,
    TreatmentType,
};
use crate::error::Result;
use crate::logic::recurrence::{
    apply_exceptions, generate_occurrences, GenerateOptions, MAX_UNBOUNDED_OCCURRENCES,
};
use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// A user-defined recurring treatment: one pattern plus its per-date overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreatmentSchedule {
    pub id: i64,
    pub name: String,
    #[serde(deserialize_with = "deserialize_treatment_type")]
    pub treatment_type: TreatmentType,
    pub start_date: NaiveDate,
    pub pattern: PatternDraft,
    #[serde(default)]
    pub exceptions: Vec<RecurrenceException>,
}

impl TreatmentSchedule {
    pub fn new(
        id: i64,
        name: &str,
        treatment_type: TreatmentType,
        start_date: NaiveDate,
        pattern: RecurrencePattern,
    ) -> Self {
        Self {
            id,
            name: name.to_string(),
            treatment_type,
            start_date,
            pattern: pattern.into(),
            exceptions: Vec::new(),
        }
    }

    pub fn with_exception(mut self, exception: RecurrenceException) -> Self {
        self.exceptions.push(exception);
        self
    }

    /// The validated pattern, or every validation message if it is malformed.
    pub fn pattern(&self) -> Result<RecurrencePattern> {
        RecurrencePattern::try_from(self.pattern.clone())
    }

    /// Occurrences from the schedule's start, with exceptions applied.
    pub fn occurrences(
        &self,
        end_date: Option<NaiveDate>,
        max_occurrences: Option<usize>,
    ) -> Result<Vec<NaiveDate>> {
        let pattern = self.pattern()?;
        let dates = generate_occurrences(
            &pattern,
            &GenerateOptions {
                start_date: self.start_date,
                end_date,
                max_occurrences,
            },
        );
        Ok(apply_exceptions(&dates, &self.exceptions))
    }

    /// Occurrences on or after `from`, still phased from the schedule's start.
    ///
    /// Moved occurrences are matched against `from` and `until` by their new date.
    /// Without `until` at most `limit` dates are returned (default
    /// [`MAX_UNBOUNDED_OCCURRENCES`]).
    pub fn occurrences_from(
        &self,
        from: NaiveDate,
        until: Option<NaiveDate>,
        limit: Option<usize>,
    ) -> Result<Vec<NaiveDate>> {
        let pattern = self.pattern()?;
        let (end, cap) = match until {
            Some(until) => (until, limit.unwrap_or(usize::MAX)),
            None => {
                let cap = limit.unwrap_or(MAX_UNBOUNDED_OCCURRENCES);
                (self.lookahead(&pattern, from, cap), cap)
            }
        };

        Ok(self
            .occurrences(Some(self.generation_end(end)), None)?
            .into_iter()
            .filter(|d| *d >= from && until.map_or(true, |u| *d <= u))
            .take(cap)
            .collect())
    }

    /// Earliest occurrence on or after `after`, exceptions included.
    pub fn next_occurrence(&self, after: NaiveDate) -> Result<Option<NaiveDate>> {
        let pattern = self.pattern()?;
        let end = self.generation_end(self.lookahead(&pattern, after, 1));
        Ok(self
            .occurrences(Some(end), None)?
            .into_iter()
            .filter(|d| *d >= after)
            .min())
    }

    /// `end` pushed out to the latest exception's original date, so an occurrence
    /// moved back from beyond `end` is still generated.
    pub fn generation_end(&self, end: NaiveDate) -> NaiveDate {
        self.exceptions
            .iter()
            .map(|e| e.original_date)
            .fold(end, NaiveDate::max)
    }

    // A date late enough that at least `count` uncancelled occurrences fall between
    // `from` (or the start, if later) and it. Monthly gaps are at most interval + 1
    // months since a missed month_day never misses twice in a row.
    fn lookahead(&self, pattern: &RecurrencePattern, from: NaiveDate, count: usize) -> NaiveDate {
        let from = from.max(self.start_date);
        let steps = count
            .saturating_add(self.exceptions.len())
            .saturating_add(1);
        let steps = u32::try_from(steps).unwrap_or(u32::MAX);
        let interval = pattern.interval.max(1);

        let end = match pattern.frequency {
            Frequency::Daily => {
                from.checked_add_days(Days::new(u64::from(interval) * u64::from(steps)))
            }
            Frequency::Weekly => from.checked_add_days(Days::new(7 * u64::from(steps))),
            Frequency::Monthly => from.checked_add_months(Months::new(
                interval.saturating_add(1).saturating_mul(steps),
            )),
        };
        end.unwrap_or(NaiveDate::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TurfPlanError;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn occurrences_apply_exceptions() {
        let schedule = TreatmentSchedule::new(
            1,
            "Spring feeding",
            TreatmentType::Fertilization,
            date(2024, 4, 1),
            RecurrencePattern::daily(7).ending_after(3),
        )
        .with_exception(RecurrenceException::cancel(date(2024, 4, 8)));

        assert_eq!(
            schedule.occurrences(None, None).unwrap(),
            vec![date(2024, 4, 1), date(2024, 4, 15)]
        );
    }

    #[test]
    fn malformed_pattern_is_rejected() {
        let mut schedule = TreatmentSchedule::new(
            2,
            "Broken",
            TreatmentType::Aeration,
            date(2024, 4, 1),
            RecurrencePattern::monthly(15, 1),
        );
        schedule.pattern.month_day = None;

        match schedule.occurrences(None, Some(5)) {
            Err(TurfPlanError::InvalidPattern(messages)) => {
                assert_eq!(
                    messages,
                    vec!["Day of month is required for monthly recurrence".to_string()]
                );
            }
            other => panic!("expected invalid pattern, got {:?}", other),
        }
    }

    fn weekly_feed() -> TreatmentSchedule {
        TreatmentSchedule::new(
            4,
            "Weekly feed",
            TreatmentType::Fertilization,
            date(2024, 4, 1),
            RecurrencePattern::daily(7).ending_after(3),
        )
    }

    #[test]
    fn occurrences_from_keeps_schedule_phase() {
        assert_eq!(
            weekly_feed()
                .occurrences_from(date(2024, 4, 3), None, None)
                .unwrap(),
            vec![date(2024, 4, 8), date(2024, 4, 15)]
        );

        let open_ended = TreatmentSchedule::new(
            5,
            "Weeds",
            TreatmentType::WeedControl,
            date(2024, 4, 1),
            RecurrencePattern::daily(7),
        );
        assert_eq!(
            open_ended
                .occurrences_from(date(2024, 6, 2), None, Some(2))
                .unwrap(),
            vec![date(2024, 6, 3), date(2024, 6, 10)]
        );
        assert_eq!(
            open_ended
                .occurrences_from(date(2024, 4, 2), Some(date(2024, 4, 22)), None)
                .unwrap(),
            vec![date(2024, 4, 8), date(2024, 4, 15), date(2024, 4, 22)]
        );
    }

    #[test]
    fn finished_schedule_has_no_next_occurrence() {
        assert_eq!(weekly_feed().next_occurrence(date(2024, 5, 1)).unwrap(), None);
        assert_eq!(
            weekly_feed().next_occurrence(date(2024, 4, 9)).unwrap(),
            Some(date(2024, 4, 15))
        );
    }

    #[test]
    fn next_occurrence_before_start_is_the_start() {
        assert_eq!(
            weekly_feed().next_occurrence(date(2024, 1, 1)).unwrap(),
            Some(date(2024, 4, 1))
        );
    }

    #[test]
    fn next_occurrence_honours_exceptions() {
        let schedule = weekly_feed()
            .with_exception(RecurrenceException::cancel(date(2024, 4, 8)))
            .with_exception(RecurrenceException::reschedule(
                date(2024, 4, 15),
                date(2024, 4, 10),
            ));
        assert_eq!(
            schedule.next_occurrence(date(2024, 4, 2)).unwrap(),
            Some(date(2024, 4, 10))
        );
    }

    #[test]
    fn next_monthly_occurrence_skips_short_months() {
        let schedule = TreatmentSchedule::new(
            6,
            "Month end",
            TreatmentType::Aeration,
            date(2024, 1, 31),
            RecurrencePattern::monthly(31, 1),
        );
        assert_eq!(
            schedule.next_occurrence(date(2024, 2, 1)).unwrap(),
            Some(date(2024, 3, 31))
        );
    }

    #[test]
    fn generation_end_reaches_exception_dates() {
        let schedule = weekly_feed().with_exception(RecurrenceException::reschedule(
            date(2024, 6, 3),
            date(2024, 5, 2),
        ));
        assert_eq!(schedule.generation_end(date(2024, 5, 10)), date(2024, 6, 3));
        assert_eq!(schedule.generation_end(date(2024, 7, 1)), date(2024, 7, 1));
    }

    #[test]
    fn treatment_type_accepts_display_name() {
        let yaml = "id: 8\nname: Patrol\ntreatment_type: Weed Control\nstart_date: 2024-05-05\npattern:\n  frequency: daily\n  interval: 1\n";
        let schedule: TreatmentSchedule = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(schedule.treatment_type, TreatmentType::WeedControl);
    }

    #[test]
    fn schedule_parses_from_yaml() {
        let yaml = r#"
id: 3
name: Weed patrol
treatment_type: WeedControl
start_date: 2024-05-05
pattern:
  frequency: weekly
  interval: 1
  weekdays: [1, 3]
  end_type: after_occurrences
  occurrences: 4
exceptions:
  - original_date: 2024-05-08
    new_date: 2024-05-09
"#;
        let schedule: TreatmentSchedule = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(schedule.treatment_type, TreatmentType::WeedControl);
        assert_eq!(
            schedule.occurrences(None, None).unwrap(),
            vec![
                date(2024, 5, 6),
                date(2024, 5, 9),
                date(2024, 5, 13),
                date(2024, 5, 15)
            ]
        );
    }
}
