use super::planner::{plan_schedule, PlanWindow};
use crate::datasources::LocalFiles;
use crate::error::{Result, TurfPlanError};
use crate::models::{
    AlertType, ForecastSnapshot, TreatmentAlert, TreatmentSchedule, WeatherMonitorConfig,
};
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashSet;
use std::future::Future;
use std::io::Write;

/// Destination for alerts that clear the monitor's threshold.
pub trait AlertSink: Send + Sync {
    fn name(&self) -> &'static str;

    fn deliver(&self, alert: &TreatmentAlert) -> Result<()>;
}

/// Writes each alert as one JSON object per line on stdout.
pub struct JsonLinesSink;

impl AlertSink for JsonLinesSink {
    fn name(&self) -> &'static str {
        "stdout"
    }

    fn deliver(&self, alert: &TreatmentAlert) -> Result<()> {
        let line = serde_json::to_string(alert)?;
        let mut out = std::io::stdout().lock();
        writeln!(out, "{}", line).map_err(|e| TurfPlanError::AlertDelivery(e.to_string()))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonitorReport {
    pub occurrences: usize,
    pub delivered: Vec<TreatmentAlert>,
    pub below_threshold: usize,
    pub already_sent: usize,
}

type AlertKey = (i64, NaiveDate, AlertType);

/// Periodically plans every schedule against the latest forecast and forwards new
/// alerts to a sink.
pub struct WeatherMonitor<S: AlertSink> {
    config: WeatherMonitorConfig,
    sink: S,
    sent: HashSet<AlertKey>,
}

impl<S: AlertSink> WeatherMonitor<S> {
    pub fn new(config: WeatherMonitorConfig, sink: S) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            sink,
            sent: HashSet::new(),
        })
    }

    pub fn config(&self) -> &WeatherMonitorConfig {
        &self.config
    }

    /// One monitoring pass over the forecast horizon starting at `now`.
    ///
    /// Schedules with malformed patterns are logged and skipped. An alert is delivered
    /// at most once per schedule, date and type.
    pub fn check(
        &mut self,
        schedules: &[TreatmentSchedule],
        forecast: &ForecastSnapshot,
        now: DateTime<Utc>,
    ) -> Result<MonitorReport> {
        let window = PlanWindow::from_horizon(now, self.config.forecast_hours);
        self.sent.retain(|(_, date, _)| *date >= window.start);

        let mut report = MonitorReport::default();

        for schedule in schedules {
            let plans = match plan_schedule(schedule, forecast, window) {
                Ok(plans) => plans,
                Err(e) => {
                    tracing::warn!(schedule = schedule.id, "Skipping schedule: {}", e);
                    continue;
                }
            };
            report.occurrences += plans.len();

            for alert in plans.iter().filter_map(|p| p.action.alert()) {
                if i64::from(alert.priority()) < self.config.alert_threshold {
                    tracing::debug!(
                        schedule = alert.treatment_id,
                        date = %alert.occurrence_date,
                        priority = alert.priority(),
                        "Alert below threshold"
                    );
                    report.below_threshold += 1;
                    continue;
                }

                let key = (alert.treatment_id, alert.occurrence_date, alert.alert_type);
                if self.sent.contains(&key) {
                    report.already_sent += 1;
                    continue;
                }

                self.sink.deliver(alert)?;
                self.sent.insert(key);
                report.delivered.push(alert.clone());
            }
        }

        Ok(report)
    }

    /// Check on every `check_interval` tick until `shutdown` resolves. Each tick
    /// reloads schedules and forecast so edits are picked up; a tick whose inputs fail
    /// to load is logged and skipped.
    pub async fn run<F>(mut self, files: &LocalFiles, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let mut interval = tokio::time::interval(self.config.check_period());
        tokio::pin!(shutdown);

        tracing::info!(
            "Weather monitor active: checking every {} min, {}h horizon, threshold {}, sink {}",
            self.config.check_interval,
            self.config.forecast_hours,
            self.config.alert_threshold,
            self.sink.name()
        );

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("Weather monitor stopping");
                    break;
                }
                _ = interval.tick() => {
                    match self.tick(files).await {
                        Ok(report) => tracing::info!(
                            occurrences = report.occurrences,
                            delivered = report.delivered.len(),
                            below_threshold = report.below_threshold,
                            "Weather check complete"
                        ),
                        Err(e) => tracing::warn!("Weather check failed: {}", e),
                    }
                }
            }
        }

        Ok(())
    }

    async fn tick(&mut self, files: &LocalFiles) -> Result<MonitorReport> {
        let schedules = files.load_schedules().await?;
        let forecast = files.load_forecast().await?;
        self.check(&schedules, &forecast, Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RecurrencePattern, TreatmentType, WeatherData};
    use chrono::TimeZone;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct CollectingSink {
        alerts: Arc<Mutex<Vec<TreatmentAlert>>>,
    }

    impl AlertSink for CollectingSink {
        fn name(&self) -> &'static str {
            "collecting"
        }

        fn deliver(&self, alert: &TreatmentAlert) -> Result<()> {
            self.alerts.lock().unwrap().push(alert.clone());
            Ok(())
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 6, 8, 0, 0).unwrap()
    }

    fn schedules() -> Vec<TreatmentSchedule> {
        vec![
            TreatmentSchedule::new(
                1,
                "Weeds",
                TreatmentType::WeedControl,
                date(2024, 5, 1),
                RecurrencePattern::daily(1),
            ),
            TreatmentSchedule::new(
                2,
                "Feed",
                TreatmentType::Fertilization,
                date(2024, 5, 6),
                RecurrencePattern::daily(1),
            ),
        ]
    }

    fn forecast() -> ForecastSnapshot {
        ForecastSnapshot::new(now())
            // severe storm: both treatments fail on wind
            .with_day(date(2024, 5, 6), WeatherData::new(20.0, 45.0, 0.0, "Thunderstorm"))
            // breezy but clear: weed control only, info severity
            .with_day(date(2024, 5, 7), WeatherData::new(20.0, 20.0, 0.0, "Clear"))
            .with_day(date(2024, 5, 8), WeatherData::new(20.0, 5.0, 0.0, "Clear"))
    }

    #[test]
    fn rejects_invalid_config() {
        let config = WeatherMonitorConfig {
            check_interval: 5,
            ..Default::default()
        };
        let err = WeatherMonitor::new(config, CollectingSink::default())
            .err()
            .unwrap();
        assert_eq!(err.to_string(), "Check interval must be at least 15 minutes");
    }

    #[test]
    fn delivers_alerts_at_or_above_threshold() {
        let sink = CollectingSink::default();
        let mut monitor =
            WeatherMonitor::new(WeatherMonitorConfig::default(), sink.clone()).unwrap();

        let report = monitor.check(&schedules(), &forecast(), now()).unwrap();

        // 48h horizon: May 6-8 for both schedules
        assert_eq!(report.occurrences, 6);
        assert_eq!(report.delivered.len(), 2);
        assert_eq!(report.below_threshold, 1);
        assert!(report
            .delivered
            .iter()
            .all(|a| a.occurrence_date == date(2024, 5, 6) && a.alert_type == AlertType::Wind));
        assert_eq!(sink.alerts.lock().unwrap().len(), 2);
    }

    #[test]
    fn low_threshold_lets_info_alerts_through() {
        let config = WeatherMonitorConfig {
            alert_threshold: 1,
            ..Default::default()
        };
        let mut monitor = WeatherMonitor::new(config, CollectingSink::default()).unwrap();
        let report = monitor.check(&schedules(), &forecast(), now()).unwrap();
        assert_eq!(report.delivered.len(), 3);
        assert_eq!(report.below_threshold, 0);
    }

    #[test]
    fn repeated_checks_do_not_resend() {
        let sink = CollectingSink::default();
        let mut monitor =
            WeatherMonitor::new(WeatherMonitorConfig::default(), sink.clone()).unwrap();

        monitor.check(&schedules(), &forecast(), now()).unwrap();
        let second = monitor.check(&schedules(), &forecast(), now()).unwrap();

        assert!(second.delivered.is_empty());
        assert_eq!(second.already_sent, 2);
        assert_eq!(sink.alerts.lock().unwrap().len(), 2);
    }

    #[test]
    fn malformed_schedule_is_skipped() {
        let mut broken = schedules().remove(0);
        broken.pattern.frequency = None;
        let mut monitor =
            WeatherMonitor::new(WeatherMonitorConfig::default(), CollectingSink::default())
                .unwrap();

        let report = monitor
            .check(&[broken, schedules().remove(1)], &forecast(), now())
            .unwrap();
        assert_eq!(report.occurrences, 3);
        assert_eq!(report.delivered.len(), 1);
    }

    #[tokio::test]
    async fn run_checks_once_then_stops_on_shutdown() {
        let dir = tempfile::tempdir().unwrap();
        let today = Utc::now().date_naive();

        let schedules = vec![TreatmentSchedule::new(
            5,
            "Storm test",
            TreatmentType::PestControl,
            today,
            RecurrencePattern::daily(1).ending_after(1),
        )];
        let forecast = ForecastSnapshot::new(Utc::now())
            .with_day(today, WeatherData::new(20.0, 60.0, 12.0, "Hurricane"));

        let schedules_path = dir.path().join("schedules.yaml");
        let forecast_path = dir.path().join("forecast.yaml");
        std::fs::write(&schedules_path, serde_yaml::to_string(&schedules).unwrap()).unwrap();
        std::fs::write(&forecast_path, serde_yaml::to_string(&forecast).unwrap()).unwrap();

        let sink = CollectingSink::default();
        let monitor = WeatherMonitor::new(WeatherMonitorConfig::default(), sink.clone()).unwrap();
        let files = LocalFiles::new(schedules_path, forecast_path);

        monitor
            .run(&files, tokio::time::sleep(std::time::Duration::from_millis(100)))
            .await
            .unwrap();

        let alerts = sink.alerts.lock().unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].treatment_id, 5);
        assert_eq!(alerts[0].violation_count, 2);
    }
}
