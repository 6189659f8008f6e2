use crate::error::{Result, TurfPlanError};
use crate::models::{ForecastSnapshot, TreatmentSchedule};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Schedules and forecast snapshots kept as YAML (or JSON) files on disk, written by
/// the surrounding application and the weather fetcher.
#[derive(Debug, Clone)]
pub struct LocalFiles {
    schedules_path: PathBuf,
    forecast_path: PathBuf,
}

impl LocalFiles {
    pub fn new(schedules_path: PathBuf, forecast_path: PathBuf) -> Self {
        Self {
            schedules_path,
            forecast_path,
        }
    }

    pub fn schedules_path(&self) -> &Path {
        &self.schedules_path
    }

    pub fn forecast_path(&self) -> &Path {
        &self.forecast_path
    }

    pub async fn load_schedules(&self) -> Result<Vec<TreatmentSchedule>> {
        let schedules: Vec<TreatmentSchedule> = read_yaml(&self.schedules_path).await?;
        tracing::debug!(
            count = schedules.len(),
            "Loaded schedules from {}",
            self.schedules_path.display()
        );
        Ok(schedules)
    }

    pub async fn load_schedule(&self, id: i64) -> Result<TreatmentSchedule> {
        self.load_schedules()
            .await?
            .into_iter()
            .find(|s| s.id == id)
            .ok_or_else(|| TurfPlanError::NotFound(format!("schedule {}", id)))
    }

    pub async fn load_forecast(&self) -> Result<ForecastSnapshot> {
        let forecast: ForecastSnapshot = read_yaml(&self.forecast_path).await?;
        tracing::debug!(
            days = forecast.days.len(),
            fetched_at = %forecast.fetched_at,
            "Loaded forecast from {}",
            self.forecast_path.display()
        );
        Ok(forecast)
    }
}

async fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(TurfPlanError::NotFound(path.display().to_string()));
        }
        Err(e) => return Err(e.into()),
    };

    serde_yaml::from_str(&content).map_err(|e| {
        TurfPlanError::InvalidData(format!("Failed to parse {}: {}", path.display(), e))
    })
}
