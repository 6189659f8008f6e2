use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A weather observation or forecast for one date, as supplied by the weather
/// collaborator. Temperature in °C, wind in km/h, precipitation in mm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherData {
    pub temperature: f64,
    pub humidity: f64,
    pub precipitation: f64,
    pub wind_speed: f64,
    pub conditions: String,
}

impl WeatherData {
    pub fn new(temperature: f64, wind_speed: f64, precipitation: f64, conditions: &str) -> Self {
        Self {
            temperature,
            humidity: 50.0,
            precipitation,
            wind_speed,
            conditions: conditions.to_string(),
        }
    }

    pub fn with_humidity(mut self, humidity: f64) -> Self {
        self.humidity = humidity;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyWeather {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub weather: WeatherData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastLocation {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Daily forecast points already fetched and parsed by the weather collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSnapshot {
    pub fetched_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<ForecastLocation>,
    #[serde(default)]
    pub days: Vec<DailyWeather>,
}

impl ForecastSnapshot {
    pub fn new(fetched_at: DateTime<Utc>) -> Self {
        Self {
            fetched_at,
            location: None,
            days: Vec::new(),
        }
    }

    pub fn with_day(mut self, date: NaiveDate, weather: WeatherData) -> Self {
        self.days.push(DailyWeather { date, weather });
        self
    }

    /// Forecast for the given date. When a date appears more than once the first
    /// entry wins.
    pub fn for_date(&self, date: NaiveDate) -> Option<&WeatherData> {
        self.days
            .iter()
            .find(|d| d.date == date)
            .map(|d| &d.weather)
    }

    /// Forecast days inside `[from, to]`, in date order.
    pub fn between(&self, from: NaiveDate, to: NaiveDate) -> Vec<&DailyWeather> {
        let mut days: Vec<&DailyWeather> = self
            .days
            .iter()
            .filter(|d| d.date >= from && d.date <= to)
            .collect();
        days.sort_by_key(|d| d.date);
        days
    }
}
