use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "turfplan",
    version,
    about = "Recurring lawn treatment scheduling with weather checks"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config.yaml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run interactive setup
    Init,
    /// Validate config, schedules and forecast
    Check,
    /// List occurrences of a schedule
    Occurrences {
        /// Schedule id
        schedule: i64,
        /// Start from this date instead of the schedule start
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Stop after this date
        #[arg(long)]
        until: Option<NaiveDate>,
        /// Maximum number of dates
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show the next occurrence of a schedule
    Next {
        /// Schedule id
        schedule: i64,
        /// Look from this date (default: today)
        #[arg(long)]
        after: Option<NaiveDate>,
    },
    /// Check weather against a treatment's limits
    Evaluate {
        /// Treatment name, e.g. "Weed Control"
        treatment: String,
        /// Temperature (°C)
        #[arg(long)]
        temperature: f64,
        /// Wind speed (km/h)
        #[arg(long, default_value_t = 0.0)]
        wind: f64,
        /// Precipitation (mm)
        #[arg(long, default_value_t = 0.0)]
        precipitation: f64,
        /// Relative humidity (%)
        #[arg(long, default_value_t = 50.0)]
        humidity: f64,
        /// Sky conditions, e.g. "Partly cloudy"
        #[arg(long, default_value = "Clear")]
        conditions: String,
    },
    /// Classify a weather event description
    Severity {
        description: String,
    },
    /// Print the treatment threshold table
    Treatments,
    /// Plan upcoming occurrences against the forecast
    Plan {
        /// Evaluate as of this instant (RFC 3339, default: now)
        #[arg(long)]
        now: Option<DateTime<Utc>>,
    },
    /// Watch the forecast and emit alerts until interrupted
    Monitor,
}
