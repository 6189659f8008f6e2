use anyhow::{bail, Context};
use chrono::Utc;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use turfplan::cli::{Cli, Commands};
use turfplan::config::Config;
use turfplan::logic::{
    determine_severity, evaluate_named, plan_schedule, validate_recurrence_pattern,
    JsonLinesSink, PlanWindow, WeatherMonitor,
};
use turfplan::models::{TreatmentType, WeatherData};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Init => {
            Config::setup_interactive()?;
        }
        Commands::Check => check(cli.config).await?,
        Commands::Occurrences {
            schedule,
            from,
            until,
            limit,
        } => {
            let files = load_config(cli.config)?.local_files()?;
            let schedule = files.load_schedule(schedule).await?;
            let dates =
                schedule.occurrences_from(from.unwrap_or(schedule.start_date), until, limit)?;
            println!("{}", serde_json::to_string_pretty(&dates)?);
        }
        Commands::Next { schedule, after } => {
            let files = load_config(cli.config)?.local_files()?;
            let schedule = files.load_schedule(schedule).await?;
            let after = after.unwrap_or_else(|| Utc::now().date_naive());
            match schedule.next_occurrence(after)? {
                Some(date) => println!("{}", date),
                None => println!("No upcoming occurrence"),
            }
        }
        Commands::Evaluate {
            treatment,
            temperature,
            wind,
            precipitation,
            humidity,
            conditions,
        } => {
            let weather = WeatherData::new(temperature, wind, precipitation, &conditions)
                .with_humidity(humidity);
            let verdict = evaluate_named(&treatment, &weather)?;
            println!("{}", serde_json::to_string_pretty(&verdict)?);
        }
        Commands::Severity { description } => {
            let severity = determine_severity(&description);
            println!("{} {}", severity.symbol(), severity);
        }
        Commands::Treatments => print_treatments(),
        Commands::Plan { now } => {
            let config = load_config(cli.config)?;
            let monitor = config.monitor_config()?;
            let files = config.local_files()?;
            let schedules = files.load_schedules().await?;
            let forecast = files.load_forecast().await?;

            let window =
                PlanWindow::from_horizon(now.unwrap_or_else(Utc::now), monitor.forecast_hours);
            let mut plans = Vec::new();
            for schedule in &schedules {
                match plan_schedule(schedule, &forecast, window) {
                    Ok(p) => plans.extend(p),
                    Err(e) => tracing::warn!(schedule = schedule.id, "Skipping schedule: {}", e),
                }
            }
            println!("{}", serde_json::to_string_pretty(&plans)?);
        }
        Commands::Monitor => {
            let config = load_config(cli.config)?;
            let files = config.local_files()?;
            let monitor = WeatherMonitor::new(config.monitor_config()?, JsonLinesSink)?;
            monitor.run(&files, shutdown_signal()).await?;
        }
    }

    Ok(())
}

/// Explicit config paths must exist; otherwise fall back to defaults when no config
/// file has been created yet.
fn load_config(path: Option<PathBuf>) -> anyhow::Result<Config> {
    if path.is_none() && !Config::exists(None) {
        tracing::info!("No config file found, using defaults");
        return Ok(Config::default());
    }
    Config::load(path).context("Failed to load configuration")
}

async fn check(path: Option<PathBuf>) -> anyhow::Result<()> {
    let config = load_config(path)?;
    let monitor = config.monitor_config()?;
    println!(
        "Monitor: every {} min, {}h forecast horizon, alert threshold {}",
        monitor.check_interval, monitor.forecast_hours, monitor.alert_threshold
    );

    let files = config.local_files()?;
    let schedules = files
        .load_schedules()
        .await
        .with_context(|| format!("Loading {}", files.schedules_path().display()))?;

    let mut invalid = 0;
    for schedule in &schedules {
        let errors = validate_recurrence_pattern(&schedule.pattern);
        if errors.is_empty() {
            println!("  [OK] {} ({})", schedule.name, schedule.treatment_type);
        } else {
            invalid += 1;
            println!("  [!!] {} ({})", schedule.name, schedule.treatment_type);
            for error in errors {
                println!("       {}", error);
            }
        }
    }

    match files.load_forecast().await {
        Ok(forecast) => println!(
            "Forecast: {} day(s), fetched {}",
            forecast.days.len(),
            forecast.fetched_at.format("%Y-%m-%d %H:%M UTC")
        ),
        Err(e) => println!("Forecast: unavailable ({})", e),
    }

    if invalid > 0 {
        bail!("{} schedule(s) have invalid recurrence patterns", invalid);
    }
    Ok(())
}

fn print_treatments() {
    for treatment in TreatmentType::all() {
        let c = treatment.conditions();
        let ideal: Vec<&str> = c.ideal_conditions.iter().map(|s| s.as_str()).collect();
        println!(
            "{:<16} {:>5.1}-{:<5.1}°C  wind ≤{:>5.1} km/h  precip ≤{:>5.1} mm  ideal: {}",
            treatment.as_str(),
            c.min_temp,
            c.max_temp,
            c.max_wind_speed,
            c.max_precipitation,
            ideal.join(", ")
        );
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for ctrl+c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
