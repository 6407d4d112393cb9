//! Command Parsing and Dispatch

use crate::pipelines::Pipeline;
use crate::settings::Settings;
use crate::CliError;
use anyhow::{Context, Result};
use aqi_calculator::AqiCategory;
use forecast::ForecastReport;
use ingest::JsonFileSource;
use std::fmt::Write;
use std::path::PathBuf;
use storage::ModelRegistry;
use tracing::info;
use uuid::Uuid;

pub const USAGE: &str = "\
Usage: aqi-pipeline <COMMAND>

Commands:
  forecast [--json]                             Print the AQI forecast and alert
  ingest --weather FILE --pollution FILE        Append the newest hourly features
  backfill --weather FILE --pollution FILE      Engineer and upload a full history
  models list [--limit N]                       List registered models
  models register FILE                          Import a model spec and activate it
  models activate ID                            Make a registered model active
  status                                        Show feature store contents
  clear                                         Delete every feature store record
  help                                          Show this message

Settings are read from $AQI_CONFIG (default aqi.toml) and AQI__* variables.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Forecast { json: bool },
    Ingest { weather: PathBuf, pollution: PathBuf },
    Backfill { weather: PathBuf, pollution: PathBuf },
    ModelsList { limit: usize },
    ModelsRegister { path: PathBuf },
    ModelsActivate { id: Uuid },
    Status,
    Clear,
    Help,
}

fn usage(msg: impl Into<String>) -> CliError {
    CliError::Usage(msg.into())
}

fn feeds(args: &[String]) -> Result<(PathBuf, PathBuf), CliError> {
    let mut weather = None;
    let mut pollution = None;
    let mut iter = args.iter();
    while let Some(flag) = iter.next() {
        let value = iter
            .next()
            .ok_or_else(|| usage(format!("{} needs a value", flag)))?;
        match flag.as_str() {
            "--weather" => weather = Some(PathBuf::from(value)),
            "--pollution" => pollution = Some(PathBuf::from(value)),
            other => return Err(usage(format!("unknown option '{}'", other))),
        }
    }
    match (weather, pollution) {
        (Some(w), Some(p)) => Ok((w, p)),
        _ => Err(usage("both --weather and --pollution are required")),
    }
}

impl Command {
    pub fn parse<I>(args: I) -> Result<Self, CliError>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        let Some((name, rest)) = args.split_first() else {
            return Ok(Command::Help);
        };

        match (name.as_str(), rest) {
            ("forecast", []) => Ok(Command::Forecast { json: false }),
            ("forecast", [flag]) if flag == "--json" => Ok(Command::Forecast { json: true }),
            ("ingest", rest) => {
                let (weather, pollution) = feeds(rest)?;
                Ok(Command::Ingest { weather, pollution })
            }
            ("backfill", rest) => {
                let (weather, pollution) = feeds(rest)?;
                Ok(Command::Backfill { weather, pollution })
            }
            ("models", [sub]) if sub == "list" => Ok(Command::ModelsList { limit: 10 }),
            ("models", [sub, flag, n]) if sub == "list" && flag == "--limit" => {
                let limit = n
                    .parse()
                    .map_err(|_| usage(format!("invalid limit '{}'", n)))?;
                Ok(Command::ModelsList { limit })
            }
            ("models", [sub, path]) if sub == "register" => Ok(Command::ModelsRegister {
                path: PathBuf::from(path),
            }),
            ("models", [sub, id]) if sub == "activate" => {
                let id = Uuid::parse_str(id).map_err(|e| usage(format!("invalid model id: {}", e)))?;
                Ok(Command::ModelsActivate { id })
            }
            ("status", []) => Ok(Command::Status),
            ("clear", []) => Ok(Command::Clear),
            ("help" | "--help" | "-h", _) => Ok(Command::Help),
            (other, _) => Err(usage(format!("unrecognised command '{}'", args_line(other, rest)))),
        }
    }
}

fn args_line(name: &str, rest: &[String]) -> String {
    std::iter::once(name)
        .chain(rest.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Forecast table, alert message and alert details
pub fn render_report(report: &ForecastReport) -> String {
    let rule = "=".repeat(60);
    let mut out = String::new();
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "{}-DAY AQI FORECAST", report.forecasts.len());
    let _ = writeln!(out, "Model: {} {}", report.model_name, report.model_version);
    let _ = writeln!(out, "{}", rule);
    for f in &report.forecasts {
        let _ = writeln!(
            out,
            "{} ({}, {}): AQI {:.2} - {}",
            f.day_label,
            f.date,
            f.date.format("%A"),
            f.aqi,
            f.category
        );
    }
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "{}", report.alert.message);
    let _ = writeln!(out, "{}", rule);

    if report.alert.has_alert {
        let _ = writeln!(out, "\nALERT DETAILS:");
        for day in &report.alert.alert_days {
            let _ = writeln!(
                out,
                "  {} ({}): AQI {:.2} - {}",
                day.day, day.date, day.aqi, day.category
            );
        }
    }
    out
}

/// Run one command against stores opened from `settings`
pub fn execute(command: Command, settings: Settings) -> Result<()> {
    if command == Command::Help {
        println!("{}", USAGE);
        return Ok(());
    }
    let pipeline = Pipeline::open(settings)?;

    match command {
        Command::Forecast { json } => {
            let report = pipeline.forecast()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", render_report(&report));
            }
        }
        Command::Ingest { weather, pollution } => {
            let weather = JsonFileSource::new("weather", weather);
            let pollution = JsonFileSource::new("pollution", pollution);
            let outcome = pipeline.hourly_update(&weather, &pollution)?;
            println!(
                "Hourly update: {} observations, {} already stored, {} out of order, {} added",
                outcome.observations,
                outcome.already_stored,
                outcome.out_of_order,
                outcome.appended.added
            );
        }
        Command::Backfill { weather, pollution } => {
            let weather = JsonFileSource::new("weather", weather);
            let pollution = JsonFileSource::new("pollution", pollution);
            let outcome = pipeline.backfill(&weather, &pollution)?;
            println!(
                "Backfill: {} uploaded, {} failed in {} batches",
                outcome.uploaded, outcome.failed, outcome.batches
            );
        }
        Command::ModelsList { limit } => {
            let models = pipeline.registry().list(limit)?;
            if models.is_empty() {
                println!("No models registered");
            }
            for m in models {
                let marker = if m.is_active { "*" } else { " " };
                let metrics = m
                    .performance
                    .iter()
                    .map(|(k, v)| format!("{}={:.3}", k, v))
                    .collect::<Vec<_>>()
                    .join(", ");
                println!(
                    "{} {} {} {} ({} features) {} [{}]",
                    marker,
                    m.id,
                    m.model_name,
                    m.version,
                    m.n_features,
                    m.created_at.format("%Y-%m-%d %H:%M"),
                    metrics
                );
            }
        }
        Command::ModelsRegister { path } => {
            let id = pipeline.register_model(&path)?;
            println!("Registered and activated model {}", id);
        }
        Command::ModelsActivate { id } => {
            pipeline
                .registry()
                .set_active(id)
                .with_context(|| format!("Cannot activate model {}", id))?;
            println!("Activated model {}", id);
        }
        Command::Status => {
            let store = pipeline.store();
            println!("Feature records: {}", store.count()?);
            match store.latest()? {
                Some(row) => println!(
                    "Latest: {} AQI {:.1} ({}) with {} features",
                    row.timestamp,
                    row.aqi,
                    AqiCategory::from_aqi(row.aqi),
                    row.feature_count()
                ),
                None => println!("Latest: none"),
            }
            match pipeline.registry().load_active()? {
                Some(m) => println!("Active model: {} {} ({})", m.model_name, m.version, m.id),
                None => println!("Active model: none"),
            }
        }
        Command::Clear => {
            let deleted = pipeline.store().clear()?;
            info!("Feature store cleared");
            println!("Deleted {} records", deleted);
        }
        Command::Help => {}
    }
    Ok(())
}
