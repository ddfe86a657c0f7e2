use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use glucose_core::journal::{events_on, load_days};
use glucose_core::stats::date_range;
use glucose_core::time::{build_timestamp, minutes_of_day};
use glucose_core::*;
use std::path::{Path, PathBuf};

const DISCLAIMER: &str = "Estimates are illustrative only. Do not use them for dosing decisions.";

#[derive(Parser)]
#[command(name = "gluco")]
#[command(about = "Personal glucose log with an estimated day curve", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Use a specific config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Day to operate on (YYYY-MM-DD, defaults to today)
    #[arg(long, global = true)]
    date: Option<NaiveDate>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log an event to the journal
    Log {
        #[command(subcommand)]
        entry: LogEntry,
    },

    /// Estimate glucose at a time of day
    Estimate {
        /// Time of day (HH:MM)
        #[arg(long)]
        at: String,
    },

    /// Show the estimated day curve (default)
    Curve {
        /// Sampling interval in minutes
        #[arg(long)]
        interval: Option<u32>,

        /// Export the curve to a CSV file instead of printing it
        #[arg(long, conflicts_with = "json")]
        csv: Option<PathBuf>,

        /// Print the curve as JSON
        #[arg(long)]
        json: bool,
    },

    /// Summarize the last N days ending at --date
    Stats {
        #[arg(long, default_value_t = 7)]
        days: u32,
    },
}

#[derive(Subcommand)]
enum LogEntry {
    /// A glucose reading in mg/dL
    Glucose {
        value: f64,
        /// Time of day (HH:MM, defaults to now)
        #[arg(long)]
        at: Option<String>,
    },
    /// A meal with its carbohydrates in grams
    Meal {
        carbs: f64,
        #[arg(long)]
        at: Option<String>,
    },
    /// An insulin dose in units
    Insulin {
        units: f64,
        #[arg(long, value_enum)]
        kind: KindArg,
        #[arg(long)]
        at: Option<String>,
    },
    /// An exercise session in minutes
    Exercise {
        minutes: f64,
        #[arg(long, value_enum, default_value_t = IntensityArg::Moderate)]
        intensity: IntensityArg,
        #[arg(long)]
        at: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Rapid,
    Long,
}

impl From<KindArg> for InsulinKind {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::Rapid => InsulinKind::Rapid,
            KindArg::Long => InsulinKind::Long,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum IntensityArg {
    Low,
    Moderate,
    High,
}

impl From<IntensityArg> for Intensity {
    fn from(arg: IntensityArg) -> Self {
        match arg {
            IntensityArg::Low => Intensity::Low,
            IntensityArg::Moderate => Intensity::Moderate,
            IntensityArg::High => Intensity::High,
        }
    }
}

fn main() -> Result<()> {
    // Initialize logging
    glucose_core::logging::init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let journal_path = data_dir.join("events.jsonl");
    let date = cli.date.unwrap_or_else(|| Local::now().date_naive());

    match cli.command {
        Some(Commands::Log { entry }) => cmd_log(&journal_path, date, entry),
        Some(Commands::Estimate { at }) => cmd_estimate(&journal_path, date, &at, &config),
        Some(Commands::Curve {
            interval,
            csv,
            json,
        }) => cmd_curve(&journal_path, date, interval, csv, json, &config),
        Some(Commands::Stats { days }) => cmd_stats(&journal_path, date, days, &config),
        None => cmd_curve(&journal_path, date, None, None, false, &config),
    }
}

fn cmd_log(journal_path: &Path, date: NaiveDate, entry: LogEntry) -> Result<()> {
    let event = match entry {
        LogEntry::Glucose { value, at } => {
            require_positive("glucose value", value)?;
            Event::glucose(timestamp_for(date, at)?, value)
        }
        LogEntry::Meal { carbs, at } => {
            require_non_negative("carbs", carbs)?;
            Event::meal(timestamp_for(date, at)?, carbs)
        }
        LogEntry::Insulin { units, kind, at } => {
            require_non_negative("units", units)?;
            Event::insulin(timestamp_for(date, at)?, units, kind.into())
        }
        LogEntry::Exercise {
            minutes,
            intensity,
            at,
        } => {
            require_non_negative("minutes", minutes)?;
            Event::exercise(timestamp_for(date, at)?, minutes, intensity.into())
        }
    };

    let record = JournalRecord::new(event);
    let mut journal = JsonlJournal::new(journal_path);
    journal.append(&record)?;

    let timestamp = record.event.timestamp().unwrap_or_default();
    println!("✓ Logged {} at {}", entry_label(&record.event), timestamp);
    Ok(())
}

fn cmd_estimate(journal_path: &Path, date: NaiveDate, at: &str, config: &Config) -> Result<()> {
    let minute = minutes_of_day(&timestamp_for(date, Some(at.to_string()))?);

    let events = events_on(journal_path, date)?;
    match estimate_at(&events, minute, &config.profile) {
        Some(value) => println!("Estimated glucose at {}: {:.0} mg/dL", at.trim(), value),
        None => println!(
            "Insufficient data: no glucose reading at or before {} on {}",
            at.trim(),
            date
        ),
    }
    println!("\n{}", DISCLAIMER);
    Ok(())
}

fn cmd_curve(
    journal_path: &Path,
    date: NaiveDate,
    interval: Option<u32>,
    csv: Option<PathBuf>,
    json: bool,
    config: &Config,
) -> Result<()> {
    let interval = interval.unwrap_or(config.curve.interval_minutes);
    if interval == 0 {
        return Err(Error::Other("--interval must be at least 1".into()));
    }

    let events = events_on(journal_path, date)?;
    let curve = generate_day_curve(&events, &config.profile, interval);

    if let Some(path) = csv {
        let count = glucose_core::export::export_curve_csv(&curve, &path)?;
        println!("✓ Exported {} points", count);
        println!("  CSV: {}", path.display());
        return Ok(());
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&curve)?);
        return Ok(());
    }

    if curve.is_empty() {
        println!("Insufficient data: no glucose readings on {}", date);
        return Ok(());
    }

    println!("Estimated glucose for {} (every {} min)", date, interval);
    println!();
    for point in &curve {
        let marker = if point.is_real { "● reading" } else { "" };
        println!("  {}  {:>4.0} mg/dL  {}", point.time_label(), point.value, marker);
    }
    println!("\n{}", DISCLAIMER);
    Ok(())
}

fn cmd_stats(journal_path: &Path, end: NaiveDate, days: u32, config: &Config) -> Result<()> {
    if days == 0 {
        return Err(Error::Other("--days must be at least 1".into()));
    }

    let dates = date_range(end, days);
    let loaded = load_days(journal_path, &dates)?;
    let summary = summarize_period(&loaded, &config.profile);

    let profile = &config.profile;
    println!("Last {} days ending {}", days, end);
    println!();
    println!("  Days with readings:   {}", summary.days_with_data);
    println!("  Average glucose:      {}", fmt_opt(summary.avg_glucose, " mg/dL", 0));
    println!(
        "  In range ({}-{}):    {}",
        profile.target_min,
        profile.target_max,
        fmt_pct(summary.time_in_range)
    );
    println!("  Below range:          {}", fmt_pct(summary.time_below_range));
    println!("  Above range:          {}", fmt_pct(summary.time_above_range));
    println!("  Readings per day:     {}", fmt_opt(summary.avg_readings_per_day, "", 1));
    println!("  Rapid insulin / day:  {}", fmt_opt(summary.avg_rapid_per_day, " U", 1));
    println!("  Long insulin / day:   {}", fmt_opt(summary.avg_long_per_day, " U", 1));
    println!("  Carbs / day:          {}", fmt_opt(summary.avg_carbs_per_day, " g", 0));
    println!("  Exercise total:       {:.0} min", summary.total_exercise_minutes);
    Ok(())
}

fn timestamp_for(date: NaiveDate, at: Option<String>) -> Result<String> {
    let clock = at.unwrap_or_else(|| Local::now().format("%H:%M").to_string());
    build_timestamp(date, &clock)
        .ok_or_else(|| Error::Other(format!("Invalid time '{}', expected HH:MM", clock)))
}

fn require_positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::Other(format!("{} must be greater than zero", name)))
    }
}

fn require_non_negative(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(Error::Other(format!("{} must not be negative", name)))
    }
}

fn entry_label(event: &Event) -> String {
    match event {
        Event::Glucose { value, .. } => format!("glucose {} mg/dL", value),
        Event::Meal { carbs_grams, .. } => format!("meal {} g", carbs_grams.unwrap_or(0.0)),
        Event::Insulin {
            units,
            insulin_type,
            ..
        } => format!(
            "{} insulin {} U",
            String::from(*insulin_type),
            units.unwrap_or(0.0)
        ),
        Event::Exercise {
            duration_minutes,
            intensity,
            ..
        } => format!(
            "{} exercise {} min",
            String::from(*intensity),
            duration_minutes.unwrap_or(0.0)
        ),
        Event::Unknown => "event".into(),
    }
}

fn fmt_opt(value: Option<f64>, unit: &str, decimals: usize) -> String {
    match value {
        Some(v) => format!("{:.*}{}", decimals, v, unit),
        None => "-".into(),
    }
}

fn fmt_pct(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.0}%", v * 100.0),
        None => "-".into(),
    }
}
