use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};

use fitexplore::config::{AppConfig, DistanceUnit, OpenPausePolicy, ShortActivityPolicy};
use fitexplore::export::{
    format_axis_miles, format_axis_minutes, format_elevation, format_heart_rate, format_pace,
    json::to_json_string, text::format_duration, ActivityReport, ExportFormat, ExportManager,
    ExportType,
};
use fitexplore::heart_rate::ChartAxis;
use fitexplore::import::ImportManager;
use fitexplore::logging::init_logging;
use fitexplore::Activity;

/// fitexplore - Activity recording analytics CLI
///
/// Reads a FIT activity recording and reports timer pauses, fixed-distance
/// splits with moving-time pace, heart-rate runs and GPS coordinates.
#[derive(Parser)]
#[command(name = "fitexplore")]
#[command(version)]
#[command(about = "Split, pause and heart-rate analytics for FIT files", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Split distance unit (mi, km, or meters such as 400m)
    #[arg(short, long, global = true)]
    unit: Option<DistanceUnit>,

    /// Close a pause left open at the end at the last record
    #[arg(long, global = true)]
    close_open_pause: bool,

    /// Emit one partial split for activities shorter than one unit
    #[arg(long, global = true)]
    partial_short_activities: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show fixed-distance splits
    Splits {
        /// FIT file to analyze
        file: PathBuf,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show paused and active timer intervals
    Pauses {
        /// FIT file to analyze
        file: PathBuf,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show heart-rate runs and stopped regions
    HeartRate {
        /// FIT file to analyze
        file: PathBuf,

        /// Chart x-axis (time, distance)
        #[arg(short, long, default_value = "time")]
        axis: ChartAxis,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show GPS coordinates in degrees
    Coords {
        /// FIT file to analyze
        file: PathBuf,

        /// Number of coordinates to show
        #[arg(short, long)]
        limit: Option<usize>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show whole-activity totals
    Summary {
        /// FIT file to analyze
        file: PathBuf,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Export analysis results
    Export {
        /// FIT file to analyze
        file: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// What to export (splits, heart-rate, coordinates, report)
        #[arg(short = 't', long = "type", default_value = "report")]
        export_type: ExportType,

        /// Export format (csv, json, text)
        #[arg(short = 'f', long, default_value = "json")]
        format: ExportFormat,
    },

    /// Configure application settings
    Config {
        /// Print the effective configuration
        #[arg(short, long)]
        list: bool,

        /// Write the default configuration file
        #[arg(long)]
        init: bool,

        /// Print the configuration file path
        #[arg(long)]
        path: bool,
    },
}

#[derive(Tabled)]
struct SplitRow {
    #[tabled(rename = "Split")]
    distance: String,
    #[tabled(rename = "Pace")]
    pace: String,
    #[tabled(rename = "Avg HR")]
    heart_rate: String,
    #[tabled(rename = "Δ Elev (ft)")]
    elevation: String,
}

#[derive(Tabled)]
struct IntervalRow {
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Start")]
    start: i64,
    #[tabled(rename = "End")]
    end: i64,
    #[tabled(rename = "Duration")]
    duration: String,
}

#[derive(Tabled)]
struct RunRow {
    #[tabled(rename = "Run")]
    run: usize,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Points")]
    points: usize,
    #[tabled(rename = "From")]
    from: String,
    #[tabled(rename = "To")]
    to: String,
    #[tabled(rename = "Avg HR")]
    heart_rate: String,
}

#[derive(Tabled)]
struct CoordinateRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Latitude")]
    latitude: String,
    #[tabled(rename = "Longitude")]
    longitude: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(AppConfig::default_config_path);
    let mut config = match &cli.config {
        Some(path) if path.exists() => AppConfig::load_from_file(path)?,
        Some(_) => AppConfig::default(),
        None => AppConfig::load_or_default(),
    };
    apply_overrides(&mut config, &cli);

    config.logging.level = config.logging.level.raised_by(cli.verbose);
    init_logging(&config.logging)?;

    match cli.command {
        Commands::Splits { file, json } => {
            let activity = load_activity(&file, &config)?;
            if json {
                println!("{}", to_json_string(activity.splits(), config.export.pretty_json)?);
            } else {
                print_splits(&activity);
            }
        }

        Commands::Pauses { file, json } => {
            let activity = load_activity(&file, &config)?;
            if json {
                println!(
                    "{}",
                    to_json_string(activity.paused_intervals(), config.export.pretty_json)?
                );
            } else {
                print_intervals(&activity);
            }
        }

        Commands::HeartRate { file, axis, json } => {
            let activity = load_activity(&file, &config)?;
            if json {
                println!(
                    "{}",
                    to_json_string(activity.heart_rate_runs(), config.export.pretty_json)?
                );
            } else {
                print_heart_rate(&activity, axis);
            }
        }

        Commands::Coords { file, limit, json } => {
            let activity = load_activity(&file, &config)?;
            let coordinates = activity.coordinates();
            let shown = &coordinates[..limit.unwrap_or(coordinates.len()).min(coordinates.len())];
            if json {
                println!("{}", to_json_string(shown, config.export.pretty_json)?);
            } else {
                let rows: Vec<CoordinateRow> = shown
                    .iter()
                    .enumerate()
                    .map(|(index, c)| CoordinateRow {
                        index: index + 1,
                        latitude: format!("{:.6}", c.latitude),
                        longitude: format!("{:.6}", c.longitude),
                    })
                    .collect();
                println!("{}", Table::new(rows).with(Style::rounded()));
                println!(
                    "{}",
                    format!("{} of {} coordinates", shown.len(), coordinates.len()).dimmed()
                );
            }
        }

        Commands::Summary { file, json } => {
            let activity = load_activity(&file, &config)?;
            if json {
                println!(
                    "{}",
                    to_json_string(&activity.summary(), config.export.pretty_json)?
                );
            } else {
                print_summary(&activity, &file);
            }
        }

        Commands::Export {
            file,
            output,
            export_type,
            format,
        } => {
            let activity = load_activity(&file, &config)?;
            activity.warm_caches();

            let output = if output.is_relative() {
                config.export.output_dir.join(output)
            } else {
                output
            };
            ExportManager::with_settings(&config.export)
                .export(&activity, export_type, format, &output)
                .with_context(|| format!("Failed to export to {}", output.display()))?;
            println!(
                "{} {}",
                "✓ Exported to".green(),
                output.display().to_string().bold()
            );
        }

        Commands::Config { list, init, path } => {
            if path {
                println!("{}", config_path.display());
            }
            if init {
                AppConfig::default().save_to_file(&config_path)?;
                println!(
                    "{} {}",
                    "✓ Wrote default configuration to".green(),
                    config_path.display()
                );
            }
            if list || !(path || init) {
                println!("{}", toml::to_string_pretty(&config)?);
            }
        }
    }

    Ok(())
}

/// Command-line flags win over the configuration file
fn apply_overrides(config: &mut AppConfig, cli: &Cli) {
    if let Some(unit) = cli.unit {
        config.analysis.unit = unit;
    }
    if cli.close_open_pause {
        config.analysis.open_pause = OpenPausePolicy::CloseAtLastRecord;
    }
    if cli.partial_short_activities {
        config.analysis.short_activity = ShortActivityPolicy::SinglePartial;
    }
}

fn load_activity(file: &Path, config: &AppConfig) -> Result<Activity> {
    let data = ImportManager::new().import_file(file).map_err(|e| {
        match e.severity().to_tracing_level() {
            tracing::Level::WARN => tracing::warn!(error = %e, "Import failed"),
            _ => tracing::error!(error = %e, "Import failed"),
        }
        anyhow::anyhow!(e.user_message())
    })?;
    Ok(Activity::with_config(data, config.analysis))
}

fn print_splits(activity: &Activity) {
    let splits = activity.splits();
    if splits.is_empty() {
        println!("{}", "No splits: activity never reached one full unit".yellow());
        return;
    }

    let rows: Vec<SplitRow> = splits
        .iter()
        .map(|split| SplitRow {
            distance: format!(
                "{} {}",
                split.distance_label(),
                activity.config().unit.abbreviation()
            ),
            pace: format_pace(split.pace_seconds_per_unit),
            heart_rate: format_heart_rate(split.avg_heart_rate),
            elevation: colorize_elevation(split.elevation_change),
        })
        .collect();

    println!("{}", Table::new(rows).with(Style::rounded()));
}

fn colorize_elevation(feet: Option<i32>) -> String {
    let text = format_elevation(feet);
    match feet {
        Some(change) if change > 0 => text.green().to_string(),
        Some(change) if change < 0 => text.red().to_string(),
        Some(_) => text,
        None => text.dimmed().to_string(),
    }
}

fn print_intervals(activity: &Activity) {
    let paused = activity.paused_intervals();
    let active = activity.active_intervals();

    let mut rows: Vec<IntervalRow> = paused
        .iter()
        .map(|i| (i, "paused".yellow().to_string()))
        .chain(active.iter().map(|i| (i, "active".green().to_string())))
        .map(|(interval, state)| IntervalRow {
            state,
            start: interval.start,
            end: interval.end,
            duration: format_duration(interval.duration()),
        })
        .collect();
    rows.sort_by_key(|row| row.start);

    if rows.is_empty() {
        println!("{}", "No timer data".yellow());
        return;
    }
    println!("{}", Table::new(rows).with(Style::rounded()));

    let paused_total: i64 = paused.iter().map(|i| i.duration()).sum();
    println!(
        "{}",
        format!("{} pause(s), {} paused", paused.len(), format_duration(paused_total)).dimmed()
    );
}

fn print_heart_rate(activity: &Activity, axis: ChartAxis) {
    let runs = activity.heart_rate_runs();
    if runs.is_empty() {
        println!("{}", "No heart-rate data".yellow());
        return;
    }

    let origin = runs
        .first()
        .and_then(|run| run.first())
        .map(|p| p.timestamp)
        .unwrap_or(0);
    let label = |position: Option<f64>| match (axis, position) {
        (ChartAxis::Time, Some(ts)) => format_axis_minutes(ts - origin as f64),
        (ChartAxis::Distance, Some(meters)) => format_axis_miles(meters),
        (_, None) => "--".to_string(),
    };
    let position = |point: &fitexplore::HeartRateDataPoint| match axis {
        ChartAxis::Time => Some(point.timestamp as f64),
        ChartAxis::Distance => point.distance,
    };

    let rows: Vec<RunRow> = runs
        .iter()
        .enumerate()
        .map(|(index, run)| {
            let stopped = run.first().is_some_and(|p| p.is_stopped);
            let mean = run.iter().map(|p| p.heart_rate as u32).sum::<u32>() / run.len().max(1) as u32;
            RunRow {
                run: index + 1,
                state: if stopped {
                    "stopped".yellow().to_string()
                } else {
                    "active".green().to_string()
                },
                points: run.len(),
                from: label(run.first().and_then(position)),
                to: label(run.last().and_then(position)),
                heart_rate: format_heart_rate(Some(mean)),
            }
        })
        .collect();
    println!("{}", Table::new(rows).with(Style::rounded()));

    for span in activity.stopped_spans(axis) {
        println!(
            "{}",
            format!("gap: {} → {}", label(Some(span.start)), label(Some(span.end))).dimmed()
        );
    }
}

fn print_summary(activity: &Activity, file: &Path) {
    let report = ActivityReport::from_activity(activity);
    let summary = &report.summary;

    println!("{}", file.display().to_string().bold());
    if let Some(start) = summary.start_time {
        println!(
            "  Started:      {}",
            start.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M")
        );
    }
    if let Some(distance) = summary.total_distance {
        println!(
            "  Distance:     {:.2} {}",
            distance / report.unit_meters,
            report.unit
        );
    }
    if let Some(elapsed) = summary.elapsed_seconds {
        println!("  Elapsed:      {}", format_duration(elapsed));
    }
    if let Some(moving) = summary.moving_seconds {
        println!("  Moving:       {}", format_duration(moving).green());
    }
    println!(
        "  Paused:       {} ({} pause(s))",
        format_duration(summary.paused_seconds).yellow(),
        summary.pause_count
    );
    println!("  Avg HR:       {}", format_heart_rate(summary.avg_heart_rate));
    if let Some(max) = summary.max_heart_rate {
        println!("  Max HR:       {} bpm", max);
    }
    println!("  Splits:       {}", summary.split_count);
    println!("  Records:      {}", summary.record_count);
    println!("  Coordinates:  {}", summary.coordinate_count);
}
