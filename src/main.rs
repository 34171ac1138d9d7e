//src/main.rs
mod cli;

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, ContentArrangement, Table};
use std::io::{self, stdout};
use tracing_subscriber::EnvFilter;

use fitness_tracker_lib::models::DEFAULT_CALORIES_PER_MINUTE;
use fitness_tracker_lib::{
    chart_series, get_config_path_util, history_by_date, load_config_util, AppService,
    FitnessGoal, ProfileUpdate, TrendPoint, UserProfile, WorkoutForm, WorkoutRecord,
    WorkoutStats, WorkoutType,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli_args = cli::parse_args();

    // Completion scripts need neither config nor storage
    if let cli::Commands::GenerateCompletion { shell } = cli_args.command {
        let mut cmd = cli::build_cli_command();
        let bin_name = cmd.get_name().to_string();

        eprintln!("Generating completion script for {shell}...");
        clap_complete::generate(shell, &mut cmd, bin_name, &mut stdout());
        return Ok(());
    }

    let config_path =
        get_config_path_util().context("Failed to determine configuration file path")?;
    let config = load_config_util(&config_path)
        .with_context(|| format!("Failed to load config from {config_path:?}"))?;
    init_logging(&config.log_filter);

    let service = AppService::from_config(config, config_path)
        .context("Failed to initialize application service")?;
    service
        .theme
        .on_change(|dark| tracing::debug!(dark, "Theme applied"));

    let header_color = service
        .header_color()
        .map(Color::from)
        .unwrap_or(Color::Green); // Fallback

    match cli_args.command {
        cli::Commands::GenerateCompletion { .. } => {
            unreachable!("Completion generation should have exited already");
        }
        cli::Commands::List { export_csv } => {
            service.workout_state.load().await;
            let state = service.workout_state.snapshot();
            if let Some(error) = &state.error {
                eprintln!("Warning: {error}");
            }
            if state.workouts.is_empty() {
                println!("No workouts recorded yet.");
            } else if export_csv {
                print_workout_csv(&state.workouts)?;
            } else {
                print_workout_table(&state.workouts, header_color);
            }
        }
        cli::Commands::Add {
            workout_type,
            duration,
            date,
            notes,
        } => {
            let form = WorkoutForm {
                workout_type,
                duration,
                date: date.unwrap_or_else(|| today().format("%Y-%m-%d").to_string()),
                notes: notes.unwrap_or_default(),
            };
            let draft = match form.validate() {
                Ok(draft) => draft,
                Err(errors) => {
                    for (field, message) in errors.iter() {
                        eprintln!("  {field}: {message}");
                    }
                    bail!("Workout not added: {} invalid field(s)", errors.len());
                }
            };
            match service.workout_state.add_workout(draft).await {
                Ok(record) => println!(
                    "Successfully added workout ID {}: {} for {} min on {} ({} kcal)",
                    record.id, record.workout_type, record.duration, record.date, record.calories
                ),
                Err(e) => bail!("Error adding workout: {}", e),
            }
        }
        cli::Commands::Delete { id } => match service.workout_state.delete_workout(&id).await {
            Ok(true) => println!("Successfully deleted workout ID {id}."),
            Ok(false) => println!("No workout found with ID {id}; nothing to delete."),
            Err(e) => bail!("Error deleting workout: {}", e),
        },
        cli::Commands::Stats => {
            let stats = service.workouts.stats().await;
            print_stats(&stats, header_color);
        }
        cli::Commands::Trend { timeframe } => {
            let workouts = service.workouts.fetch_all().await;
            let series = chart_series(&workouts, timeframe.into(), today());
            if series.is_empty() {
                println!("No workouts in the selected timeframe.");
            } else {
                print_trend_table(&series, header_color);
            }
        }
        cli::Commands::History => {
            let workouts = service.workouts.fetch_all().await;
            let history = history_by_date(&workouts);
            if history.is_empty() {
                println!("No workouts recorded yet.");
            }
            for (date, day) in history {
                println!("{}", date.format("%A, %B %-d, %Y"));
                for workout in day {
                    println!(
                        "  {:<16} {:>4} min {:>5} kcal  {}",
                        workout.workout_type.label(),
                        workout.duration,
                        workout.calories,
                        workout.notes.as_deref().unwrap_or("")
                    );
                }
            }
        }
        cli::Commands::Types => print_types_table(header_color),
        cli::Commands::Profile {
            name,
            email,
            height,
            weight,
            goal,
        } => {
            let goal = goal
                .as_deref()
                .map(str::parse::<FitnessGoal>)
                .transpose()?;
            let update = ProfileUpdate {
                name,
                email,
                height,
                weight,
                goal,
            };
            let profile = if update.is_empty() {
                service.profile.profile()
            } else {
                let profile = service.profile.update_profile(update);
                println!("Profile updated.");
                profile
            };
            print_profile(&profile, header_color);
        }
        cli::Commands::Theme { toggle } => {
            let dark = if toggle {
                service.theme.toggle_dark_mode()
            } else {
                service.theme.dark_mode()
            };
            println!("Theme: {}", if dark { "dark" } else { "light" });
        }
        cli::Commands::Clear => match service.workouts.clear().await {
            Ok(()) => println!("All workouts removed. Sample workouts return on the next listing."),
            Err(e) => bail!("Error clearing workouts: {}", e),
        },
        cli::Commands::DbPath => match service.get_db_path() {
            Some(path) => println!("Database file is located at: {path:?}"),
            None => println!("Using in-memory storage; nothing is written to disk."),
        },
        cli::Commands::ConfigPath => {
            println!("Config file is located at: {:?}", service.get_config_path());
        }
    }

    Ok(())
}

// RUST_LOG takes precedence over the configured filter.
fn init_logging(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn print_workout_table(workouts: &[WorkoutRecord], header_color: Color) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").fg(header_color),
            Cell::new("Date").fg(header_color),
            Cell::new("Type").fg(header_color),
            Cell::new("Duration (min)").fg(header_color),
            Cell::new("Calories").fg(header_color),
            Cell::new("Notes").fg(header_color),
        ]);

    for workout in workouts {
        table.add_row(vec![
            Cell::new(&workout.id),
            Cell::new(workout.date.format("%Y-%m-%d").to_string()),
            Cell::new(workout.workout_type.label()),
            Cell::new(workout.duration),
            Cell::new(workout.calories),
            Cell::new(workout.notes.as_deref().unwrap_or("-")),
        ]);
    }
    println!("{table}");
}

fn print_workout_csv(workouts: &[WorkoutRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(io::stdout());
    writer.write_record(["ID", "Date", "Type", "Duration_min", "Calories", "Notes"])?;

    for workout in workouts {
        writer.write_record([
            workout.id.clone(),
            workout.date.format("%Y-%m-%d").to_string(),
            workout.workout_type.to_string(),
            workout.duration.to_string(),
            workout.calories.to_string(),
            workout.notes.clone().unwrap_or_default(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

fn print_stats(stats: &WorkoutStats, header_color: Color) {
    let mut summary = Table::new();
    summary
        .load_preset(UTF8_FULL)
        .set_header(vec![
            Cell::new("Metric").fg(header_color),
            Cell::new("Value").fg(header_color),
        ])
        .add_row(vec![
            Cell::new("Total Workouts"),
            Cell::new(stats.total_workouts),
        ])
        .add_row(vec![
            Cell::new("Total Duration (min)"),
            Cell::new(stats.total_duration),
        ])
        .add_row(vec![
            Cell::new("Total Calories"),
            Cell::new(stats.total_calories),
        ]);
    println!("{summary}");

    if stats.workout_type_counts.is_empty() {
        return;
    }
    let mut by_type = Table::new();
    by_type.load_preset(UTF8_FULL).set_header(vec![
        Cell::new("Type").fg(header_color),
        Cell::new("Workouts").fg(header_color),
    ]);
    for (workout_type, count) in &stats.workout_type_counts {
        by_type.add_row(vec![Cell::new(workout_type), Cell::new(count)]);
    }
    println!("{by_type}");
}

fn print_trend_table(series: &[TrendPoint], header_color: Color) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Period").fg(header_color),
            Cell::new("Workouts").fg(header_color),
            Cell::new("Duration (min)").fg(header_color),
            Cell::new("Calories").fg(header_color),
        ]);
    for point in series {
        table.add_row(vec![
            Cell::new(&point.label),
            Cell::new(point.count),
            Cell::new(point.duration),
            Cell::new(point.calories),
        ]);
    }
    println!("{table}");
}

fn print_types_table(header_color: Color) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        Cell::new("Type").fg(header_color),
        Cell::new("kcal / min").fg(header_color),
    ]);
    for workout_type in WorkoutType::known() {
        table.add_row(vec![
            Cell::new(workout_type.label()),
            Cell::new(workout_type.calories_per_minute()),
        ]);
    }
    table.add_row(vec![
        Cell::new("(any other name)").add_attribute(Attribute::Italic),
        Cell::new(DEFAULT_CALORIES_PER_MINUTE),
    ]);
    println!("{table}");
}

fn print_profile(profile: &UserProfile, header_color: Color) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec![
            Cell::new("Field").fg(header_color),
            Cell::new("Value").fg(header_color),
        ])
        .add_row(vec![Cell::new("Name"), Cell::new(&profile.name)])
        .add_row(vec![Cell::new("Email"), Cell::new(&profile.email)])
        .add_row(vec![
            Cell::new("Height (cm)"),
            Cell::new(format!("{:.1}", profile.height)),
        ])
        .add_row(vec![
            Cell::new("Weight (kg)"),
            Cell::new(format!("{:.1}", profile.weight)),
        ])
        .add_row(vec![Cell::new("Goal"), Cell::new(profile.goal)]);
    println!("{table}");
}
