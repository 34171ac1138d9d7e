// src/cli.rs
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use fitness_tracker_lib::Timeframe;

#[derive(Parser, Debug)]
#[command(author, version, about = "A CLI tool to track workouts, your profile and theme", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TimeframeCli {
    #[default]
    Week,
    Month,
    Year,
}

impl From<TimeframeCli> for Timeframe {
    fn from(value: TimeframeCli) -> Self {
        match value {
            TimeframeCli::Week => Timeframe::Week,
            TimeframeCli::Month => Timeframe::Month,
            TimeframeCli::Year => Timeframe::Year,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List all workouts (seeds sample workouts on first run)
    List {
        /// Print CSV instead of a table
        #[arg(long)]
        export_csv: bool,
    },
    /// Add a new workout entry
    Add {
        /// Workout type (e.g., "Running", "Weight Training", or any custom name)
        #[arg(short = 't', long = "type")]
        workout_type: String,
        /// Duration in minutes
        #[arg(short, long)]
        duration: String,
        /// Date of the workout (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
        /// Additional notes
        #[arg(short, long)]
        notes: Option<String>,
    },
    /// Delete a workout by its ID
    Delete { id: String },
    /// Show totals and per-type counts
    Stats,
    /// Show duration and calories per day or month
    Trend {
        #[arg(short, long, value_enum, default_value_t = TimeframeCli::Week)]
        timeframe: TimeframeCli,
    },
    /// Show workouts grouped by date, newest first
    History,
    /// List known workout types with their calorie rates
    Types,
    /// Show the profile, or update the given fields
    Profile {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        /// Height in cm
        #[arg(long)]
        height: Option<f64>,
        /// Weight in kg
        #[arg(long)]
        weight: Option<f64>,
        /// Fitness goal (e.g., "build-muscle", "Lose weight")
        #[arg(long)]
        goal: Option<String>,
    },
    /// Show the current theme, or flip it
    Theme {
        #[arg(long)]
        toggle: bool,
    },
    /// Remove every stored workout (the samples come back on the next fetch)
    Clear,
    /// Show the path to the database file
    DbPath,
    /// Show the path to the config file
    ConfigPath,
    /// Generate shell completion scripts
    GenerateCompletion {
        #[arg(value_enum)]
        shell: Shell,
    },
}

pub fn build_cli_command() -> clap::Command {
    Cli::command()
}

// Function to parse CLI arguments
pub fn parse_args() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_add_and_trend() {
        let cli = Cli::try_parse_from([
            "fitness-tracker",
            "add",
            "--type",
            "Running",
            "--duration",
            "30",
            "--date",
            "2024-05-01",
        ])
        .unwrap();
        match cli.command {
            Commands::Add {
                workout_type,
                duration,
                date,
                notes,
            } => {
                assert_eq!(workout_type, "Running");
                assert_eq!(duration, "30");
                assert_eq!(date.as_deref(), Some("2024-05-01"));
                assert_eq!(notes, None);
            }
            other => panic!("unexpected command {other:?}"),
        }

        let cli = Cli::try_parse_from(["fitness-tracker", "trend", "-t", "year"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Trend {
                timeframe: TimeframeCli::Year
            }
        ));
    }
}
