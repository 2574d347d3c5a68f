// src/cli.rs
use chrono::{Duration, Local, NaiveDate};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser, Debug)]
#[command(author, version, about = "A personal workout calendar", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

// Custom parser for date strings and shorthands
pub fn parse_date_shorthand(s: &str) -> Result<NaiveDate, String> {
    let today = Local::now().date_naive();
    match s.to_lowercase().as_str() {
        "today" => Ok(today),
        "yesterday" => Ok(today - Duration::days(1)),
        _ => ["%Y-%m-%d", "%d.%m.%Y", "%Y/%m/%d"]
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
            .ok_or_else(|| {
                format!(
                    "Invalid date format: '{s}'. Use 'today', 'yesterday', YYYY-MM-DD, DD.MM.YYYY, or YYYY/MM/DD."
                )
            }),
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the calendar for the current month (or the month set with prev/next)
    Show {
        /// Show the month this many months away from today instead
        #[arg(long, allow_hyphen_values = true)]
        offset: Option<i32>,
    },
    /// Go back one month and show it
    Prev,
    /// Go forward one month and show it
    Next,
    /// Go back to the current month and show it
    Today,
    /// Show the saved entry for a date
    View {
        #[arg(value_parser = parse_date_shorthand)]
        date: NaiveDate,
    },
    /// Create or update the entry for a date. Unset fields keep their saved value.
    /// An entry left with no workout and no emoji is removed.
    Set {
        #[arg(value_parser = parse_date_shorthand)]
        date: NaiveDate,
        /// First workout (e.g. "Run"); pass "" to clear
        #[arg(long)]
        text1: Option<String>,
        /// Second workout (e.g. "Yoga"); pass "" to clear
        #[arg(long)]
        text2: Option<String>,
        /// Duration, e.g. "1h 30m", "45m" or "90"
        #[arg(short, long)]
        duration: Option<String>,
        /// Toggle an emoji from the palette (picking the current one clears it)
        #[arg(short, long)]
        emoji: Option<String>,
    },
    /// Delete the entry for a date
    Delete {
        #[arg(value_parser = parse_date_shorthand)]
        date: NaiveDate,
    },
    /// Show workout stats for the displayed month
    Stats {
        /// A single workout to report on, or "All" for the chart
        #[arg(short, long, default_value = "All")]
        workout: String,
        /// Report on the month this many months away from today instead
        #[arg(long, allow_hyphen_values = true)]
        offset: Option<i32>,
    },
    /// List the emojis available for entries
    Emojis,
    /// Show the path to the database file
    DbPath,
    /// Show the path to the config file
    ConfigPath,
    GenerateCompletion {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

// Function to parse CLI arguments
pub fn parse_args() -> Cli {
    Cli::parse()
}

pub fn build_cli_command() -> clap::Command {
    Cli::command()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(parse_date_shorthand("2024-03-05"), Ok(expected));
        assert_eq!(parse_date_shorthand("05.03.2024"), Ok(expected));
        assert_eq!(parse_date_shorthand("2024/03/05"), Ok(expected));
        assert!(parse_date_shorthand("March 5").is_err());
    }

    #[test]
    fn cli_definition_is_valid() {
        build_cli_command().debug_assert();
    }

    #[test]
    fn negative_offsets_parse() {
        let cli = Cli::try_parse_from(["workout-calendar", "stats", "--offset", "-2"]).unwrap();
        match cli.command {
            Commands::Stats { workout, offset } => {
                assert_eq!(workout, "All");
                assert_eq!(offset, Some(-2));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
