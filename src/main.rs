//src/main.rs
mod cli; // Keep cli module for parsing args

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, ContentArrangement, Table};
use std::io::stdout;

use workout_calendar_lib::{
    format_minutes_to_time, parse_color, parse_duration_to_minutes, stats_title, AppService,
    CalendarGrid, EditOutcome, GridCell, StatsSelection, StatsView, WorkoutEntry,
    WEEKDAY_NAMES,
};

fn main() -> Result<()> {
    let cli_args = cli::parse_args();

    if let cli::Commands::GenerateCompletion { shell } = cli_args.command {
        let mut cmd = cli::build_cli_command();
        let bin_name = cmd.get_name().to_string();

        eprintln!("Generating completion script for {shell}...");
        clap_complete::generate(shell, &mut cmd, bin_name, &mut stdout());
        return Ok(());
    }

    env_logger::init();

    // Initialize the application service (loads config, opens the store)
    let mut service =
        AppService::initialize().context("Failed to initialize application service")?;
    let today = Local::now().date_naive();

    match cli_args.command {
        cli::Commands::GenerateCompletion { .. } => {
            unreachable!("Completion generation should have exited already");
        }
        cli::Commands::Show { offset } => {
            if let Some(offset) = offset {
                // One-off view; the saved offset is left alone.
                service.nav = offset;
            }
            print_calendar(&service, &service.load_calendar(today)?);
        }
        cli::Commands::Prev => {
            service.prev_month()?;
            print_calendar(&service, &service.load_calendar(today)?);
        }
        cli::Commands::Next => {
            service.next_month()?;
            print_calendar(&service, &service.load_calendar(today)?);
        }
        cli::Commands::Today => {
            service.reset_nav()?;
            print_calendar(&service, &service.load_calendar(today)?);
        }
        cli::Commands::View { date } => match service.get_entry(date) {
            Some(entry) => print_entry(&service, date, entry),
            None => println!("No entry for {}.", date.format("%B %-d, %Y")),
        },
        cli::Commands::Set {
            date,
            text1,
            text2,
            duration,
            emoji,
        } => {
            if let Some(glyph) = emoji.as_deref() {
                service
                    .config
                    .ensure_palette_emoji(glyph)
                    .context("Use the 'emojis' command to list the palette")?;
            }

            service.open_entry(date);
            if let Some(text) = text1 {
                service.editor.set_text1(text);
            }
            if let Some(text) = text2 {
                service.editor.set_text2(text);
            }
            if let Some(text) = duration {
                service.editor.set_duration(text);
            }
            if let Some(glyph) = emoji {
                service.select_emoji(&glyph);
            }

            let result = service.save_entry(today)?;
            match result.outcome {
                EditOutcome::Stored { date } => {
                    println!("Saved entry for {}.", date.format("%B %-d, %Y"));
                    if let Some(entry) = service.get_entry(date) {
                        print_entry(&service, date, entry);
                    }
                }
                EditOutcome::Removed { date, existed: true } => println!(
                    "Entry for {} had no workout or emoji left and was removed.",
                    date.format("%B %-d, %Y")
                ),
                EditOutcome::Removed { existed: false, .. } => {
                    println!("Nothing to save: give a workout or an emoji.");
                }
                EditOutcome::NotOpen => bail!("Entry editor was not open"),
            }
            print_calendar(&service, &result.grid);
        }
        cli::Commands::Delete { date } => {
            service.open_entry(date);
            let result = service.delete_entry(today)?;
            match result.outcome {
                EditOutcome::Removed { existed: true, .. } => {
                    println!("Deleted entry for {}.", date.format("%B %-d, %Y"));
                }
                _ => println!("No entry for {}.", date.format("%B %-d, %Y")),
            }
            print_calendar(&service, &result.grid);
        }
        cli::Commands::Stats { workout, offset } => {
            if let Some(offset) = offset {
                service.nav = offset;
            }
            let month = service.displayed_month(today)?;
            let stats = service.monthly_stats(today)?;
            let selection: StatsSelection = workout.parse()?;
            let view = workout_calendar_lib::render_stats(&stats, &selection);

            println!("{}", stats_title(month));
            if stats.is_empty() {
                log::debug!("No labels for {month}");
            } else {
                println!("Workouts: {}", stats.selector_options().join(", "));
            }
            println!();
            print_stats_view(&service, &view);
        }
        cli::Commands::Emojis => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_header(vec![Cell::new("Emoji").fg(header_color(&service))]);
            for glyph in &service.config.emoji_palette {
                table.add_row(vec![Cell::new(glyph)]);
            }
            println!("{table}");
        }
        cli::Commands::DbPath => {
            println!("Database file is located at: {:?}", service.get_db_path());
        }
        cli::Commands::ConfigPath => {
            println!("Config file is located at: {:?}", service.get_config_path());
        }
    }

    Ok(())
}

fn theme_color(name: &str, fallback: Color) -> Color {
    parse_color(name).map(Color::from).unwrap_or(fallback)
}

fn header_color(service: &AppService) -> Color {
    theme_color(&service.config.theme.header_color, Color::Green)
}

/// Prints the month grid, one row per week.
fn print_calendar(service: &AppService, grid: &CalendarGrid) {
    let header_color = header_color(service);
    let today_color = theme_color(&service.config.theme.today_color, Color::Yellow);
    let threshold = service.config.compact_label_threshold;

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            WEEKDAY_NAMES
                .iter()
                .map(|name| Cell::new(name).fg(header_color))
                .collect::<Vec<_>>(),
        );

    for week in grid.weeks() {
        let mut row: Vec<Cell> = week
            .iter()
            .map(|cell| match cell {
                GridCell::Padding => Cell::new(""),
                GridCell::Day(day) => {
                    let mut lines = vec![day.day.to_string()];
                    for label in &day.labels {
                        if label.compact {
                            // Too long for the cell; show a shortened form.
                            let short: String = label.text.chars().take(threshold).collect();
                            lines.push(format!("{short}…"));
                        } else {
                            lines.push(label.text.clone());
                        }
                    }
                    if let Some(emoji) = &day.emoji {
                        lines.push(emoji.clone());
                    }
                    let cell = Cell::new(lines.join("\n"));
                    if day.is_today {
                        cell.fg(today_color).add_attribute(Attribute::Bold)
                    } else {
                        cell
                    }
                }
            })
            .collect();
        row.resize_with(WEEKDAY_NAMES.len(), || Cell::new(""));
        table.add_row(row);
    }

    println!("{}", grid.title);
    println!("{table}");
}

fn print_entry(service: &AppService, date: NaiveDate, entry: &WorkoutEntry) {
    let header_color = header_color(service);
    let minutes = parse_duration_to_minutes(entry.duration()) as f64;

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Date").fg(header_color),
            Cell::new("Workout 1").fg(header_color),
            Cell::new("Workout 2").fg(header_color),
            Cell::new("Duration").fg(header_color),
            Cell::new("Emoji").fg(header_color),
        ]);
    table.add_row(vec![
        Cell::new(date.format("%B %-d").to_string()),
        Cell::new(entry.text1().unwrap_or("-")),
        Cell::new(entry.text2().unwrap_or("-")),
        Cell::new(match entry.duration() {
            Some(raw) => format!("{raw} ({})", format_minutes_to_time(minutes)),
            None => "-".to_string(),
        }),
        Cell::new(entry.emoji().unwrap_or("-")),
    ]);
    println!("{table}");
}

fn print_stats_view(service: &AppService, view: &StatsView) {
    match view {
        StatsView::Chart { chart, .. } => {
            let chart_color = theme_color(&service.config.theme.chart_color, Color::Cyan);
            let mut table = Table::new();
            table.load_preset(UTF8_FULL);
            table.add_row(vec![Cell::new(chart.to_vertical_text()).fg(chart_color)]);
            println!("{table}");
            if let Some(total) = view.total_line() {
                println!("{total}");
            }
        }
        _ => println!("{view}"),
    }
}
