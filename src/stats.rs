//src/stats.rs
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::calendar::YearMonth;
use crate::duration::{format_minutes_to_time, parse_duration_to_minutes};
use crate::store::EntryStore;

/// Selector value meaning "every label".
pub const ALL_SELECTION: &str = "All";
const MAX_Y_TICKS: u32 = 4;
const TEXT_BAR_WIDTH: f64 = 20.0;
/// Plot rows above the zero line in the vertical chart.
pub const CHART_ROWS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AggregatedStat {
    pub count: u32,
    pub total_minutes: f64,
}

/// Per-label aggregates for one month, sorted by label.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyStats {
    pub month: YearMonth,
    pub per_label: BTreeMap<String, AggregatedStat>,
    /// Sum of entry durations, counted once per entry that has a label.
    pub total_minutes: f64,
}

impl MonthlyStats {
    pub fn get(&self, label: &str) -> Option<&AggregatedStat> {
        self.per_label.get(label)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.per_label.keys().map(String::as_str)
    }

    /// Choices for the workout selector: "All" followed by each label.
    pub fn selector_options(&self) -> Vec<String> {
        std::iter::once(ALL_SELECTION.to_string())
            .chain(self.labels().map(str::to_string))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.per_label.is_empty()
    }
}

/// Groups the month's entries by label. An entry with two labels splits its
/// duration evenly between them.
pub fn calculate_monthly_stats(entries: &EntryStore, month: YearMonth) -> MonthlyStats {
    let mut per_label: BTreeMap<String, AggregatedStat> = BTreeMap::new();
    let mut total_minutes = 0.0;

    for (_, entry) in entries.entries_in_month(month) {
        let labels = entry.labels();
        if labels.is_empty() {
            continue;
        }
        let duration = parse_duration_to_minutes(entry.duration()) as f64;
        total_minutes += duration;

        let share = duration / labels.len() as f64;
        for label in labels {
            let stat = per_label.entry(label.to_string()).or_default();
            stat.count += 1;
            stat.total_minutes += share;
        }
    }

    MonthlyStats {
        month,
        per_label,
        total_minutes,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StatsSelection {
    #[default]
    All,
    Label(String),
}

impl FromStr for StatsSelection {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(if s == ALL_SELECTION {
            Self::All
        } else {
            Self::Label(s.to_string())
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub count: u32,
    /// Count relative to the largest count, 0..=100.
    pub height_percent: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    pub bars: Vec<Bar>,
    /// Tick values from the top of the axis down to 0.
    pub y_axis: Vec<u32>,
    pub max_count: u32,
}

impl BarChart {
    fn from_stats(stats: &MonthlyStats) -> Self {
        let max_count = stats.per_label.values().map(|s| s.count).max().unwrap_or(0);
        let bars = stats
            .per_label
            .iter()
            .map(|(label, stat)| Bar {
                label: label.clone(),
                count: stat.count,
                height_percent: if max_count > 0 {
                    f64::from(stat.count) / f64::from(max_count) * 100.0
                } else {
                    0.0
                },
            })
            .collect();

        Self {
            bars,
            y_axis: y_axis_ticks(max_count),
            max_count,
        }
    }

    /// Vertical bars with the y-axis ticks on the left and labels underneath.
    pub fn to_vertical_text(&self) -> String {
        let axis_width = self
            .y_axis
            .iter()
            .map(|t| t.to_string().len())
            .max()
            .unwrap_or(1);
        let col_widths: Vec<usize> = self
            .bars
            .iter()
            .map(|b| b.label.chars().count().max(3))
            .collect();

        // Row index (from the top) at which each tick label sits.
        let intervals = self.y_axis.len().saturating_sub(1).max(1);
        let tick_at = |row: usize| {
            self.y_axis
                .iter()
                .enumerate()
                .find(|(i, _)| i * CHART_ROWS / intervals == row)
                .map(|(_, tick)| tick.to_string())
        };

        let mut out = Vec::with_capacity(CHART_ROWS + 3);
        for row in 0..=CHART_ROWS {
            let label = tick_at(row).unwrap_or_default();
            let mut line = format!("{label:>axis_width$} |");
            // Bar cell is filled when its height reaches this row's midpoint.
            let level = (CHART_ROWS - row) as f64 - 0.5;
            for (bar, width) in self.bars.iter().zip(&col_widths) {
                let filled =
                    row < CHART_ROWS && bar.height_percent / 100.0 * CHART_ROWS as f64 >= level;
                let glyph = if filled { "█" } else { " " };
                line.push_str(&format!(" {:^width$}", glyph.repeat(2), width = *width));
            }
            out.push(line);
        }

        let mut labels = format!("{:>axis_width$}  ", "");
        for (bar, width) in self.bars.iter().zip(&col_widths) {
            labels.push_str(&format!(" {:^width$}", bar.label, width = *width));
        }
        out.push(labels);

        let mut counts = format!("{:>axis_width$}  ", "");
        for (bar, width) in self.bars.iter().zip(&col_widths) {
            counts.push_str(&format!(" {:^width$}", format!("({})", bar.count), width = *width));
        }
        out.push(counts);

        out.join("\n")
    }
}

/// Up to five ticks from the top down: with n = min(max, 4) intervals each
/// tick is ceil(max / n) * i. The top tick may overshoot `max_count`.
pub fn y_axis_ticks(max_count: u32) -> Vec<u32> {
    let intervals = max_count.min(MAX_Y_TICKS);
    if intervals == 0 {
        return vec![0];
    }
    let step = max_count.div_ceil(intervals);
    (0..=intervals).rev().map(|i| step * i).collect()
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatsView {
    Single {
        label: String,
        count: u32,
        total: String,
    },
    NoData {
        label: String,
    },
    /// Nothing logged this month; no total is shown.
    Empty,
    Chart {
        chart: BarChart,
        total: String,
    },
}

impl StatsView {
    /// The "total this month" line, only present for the chart view.
    pub fn total_line(&self) -> Option<String> {
        match self {
            Self::Chart { total, .. } => Some(format!("Total workout time this month: {total}")),
            _ => None,
        }
    }
}

pub fn render_stats(stats: &MonthlyStats, selection: &StatsSelection) -> StatsView {
    match selection {
        StatsSelection::Label(label) => match stats.get(label) {
            Some(stat) if stat.count > 0 => StatsView::Single {
                label: label.clone(),
                count: stat.count,
                total: format_minutes_to_time(stat.total_minutes),
            },
            _ => StatsView::NoData {
                label: label.clone(),
            },
        },
        StatsSelection::All if stats.is_empty() => StatsView::Empty,
        StatsSelection::All => StatsView::Chart {
            chart: BarChart::from_stats(stats),
            total: format_minutes_to_time(stats.total_minutes),
        },
    }
}

pub fn stats_title(month: YearMonth) -> String {
    format!("Stats for {}", month.month_name())
}

impl fmt::Display for StatsView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single {
                label,
                count,
                total,
            } => {
                writeln!(f, "{label}:")?;
                writeln!(f, "Times done: {count}")?;
                write!(f, "Total duration: {total}")
            }
            Self::NoData { label } => write!(f, "No data for {label} this month."),
            Self::Empty => write!(f, "No workouts logged to display stats."),
            Self::Chart { chart, .. } => {
                let width = chart.bars.iter().map(|b| b.label.chars().count()).max().unwrap_or(0);
                for bar in &chart.bars {
                    let filled = (bar.height_percent / 100.0 * TEXT_BAR_WIDTH).round() as usize;
                    writeln!(f, "{:<width$} | {} {}", bar.label, "#".repeat(filled), bar.count)?;
                }
                write!(f, "{}", self.total_line().unwrap_or_default())
            }
        }
    }
}
