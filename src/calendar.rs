//src/calendar.rs
use chrono::{Datelike, NaiveDate};
use std::fmt;
use thiserror::Error;

use crate::store::{date_key, EntryStore};

pub const WEEKDAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CalendarError {
    #[error("Month offset {0} is outside the supported calendar range.")]
    OffsetOutOfRange(i32),
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// A calendar month. Always refers to a representable date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    first: NaiveDate,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|first| Self { first })
    }

    /// The month `offset` months away from the month containing `today`.
    /// The offset is applied to the month index, rolling the year over.
    pub fn from_offset(today: NaiveDate, offset: i32) -> Result<Self, CalendarError> {
        let index = i64::from(today.year()) * 12 + i64::from(today.month0()) + i64::from(offset);
        let year = i32::try_from(index.div_euclid(12))
            .map_err(|_| CalendarError::OffsetOutOfRange(offset))?;
        // rem_euclid keeps the month in 0..12
        let month = index.rem_euclid(12) as u32 + 1;
        Self::new(year, month).ok_or(CalendarError::OffsetOutOfRange(offset))
    }

    pub fn year(self) -> i32 {
        self.first.year()
    }

    pub fn month(self) -> u32 {
        self.first.month()
    }

    pub fn days_in_month(self) -> u32 {
        match self.month() {
            1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
            4 | 6 | 9 | 11 => 30,
            _ if is_leap_year(self.year()) => 29,
            _ => 28,
        }
    }

    /// Weekday of the 1st, 0 = Sunday.
    pub fn first_weekday_index(self) -> u32 {
        self.first.weekday().num_days_from_sunday()
    }

    pub fn date(self, day: u32) -> Option<NaiveDate> {
        self.first.with_day(day)
    }

    /// Prefix shared by every entry key of this month, e.g. "2024-03-".
    pub fn key_prefix(self) -> String {
        self.first.format("%Y-%m-").to_string()
    }

    pub fn month_name(self) -> String {
        self.first.format("%B").to_string()
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.first.format("%B %Y"))
    }
}

/// A workout label as shown inside a day cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelView {
    pub text: String,
    /// Long labels are drawn smaller; the text itself is untouched.
    /// Length is measured in UTF-16 code units, so most emoji count twice.
    pub compact: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellAction {
    OpenEditor(NaiveDate),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayCell {
    pub date: NaiveDate,
    pub day: u32,
    pub key: String,
    pub is_today: bool,
    pub labels: Vec<LabelView>,
    pub emoji: Option<String>,
}

impl DayCell {
    pub fn has_entry(&self) -> bool {
        !self.labels.is_empty() || self.emoji.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridCell {
    /// Blank lead-in before the 1st; not clickable.
    Padding,
    Day(DayCell),
}

impl GridCell {
    pub fn action(&self) -> Option<CellAction> {
        match self {
            Self::Padding => None,
            Self::Day(cell) => Some(CellAction::OpenEditor(cell.date)),
        }
    }
}

/// Renderable description of one month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarGrid {
    pub month: YearMonth,
    pub title: String,
    pub cells: Vec<GridCell>,
}

impl CalendarGrid {
    pub fn padding_count(&self) -> usize {
        self.cells
            .iter()
            .take_while(|c| matches!(c, GridCell::Padding))
            .count()
    }

    pub fn day(&self, day: u32) -> Option<&DayCell> {
        self.days().find(|cell| cell.day == day)
    }

    pub fn days(&self) -> impl Iterator<Item = &DayCell> {
        self.cells.iter().filter_map(|c| match c {
            GridCell::Day(cell) => Some(cell),
            GridCell::Padding => None,
        })
    }

    /// Rows of seven cells, Sunday first. The last row may be short.
    pub fn weeks(&self) -> std::slice::Chunks<'_, GridCell> {
        self.cells.chunks(7)
    }
}

/// Lays out `month`: padding up to the weekday of the 1st, then one cell per
/// day carrying that date's entry summary.
pub fn build_grid(
    month: YearMonth,
    today: NaiveDate,
    entries: &EntryStore,
    compact_threshold: usize,
) -> CalendarGrid {
    let padding = month.first_weekday_index();
    let days = month.days_in_month();

    let mut cells = Vec::with_capacity((padding + days) as usize);
    for i in 1..=padding + days {
        if i <= padding {
            cells.push(GridCell::Padding);
            continue;
        }
        let day = i - padding;
        let Some(date) = month.date(day) else {
            continue;
        };
        cells.push(GridCell::Day(day_cell(date, day, today, entries, compact_threshold)));
    }

    CalendarGrid {
        month,
        title: month.to_string(),
        cells,
    }
}

fn day_cell(
    date: NaiveDate,
    day: u32,
    today: NaiveDate,
    entries: &EntryStore,
    compact_threshold: usize,
) -> DayCell {
    let key = date_key(date);
    let (labels, emoji) = match entries.get_by_key(&key) {
        Some(entry) => (
            entry
                .labels()
                .into_iter()
                .map(|text| LabelView {
                    text: text.to_string(),
                    compact: text.encode_utf16().count() > compact_threshold,
                })
                .collect(),
            entry.emoji().map(str::to_string),
        ),
        None => (Vec::new(), None),
    };

    DayCell {
        date,
        day,
        key,
        is_today: date == today,
        labels,
        emoji,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn offset_rolls_years() {
        let nov = date(2023, 11, 15);
        let ym = YearMonth::from_offset(nov, 14).unwrap();
        assert_eq!((ym.year(), ym.month()), (2025, 1));

        let ym = YearMonth::from_offset(nov, -11).unwrap();
        assert_eq!((ym.year(), ym.month()), (2022, 12));

        let ym = YearMonth::from_offset(date(2024, 1, 31), -1).unwrap();
        assert_eq!((ym.year(), ym.month()), (2023, 12));
    }

    #[test]
    fn absurd_offsets_are_rejected() {
        assert_eq!(
            YearMonth::from_offset(date(2024, 1, 1), i32::MAX),
            Err(CalendarError::OffsetOutOfRange(i32::MAX))
        );
    }

    #[test]
    fn month_lengths() {
        assert_eq!(YearMonth::new(2024, 2).unwrap().days_in_month(), 29);
        assert_eq!(YearMonth::new(2023, 2).unwrap().days_in_month(), 28);
        assert_eq!(YearMonth::new(1900, 2).unwrap().days_in_month(), 28);
        assert_eq!(YearMonth::new(2024, 4).unwrap().days_in_month(), 30);
        assert_eq!(YearMonth::new(2024, 12).unwrap().days_in_month(), 31);
    }

    #[test]
    fn sunday_start_has_no_padding() {
        // September 2024 starts on a Sunday.
        let grid = build_grid(
            YearMonth::new(2024, 9).unwrap(),
            date(2024, 9, 10),
            &EntryStore::new(),
            8,
        );
        assert_eq!(grid.padding_count(), 0);
        assert_eq!(grid.cells.len(), 30);
        assert_eq!(grid.title, "September 2024");
        assert!(grid.day(10).unwrap().is_today);
        assert!(grid.cells[0].action().is_some());
    }

    #[test]
    fn compact_threshold_counts_utf16_units() {
        let mut entries = EntryStore::new();
        let day = date(2024, 3, 5);
        entries.upsert(
            day,
            crate::store::WorkoutEntry {
                // 5 chars, 10 UTF-16 units
                text1: Some("💪💪💪💪💪".into()),
                text2: Some("Yoga".into()),
                ..Default::default()
            },
        );

        let grid = build_grid(YearMonth::new(2024, 3).unwrap(), day, &entries, 8);
        let labels = &grid.day(5).unwrap().labels;
        assert!(labels[0].compact);
        assert!(!labels[1].compact);
    }
}
