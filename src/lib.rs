use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

// --- Declare modules ---
pub mod calendar;
mod config;
pub mod db;
pub mod duration;
pub mod editor;
pub mod stats;
pub mod store;

// --- Expose public types ---
pub use calendar::{
    build_grid, CalendarError, CalendarGrid, CellAction, DayCell, GridCell, LabelView, YearMonth,
    WEEKDAY_NAMES,
};
pub use config::{
    get_config_path as get_config_path_util, load_config as load_config_util, parse_color,
    save_config as save_config_util, Config, Error as ConfigError, StandardColor, Theme,
};
pub use db::{get_db_path as get_db_path_util, DbError, SqliteStore};
pub use duration::{format_minutes_to_time, parse_duration_to_minutes};
pub use editor::{EditFields, EditOutcome, EditorMode, EntryEditor};
pub use stats::{
    calculate_monthly_stats, render_stats, stats_title, AggregatedStat, Bar, BarChart,
    MonthlyStats, StatsSelection, StatsView, ALL_SELECTION,
};
pub use store::{date_key, EntryStore, KeyValueStore, MemoryStore, WorkoutEntry};

/// Result of a save or delete: what changed, plus the rebuilt month grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditResult {
    pub outcome: EditOutcome,
    pub grid: CalendarGrid,
}

/// All application state. Every user action goes through one of these
/// methods, and each mutation is persisted before the method returns.
pub struct AppService {
    pub config: Config,
    pub storage: Box<dyn KeyValueStore>,
    pub entries: EntryStore,
    /// Months relative to the current month; 0 is the current month.
    pub nav: i32,
    pub editor: EntryEditor,
    pub db_path: PathBuf,
    pub config_path: PathBuf,
}

impl AppService {
    /// Initializes the application service.
    /// # Errors
    /// Returns `anyhow::Error` if config/db path determination, loading, or initialization fails.
    pub fn initialize() -> Result<Self> {
        let config_path =
            config::get_config_path().context("Failed to determine configuration file path")?;
        let config = config::load_config(&config_path)
            .with_context(|| format!("Failed to load config from {config_path:?}"))?;

        let db_path = db::get_db_path().context("Failed to determine database path")?;
        let store = SqliteStore::open(&db_path)
            .with_context(|| format!("Failed to open database at {db_path:?}"))?;

        Self::with_storage(config, Box::new(store), db_path, config_path)
    }

    /// Builds the service over an already opened store, loading entries and
    /// the navigation offset from it.
    /// # Errors
    /// Returns `anyhow::Error` if the store cannot be read.
    pub fn with_storage(
        config: Config,
        storage: Box<dyn KeyValueStore>,
        db_path: PathBuf,
        config_path: PathBuf,
    ) -> Result<Self> {
        let entries =
            EntryStore::load(&*storage).context("Failed to load workout entries")?;
        let nav = store::load_nav(&*storage).context("Failed to load month offset")?;
        log::debug!("Loaded {} entries, month offset {}", entries.len(), nav);

        Ok(Self {
            config,
            storage,
            entries,
            nav,
            editor: EntryEditor::new(),
            db_path,
            config_path,
        })
    }

    pub fn get_config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn get_db_path(&self) -> &Path {
        &self.db_path
    }

    /// Saves the current configuration state.
    /// # Errors
    /// Returns `ConfigError` if saving fails.
    pub fn save_config(&self) -> Result<(), ConfigError> {
        config::save_config(&self.config_path, &self.config)
    }

    // --- Navigation ---

    /// The month currently displayed, relative to `today`.
    /// # Errors
    /// Returns `CalendarError` if the offset leaves the supported date range.
    pub fn displayed_month(&self, today: NaiveDate) -> Result<YearMonth, CalendarError> {
        YearMonth::from_offset(today, self.nav)
    }

    /// Builds the grid for the displayed month. Reads state only.
    /// # Errors
    /// Returns `anyhow::Error` if the offset leaves the supported date range.
    pub fn load_calendar(&self, today: NaiveDate) -> Result<CalendarGrid> {
        let month = self.displayed_month(today)?;
        Ok(build_grid(
            month,
            today,
            &self.entries,
            self.config.compact_label_threshold,
        ))
    }

    /// Sets the navigation offset and persists it.
    /// # Errors
    /// Returns `anyhow::Error` wrapping `DbError` if persisting fails.
    pub fn set_nav(&mut self, nav: i32) -> Result<i32> {
        self.nav = nav;
        store::save_nav(&mut *self.storage, nav).context("Failed to save month offset")?;
        Ok(nav)
    }

    /// Moves one month back.
    /// # Errors
    /// See [`AppService::set_nav`].
    pub fn prev_month(&mut self) -> Result<i32> {
        self.set_nav(self.nav.saturating_sub(1))
    }

    /// Moves one month forward.
    /// # Errors
    /// See [`AppService::set_nav`].
    pub fn next_month(&mut self) -> Result<i32> {
        self.set_nav(self.nav.saturating_add(1))
    }

    /// Returns to the current month.
    /// # Errors
    /// See [`AppService::set_nav`].
    pub fn reset_nav(&mut self) -> Result<i32> {
        self.set_nav(0)
    }

    // --- Entry editor ---

    pub fn get_entry(&self, date: NaiveDate) -> Option<&WorkoutEntry> {
        self.entries.get(date)
    }

    /// Dispatches a grid cell action.
    pub fn handle_action(&mut self, action: CellAction) -> EditorMode {
        match action {
            CellAction::OpenEditor(date) => self.open_entry(date),
        }
    }

    pub fn open_entry(&mut self, date: NaiveDate) -> EditorMode {
        self.editor.open(date, &self.entries)
    }

    /// Toggles an emoji in the open editor; returns the selection afterwards.
    pub fn select_emoji(&mut self, glyph: &str) -> Option<String> {
        self.editor.select_emoji(glyph).map(str::to_string)
    }

    /// Saves the open editor (or removes the entry when it holds nothing),
    /// persists, closes and rebuilds the grid.
    /// # Errors
    /// Returns `anyhow::Error` if persisting fails or the offset is out of range.
    pub fn save_entry(&mut self, today: NaiveDate) -> Result<EditResult> {
        let outcome = self.editor.save(&mut self.entries);
        self.finish_edit(outcome, today)
    }

    /// Deletes the open date's entry, persists, closes and rebuilds the grid.
    /// # Errors
    /// Returns `anyhow::Error` if persisting fails or the offset is out of range.
    pub fn delete_entry(&mut self, today: NaiveDate) -> Result<EditResult> {
        let outcome = self.editor.delete(&mut self.entries);
        self.finish_edit(outcome, today)
    }

    pub fn close_editor(&mut self) {
        self.editor.close();
    }

    fn finish_edit(&mut self, outcome: EditOutcome, today: NaiveDate) -> Result<EditResult> {
        match &outcome {
            EditOutcome::Stored { date } => log::info!("Saved entry for {date}"),
            EditOutcome::Removed { date, existed } => {
                log::info!("Removed entry for {date} (existed: {existed})");
            }
            EditOutcome::NotOpen => log::debug!("Editor not open, nothing to save"),
        }
        if outcome.mutated_store() {
            self.entries
                .persist(&mut *self.storage)
                .context("Failed to save workout entries")?;
        }
        let grid = self.load_calendar(today)?;
        Ok(EditResult { outcome, grid })
    }

    // --- Statistics ---

    /// Aggregates the displayed month.
    /// # Errors
    /// Returns `CalendarError` if the offset leaves the supported date range.
    pub fn monthly_stats(&self, today: NaiveDate) -> Result<MonthlyStats, CalendarError> {
        let month = self.displayed_month(today)?;
        Ok(calculate_monthly_stats(&self.entries, month))
    }
}
