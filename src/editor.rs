//src/editor.rs
use chrono::NaiveDate;

use crate::store::{EntryStore, WorkoutEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorMode {
    Closed,
    /// Open on a date with no saved entry.
    OpenEmpty,
    /// Open with the saved entry loaded into the fields.
    OpenPopulated,
}

/// Transient values being edited. Nothing here is persisted until save.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditFields {
    pub text1: String,
    pub text2: String,
    pub duration: String,
    pub selected_emoji: Option<String>,
}

impl EditFields {
    fn from_entry(entry: &WorkoutEntry) -> Self {
        Self {
            text1: entry.text1().unwrap_or_default().to_string(),
            text2: entry.text2().unwrap_or_default().to_string(),
            duration: entry.duration().unwrap_or_default().to_string(),
            selected_emoji: entry.emoji().map(str::to_string),
        }
    }

    /// Builds the entry to store, trimming text fields and dropping empty ones.
    fn to_entry(&self) -> WorkoutEntry {
        WorkoutEntry {
            text1: trimmed(&self.text1),
            text2: trimmed(&self.text2),
            emoji: self.selected_emoji.clone().filter(|e| !e.is_empty()),
            duration: trimmed(&self.duration),
        }
    }
}

fn trimmed(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

/// What a save or delete did to the entry store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    Stored { date: NaiveDate },
    Removed { date: NaiveDate, existed: bool },
    /// The editor was closed; nothing changed.
    NotOpen,
}

impl EditOutcome {
    pub fn mutated_store(&self) -> bool {
        !matches!(self, Self::NotOpen)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Session {
    date: NaiveDate,
    populated: bool,
    fields: EditFields,
}

/// Single-date entry editor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryEditor {
    session: Option<Session>,
}

impl EntryEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> EditorMode {
        match &self.session {
            None => EditorMode::Closed,
            Some(s) if s.populated => EditorMode::OpenPopulated,
            Some(_) => EditorMode::OpenEmpty,
        }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.session.as_ref().map(|s| s.date)
    }

    pub fn fields(&self) -> Option<&EditFields> {
        self.session.as_ref().map(|s| &s.fields)
    }

    /// Heading for the open date, e.g. "March 5".
    pub fn title(&self) -> Option<String> {
        self.date().map(|d| d.format("%B %-d").to_string())
    }

    /// Opens `date`, loading its saved entry if there is one. Any unsaved
    /// edits from a previous date are discarded.
    pub fn open(&mut self, date: NaiveDate, entries: &EntryStore) -> EditorMode {
        let existing = entries.get(date);
        self.session = Some(Session {
            date,
            populated: existing.is_some(),
            fields: existing.map(EditFields::from_entry).unwrap_or_default(),
        });
        self.mode()
    }

    fn fields_mut(&mut self) -> Option<&mut EditFields> {
        self.session.as_mut().map(|s| &mut s.fields)
    }

    pub fn set_text1(&mut self, text: impl Into<String>) {
        if let Some(fields) = self.fields_mut() {
            fields.text1 = text.into();
        }
    }

    pub fn set_text2(&mut self, text: impl Into<String>) {
        if let Some(fields) = self.fields_mut() {
            fields.text2 = text.into();
        }
    }

    pub fn set_duration(&mut self, text: impl Into<String>) {
        if let Some(fields) = self.fields_mut() {
            fields.duration = text.into();
        }
    }

    /// Toggles `glyph`: picking the selected glyph clears the selection,
    /// any other glyph replaces it. Returns the selection afterwards.
    pub fn select_emoji(&mut self, glyph: &str) -> Option<&str> {
        let fields = self.fields_mut()?;
        if fields.selected_emoji.as_deref() == Some(glyph) {
            fields.selected_emoji = None;
        } else {
            fields.selected_emoji = Some(glyph.to_string());
        }
        fields.selected_emoji.as_deref()
    }

    /// Writes the fields into `entries` and closes. With no label and no
    /// emoji the date's entry is removed instead of stored empty.
    pub fn save(&mut self, entries: &mut EntryStore) -> EditOutcome {
        let Some(session) = self.session.take() else {
            return EditOutcome::NotOpen;
        };
        let date = session.date;
        let entry = session.fields.to_entry();
        if entry.is_blank() {
            let existed = entries.remove(date).is_some();
            EditOutcome::Removed { date, existed }
        } else {
            entries.upsert(date, entry);
            EditOutcome::Stored { date }
        }
    }

    /// Removes the open date's entry and closes.
    pub fn delete(&mut self, entries: &mut EntryStore) -> EditOutcome {
        let Some(session) = self.session.take() else {
            return EditOutcome::NotOpen;
        };
        let existed = entries.remove(session.date).is_some();
        EditOutcome::Removed {
            date: session.date,
            existed,
        }
    }

    /// Closes without saving.
    pub fn close(&mut self) {
        self.session = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
    }

    #[test]
    fn emoji_selection_toggles() {
        let mut editor = EntryEditor::new();
        editor.open(date(), &EntryStore::new());

        assert_eq!(editor.select_emoji("💪"), Some("💪"));
        assert_eq!(editor.select_emoji("🔥"), Some("🔥"));
        assert_eq!(editor.select_emoji("🔥"), None);
        assert_eq!(editor.select_emoji("💪"), Some("💪"));
    }

    #[test]
    fn closed_editor_ignores_edits() {
        let mut editor = EntryEditor::new();
        let mut entries = EntryStore::new();
        assert_eq!(editor.select_emoji("💪"), None);
        editor.set_text1("Run");
        assert_eq!(editor.save(&mut entries), EditOutcome::NotOpen);
        assert_eq!(editor.delete(&mut entries), EditOutcome::NotOpen);
        assert!(entries.is_empty());
    }

    #[test]
    fn title_uses_month_and_day() {
        let mut editor = EntryEditor::new();
        assert_eq!(editor.title(), None);
        editor.open(date(), &EntryStore::new());
        assert_eq!(editor.title().as_deref(), Some("March 5"));
    }

    #[test]
    fn save_trims_fields() {
        let mut editor = EntryEditor::new();
        let mut entries = EntryStore::new();
        editor.open(date(), &entries);
        editor.set_text1("  Run ");
        editor.set_text2("   ");
        editor.set_duration(" 45 min ");

        assert_eq!(editor.save(&mut entries), EditOutcome::Stored { date: date() });
        assert_eq!(editor.mode(), EditorMode::Closed);
        let entry = entries.get(date()).unwrap();
        assert_eq!(entry.text1.as_deref(), Some("Run"));
        assert_eq!(entry.text2, None);
        assert_eq!(entry.duration.as_deref(), Some("45 min"));
    }
}
