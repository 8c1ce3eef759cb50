//! Session state for the interactive UI.
//!
//! Everything the event loop mutates lives here: the mode, both cursors,
//! the cached result table, the saved search filter and the form being
//! edited. There are no ambient globals.

use phonebook_common::{ContactRow, SearchFilter};

use crate::forms::{Form, FormKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Browsing the main table with a row cursor.
    Main,
    /// Field-grid entry for the search form or a CRUD form.
    Editor,
    /// Capturing one cell's raw text.
    Input,
    /// Read-only upcoming-birthdays list.
    Birthday,
}

pub struct Session {
    pub mode: Mode,
    pub auto_save: bool,
    /// Last query result backing the main table.
    pub rows: Vec<ContactRow>,
    pub selected_row: usize,
    /// Saved search parameters applied on every reload.
    pub filter: SearchFilter,
    /// Search form cells persist across openings until cleared.
    pub search_form: Form,
    /// Form currently in the editor, if any.
    pub form: Option<Form>,
    pub selected_field: usize,
    /// Raw text being typed while in [`Mode::Input`].
    pub input: String,
    /// Transient error/info message for the status line.
    pub status: Option<String>,
    pub birthdays: Vec<ContactRow>,
    pub quit: bool,
}

impl Session {
    pub fn new(auto_save: bool) -> Self {
        Self {
            mode: Mode::Main,
            auto_save,
            rows: Vec::new(),
            selected_row: 0,
            filter: SearchFilter::default(),
            search_form: Form::new(FormKind::Search),
            form: None,
            selected_field: 0,
            input: String::new(),
            status: None,
            birthdays: Vec::new(),
            quit: false,
        }
    }

    pub fn selected(&self) -> Option<&ContactRow> {
        self.rows.get(self.selected_row)
    }

    /// Move the main-table row cursor; clamps at both ends.
    pub fn move_row(&mut self, delta: isize) {
        self.selected_row = clamped(self.selected_row, delta, self.rows.len());
    }

    /// Move the editor field cursor; clamps at both ends.
    pub fn move_field(&mut self, delta: isize) {
        let fields = self.form.as_ref().map(Form::len).unwrap_or(0);
        self.selected_field = clamped(self.selected_field, delta, fields);
    }

    /// Re-clamp the row cursor after the table changed size.
    pub fn clamp_row(&mut self) {
        self.selected_row = self.selected_row.min(self.rows.len().saturating_sub(1));
    }

    /// Enter the editor with the given form, field cursor at the start.
    pub fn open_form(&mut self, form: Form) {
        self.form = Some(form);
        self.selected_field = 0;
        self.mode = Mode::Editor;
    }

    /// Reopen the search form with its previously entered cells.
    pub fn open_search(&mut self) {
        self.open_form(self.search_form.clone());
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }
}

/// Cursor arithmetic shared by both axes: move by `delta` within
/// `[0, count - 1]`, clamping instead of wrapping.
fn clamped(position: usize, delta: isize, count: usize) -> usize {
    let top = count.saturating_sub(1);
    if delta.is_negative() {
        position.saturating_sub(delta.unsigned_abs())
    } else {
        position.saturating_add(delta as usize).min(top)
    }
}
