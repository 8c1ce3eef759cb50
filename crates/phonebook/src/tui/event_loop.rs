//! TUI entry point and key dispatch.
//!
//! One synchronous loop: draw, poll for a key event, dispatch through a
//! single match over the current mode. Every handler that touches the store
//! reports failure on the status line and leaves the mode unchanged.

use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::warn;

use phonebook_common::{ContactStore, SearchFilter};

use super::render::draw;
use super::state::{Mode, Session};
use crate::forms::{self, Form, FormKind};

/// Run the UI until the user quits. The store is dropped on the way out,
/// which commits or rolls back the session transaction per its auto-save
/// flag - on every exit path, including errors.
pub fn run(store: ContactStore) -> Result<()> {
    enable_raw_mode().map_err(|e| {
        anyhow::anyhow!("failed to enable raw mode: {e}; run inside a real terminal (TTY)")
    })?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).map_err(|e| {
        let _ = disable_raw_mode();
        anyhow::anyhow!("failed to enter the alternate screen: {e}")
    })?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut session = Session::new(store.auto_save());
    reload(&mut session, &store);

    let result = event_loop(&mut terminal, &mut session, &store);

    let cleanup = restore_terminal(&mut terminal);
    result.and(cleanup)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    session: &mut Session,
    store: &ContactStore,
) -> Result<()> {
    loop {
        terminal.draw(|frame| draw(frame, session))?;
        if session.quit {
            return Ok(());
        }
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    dispatch(session, store, key.code, key.modifiers);
                }
            }
        }
    }
}

/// The (mode, key) table. Consulted synchronously per input event; no
/// handler registration anywhere else.
fn dispatch(session: &mut Session, store: &ContactStore, code: KeyCode, mods: KeyModifiers) {
    session.status = None;

    if code == KeyCode::Char('c') && mods.contains(KeyModifiers::CONTROL) {
        session.quit = true;
        return;
    }

    match session.mode {
        Mode::Main => main_key(session, store, code),
        Mode::Editor => editor_key(session, store, code),
        Mode::Input => input_key(session, code),
        Mode::Birthday => {
            if code == KeyCode::Char('q') {
                session.mode = Mode::Main;
            }
        }
    }
}

fn main_key(session: &mut Session, store: &ContactStore, code: KeyCode) {
    match code {
        KeyCode::Char('q') => session.quit = true,
        KeyCode::Up => session.move_row(-1),
        KeyCode::Down => session.move_row(1),
        KeyCode::Char('s') => session.open_search(),
        KeyCode::Char('c') => {
            session.filter = SearchFilter::default();
            session.search_form.clear();
            reload(session, store);
        }
        KeyCode::Char('n') => session.open_form(Form::new(FormKind::NewRecord)),
        KeyCode::Char('N') => {
            if session.selected().is_some() {
                session.open_form(Form::new(FormKind::NewPhone));
            }
        }
        KeyCode::Char('u') => {
            if let Some(row) = session.selected().cloned() {
                session.open_form(Form::for_row(FormKind::UpdatePerson, &row));
            }
        }
        KeyCode::Char('U') => {
            if let Some(row) = session.selected().cloned() {
                session.open_form(Form::for_row(FormKind::UpdatePhone, &row));
            }
        }
        KeyCode::Char('d') => {
            if let Some(row) = session.selected() {
                let person_id = row.person_id;
                match store.delete_person(person_id) {
                    Ok(()) => reload(session, store),
                    Err(e) => fail(session, "delete person", &e),
                }
            }
        }
        KeyCode::Char('D') => {
            if let Some(row) = session.selected() {
                let phone_id = row.phone_id;
                match store.delete_phone(phone_id) {
                    Ok(()) => reload(session, store),
                    Err(e) => fail(session, "delete phone", &e),
                }
            }
        }
        KeyCode::Char('S') => match store.save() {
            Ok(()) => session.set_status("database saved"),
            Err(e) => fail(session, "save", &e),
        },
        KeyCode::Char('b') => match store.search(&SearchFilter::nearest_birthdays()) {
            Ok(rows) => {
                session.birthdays = rows;
                session.mode = Mode::Birthday;
            }
            Err(e) => fail(session, "birthday search", &e),
        },
        _ => {}
    }
}

fn editor_key(session: &mut Session, store: &ContactStore, code: KeyCode) {
    match code {
        KeyCode::Char('q') => commit_editor(session, store),
        KeyCode::Char('e') => {
            session.input.clear();
            session.mode = Mode::Input;
        }
        KeyCode::Left => session.move_field(-1),
        KeyCode::Right => session.move_field(1),
        KeyCode::Char('c') => {
            if let Some(form) = session.form.as_mut() {
                if form.kind == FormKind::Search {
                    form.clear();
                }
            }
        }
        _ => {}
    }
}

/// Leaving the editor commits its form. On failure the editor stays open
/// with the error on the status line so the user can correct the input.
fn commit_editor(session: &mut Session, store: &ContactStore) {
    let Some(form) = session.form.take() else {
        session.mode = Mode::Main;
        return;
    };
    let selected = session.selected().cloned();

    let outcome = match form.kind {
        FormKind::Search => {
            session.filter = forms::build_search_filter(&form);
            Ok(())
        }
        FormKind::NewRecord => forms::commit_new_record(&form, store),
        FormKind::NewPhone => match &selected {
            Some(row) => forms::commit_new_phone(&form, store, row.person_id),
            None => Ok(()),
        },
        FormKind::UpdatePerson => match &selected {
            Some(row) => forms::commit_update_person(&form, store, row),
            None => Ok(()),
        },
        FormKind::UpdatePhone => match &selected {
            Some(row) => forms::commit_update_phone(&form, store, row),
            None => Ok(()),
        },
    };

    match outcome {
        Ok(()) => {
            if form.kind == FormKind::Search {
                session.search_form = form;
            }
            session.mode = Mode::Main;
            reload(session, store);
        }
        Err(e) => {
            warn!("commit of {} failed: {e}", form.kind.title());
            session.set_status(e.to_string());
            session.form = Some(form);
        }
    }
}

fn input_key(session: &mut Session, code: KeyCode) {
    match code {
        KeyCode::Enter => {
            session.mode = Mode::Editor;
            let raw = std::mem::take(&mut session.input);
            let raw = raw.trim();
            let index = session.selected_field;
            let Some(form) = session.form.as_mut() else {
                return;
            };
            if raw.is_empty() {
                // Entering nothing clears the cell.
                form.cells[index] = None;
                return;
            }
            match form.kind.fields()[index].1.check(raw) {
                Ok(value) => form.cells[index] = Some(value),
                Err(error) => session.set_status(error.to_string()),
            }
        }
        KeyCode::Esc => {
            session.input.clear();
            session.mode = Mode::Editor;
        }
        KeyCode::Backspace => {
            session.input.pop();
        }
        KeyCode::Char(c) => session.input.push(c),
        _ => {}
    }
}

fn reload(session: &mut Session, store: &ContactStore) {
    match store.search(&session.filter) {
        Ok(rows) => {
            session.rows = rows;
            session.clamp_row();
        }
        Err(e) => fail(session, "search", &e),
    }
}

fn fail(session: &mut Session, operation: &str, error: &dyn std::fmt::Display) {
    warn!("{operation} failed: {error}");
    session.set_status(format!("{operation} failed: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use phonebook_common::{FieldValue, NewPerson, NewPhone};
    use tempfile::tempdir;

    fn test_store() -> (ContactStore, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let store = ContactStore::open(dir.path().join("contacts.db"), true).unwrap();
        store
            .insert_record(
                &NewPerson {
                    first_name: "Ann".into(),
                    last_name: "Lee".into(),
                    birthday: None,
                    is_favourite: false,
                },
                &NewPhone {
                    number: "89990001122".into(),
                    description: None,
                },
            )
            .unwrap();
        (store, dir)
    }

    fn session_with(store: &ContactStore) -> Session {
        let mut session = Session::new(true);
        reload(&mut session, store);
        session
    }

    #[test]
    fn search_commit_filters_and_returns_to_main() {
        let (store, _dir) = test_store();
        let mut session = session_with(&store);
        assert_eq!(session.rows.len(), 1);

        dispatch(&mut session, &store, KeyCode::Char('s'), KeyModifiers::NONE);
        assert_eq!(session.mode, Mode::Editor);
        session.form.as_mut().unwrap().cells[2] = Some(FieldValue::Text("Ray".into()));
        dispatch(&mut session, &store, KeyCode::Char('q'), KeyModifiers::NONE);

        assert_eq!(session.mode, Mode::Main);
        assert!(session.rows.is_empty());

        // Clearing the search brings everything back.
        dispatch(&mut session, &store, KeyCode::Char('c'), KeyModifiers::NONE);
        assert_eq!(session.rows.len(), 1);
    }

    #[test]
    fn failed_commit_stays_in_editor() {
        let (store, _dir) = test_store();
        let mut session = session_with(&store);

        // A new record colliding with Ann Lee must not leave the editor.
        dispatch(&mut session, &store, KeyCode::Char('n'), KeyModifiers::NONE);
        let form = session.form.as_mut().unwrap();
        form.cells[0] = Some(FieldValue::Text("Ann".into()));
        form.cells[1] = Some(FieldValue::Text("Lee".into()));
        form.cells[4] = Some(FieldValue::Text("89990002233".into()));
        dispatch(&mut session, &store, KeyCode::Char('q'), KeyModifiers::NONE);

        assert_eq!(session.mode, Mode::Editor);
        assert!(session.status.is_some());
    }

    #[test]
    fn input_validation_failure_keeps_cell_unset() {
        let (store, _dir) = test_store();
        let mut session = session_with(&store);

        dispatch(&mut session, &store, KeyCode::Char('n'), KeyModifiers::NONE);
        // Move to the phone field and type garbage.
        session.selected_field = 4;
        dispatch(&mut session, &store, KeyCode::Char('e'), KeyModifiers::NONE);
        assert_eq!(session.mode, Mode::Input);
        for c in "nonsense".chars() {
            dispatch(&mut session, &store, KeyCode::Char(c), KeyModifiers::NONE);
        }
        dispatch(&mut session, &store, KeyCode::Enter, KeyModifiers::NONE);

        assert_eq!(session.mode, Mode::Editor);
        assert!(session.status.is_some());
        assert!(session.form.as_ref().unwrap().cells[4].is_none());
    }

    #[test]
    fn valid_input_lands_in_the_cell() {
        let (store, _dir) = test_store();
        let mut session = session_with(&store);

        dispatch(&mut session, &store, KeyCode::Char('n'), KeyModifiers::NONE);
        session.selected_field = 4;
        dispatch(&mut session, &store, KeyCode::Char('e'), KeyModifiers::NONE);
        for c in "+79990002233".chars() {
            dispatch(&mut session, &store, KeyCode::Char(c), KeyModifiers::NONE);
        }
        dispatch(&mut session, &store, KeyCode::Enter, KeyModifiers::NONE);

        assert_eq!(
            session.form.as_ref().unwrap().cell_display(4),
            "89990002233"
        );
    }

    #[test]
    fn delete_person_reloads_the_table() {
        let (store, _dir) = test_store();
        let mut session = session_with(&store);

        dispatch(&mut session, &store, KeyCode::Char('d'), KeyModifiers::NONE);
        assert!(session.rows.is_empty());
    }

    #[test]
    fn birthday_view_round_trip() {
        let (store, _dir) = test_store();
        let mut session = session_with(&store);

        dispatch(&mut session, &store, KeyCode::Char('b'), KeyModifiers::NONE);
        assert_eq!(session.mode, Mode::Birthday);
        dispatch(&mut session, &store, KeyCode::Char('q'), KeyModifiers::NONE);
        assert_eq!(session.mode, Mode::Main);
    }

    #[test]
    fn update_forms_need_a_selected_row() {
        let (store, _dir) = test_store();
        let mut session = session_with(&store);
        session.rows.clear();

        dispatch(&mut session, &store, KeyCode::Char('u'), KeyModifiers::NONE);
        assert_eq!(session.mode, Mode::Main);
        dispatch(&mut session, &store, KeyCode::Char('N'), KeyModifiers::NONE);
        assert_eq!(session.mode, Mode::Main);
    }
}
