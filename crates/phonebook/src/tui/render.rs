//! Rendering - banner, key help, the current grid and the status line.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use super::state::{Mode, Session};

const MAIN_HELP: &str = "\
 [q] quit  [s] search  [c] clear search  [S] save
 [d] delete person  [D] delete phone
 [u] update person  [U] update phone
 [n] new record  [N] new phone
 [b] nearest birthdays  [up]/[down] select row";

const EDITOR_HELP: &str = "\
 [q] confirm and exit  [e] edit selected field
 [c] clear all fields (search form)
 [<-]/[->] select field  [ENTER] store input  [ESC] cancel input";

const BIRTHDAY_HELP: &str = " [q] back";

pub fn draw(frame: &mut Frame, session: &Session) {
    let help = help_text(session.mode);
    let help_height = help.lines().count() as u16 + 2;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(help_height),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(frame.size());

    draw_header(frame, chunks[0], session);
    draw_help(frame, chunks[1], help);
    match session.mode {
        Mode::Main => draw_main_table(frame, chunks[2], session),
        Mode::Editor | Mode::Input => draw_editor(frame, chunks[2], session),
        Mode::Birthday => draw_birthdays(frame, chunks[2], session),
    }
    draw_status(frame, chunks[3], session);
}

fn help_text(mode: Mode) -> &'static str {
    match mode {
        Mode::Main => MAIN_HELP,
        Mode::Editor | Mode::Input => EDITOR_HELP,
        Mode::Birthday => BIRTHDAY_HELP,
    }
}

fn draw_header(frame: &mut Frame, area: Rect, session: &Session) {
    let banner = Paragraph::new(Line::from(format!(" auto save = {}", session.auto_save)))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" CONTACTS DATA BASE "),
        );
    frame.render_widget(banner, area);
}

fn draw_help(frame: &mut Frame, area: Rect, help: &'static str) {
    let block = Block::default().borders(Borders::ALL).title(" keys ");
    frame.render_widget(
        Paragraph::new(help)
            .style(Style::default().fg(Color::Gray))
            .block(block),
        area,
    );
}

fn draw_main_table(frame: &mut Frame, area: Rect, session: &Session) {
    let header = Row::new([
        "ID",
        "First Name",
        "Last Name",
        "Birthday",
        "Fav",
        "Phone",
        "Description",
    ])
    .style(Style::default().add_modifier(Modifier::BOLD));

    let mut rows = Vec::with_capacity(session.rows.len());
    for (index, row) in session.rows.iter().enumerate() {
        // A person with several phones repeats across rows; blank the
        // person columns after the first to read as one record.
        let repeated = index > 0 && session.rows[index - 1].person_id == row.person_id;
        let (id, first, last, birthday, favourite) = if repeated {
            (String::new(), String::new(), String::new(), String::new(), "")
        } else {
            (
                row.person_id.to_string(),
                row.first_name.clone(),
                row.last_name.clone(),
                row.birthday_display(),
                if row.is_favourite { "*" } else { "" },
            )
        };
        let height = if birthday.contains('\n') { 2 } else { 1 };
        rows.push(
            Row::new([
                Cell::from(id),
                Cell::from(first),
                Cell::from(last),
                Cell::from(birthday),
                Cell::from(favourite),
                Cell::from(row.number.clone()),
                Cell::from(row.description.clone().unwrap_or_default()),
            ])
            .height(height),
        );
    }

    let widths = [
        Constraint::Length(5),
        Constraint::Length(14),
        Constraint::Length(14),
        Constraint::Length(18),
        Constraint::Length(4),
        Constraint::Length(12),
        Constraint::Min(12),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(" contacts "))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol(">> ");

    let mut table_state = TableState::default();
    table_state.select((!session.rows.is_empty()).then_some(session.selected_row));
    frame.render_stateful_widget(table, area, &mut table_state);
}

fn draw_editor(frame: &mut Frame, area: Rect, session: &Session) {
    let Some(form) = session.form.as_ref() else {
        return;
    };

    let header = Row::new(
        form.kind
            .fields()
            .iter()
            .map(|(label, _)| Cell::from(*label)),
    )
    .style(Style::default().add_modifier(Modifier::BOLD));

    let values = Row::new((0..form.len()).map(|index| {
        let cell = Cell::from(form.cell_display(index));
        if index == session.selected_field {
            cell.style(Style::default().add_modifier(Modifier::REVERSED))
        } else {
            cell
        }
    }));

    let mut rows = vec![values];
    if !form.reference.is_empty() {
        // Current values of the row being updated, for reference.
        rows.push(
            Row::new(form.reference.iter().map(|value| Cell::from(value.clone())))
                .style(Style::default().fg(Color::DarkGray)),
        );
    }

    let widths = vec![Constraint::Ratio(1, form.len() as u32); form.len()];
    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", form.kind.title())),
    );
    frame.render_widget(table, area);
}

fn draw_birthdays(frame: &mut Frame, area: Rect, session: &Session) {
    let header = Row::new(["First Name", "Last Name", "Birthday"])
        .style(Style::default().add_modifier(Modifier::BOLD));
    let rows = session.birthdays.iter().map(|row| {
        Row::new([
            Cell::from(row.first_name.clone()),
            Cell::from(row.last_name.clone()),
            Cell::from(row.birthday_display()),
        ])
        .height(2)
    });

    let widths = [
        Constraint::Length(14),
        Constraint::Length(14),
        Constraint::Min(18),
    ];
    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" NEAREST BIRTHDAYS (next 30 days) "),
    );
    frame.render_widget(table, area);
}

fn draw_status(frame: &mut Frame, area: Rect, session: &Session) {
    let line = if session.mode == Mode::Input {
        Line::from(vec![
            Span::raw(" Your value: "),
            Span::styled(
                format!("{}_", session.input),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ])
    } else if let Some(status) = &session.status {
        Line::from(Span::styled(
            format!(" {status}"),
            Style::default().fg(Color::Yellow),
        ))
    } else {
        Line::from("")
    };
    frame.render_widget(Paragraph::new(line), area);
}
