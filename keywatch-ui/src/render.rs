use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph, Row, Table};
use ratatui::Frame;

use keywatch_core::notes::note_name;
use keywatch_core::state::{ConnectionState, ViewState};

use crate::app::App;

pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(3)])
        .split(frame.area());

    draw_status(frame, chunks[0], &app.state);
    draw_notes(frame, chunks[1], &app.state);
}

/// Status banner text keyed by connection state.
fn status_text(state: &ViewState) -> String {
    match state.connection {
        ConnectionState::Idle => "Not connected".to_string(),
        ConnectionState::Requesting => "Requesting MIDI access...".to_string(),
        ConnectionState::Ready => {
            if state.input_names.is_empty() {
                "Ready, no devices found".to_string()
            } else {
                format!("Ready: {}", state.input_names.join(", "))
            }
        }
        ConnectionState::Unsupported => "MIDI is not supported on this system".to_string(),
        ConnectionState::Denied => "MIDI access denied".to_string(),
        ConnectionState::Error => "MIDI connection error".to_string(),
    }
}

fn status_style(connection: ConnectionState) -> Style {
    match connection {
        ConnectionState::Idle => Style::default().fg(Color::DarkGray),
        ConnectionState::Requesting => Style::default().fg(Color::Yellow),
        ConnectionState::Ready => Style::default().fg(Color::Green),
        ConnectionState::Unsupported => Style::default().fg(Color::Yellow),
        ConnectionState::Denied | ConnectionState::Error => Style::default().fg(Color::Red),
    }
}

fn draw_status(frame: &mut Frame, area: Rect, state: &ViewState) {
    let mut lines = vec![Line::styled(
        status_text(state),
        status_style(state.connection).add_modifier(Modifier::BOLD),
    )];

    // The connect action is offered only while idle
    let hint = if state.connection == ConnectionState::Idle {
        "Press 'c' to connect, 'q' to quit"
    } else {
        "Press 'q' to quit"
    };
    lines.push(Line::styled(hint, Style::default().fg(Color::DarkGray)));

    let banner = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" keywatch ")
            .border_style(Style::default().fg(Color::Cyan)),
    );
    frame.render_widget(banner, area);
}

fn draw_notes(frame: &mut Frame, area: Rect, state: &ViewState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Held Keys ")
        .border_style(Style::default().fg(Color::Cyan));

    if state.no_notes_held() {
        let empty = Paragraph::new("(no keys held)")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let rows: Vec<Row> = state
        .pressed_notes()
        .map(|(note, velocity)| {
            Row::new(vec![
                note_name(note),
                note.to_string(),
                velocity.to_string(),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Length(5),
            Constraint::Length(5),
        ],
    )
    .header(
        Row::new(vec!["Note", "Num", "Vel"]).style(
            Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::BOLD),
        ),
    )
    .block(block);

    frame.render_widget(table, area);
}
