//! Transport bar widget - shows BPM, meter, play state, position and drops

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::UiState;

/// Render the transport bar
pub fn render_transport(frame: &mut Frame, area: Rect, state: &UiState) {
    let block = Block::default().title(" pendulum ").borders(Borders::ALL);

    let play_symbol = if state.running { "▶" } else { "⏸" };
    let play_state_str = if state.running { "Running" } else { "Stopped" };

    let position = match state.bar_and_beat() {
        Some((bar, beat)) => format!("Bar {} | Beat {}  ", bar, beat),
        None => "Bar - | Beat -  ".to_string(),
    };

    let mut spans = vec![
        Span::styled(
            format!(" BPM: {:.0}  ", state.bpm),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!("{}/bar  ", state.beats_per_bar),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!("{} {}  ", play_symbol, play_state_str),
            Style::default().fg(if state.running {
                Color::Green
            } else {
                Color::Yellow
            }),
        ),
        Span::styled(position, Style::default().fg(Color::White)),
        Span::styled(
            format!("{:+6.1}°  ", state.angle),
            Style::default().fg(Color::DarkGray),
        ),
    ];

    if state.dropped > 0 {
        spans.push(Span::styled(
            format!("dropped: {}  ", state.dropped),
            Style::default().fg(Color::Magenta),
        ));
    }
    if let Some(status) = &state.status {
        spans.push(Span::styled(status.clone(), Style::default().fg(Color::Red)));
    }

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}
