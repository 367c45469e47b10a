//! Beat bar widget - one marker per beat in the bar

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::UiState;

pub fn render_beat_bar(frame: &mut Frame, area: Rect, state: &UiState) {
    let block = Block::default().title(" Beat ").borders(Borders::ALL);

    let current = state.bar_and_beat().map(|(_, beat)| beat);
    let flashing = state.flashing();

    let mut spans = Vec::with_capacity(state.beats_per_bar as usize * 2);
    for beat in 1..=state.beats_per_bar as u64 {
        let is_current = current == Some(beat);
        let color = match (beat == 1, is_current) {
            (true, true) => Color::Red,
            (false, true) => Color::Green,
            _ => Color::DarkGray,
        };
        let mut style = Style::default().fg(color);
        if is_current && flashing {
            style = style.add_modifier(Modifier::BOLD);
        }

        let symbol = if is_current { "●" } else { "○" };
        spans.push(Span::styled(symbol, style));
        spans.push(Span::raw("  "));
    }

    let paragraph = Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .block(block);
    frame.render_widget(paragraph, area);
}
