//! Needle widget - the swinging pendulum arm

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols::Marker,
    widgets::{
        canvas::{Canvas, Line},
        Block, Borders,
    },
    Frame,
};

use super::UiState;

/// Arm length in canvas units; the pivot sits at the bottom centre
const ARM: f64 = 0.95;

/// End point of an arm tilted `degrees` from vertical
fn tip(degrees: f32) -> (f64, f64) {
    let radians = (degrees as f64).to_radians();
    (ARM * radians.sin(), ARM * radians.cos())
}

/// Render the needle and its swing limits
pub fn render_needle(frame: &mut Frame, area: Rect, state: &UiState) {
    let block = Block::default()
        .title(" Needle ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let (left_x, left_y) = tip(-state.max_angle);
    let (right_x, right_y) = tip(state.max_angle);
    let (x, y) = tip(state.angle);
    let needle_color = if state.flashing() {
        Color::Yellow
    } else {
        Color::Cyan
    };

    let canvas = Canvas::default()
        .block(block)
        .marker(Marker::Braille)
        .x_bounds([-1.0, 1.0])
        .y_bounds([0.0, 1.0])
        .paint(move |ctx| {
            ctx.draw(&Line::new(0.0, 0.0, left_x, left_y, Color::DarkGray));
            ctx.draw(&Line::new(0.0, 0.0, right_x, right_y, Color::DarkGray));
            ctx.layer();
            ctx.draw(&Line::new(0.0, 0.0, x, y, needle_color));
        });

    frame.render_widget(canvas, area);
}
