//! TUI module for pendulum
//!
//! Polls the engine's needle and events each frame and draws them. The
//! renderer only reads; control goes through start/stop on the engine.

mod beat_bar;
mod needle;
pub mod state;
mod transport;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use std::time::Duration;

use pendulum::{ClockSource, Metronome, PcmSink};

pub use state::UiState;

use beat_bar::render_beat_bar;
use needle::render_needle;
use transport::render_transport;

/// UI application state
pub struct UiApp {
    state: UiState,
    should_quit: bool,
}

impl UiApp {
    pub fn new(state: UiState) -> Self {
        Self {
            state,
            should_quit: false,
        }
    }

    /// Run the UI event loop
    pub fn run<S: PcmSink, C: ClockSource>(
        &mut self,
        terminal: &mut DefaultTerminal,
        metronome: &mut Metronome<S, C>,
    ) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_engine(metronome);

            terminal.draw(|frame| self.render(frame))?;

            // Handle keyboard input (non-blocking, ~60fps)
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code, metronome);
                    }
                }
            }
        }

        Ok(())
    }

    fn poll_engine<S: PcmSink, C: ClockSource>(&mut self, metronome: &mut Metronome<S, C>) {
        for event in metronome.drain_events() {
            self.state.apply(event);
        }
        if let Some(fault) = metronome.take_fault() {
            self.state.status = Some(fault.to_string());
        }
        self.state.angle = metronome.angle();
        self.state.running = metronome.is_running();
    }

    fn handle_key<S: PcmSink, C: ClockSource>(
        &mut self,
        key: KeyCode,
        metronome: &mut Metronome<S, C>,
    ) {
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char(' ') => {
                let result = if metronome.is_running() {
                    metronome.stop()
                } else {
                    metronome.start()
                };
                if let Err(e) = result {
                    self.state.status = Some(e.to_string());
                }
            }
            _ => {}
        }
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        // Main layout: transport, needle, beat bar, help
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Transport bar
                Constraint::Min(8),    // Needle
                Constraint::Length(3), // Beat bar
                Constraint::Length(1), // Help bar
            ])
            .split(area);

        render_transport(frame, chunks[0], &self.state);
        render_needle(frame, chunks[1], &self.state);
        render_beat_bar(frame, chunks[2], &self.state);

        let help = Paragraph::new(" [Space] Start/Stop  [Q] Quit")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[3]);
    }
}
