//! Accusation screen: name the killer.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Paragraph},
};
use tracing::{info, instrument};

use super::SuspectPicker;
use crate::controller::Action;
use crate::session::Session;
use crate::tui::screen::{Screen, ScreenAction};

/// State for the accusation screen.
#[derive(Debug)]
pub struct AccusationScreen {
    picker: SuspectPicker,
}

impl AccusationScreen {
    /// Creates the accusation screen with the first suspect highlighted.
    pub fn new() -> Self {
        Self {
            picker: SuspectPicker::new(),
        }
    }
}

impl Default for AccusationScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen for AccusationScreen {
    #[instrument(skip(self, frame, session))]
    fn render(&self, frame: &mut Frame, session: &Session) {
        if session.case().is_none() {
            return;
        }
        let phrases = session.language().phrases();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(3),
            ])
            .split(frame.area());

        let prompt = Paragraph::new(phrases.who_is_killer)
            .style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(prompt, chunks[0]);

        let (list, mut list_state) = self.picker.list(session, phrases.suspects);
        frame.render_stateful_widget(list, chunks[1], &mut list_state);

        let help = format!("↑↓: Navigate | Enter: Accuse | Esc: {}", phrases.wait);
        frame.render_widget(
            Paragraph::new(help)
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL)),
            chunks[2],
        );
    }

    #[instrument(skip(self, key, session))]
    fn handle_key(&mut self, key: KeyEvent, session: &Session) -> ScreenAction {
        match key.code {
            KeyCode::Up => {
                self.picker.select_previous(session);
                ScreenAction::Stay
            }
            KeyCode::Down => {
                self.picker.select_next(session);
                ScreenAction::Stay
            }
            KeyCode::Enter => match self.picker.selected_id(session) {
                Some(id) => {
                    info!(suspect_id = %id, "Accusing suspect");
                    ScreenAction::Dispatch(Action::Accuse(id))
                }
                None => ScreenAction::Stay,
            },
            KeyCode::Esc => ScreenAction::Dispatch(Action::Defer),
            _ => ScreenAction::Stay,
        }
    }
}
