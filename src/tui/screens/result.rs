//! Result screen: the verdict of the last accusation.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph, Wrap},
};
use tracing::instrument;

use super::status_bar;
use crate::controller::Action;
use crate::scoring::{Outcome, score};
use crate::session::Session;
use crate::tui::screen::{Screen, ScreenAction};

/// Result screen. Holds no state of its own.
#[derive(Debug)]
pub struct ResultScreen;

impl Screen for ResultScreen {
    #[instrument(skip(self, frame, session))]
    fn render(&self, frame: &mut Frame, session: &Session) {
        let (Some(outcome), Some(killer)) = (
            *session.outcome(),
            session.case().as_ref().and_then(|c| c.killer()),
        ) else {
            return;
        };
        let phrases = session.language().phrases();

        let (heading, verdict, color) = match outcome {
            Outcome::Win => (phrases.case_closed, phrases.success(killer.name()), Color::Green),
            Outcome::Lose => (phrases.case_cold, phrases.failure(killer.name()), Color::Red),
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(7),
                Constraint::Length(3),
                Constraint::Length(3),
            ])
            .split(frame.area());

        let body = Paragraph::new(vec![
            Line::styled(
                heading,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
            Line::default(),
            Line::from(verdict),
            Line::default(),
            Line::from(score(outcome).to_string()),
        ])
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(body, chunks[0]);

        frame.render_widget(status_bar(session), chunks[1]);

        let help = format!("Enter: {}", phrases.back_to_office);
        frame.render_widget(
            Paragraph::new(help)
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL)),
            chunks[2],
        );
    }

    #[instrument(skip(self, key, _session))]
    fn handle_key(&mut self, key: KeyEvent, _session: &Session) -> ScreenAction {
        match key.code {
            KeyCode::Enter | KeyCode::Esc => ScreenAction::Dispatch(Action::Acknowledge),
            KeyCode::Char('q') | KeyCode::Char('Q') => ScreenAction::Quit,
            _ => ScreenAction::Stay,
        }
    }
}
