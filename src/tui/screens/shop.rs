//! Shop screen: free energy restock.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph},
};
use tracing::instrument;

use super::{help_bar, status_bar};
use crate::controller::Action;
use crate::session::Session;
use crate::tui::screen::{Screen, ScreenAction};

/// Shop screen. Holds no state of its own.
#[derive(Debug)]
pub struct ShopScreen;

impl Screen for ShopScreen {
    #[instrument(skip(self, frame, session))]
    fn render(&self, frame: &mut Frame, session: &Session) {
        let phrases = session.language().phrases();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(3),
            ])
            .split(frame.area());

        frame.render_widget(status_bar(session), chunks[0]);

        let item = Paragraph::new(vec![
            Line::styled(
                format!("☕ {}", phrases.buy_coffee),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Line::from(phrases.restock_energy),
            Line::default(),
            Line::from(format!(
                "{} / {}",
                session.energy().current(),
                session.energy().max()
            )),
        ])
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title(phrases.shop));
        frame.render_widget(item, chunks[1]);

        frame.render_widget(help_bar("Enter: Restock | Esc: Back"), chunks[2]);
    }

    #[instrument(skip(self, key, _session))]
    fn handle_key(&mut self, key: KeyEvent, _session: &Session) -> ScreenAction {
        match key.code {
            KeyCode::Enter | KeyCode::Char('b') => ScreenAction::Dispatch(Action::Restock),
            KeyCode::Esc => ScreenAction::Dispatch(Action::Back),
            _ => ScreenAction::Stay,
        }
    }
}
