//! Case file screen: the incident report, the evidence, and the suspects.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph, Wrap},
};
use tracing::{info, instrument};

use super::{SuspectPicker, help_bar, status_bar};
use crate::controller::Action;
use crate::session::Session;
use crate::tui::screen::{Screen, ScreenAction};

/// State for the case file screen.
#[derive(Debug)]
pub struct CaseFileScreen {
    picker: SuspectPicker,
}

impl CaseFileScreen {
    /// Creates the case file screen with the first suspect highlighted.
    pub fn new() -> Self {
        Self {
            picker: SuspectPicker::new(),
        }
    }
}

impl Default for CaseFileScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen for CaseFileScreen {
    #[instrument(skip(self, frame, session))]
    fn render(&self, frame: &mut Frame, session: &Session) {
        let Some(case) = session.case() else {
            return;
        };
        let phrases = session.language().phrases();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Min(5),
                Constraint::Length(case.clues().len() as u16 + 2),
                Constraint::Length(case.suspects().len() as u16 + 2),
                Constraint::Length(3),
                Constraint::Length(3),
            ])
            .split(frame.area());

        let header = Paragraph::new(vec![
            Line::styled(
                case.title().as_str(),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Line::from(format!(
                "{} | {} | {} | {}",
                case.location(),
                case.victim(),
                case.time_of_death(),
                case.difficulty()
            )),
        ])
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(header, chunks[0]);

        let report = Paragraph::new(case.description().as_str())
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(phrases.incident_report),
            );
        frame.render_widget(report, chunks[1]);

        let clues: Vec<Line> = case
            .clues()
            .iter()
            .map(|clue| Line::from(format!("• {}", clue)))
            .collect();
        let evidence = Paragraph::new(clues)
            .block(Block::default().borders(Borders::ALL).title(phrases.evidence));
        frame.render_widget(evidence, chunks[2]);

        let (list, mut list_state) = self.picker.list(session, phrases.suspects);
        frame.render_stateful_widget(list, chunks[3], &mut list_state);

        frame.render_widget(status_bar(session), chunks[4]);
        frame.render_widget(
            help_bar("↑↓: Navigate | Enter: Interrogate | a: Accuse | q: Quit"),
            chunks[5],
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
                    info!(suspect_id = %id, "Suspect picked for interrogation");
                    ScreenAction::Dispatch(Action::SelectSuspect(id))
                }
                None => ScreenAction::Stay,
            },
            KeyCode::Char('a') => ScreenAction::Dispatch(Action::RequestAccusation),
            KeyCode::Char('q') | KeyCode::Char('Q') => ScreenAction::Quit,
            _ => ScreenAction::Stay,
        }
    }
}
