//! Interrogation screen: the transcript and the question input line.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use tracing::{debug, instrument};

use super::{help_bar, status_bar};
use crate::controller::Action;
use crate::dialogue::Sender;
use crate::session::Session;
use crate::tui::screen::{Screen, ScreenAction};

/// State for the interrogation screen.
#[derive(Debug, Default)]
pub struct InterrogationScreen {
    input: String,
}

impl InterrogationScreen {
    /// Creates the screen with an empty input line.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Screen for InterrogationScreen {
    #[instrument(skip(self, frame, session))]
    fn render(&self, frame: &mut Frame, session: &Session) {
        let Some(suspect) = session.selected() else {
            return;
        };
        let phrases = session.language().phrases();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Min(5),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
            ])
            .split(frame.area());

        let header = Paragraph::new(vec![
            Line::styled(
                format!("{} ({})", suspect.name(), suspect.role()),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Line::from(format!(
                "{} {}",
                session.energy().current(),
                phrases.questions_remaining
            )),
        ])
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(header, chunks[0]);

        let lines: Vec<Line> = session
            .transcript()
            .iter()
            .map(|message| {
                let (speaker, color) = match message.sender() {
                    Sender::Detective => ("Detective", Color::Yellow),
                    Sender::Suspect => (suspect.name().as_str(), Color::White),
                };
                Line::from(vec![
                    Span::styled(
                        format!("{}: ", speaker),
                        Style::default().fg(color).add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(message.text().as_str()),
                ])
            })
            .collect();
        // Keep the newest wrapped rows in view.
        let transcript = Paragraph::new(lines).wrap(Wrap { trim: false });
        let rows = transcript.line_count(chunks[1].width.saturating_sub(2));
        let visible = usize::from(chunks[1].height.saturating_sub(2));
        let scroll = u16::try_from(rows.saturating_sub(visible)).unwrap_or(u16::MAX);
        let transcript = transcript
            .scroll((scroll, 0))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(transcript, chunks[1]);

        let input = if session.energy().is_empty() {
            Paragraph::new(phrases.out_of_energy).style(Style::default().fg(Color::Red))
        } else if self.input.is_empty() {
            Paragraph::new(phrases.ask_question).style(Style::default().fg(Color::DarkGray))
        } else {
            Paragraph::new(self.input.as_str())
        };
        frame.render_widget(input.block(Block::default().borders(Borders::ALL)), chunks[2]);

        frame.render_widget(status_bar(session), chunks[3]);
        frame.render_widget(help_bar("Type a question | Enter: Ask | Esc: Back"), chunks[4]);
    }

    #[instrument(skip(self, key, session))]
    fn handle_key(&mut self, key: KeyEvent, session: &Session) -> ScreenAction {
        match key.code {
            KeyCode::Char(c) => {
                self.input.push(c);
                ScreenAction::Stay
            }
            KeyCode::Backspace => {
                self.input.pop();
                ScreenAction::Stay
            }
            KeyCode::Enter => {
                if self.input.trim().is_empty() {
                    return ScreenAction::Stay;
                }
                if session.energy().is_empty() {
                    debug!("Out of energy, question kept");
                    return ScreenAction::Stay;
                }
                let question = std::mem::take(&mut self.input);
                debug!(length = question.len(), "Submitting question");
                ScreenAction::Dispatch(Action::Ask(question))
            }
            KeyCode::Esc => ScreenAction::Dispatch(Action::Back),
            _ => ScreenAction::Stay,
        }
    }
}
