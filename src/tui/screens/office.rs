//! Office screen: start of every cycle.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use tracing::{info, instrument};

use super::{help_bar, status_bar};
use crate::controller::Action;
use crate::language::Language;
use crate::session::Session;
use crate::tui::screen::{Screen, ScreenAction};

/// Menu options available in the office.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OfficeOption {
    NewCase,
    Shop,
    Language,
    Quit,
}

impl OfficeOption {
    fn label(self, language: Language) -> String {
        let phrases = language.phrases();
        match self {
            Self::NewCase => phrases.new_case.to_string(),
            Self::Shop => phrases.shop.to_string(),
            Self::Language => format!("{} / {}", language.display_name(), language.toggle().display_name()),
            Self::Quit => "Quit".to_string(),
        }
    }

    fn all() -> &'static [OfficeOption] {
        &[Self::NewCase, Self::Shop, Self::Language, Self::Quit]
    }

    fn action(self) -> ScreenAction {
        match self {
            Self::NewCase => ScreenAction::Dispatch(Action::NewCase),
            Self::Shop => ScreenAction::Dispatch(Action::OpenShop),
            Self::Language => ScreenAction::Dispatch(Action::ToggleLanguage),
            Self::Quit => ScreenAction::Quit,
        }
    }
}

/// State for the office screen.
#[derive(Debug)]
pub struct OfficeScreen {
    list_state: ListState,
}

impl OfficeScreen {
    /// Creates the office screen with the first option highlighted.
    pub fn new() -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));
        Self { list_state }
    }

    fn select_previous(&mut self) {
        let count = OfficeOption::all().len();
        let i = match self.list_state.selected() {
            Some(i) if i > 0 => i - 1,
            _ => count - 1,
        };
        self.list_state.select(Some(i));
    }

    fn select_next(&mut self) {
        let count = OfficeOption::all().len();
        let i = match self.list_state.selected() {
            Some(i) => (i + 1) % count,
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    fn selected_option(&self) -> OfficeOption {
        let options = OfficeOption::all();
        let idx = self.list_state.selected().unwrap_or(0);
        options[idx.min(options.len() - 1)]
    }
}

impl Default for OfficeScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen for OfficeScreen {
    #[instrument(skip(self, frame, session))]
    fn render(&self, frame: &mut Frame, session: &Session) {
        let language = *session.language();
        let phrases = language.phrases();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(6),
                Constraint::Length(3),
                Constraint::Min(6),
                Constraint::Length(3),
            ])
            .split(frame.area());

        let title = Paragraph::new(vec![
            Line::styled(
                phrases.title,
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Line::styled(phrases.subtitle, Style::default().fg(Color::Gray)),
            Line::default(),
            Line::styled(
                phrases.intro_quote,
                Style::default().add_modifier(Modifier::ITALIC),
            ),
        ])
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(title, chunks[0]);

        frame.render_widget(status_bar(session), chunks[1]);

        let items: Vec<ListItem> = OfficeOption::all()
            .iter()
            .map(|opt| ListItem::new(opt.label(language)))
            .collect();
        let menu = List::new(items)
            .block(Block::default().borders(Borders::ALL))
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");
        let mut list_state = self.list_state;
        frame.render_stateful_widget(menu, chunks[2], &mut list_state);

        frame.render_widget(
            help_bar("↑↓: Navigate | Enter: Select | n: New case | s: Shop | l: Language | q: Quit"),
            chunks[3],
        );
    }

    #[instrument(skip(self, key, _session))]
    fn handle_key(&mut self, key: KeyEvent, _session: &Session) -> ScreenAction {
        match key.code {
            KeyCode::Up => {
                self.select_previous();
                ScreenAction::Stay
            }
            KeyCode::Down => {
                self.select_next();
                ScreenAction::Stay
            }
            KeyCode::Enter => {
                let option = self.selected_option();
                info!(option = ?option, "Office option selected");
                option.action()
            }
            KeyCode::Char('n') => OfficeOption::NewCase.action(),
            KeyCode::Char('s') => OfficeOption::Shop.action(),
            KeyCode::Char('l') => OfficeOption::Language.action(),
            KeyCode::Char('q') | KeyCode::Char('Q') => ScreenAction::Quit,
            _ => ScreenAction::Stay,
        }
    }
}
