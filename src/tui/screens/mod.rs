//! One screen per view, plus the pieces they share.

mod accusation;
mod case_file;
mod interrogation;
mod office;
mod result;
mod shop;

pub use accusation::AccusationScreen;
pub use case_file::CaseFileScreen;
pub use interrogation::InterrogationScreen;
pub use office::OfficeScreen;
pub use result::ResultScreen;
pub use shop::ShopScreen;

use crossterm::event::KeyEvent;
use ratatui::{
    Frame,
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};
use tracing::{debug, instrument};

use super::screen::{Screen, ScreenAction};
use crate::case::SuspectId;
use crate::session::{Session, View};

/// The screen currently shown, one variant per [`View`].
#[derive(Debug)]
pub enum ActiveScreen {
    /// Office screen.
    Office(OfficeScreen),
    /// Case file screen.
    CaseFile(CaseFileScreen),
    /// Interrogation screen.
    Interrogation(InterrogationScreen),
    /// Accusation screen.
    Accusation(AccusationScreen),
    /// Result screen.
    Result(ResultScreen),
    /// Shop screen.
    Shop(ShopScreen),
}

impl ActiveScreen {
    /// Fresh screen for `view`.
    #[instrument]
    pub fn for_view(view: View) -> Self {
        debug!(view = %view, "Building screen");
        match view {
            View::Office => Self::Office(OfficeScreen::new()),
            View::CaseFile => Self::CaseFile(CaseFileScreen::new()),
            View::Interrogation => Self::Interrogation(InterrogationScreen::new()),
            View::Accusation => Self::Accusation(AccusationScreen::new()),
            View::Result => Self::Result(ResultScreen),
            View::Shop => Self::Shop(ShopScreen),
        }
    }

    fn inner(&self) -> &dyn Screen {
        match self {
            Self::Office(s) => s,
            Self::CaseFile(s) => s,
            Self::Interrogation(s) => s,
            Self::Accusation(s) => s,
            Self::Result(s) => s,
            Self::Shop(s) => s,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Screen {
        match self {
            Self::Office(s) => s,
            Self::CaseFile(s) => s,
            Self::Interrogation(s) => s,
            Self::Accusation(s) => s,
            Self::Result(s) => s,
            Self::Shop(s) => s,
        }
    }
}

impl Screen for ActiveScreen {
    fn render(&self, frame: &mut Frame, session: &Session) {
        self.inner().render(frame, session);
    }

    fn handle_key(&mut self, key: KeyEvent, session: &Session) -> ScreenAction {
        self.inner_mut().handle_key(key, session)
    }
}

/// Cursor over the suspects of the active case.
#[derive(Debug, Default)]
pub(crate) struct SuspectPicker {
    list_state: ListState,
}

impl SuspectPicker {
    pub(crate) fn new() -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));
        Self { list_state }
    }

    fn count(session: &Session) -> usize {
        session.case().as_ref().map_or(0, |c| c.suspects().len())
    }

    pub(crate) fn select_previous(&mut self, session: &Session) {
        let count = Self::count(session);
        if count == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) if i > 0 => i - 1,
            _ => count - 1,
        };
        self.list_state.select(Some(i));
    }

    pub(crate) fn select_next(&mut self, session: &Session) {
        let count = Self::count(session);
        if count == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => (i + 1) % count,
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    /// Id of the highlighted suspect.
    pub(crate) fn selected_id(&self, session: &Session) -> Option<SuspectId> {
        let case = session.case().as_ref()?;
        let index = self.list_state.selected()?;
        case.suspects().get(index).map(|s| s.id().clone())
    }

    /// Suspect list widget with the cursor.
    pub(crate) fn list<'a>(&self, session: &'a Session, title: &'a str) -> (List<'a>, ListState) {
        let items: Vec<ListItem> = session
            .case()
            .iter()
            .flat_map(|c| c.suspects())
            .map(|s| ListItem::new(format!("{} ({})", s.name(), s.role())))
            .collect();

        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");
        (list, self.list_state)
    }
}

/// Energy, experience, level and any pending notice.
pub(crate) fn status_bar(session: &Session) -> Paragraph<'static> {
    let phrases = session.language().phrases();
    let mut spans = vec![Span::styled(
        format!(
            "⚡ {}/{}   {} {}   Lv {}",
            session.energy().current(),
            session.energy().max(),
            session.experience().points(),
            phrases.xp,
            session.level()
        ),
        Style::default().fg(Color::Green),
    )];
    if let Some(notice) = session.notice() {
        spans.push(Span::raw("   "));
        spans.push(Span::styled(
            notice.clone(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
    }
    Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL))
}

/// Key hints at the bottom of a screen.
pub(crate) fn help_bar(text: &'static str) -> Paragraph<'static> {
    Paragraph::new(text)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL))
}
