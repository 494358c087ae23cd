//! Screen trait and key-handling result for the terminal UI.

use crossterm::event::KeyEvent;
use ratatui::Frame;

use crate::controller::Action;
use crate::session::Session;

/// The result of handling a key on a screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenAction {
    /// Nothing for the controller to do.
    Stay,
    /// Hand an action to the game controller.
    Dispatch(Action),
    /// Exit the game.
    Quit,
}

/// Trait implemented by the screen of each view.
///
/// Screens own only presentation state (list cursors, the input line). All
/// game state is read from the [`Session`].
pub trait Screen {
    /// Renders the screen into the provided [`Frame`].
    fn render(&self, frame: &mut Frame, session: &Session);

    /// Handles a key event and returns the resulting [`ScreenAction`].
    fn handle_key(&mut self, key: KeyEvent, session: &Session) -> ScreenAction;
}
