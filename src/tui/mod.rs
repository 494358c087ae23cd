//! Terminal front end: one screen per view over a [`GameController`].

mod app;
mod screen;
mod screens;

pub use app::App;
pub use screen::{Screen, ScreenAction};
pub use screens::ActiveScreen;

use std::io;

use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{error, info, instrument};

use crate::case::CaseSource;
use crate::controller::GameController;
use crate::dialogue::DialogueSource;

/// Runs the game in the terminal until the player quits.
///
/// The terminal is restored even when the event loop fails.
#[instrument(skip_all)]
pub async fn run_tui<C, D>(controller: GameController<C, D>) -> anyhow::Result<()>
where
    C: CaseSource,
    D: DialogueSource,
{
    info!("Starting terminal UI");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(controller);
    let res = app.run(&mut terminal).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = &res {
        error!(error = ?e, "Game loop error");
    }
    info!("Terminal UI closed");
    res
}
