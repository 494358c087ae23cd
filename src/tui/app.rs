//! Terminal event loop around the [`GameController`].

use crossterm::event::{self, Event, KeyEventKind};
use ratatui::{
    Frame, Terminal,
    backend::Backend,
    layout::Alignment,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Paragraph},
};
use tokio::time::{Duration, sleep};
use tracing::{debug, info, instrument};

use super::screen::{Screen, ScreenAction};
use super::screens::ActiveScreen;
use crate::case::CaseSource;
use crate::controller::{Action, GameController};
use crate::dialogue::DialogueSource;
use crate::language::Language;
use crate::machine::Transition;

/// Terminal front end: draws the session and turns keys into actions.
#[derive(Debug)]
pub struct App<C, D> {
    controller: GameController<C, D>,
    screen: ActiveScreen,
}

impl<C, D> App<C, D>
where
    C: CaseSource,
    D: DialogueSource,
{
    /// Creates the app on the screen for the controller's current view.
    #[instrument(skip_all)]
    pub fn new(controller: GameController<C, D>) -> Self {
        let screen = ActiveScreen::for_view(*controller.session().view());
        Self { controller, screen }
    }

    /// Runs the event loop until the player quits.
    #[instrument(skip(self, terminal))]
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> anyhow::Result<()>
    where
        <B as Backend>::Error: Send + Sync + 'static,
    {
        info!("Starting game event loop");

        loop {
            terminal.draw(|f| self.screen.render(f, self.controller.session()))?;

            if event::poll(Duration::from_millis(100))?
                && let Event::Key(key) = event::read()?
            {
                // Skip key release events (crossterm fires both press and release).
                if key.kind == KeyEventKind::Release {
                    continue;
                }

                match self.screen.handle_key(key, self.controller.session()) {
                    ScreenAction::Stay => {}
                    ScreenAction::Quit => {
                        info!("Player quit");
                        return Ok(());
                    }
                    ScreenAction::Dispatch(action) => self.dispatch(terminal, action).await?,
                }
            }

            sleep(Duration::from_millis(10)).await;
        }
    }

    /// Hands `action` to the controller, showing a loading frame while a
    /// provider call is pending, and swaps the screen when the view changes.
    #[instrument(skip(self, terminal))]
    async fn dispatch<B: Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
        action: Action,
    ) -> anyhow::Result<()>
    where
        <B as Backend>::Error: Send + Sync + 'static,
    {
        if action.needs_network() {
            let language = *self.controller.session().language();
            terminal.draw(|f| render_loading(f, language))?;
        }

        let transition = self.controller.dispatch(action).await;
        debug!(transition = ?transition, "Action handled");
        if let Transition::Moved { to, .. } = transition {
            self.screen = ActiveScreen::for_view(to);
        }
        Ok(())
    }
}

fn render_loading(frame: &mut Frame, language: Language) {
    let loading = Paragraph::new(language.phrases().loading)
        .style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(loading, frame.area());
}
