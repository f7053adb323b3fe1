use anyhow::{Context, Result};
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::{Stream, StreamExt};
use ratatui::{
    Terminal,
    backend::{Backend, CrosstermBackend},
};
use std::io::{Stderr, stderr};
use std::time::Duration;
use tokio::time::interval;

use crate::game::GameSession;
use crate::input::{InputHandler, KeyAction, terminal_input};
use crate::render::Renderer;
use crate::storage::HighScoreStore;

/// How often timed notices and highlights are checked for expiry
const HOUSEKEEPING_INTERVAL: Duration = Duration::from_millis(100);

pub struct HumanMode<S> {
    session: GameSession<S>,
    renderer: Renderer,
    should_quit: bool,
    needs_redraw: bool,
}

impl<S: HighScoreStore> HumanMode<S> {
    pub fn new(session: GameSession<S>) -> Self {
        Self {
            session,
            renderer: Renderer::new(),
            should_quit: false,
            needs_redraw: true,
        }
    }

    pub fn session(&self) -> &GameSession<S> {
        &self.session
    }

    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        // Run game loop with cleanup
        let input = terminal_input(InputHandler::new());
        let result = self.run_game_loop(&mut terminal, input).await;

        // Cleanup terminal
        self.cleanup_terminal(&mut terminal)?;

        log::info!("Quit with high score {}", self.session.high_score());
        result
    }

    /// Drive the session from key actions and the tick timer until quit.
    ///
    /// Input received while a tick is being handled is only seen by the loop
    /// afterwards, so it can only affect the following tick.
    async fn run_game_loop<B, I>(&mut self, terminal: &mut Terminal<B>, mut input: I) -> Result<()>
    where
        B: Backend,
        I: Stream<Item = Result<KeyAction>> + Unpin,
    {
        let mut housekeeping = interval(HOUSEKEEPING_INTERVAL);

        loop {
            if self.needs_redraw {
                self.draw(terminal)?;
            }

            tokio::select! {
                maybe_action = input.next() => {
                    match maybe_action {
                        Some(action) => self.handle_action(action?),
                        None => self.should_quit = true,
                    }
                }

                // Game logic tick, re-armed by the session once handled
                _ = self.session.next_tick() => {
                    self.session.on_tick();
                    self.needs_redraw = true;
                }

                _ = housekeeping.tick() => {
                    if self.session.expire_effects() {
                        self.needs_redraw = true;
                    }
                }

                // Handle Ctrl+C
                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn handle_action(&mut self, action: KeyAction) {
        match action {
            KeyAction::Move(direction) => {
                // Only changes what the next tick does; nothing to redraw
                self.session.request_direction(direction);
                return;
            }
            KeyAction::StartOrPause => self.session.start_or_pause(),
            KeyAction::TogglePause => self.session.toggle_pause(),
            KeyAction::Restart => self.session.restart_game(),
            KeyAction::SetDifficulty(difficulty) => {
                self.session.change_difficulty(difficulty);
            }
            KeyAction::Quit => {
                self.should_quit = true;
                return;
            }
            KeyAction::None => return,
        }

        self.needs_redraw = true;
    }

    fn draw<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        terminal
            .draw(|frame| {
                self.renderer.render(frame, &self.session);
            })
            .context("Failed to draw frame")?;
        self.needs_redraw = false;
        Ok(())
    }

    fn cleanup_terminal(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Difficulty, Direction, GameConfig, GameEngine, GameStatus, Position};
    use crate::storage::MemoryStore;
    use futures::channel::mpsc;
    use rand::{SeedableRng, rngs::StdRng};
    use ratatui::backend::TestBackend;

    fn mode() -> HumanMode<MemoryStore> {
        let engine = GameEngine::with_rng(GameConfig::default(), StdRng::seed_from_u64(5));
        HumanMode::new(GameSession::with_engine(engine, MemoryStore::new()))
    }

    fn test_terminal() -> Terminal<TestBackend> {
        Terminal::new(TestBackend::new(100, 32)).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_scripted_game() {
        let mut mode = mode();
        let mut terminal = test_terminal();
        let (tx, rx) = mpsc::unbounded();

        tx.unbounded_send(Ok(KeyAction::StartOrPause)).unwrap();
        let script = async {
            // First medium tick lands at 150ms
            tokio::time::sleep(Duration::from_millis(160)).await;
            tx.unbounded_send(Ok(KeyAction::Move(Direction::Down))).unwrap();
            tokio::time::sleep(Duration::from_millis(200)).await;
            tx.unbounded_send(Ok(KeyAction::Quit)).unwrap();
        };

        let (result, ()) = tokio::join!(mode.run_game_loop(&mut terminal, rx), script);

        result.unwrap();
        let session = mode.session();
        assert_eq!(session.status(), GameStatus::Running);
        assert_eq!(session.state().steps, 2);
        assert_eq!(session.state().snake.head(), Position::new(11, 11));
    }

    #[tokio::test(start_paused = true)]
    async fn test_actions_reach_session() {
        let mut mode = mode();
        let mut terminal = test_terminal();
        let input = futures::stream::iter(vec![
            Ok(KeyAction::SetDifficulty(Difficulty::Hard)),
            Ok(KeyAction::StartOrPause),
            Ok(KeyAction::TogglePause),
            Ok(KeyAction::None),
        ]);

        // The loop stops once the input stream is exhausted
        mode.run_game_loop(&mut terminal, input).await.unwrap();

        assert_eq!(mode.session().difficulty(), Difficulty::Hard);
        assert_eq!(mode.session().status(), GameStatus::Paused);
        assert!(!mode.session().is_tick_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_action() {
        let mut mode = mode();
        let mut terminal = test_terminal();
        let input = futures::stream::iter(vec![
            Ok(KeyAction::StartOrPause),
            Ok(KeyAction::Restart),
            Ok(KeyAction::Quit),
        ]);

        mode.run_game_loop(&mut terminal, input).await.unwrap();

        assert_eq!(mode.session().status(), GameStatus::Idle);
        assert_eq!(mode.session().state().snake.heading, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_input_error_stops_loop() {
        let mut mode = mode();
        let mut terminal = test_terminal();
        let input = futures::stream::iter(vec![Err(anyhow::anyhow!("terminal went away"))]);

        let result = mode.run_game_loop(&mut terminal, input).await;

        assert!(result.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_screen_is_drawn() {
        let mut mode = mode();
        let mut terminal = test_terminal();
        let input = futures::stream::iter(vec![Ok(KeyAction::Quit)]);

        mode.run_game_loop(&mut terminal, input).await.unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(text.contains("Press Space to start"));
    }
}
