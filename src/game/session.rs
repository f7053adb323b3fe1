//! A single game session: board state plus the start/pause/restart state
//! machine, the tick timer, and high score bookkeeping.

use std::time::Duration;
use tokio::time::Instant;

use super::{
    action::Direction,
    clock::TickTimer,
    config::{Difficulty, GameConfig},
    engine::{GameEngine, StepResult},
    state::{GameOutcome, GameState, GameStatus},
};
use crate::storage::HighScoreStore;

/// How long a transient status notice stays up
pub const NOTICE_DURATION: Duration = Duration::from_secs(2);
/// How long the score stays highlighted after eating
pub const SCORE_FLASH: Duration = Duration::from_millis(300);
/// How long the game-over panel flashes after a crash
pub const CRASH_FLASH: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
struct Notice {
    text: String,
    expires_at: Instant,
}

impl Notice {
    fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            expires_at: Instant::now() + NOTICE_DURATION,
        }
    }
}

fn is_live(deadline: Option<Instant>) -> bool {
    deadline.is_some_and(|at| Instant::now() < at)
}

pub struct GameSession<S> {
    engine: GameEngine,
    state: GameState,
    status: GameStatus,
    outcome: Option<GameOutcome>,
    difficulty: Difficulty,
    /// Latest accepted heading change, applied on the next tick
    pending_direction: Option<Direction>,
    high_score: u32,
    store: S,
    timer: TickTimer,
    notice: Option<Notice>,
    score_flash_until: Option<Instant>,
    crash_flash_until: Option<Instant>,
}

impl<S: HighScoreStore> GameSession<S> {
    pub fn new(config: GameConfig, store: S) -> Self {
        Self::with_engine(GameEngine::new(config), store)
    }

    /// Build a session around an existing engine; the high score is read
    /// from the store once, here.
    pub fn with_engine(mut engine: GameEngine, store: S) -> Self {
        let state = engine.reset();
        let difficulty = engine.config().difficulty;
        let high_score = store.load();

        log::info!(
            "New session on a {}x{} grid, difficulty {}, high score {}",
            state.grid_width,
            state.grid_height,
            difficulty.label(),
            high_score
        );

        Self {
            engine,
            state,
            status: GameStatus::Idle,
            outcome: None,
            difficulty,
            pending_direction: None,
            high_score,
            store,
            timer: TickTimer::new(),
            notice: None,
            score_flash_until: None,
            crash_flash_until: None,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn score(&self) -> u32 {
        self.state.score
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn pending_direction(&self) -> Option<Direction> {
        self.pending_direction
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Whether a tick is scheduled
    pub fn is_tick_pending(&self) -> bool {
        self.timer.is_armed()
    }

    pub fn score_flash_active(&self) -> bool {
        is_live(self.score_flash_until)
    }

    pub fn crash_flash_active(&self) -> bool {
        is_live(self.crash_flash_until)
    }

    /// Start moving. From `Over` the board is reset first.
    pub fn start_game(&mut self) {
        match self.status {
            GameStatus::Running | GameStatus::Paused => return,
            GameStatus::Over => self.restart_game(),
            GameStatus::Idle => {}
        }

        self.status = GameStatus::Running;
        self.state.snake.heading = Some(Direction::Right);
        self.pending_direction = None;
        self.notice = None;
        self.timer.arm(self.difficulty.tick_delay());

        log::info!("Game started at {} difficulty", self.difficulty.label());
    }

    /// Pause a running game or resume a paused one
    pub fn toggle_pause(&mut self) {
        match self.status {
            GameStatus::Running => {
                self.status = GameStatus::Paused;
                self.timer.cancel();
                log::info!("Game paused at score {}", self.state.score);
            }
            GameStatus::Paused => {
                self.status = GameStatus::Running;
                // Fixed delay: a full interval again, nothing carried over
                self.timer.arm(self.difficulty.tick_delay());
                log::info!("Game resumed");
            }
            GameStatus::Idle | GameStatus::Over => return,
        }
        self.notice = None;
    }

    /// Space bar behaviour: start when nothing is in progress, else pause
    pub fn start_or_pause(&mut self) {
        match self.status {
            GameStatus::Idle | GameStatus::Over => self.start_game(),
            GameStatus::Running | GameStatus::Paused => self.toggle_pause(),
        }
    }

    /// Back to a fresh idle board. The high score is kept.
    pub fn restart_game(&mut self) {
        self.timer.cancel();
        self.state = self.engine.reset();
        self.status = GameStatus::Idle;
        self.outcome = None;
        self.pending_direction = None;
        self.notice = None;
        self.score_flash_until = None;
        self.crash_flash_until = None;

        log::info!("Game restarted");
    }

    /// Select a difficulty for the next start. Refused while a game is in
    /// progress, including while paused.
    pub fn change_difficulty(&mut self, difficulty: Difficulty) -> bool {
        if matches!(self.status, GameStatus::Running | GameStatus::Paused) {
            log::debug!(
                "Refused difficulty change to {} while {:?}",
                difficulty.label(),
                self.status
            );
            self.notice = Some(Notice::new("Stop the game before changing difficulty"));
            return false;
        }

        self.difficulty = difficulty;
        self.notice = Some(Notice::new(format!(
            "Difficulty set to: {}",
            difficulty.label()
        )));
        log::info!("Difficulty set to {}", difficulty.label());
        true
    }

    /// Queue a heading change for the next tick.
    ///
    /// Ignored unless the game is running, and ignored when it would reverse
    /// the heading the snake is currently moving in. Among accepted requests
    /// the latest one wins.
    pub fn request_direction(&mut self, direction: Direction) -> bool {
        if self.status != GameStatus::Running {
            return false;
        }

        if self
            .state
            .snake
            .heading
            .is_some_and(|current| current.is_opposite(direction))
        {
            return false;
        }

        self.pending_direction = Some(direction);
        true
    }

    /// Wait for the scheduled tick. Pends forever when none is scheduled.
    pub async fn next_tick(&mut self) {
        self.timer.fired().await;
    }

    /// Advance the board by one step. Returns `None` when the game is not
    /// running. The next tick is scheduled only after the step completes.
    pub fn on_tick(&mut self) -> Option<StepResult> {
        if self.status != GameStatus::Running {
            return None;
        }

        if let Some(direction) = self.pending_direction.take() {
            self.state.snake.heading = Some(direction);
        }

        let result = self.engine.step(&mut self.state);
        log::trace!(
            "Tick {}: head {:?}, length {}",
            self.state.steps,
            self.state.snake.head(),
            self.state.snake.len()
        );

        if result.ate_food {
            self.score_flash_until = Some(Instant::now() + SCORE_FLASH);
            self.record_score();
        }

        match result.outcome {
            Some(outcome) => self.finish(outcome),
            None => self.timer.arm(self.difficulty.tick_delay()),
        }

        Some(result)
    }

    fn finish(&mut self, outcome: GameOutcome) {
        self.status = GameStatus::Over;
        self.outcome = Some(outcome);
        self.pending_direction = None;
        self.notice = None;
        self.timer.cancel();
        self.crash_flash_until = Some(Instant::now() + CRASH_FLASH);

        log::info!(
            "Game over ({:?}) with score {} after {} steps",
            outcome,
            self.state.score,
            self.state.steps
        );
    }

    fn record_score(&mut self) {
        if self.state.score <= self.high_score {
            return;
        }

        self.high_score = self.state.score;
        match self.store.save(self.high_score) {
            Ok(()) => log::info!("New high score: {}", self.high_score),
            Err(e) => log::error!("Failed to save high score {}: {e:#}", self.high_score),
        }
    }

    /// Drop notices and highlights whose time is up. Returns true if anything
    /// visible changed.
    pub fn expire_effects(&mut self) -> bool {
        let now = Instant::now();
        let mut changed = false;

        if self.notice.as_ref().is_some_and(|n| n.expires_at <= now) {
            self.notice = None;
            changed = true;
        }
        for deadline in [&mut self.score_flash_until, &mut self.crash_flash_until] {
            if deadline.is_some_and(|at| at <= now) {
                *deadline = None;
                changed = true;
            }
        }

        changed
    }

    /// Human readable status line
    pub fn status_text(&self) -> String {
        if let Some(notice) = &self.notice {
            if Instant::now() < notice.expires_at {
                return notice.text.clone();
            }
        }

        match self.status {
            GameStatus::Idle => "Press Space to start".to_string(),
            GameStatus::Running => format!("Running - Difficulty: {}", self.difficulty.label()),
            GameStatus::Paused => format!("Paused - Difficulty: {}", self.difficulty.label()),
            GameStatus::Over => match self.outcome {
                Some(GameOutcome::BoardFilled) => "You win! Press Space to play again".to_string(),
                _ => "Game over! Press Space to play again".to_string(),
            },
        }
    }
}
