use super::{
    config::{FOOD_SCORE, GameConfig},
    state::{CollisionType, GameOutcome, GameState, Position, Snake},
};
use rand::{Rng, SeedableRng, rngs::StdRng, seq::IteratorRandom};

/// Result of a game step
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    /// Whether the snake ate food this step
    pub ate_food: bool,
    /// Set when this step ended the game
    pub outcome: Option<GameOutcome>,
}

impl StepResult {
    fn idle() -> Self {
        Self {
            ate_food: false,
            outcome: None,
        }
    }

    /// Whether the game has terminated
    pub fn terminated(&self) -> bool {
        self.outcome.is_some()
    }
}

/// The game engine that handles all board logic
pub struct GameEngine<R = StdRng> {
    config: GameConfig,
    rng: R,
}

impl GameEngine<StdRng> {
    /// Create a new game engine with the given configuration
    pub fn new(config: GameConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }
}

impl<R: Rng> GameEngine<R> {
    pub fn with_rng(config: GameConfig, rng: R) -> Self {
        Self { config, rng }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Reset the board: a single stationary cell at the centre and fresh food
    pub fn reset(&mut self) -> GameState {
        let center_x = (self.config.grid_width / 2) as i32;
        let center_y = (self.config.grid_height / 2) as i32;

        let snake = Snake::new(Position::new(center_x, center_y));
        let food = self.spawn_food(&snake);

        GameState::new(snake, food, self.config.grid_width, self.config.grid_height)
    }

    /// Execute one step of the game using the snake's current heading
    pub fn step(&mut self, state: &mut GameState) -> StepResult {
        if state.snake.heading.is_none() {
            return StepResult::idle();
        }

        let new_head = state.snake.next_head();

        if let Some(collision_type) = self.check_collision(state, new_head) {
            return StepResult {
                ate_food: false,
                outcome: Some(GameOutcome::Collision(collision_type)),
            };
        }

        let ate_food = state.food == Some(new_head);
        state.snake.advance(new_head, ate_food);
        state.steps += 1;

        let mut outcome = None;
        if ate_food {
            state.score += FOOD_SCORE;
            state.food = self.spawn_food(&state.snake);
            if state.food.is_none() {
                outcome = Some(GameOutcome::BoardFilled);
            }
        }

        StepResult { ate_food, outcome }
    }

    /// Check if the new head position causes a collision. Bounds come first.
    fn check_collision(&self, state: &GameState, pos: Position) -> Option<CollisionType> {
        if !state.is_in_bounds(pos) {
            return Some(CollisionType::Wall);
        }

        // The tail still counts: it only moves after the head is placed
        if state.is_occupied_by_snake(pos) {
            return Some(CollisionType::SelfCollision);
        }

        None
    }

    /// Pick a random free cell for the food, or `None` if the snake covers
    /// the whole grid.
    ///
    /// Uniform rejection sampling is tried first, bounded by the number of
    /// cells; when every draw hits the snake the free cells are scanned and
    /// one is chosen uniformly.
    pub fn spawn_food(&mut self, snake: &Snake) -> Option<Position> {
        let (width, height) = (self.config.grid_width, self.config.grid_height);

        for _ in 0..self.config.cell_count() {
            let x = self.rng.gen_range(0..width) as i32;
            let y = self.rng.gen_range(0..height) as i32;
            let pos = Position::new(x, y);

            if !snake.occupies(pos) {
                return Some(pos);
            }
        }

        (0..height as i32)
            .flat_map(|y| (0..width as i32).map(move |x| Position::new(x, y)))
            .filter(|pos| !snake.occupies(*pos))
            .choose(&mut self.rng)
    }
}
