use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction as LayoutDirection, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use crate::game::{CollisionType, GameOutcome, GameSession, GameState, GameStatus, Position};
use crate::storage::HighScoreStore;

/// What occupies a grid cell, as far as drawing is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Head,
    Body,
    Food,
    Empty,
}

pub fn cell_kind(state: &GameState, pos: Position) -> CellKind {
    if pos == state.snake.head() {
        CellKind::Head
    } else if state.snake.occupies(pos) {
        CellKind::Body
    } else if state.food == Some(pos) {
        CellKind::Food
    } else {
        CellKind::Empty
    }
}

fn cell_span(kind: CellKind) -> Span<'static> {
    match kind {
        CellKind::Head => Span::styled(
            "■ ",
            Style::default()
                .fg(Color::LightGreen)
                .add_modifier(Modifier::BOLD),
        ),
        CellKind::Body => Span::styled("□ ", Style::default().fg(Color::Green)),
        CellKind::Food => Span::styled(
            "● ",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        CellKind::Empty => Span::styled(". ", Style::default().fg(Color::DarkGray)),
    }
}

pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    /// Draw the whole screen. Reads the session, never changes it.
    pub fn render<S: HighScoreStore>(&self, frame: &mut Frame, session: &GameSession<S>) {
        let chunks = Layout::default()
            .direction(LayoutDirection::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Game area
                Constraint::Length(1), // Status line
                Constraint::Length(3), // Footer
            ])
            .split(frame.area());

        frame.render_widget(self.render_stats(session), chunks[0]);

        // Center the game grid horizontally
        let game_area = Layout::default()
            .direction(LayoutDirection::Horizontal)
            .constraints([
                Constraint::Percentage(10),
                Constraint::Percentage(80),
                Constraint::Percentage(10),
            ])
            .split(chunks[1])[1];

        let state = session.state();
        // Two columns per cell plus the border on each side
        let need_width = state.grid_width * 2 + 2;
        let need_height = state.grid_height + 2;

        if session.status() == GameStatus::Over {
            frame.render_widget(self.render_game_over(session), game_area);
        } else if usize::from(game_area.width) < need_width
            || usize::from(game_area.height) < need_height
        {
            frame.render_widget(self.render_too_small(need_width, need_height), game_area);
        } else {
            frame.render_widget(self.render_grid(session), game_area);
        }

        frame.render_widget(self.render_status(session), chunks[2]);
        frame.render_widget(self.render_controls(), chunks[3]);
    }

    fn render_grid<S: HighScoreStore>(&self, session: &GameSession<S>) -> Paragraph<'static> {
        let state = session.state();
        let mut lines = Vec::with_capacity(state.grid_height);

        for y in 0..state.grid_height {
            let spans: Vec<Span> = (0..state.grid_width)
                .map(|x| cell_span(cell_kind(state, Position::new(x as i32, y as i32))))
                .collect();
            lines.push(Line::from(spans));
        }

        let (border_color, title) = match session.status() {
            GameStatus::Paused => (
                Color::Yellow,
                format!(" Snake - {} - Paused ", session.difficulty().label()),
            ),
            _ => (
                Color::White,
                format!(" Snake - {} ", session.difficulty().label()),
            ),
        };

        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Double)
                    .border_style(Style::default().fg(border_color))
                    .title(title),
            )
            .alignment(Alignment::Center)
    }

    fn render_too_small(&self, need_width: usize, need_height: usize) -> Paragraph<'static> {
        let text = vec![
            Line::from(Span::styled(
                "Terminal too small",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                format!("The grid needs {}x{}, resize to play", need_width, need_height),
                Style::default().fg(Color::Gray),
            )),
        ];

        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        )
    }

    fn render_stats<S: HighScoreStore>(&self, session: &GameSession<S>) -> Paragraph<'static> {
        let score_style = if session.score_flash_active() {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD)
        };

        let text = vec![Line::from(vec![
            Span::styled("Score: ", Style::default().fg(Color::Yellow)),
            Span::styled(session.score().to_string(), score_style),
            Span::raw("    "),
            Span::styled("High Score: ", Style::default().fg(Color::Yellow)),
            Span::styled(
                session.high_score().to_string(),
                Style::default().fg(Color::White),
            ),
            Span::raw("    "),
            Span::styled("Steps: ", Style::default().fg(Color::Yellow)),
            Span::styled(
                session.state().steps.to_string(),
                Style::default().fg(Color::White),
            ),
        ])];

        Paragraph::new(text).alignment(Alignment::Center)
    }

    fn render_status<S: HighScoreStore>(&self, session: &GameSession<S>) -> Paragraph<'static> {
        Paragraph::new(Line::from(Span::styled(
            session.status_text(),
            Style::default().fg(Color::Cyan),
        )))
        .alignment(Alignment::Center)
    }

    fn render_game_over<S: HighScoreStore>(&self, session: &GameSession<S>) -> Paragraph<'static> {
        let (headline, reason) = match session.outcome() {
            Some(GameOutcome::BoardFilled) => ("YOU WIN", "The snake fills the board"),
            Some(GameOutcome::Collision(CollisionType::SelfCollision)) => {
                ("GAME OVER", "You ran into yourself")
            }
            _ => ("GAME OVER", "You hit the wall"),
        };

        let text = vec![
            Line::from(""),
            Line::from(vec![Span::styled(
                headline,
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )]),
            Line::from(Span::styled(reason, Style::default().fg(Color::Gray))),
            Line::from(""),
            Line::from(vec![
                Span::styled("Final Score: ", Style::default().fg(Color::Yellow)),
                Span::styled(
                    session.score().to_string(),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Press ", Style::default().fg(Color::Gray)),
                Span::styled(
                    "Space",
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(" to play again or ", Style::default().fg(Color::Gray)),
                Span::styled(
                    "Q",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                ),
                Span::styled(" to quit", Style::default().fg(Color::Gray)),
            ]),
        ];

        let border_style = if session.crash_flash_active() {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Red)
        };

        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style),
        )
    }

    fn render_controls(&self) -> Paragraph<'static> {
        let text = vec![Line::from(vec![
            Span::styled("↑↓←→", Style::default().fg(Color::Cyan)),
            Span::raw(" or "),
            Span::styled("WASD", Style::default().fg(Color::Cyan)),
            Span::raw(" to move | "),
            Span::styled("Space", Style::default().fg(Color::Cyan)),
            Span::raw(" start/pause | "),
            Span::styled("R", Style::default().fg(Color::Cyan)),
            Span::raw(" restart | "),
            Span::styled("1-4", Style::default().fg(Color::Cyan)),
            Span::raw(" difficulty | "),
            Span::styled("Q", Style::default().fg(Color::Red)),
            Span::raw(" to quit"),
        ])];

        Paragraph::new(text).alignment(Alignment::Center)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Direction, GameConfig, GameEngine, Snake};
    use crate::storage::MemoryStore;
    use rand::{SeedableRng, rngs::StdRng};
    use ratatui::{Terminal, backend::TestBackend};

    fn session() -> GameSession<MemoryStore> {
        let engine = GameEngine::with_rng(GameConfig::default(), StdRng::seed_from_u64(3));
        GameSession::with_engine(engine, MemoryStore::with_value(70))
    }

    fn screen_text(session: &GameSession<MemoryStore>) -> String {
        screen_text_sized(session, 100, 32)
    }

    fn screen_text_sized(session: &GameSession<MemoryStore>, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal
            .draw(|frame| Renderer::new().render(frame, session))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_cell_kinds_are_distinct() {
        let state = GameState::new(
            Snake::from_segments(
                vec![Position::new(3, 3), Position::new(2, 3)],
                Some(Direction::Right),
            ),
            Some(Position::new(7, 7)),
            10,
            10,
        );

        assert_eq!(cell_kind(&state, Position::new(3, 3)), CellKind::Head);
        assert_eq!(cell_kind(&state, Position::new(2, 3)), CellKind::Body);
        assert_eq!(cell_kind(&state, Position::new(7, 7)), CellKind::Food);
        assert_eq!(cell_kind(&state, Position::new(0, 0)), CellKind::Empty);

        let glyphs: Vec<_> = [
            CellKind::Head,
            CellKind::Body,
            CellKind::Food,
            CellKind::Empty,
        ]
        .into_iter()
        .map(|kind| cell_span(kind).content.into_owned())
        .collect();
        for (i, a) in glyphs.iter().enumerate() {
            for b in &glyphs[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_screen() {
        let text = screen_text(&session());

        assert!(text.contains("Score: 0"));
        assert!(text.contains("High Score: 70"));
        assert!(text.contains("Press Space to start"));
        assert!(text.contains("Snake - Medium"));
        assert_eq!(text.matches('■').count(), 1);
        assert_eq!(text.matches('●').count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_paused_screen() {
        let mut session = session();
        session.start_game();
        session.toggle_pause();

        let text = screen_text(&session);

        assert!(text.contains("Paused - Difficulty: Medium"));
        assert!(text.contains("Snake - Medium - Paused"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_game_over_screen() {
        let mut session = session();
        session.start_game();
        for _ in 0..20 {
            session.next_tick().await;
            session.on_tick();
            if session.status() == GameStatus::Over {
                break;
            }
        }
        assert_eq!(session.status(), GameStatus::Over);

        let text = screen_text(&session);

        assert!(text.contains("GAME OVER"));
        assert!(text.contains("You hit the wall"));
        assert!(text.contains("Game over! Press Space to play again"));
        assert!(!text.contains('■'));
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_terminal_shows_notice() {
        let mut session = session();

        // 24 rows leave 17 for the board, the 20x20 grid needs 22
        let text = screen_text_sized(&session, 100, 24);
        assert!(text.contains("Terminal too small"));
        assert!(text.contains("The grid needs 42x22"));
        assert!(!text.contains('■'));
        assert!(text.contains("Press Space to start"));

        session.start_game();
        session.toggle_pause();
        let text = screen_text_sized(&session, 100, 24);
        assert!(text.contains("Terminal too small"));

        let text = screen_text(&session);
        assert!(!text.contains("Terminal too small"));
        assert_eq!(text.matches('■').count(), 1);
    }
}
