use std::time::Duration;

use crate::apple::Apple;
use crate::config::*;
use crate::snake::{Snake, Direction, MoveResult::*};
use crate::term::Surface;

use crossterm::Result;
use crossterm::event::{KeyEvent, KeyModifiers, KeyCode};
use log::{debug, info, warn};
use rand::Rng;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EndReason {
    Collided,
    Quit
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Outcome {
    pub score: u32,
    pub reason: EndReason,
}

/// State of a single playthrough, owned by the loop.
pub struct Round {
    snake: Snake,
    apples: Vec<Apple>,
    score: u32,
    interval: Duration,
}

impl Round {
    pub fn new(snake: Snake, apples: Vec<Apple>) -> Self {
        let interval = frame_interval(snake.direction());
        Round { snake, apples, score: 0, interval }
    }
}

pub struct SnakeGame<S, R> {
    surface: S,
    rng: R,
    apple_count: usize,
}

impl<S: Surface, R: Rng> SnakeGame<S, R> {
    pub fn new(surface: S, rng: R, apple_count: usize) -> Self {
        SnakeGame { surface, rng, apple_count: apple_count.min(MAX_APPLES) }
    }

    pub fn run(&mut self) -> Result<Outcome> {
        self.surface.clear()?;

        let bounds = self.surface.dimensions();
        info!("Starting game on a {}x{} grid with {} apples", bounds.0, bounds.1, self.apple_count);

        let mut apples = Vec::new();
        for _ in 0..self.apple_count {
            let apple = Apple::new(bounds, &mut self.rng);
            self.surface.write_char(apple.position(), APPLE_CHAR, APPLE_COLOR)?;
            apples.push(apple);
        }
        self.surface.flush()?;

        let snake = Snake::new(START_COORDS, START_DIRECTION);
        self.play(Round::new(snake, apples))
    }

    pub fn play(&mut self, mut round: Round) -> Result<Outcome> {
        loop {
            if let Some(reason) = self.tick(&mut round)? {
                info!("Game ended ({:?}) with score {}", reason, round.score);
                return Ok(Outcome { score: round.score, reason });
            }
        }
    }

    /// Runs one step of the game. Returns the reason the game ended, if it did.
    pub fn tick(&mut self, round: &mut Round) -> Result<Option<EndReason>> {
        let bounds = self.surface.dimensions();

        match round.snake.advance(bounds) {
            Collided => return Ok(Some(EndReason::Collided)),
            Moved { new_head, old_tail } => {
                self.surface.write_char(new_head, SNAKE_CHAR, SNAKE_COLOR)?;
                self.surface.write_char(old_tail, ' ', BLANK_COLOR)?;
                self.surface.flush()?;
            }
        }

        self.surface.wait(round.interval);

        if self.surface.key_available()? {
            let key = self.surface.read_key()?;
            if is_quit(&key) {
                return Ok(Some(EndReason::Quit));
            }
            if let Some(dir) = Direction::from_key(key.code) {
                round.snake.set_direction(dir);
            }
        }

        // Only the first apple under the head is eaten, any others on the same
        // cell wait for a later tick
        let snake = &mut round.snake;
        if let Some(apple) = round.apples.iter_mut().find(|a| snake.head_touches(a.position())) {
            round.score += 1;
            debug!("Apple eaten at {:?}, score {}, length {}", apple.position(), round.score, snake.len() + 1);

            match apple.relocate(&snake.occupied_cells(), bounds, &mut self.rng) {
                Some(pos) => self.surface.write_char(pos, APPLE_CHAR, APPLE_COLOR)?,
                None => warn!("No free cell left for the apple at {:?}", apple.position()),
            }

            let tail = snake.grow();
            self.surface.write_char(tail, SNAKE_CHAR, SNAKE_COLOR)?;
            self.surface.write_str((0, 0), &format!("Score: {}", round.score), SCORE_COLOR)?;
            self.surface.flush()?;
        }

        round.interval = frame_interval(round.snake.direction());
        Ok(None)
    }

    pub fn game_over(&mut self, score: u32) -> Result<()> {
        self.surface.write_str((0, 0), &format!("Score: {}. Game Over", score), GAME_OVER_COLOR)?;
        self.surface.flush()?;

        self.surface.wait(GAME_OVER_PAUSE);

        self.surface.write_str((0, 1), "Press enter to exit", SCORE_COLOR)?;
        self.surface.flush()?;

        loop {
            let key = self.surface.read_key()?;
            if key.code == KeyCode::Enter || is_quit(&key) {
                break;
            }
        }

        self.surface.clear()
    }
}

fn is_quit(ev: &KeyEvent) -> bool {
    matches!(ev, KeyEvent { code: KeyCode::Char('c'), modifiers: KeyModifiers::CONTROL })
        || ev.code == KeyCode::Esc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snake::{Direction::*, Point};
    use crate::{Coords, Size};
    use crossterm::style::Color;
    use rand::{rngs::StdRng, SeedableRng};
    use std::collections::{HashMap, VecDeque};
    use std::io;

    struct FakeSurface {
        size: Size,
        cells: HashMap<Coords, (char, Color)>,
        keys: VecDeque<KeyEvent>,
        waits: Vec<Duration>,
        clears: usize,
    }

    impl FakeSurface {
        fn new(size: Size) -> Self {
            FakeSurface { size, cells: HashMap::new(), keys: VecDeque::new(), waits: vec![], clears: 0 }
        }

        fn char_at(&self, pos: Coords) -> char {
            self.cells.get(&pos).map(|c| c.0).unwrap_or(' ')
        }

        fn row(&self, y: i32) -> String {
            (0..self.size.0 as i32).map(|x| self.char_at((x, y))).collect::<String>().trim_end().to_string()
        }
    }

    impl Surface for FakeSurface {
        fn dimensions(&self) -> Size {
            self.size
        }

        fn write_char(&mut self, pos: Coords, ch: char, color: Color) -> Result<()> {
            if pos.0 >= 0 && pos.1 >= 0 && pos.0 < self.size.0 as i32 && pos.1 < self.size.1 as i32 {
                self.cells.insert(pos, (ch, color));
            }
            Ok(())
        }

        fn clear(&mut self) -> Result<()> {
            self.cells.clear();
            self.clears += 1;
            Ok(())
        }

        fn flush(&mut self) -> Result<()> {
            Ok(())
        }

        fn key_available(&mut self) -> Result<bool> {
            Ok(!self.keys.is_empty())
        }

        fn read_key(&mut self) -> Result<KeyEvent> {
            match self.keys.pop_front() {
                Some(key) => Ok(key),
                None => Err(io::Error::new(io::ErrorKind::UnexpectedEof, "out of keys").into()),
            }
        }

        fn wait(&mut self, duration: Duration) {
            self.waits.push(duration);
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent { code, modifiers: KeyModifiers::NONE }
    }

    fn game(apple_count: usize) -> SnakeGame<FakeSurface, StdRng> {
        SnakeGame::new(FakeSurface::new((20, 10)), StdRng::seed_from_u64(5), apple_count)
    }

    #[test]
    fn test_eating_an_apple() {
        let mut game = game(0);
        let mut round = Round::new(Snake::new((10, 5), Right), vec![Apple::at((11, 5))]);

        assert_eq!(game.tick(&mut round).unwrap(), None);

        assert_eq!(round.score, 1);
        assert_eq!(round.snake.len(), 2);
        assert_eq!(round.snake.head(), (11, 5));

        let apple = round.apples[0].position();
        assert_ne!(apple, (11, 5));
        // The score line and the new tail are drawn after the apple
        if apple.1 != 0 && apple != (10, 5) {
            assert_eq!(game.surface.char_at(apple), APPLE_CHAR);
        }
        assert_eq!(game.surface.char_at((11, 5)), SNAKE_CHAR);
        assert_eq!(game.surface.char_at((10, 5)), SNAKE_CHAR);
        assert_eq!(game.surface.row(0).get(0..8), Some("Score: 1"));
    }

    #[test]
    fn test_stacked_apples_eaten_one_per_tick() {
        let mut game = game(0);
        let apples = vec![Apple::at((11, 5)), Apple::at((11, 5))];
        let mut round = Round::new(Snake::new((10, 5), Right), apples);

        game.tick(&mut round).unwrap();

        assert_eq!(round.score, 1);
        assert_ne!(round.apples[0].position(), (11, 5));
        assert_eq!(round.apples[1].position(), (11, 5));
    }

    #[test]
    fn test_moving_erases_tail() {
        let mut game = game(0);
        let body = vec![
            Point::new((5, 5), Right),
            Point::new((6, 5), Right),
            Point::new((7, 5), Right),
        ];
        let mut round = Round::new(Snake::from_points(body, Right), vec![]);
        for x in 5..8 {
            game.surface.write_char((x, 5), SNAKE_CHAR, SNAKE_COLOR).unwrap();
        }

        game.surface.keys.push_back(key(KeyCode::Left));
        game.tick(&mut round).unwrap();
        game.tick(&mut round).unwrap();

        assert_eq!(round.snake.head(), (9, 5));
        assert_eq!(game.surface.row(5), "       OOO");
        assert_eq!(game.surface.cells[&(6, 5)], (' ', Color::Reset));
        assert_eq!(game.surface.cells[&(9, 5)], (SNAKE_CHAR, SNAKE_COLOR));
    }

    #[test]
    fn test_turning_changes_frame_interval() {
        let mut game = game(0);
        let mut round = Round::new(Snake::new((10, 5), Right), vec![]);

        game.surface.keys.push_back(key(KeyCode::Down));
        game.tick(&mut round).unwrap();
        game.tick(&mut round).unwrap();
        game.surface.keys.push_back(key(KeyCode::Char('a')));
        game.tick(&mut round).unwrap();
        game.tick(&mut round).unwrap();

        let (fast, slow) = (Duration::from_millis(33), Duration::from_millis(66));
        assert_eq!(game.surface.waits, vec![fast, slow, slow, fast]);
        assert_eq!(round.snake.head(), (10, 7));
    }

    #[test]
    fn test_collision_keeps_score() {
        let mut game = game(0);
        let mut round = Round::new(Snake::new((0, 5), Left), vec![]);
        round.score = 3;

        assert_eq!(game.play(round).unwrap(), Outcome { score: 3, reason: EndReason::Collided });
        assert!(game.surface.waits.is_empty());
    }

    #[test]
    fn test_run_until_wall() {
        let mut game = game(0);

        let outcome = game.run().unwrap();

        assert_eq!(outcome, Outcome { score: 0, reason: EndReason::Collided });
        // (10, 5) to (19, 5), then into the wall
        assert_eq!(game.surface.waits.len(), 9);
        assert_eq!(game.surface.char_at((19, 5)), SNAKE_CHAR);
        assert_eq!(game.surface.char_at((18, 5)), ' ');
    }

    #[test]
    fn test_run_places_apples() {
        let mut game = game(4);
        game.surface.keys.push_back(key(KeyCode::Esc));

        let outcome = game.run().unwrap();

        assert_eq!(outcome.reason, EndReason::Quit);
        let apples = game.surface.cells.values().filter(|c| c.0 == APPLE_CHAR).count();
        assert!(apples >= 1 && apples <= 4);
    }

    #[test]
    fn test_huge_apple_count_is_capped() {
        let mut game = SnakeGame::new(FakeSurface::new((20, 10)), StdRng::seed_from_u64(5), usize::MAX);
        assert_eq!(game.apple_count, MAX_APPLES);

        game.surface.keys.push_back(key(KeyCode::Esc));
        assert_eq!(game.run().unwrap().reason, EndReason::Quit);
    }

    #[test]
    fn test_ctrl_c_quits() {
        let mut game = game(0);
        let mut round = Round::new(Snake::new((10, 5), Right), vec![]);
        game.surface.keys.push_back(KeyEvent { code: KeyCode::Char('c'), modifiers: KeyModifiers::CONTROL });

        assert_eq!(game.tick(&mut round).unwrap(), Some(EndReason::Quit));
    }

    #[test]
    fn test_game_over_waits_for_enter() {
        let mut game = game(0);
        game.surface.keys.extend(vec![key(KeyCode::Up), key(KeyCode::Char('x')), key(KeyCode::Enter)]);

        game.game_over(7).unwrap();

        assert!(game.surface.keys.is_empty());
        assert_eq!(game.surface.waits, vec![GAME_OVER_PAUSE]);
        assert_eq!(game.surface.clears, 1);
        assert!(game.surface.cells.is_empty());
    }

    #[test]
    fn test_game_over_message() {
        let mut game = game(0);

        // No keys scripted, so the wait for Enter fails before the clear
        assert!(game.game_over(12).is_err());

        assert_eq!(game.surface.row(0), "Score: 12. Game Over");
        assert_eq!(game.surface.row(1), "Press enter to exit");
        assert_eq!(game.surface.cells[&(0, 0)].1, GAME_OVER_COLOR);
    }
}
