use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, info, trace};

use crate::error::GameError;
use crate::snake::{Direction, Snake, Vector};

/// How long a status message stays on screen.
pub const MESSAGE_DURATION: Duration = Duration::from_secs(3);

const WALL_MSG: &str = "You ran into a wall!";
const SELF_MSG: &str = "You ran into yourself!";
const FULL_MSG: &str = "You filled the board!";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Board {
    width: i32,
    height: i32,
}

impl Board {
    pub fn new(width: i32, height: i32) -> Result<Self, GameError> {
        if width < 1 || height < 1 {
            return Err(GameError::InvalidBoard { width, height });
        }
        Ok(Board { width, height })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn center(&self) -> Vector {
        Vector::new(self.width / 2, self.height / 2)
    }

    pub fn contains(&self, pos: Vector) -> bool {
        (0..self.width).contains(&pos.x) && (0..self.height).contains(&pos.y)
    }

    /// Folds a position that stepped off one edge back in from the opposite edge.
    pub fn wrap(&self, pos: Vector) -> Vector {
        Vector::new(pos.x.rem_euclid(self.width), pos.y.rem_euclid(self.height))
    }

    fn cells(&self) -> impl Iterator<Item = Vector> + '_ {
        (0..self.width).flat_map(move |x| (0..self.height).map(move |y| Vector::new(x, y)))
    }
}

#[derive(Clone, Debug)]
struct StatusMessage {
    text: String,
    expires_at: Instant,
}

/// Read-only view of the game handed to the renderer.
#[derive(Debug)]
pub struct Snapshot<'a> {
    pub board: Board,
    pub body: &'a [Vector],
    pub head_char: char,
    pub fruits: &'a [Vector],
    pub paused: bool,
    pub dead: bool,
    pub board_full: bool,
    pub loop_walls: bool,
    pub message: Option<&'a str>,
    pub score: usize,
}

#[derive(Debug)]
pub struct GameState {
    snake: Snake,
    fruits: Vec<Vector>,
    board: Board,
    loop_walls: bool,
    paused: bool,
    board_full: bool,
    message: Option<StatusMessage>,
    rng: StdRng,
}

impl GameState {
    pub fn new(board: Board, rng: StdRng) -> Self {
        let mut game = GameState {
            snake: Snake::new(board.center()),
            fruits: vec![],
            board,
            loop_walls: false,
            paused: false,
            board_full: false,
            message: None,
            rng,
        };
        game.place_initial_fruit();
        game
    }

    pub fn with_seed(width: i32, height: i32, seed: u64) -> Result<Self, GameError> {
        Ok(GameState::new(Board::new(width, height)?, StdRng::seed_from_u64(seed)))
    }

    pub fn from_entropy(width: i32, height: i32) -> Result<Self, GameError> {
        Ok(GameState::new(Board::new(width, height)?, StdRng::from_entropy()))
    }

    /// Starts over on a `width`x`height` board. The pause flag is kept as is.
    /// On invalid extents nothing changes.
    pub fn reset(&mut self, width: i32, height: i32) -> Result<(), GameError> {
        let board = Board::new(width, height)?;

        self.board = board;
        self.snake = Snake::new(board.center());
        self.board_full = false;
        self.message = None;
        self.place_initial_fruit();

        debug!(width, height, "game reset");
        Ok(())
    }

    fn place_initial_fruit(&mut self) {
        self.fruits.clear();
        if let Some(fruit) = self.random_empty_cell() {
            self.fruits.push(fruit);
        }
    }

    /// Advances the game by one step. Does nothing while paused or over.
    pub fn tick(&mut self) {
        if self.paused || self.snake.is_dead() || self.board_full {
            return;
        }

        let mut head = self.snake.advance();

        if self.loop_walls {
            head = self.board.wrap(head);
            self.snake.set_head(head);
        } else if !self.board.contains(head) {
            self.snake.kill();
            self.show_message(WALL_MSG);
            info!(x = head.x, y = head.y, "snake hit a wall");
        }

        // Checked after the wall so its message wins when both apply.
        if self.snake.bites_itself() {
            self.snake.kill();
            self.show_message(SELF_MSG);
            info!(x = head.x, y = head.y, "snake hit itself");
        }

        let mut ate = false;
        let mut i = 0;
        while i < self.fruits.len() {
            if self.fruits[i] != head {
                i += 1;
                continue;
            }

            ate = true;
            match self.random_empty_cell() {
                Some(pos) => {
                    self.fruits[i] = pos;
                    i += 1;
                }
                None => {
                    self.fruits.remove(i);
                }
            }
            self.snake.grow();
            debug!(len = self.snake.len(), "fruit eaten");
        }

        if ate && self.fruits.is_empty() {
            self.board_full = true;
            self.show_message(FULL_MSG);
            info!(len = self.snake.len(), "board filled");
        }

        trace!(x = head.x, y = head.y, "tick");
    }

    /// A uniformly chosen cell free of both snake and fruit, or `None` when
    /// the board is full.
    pub fn random_empty_cell(&mut self) -> Option<Vector> {
        let occupied = |pos: &Vector| self.snake.body().contains(pos) || self.fruits.contains(pos);
        let choices: Vec<Vector> = self.board.cells().filter(|pos| !occupied(pos)).collect();
        choices.choose(&mut self.rng).copied()
    }

    pub fn show_message(&mut self, text: &str) {
        self.show_message_at(text, Instant::now());
    }

    pub(crate) fn show_message_at(&mut self, text: &str, now: Instant) {
        self.message = Some(StatusMessage { text: text.to_string(), expires_at: now + MESSAGE_DURATION });
    }

    /// The status message, if it has not expired by `now`.
    pub fn message(&self, now: Instant) -> Option<&str> {
        self.message.as_ref()
            .filter(|msg| now < msg.expires_at)
            .map(|msg| msg.text.as_str())
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// Flips wrap mode and returns the new value.
    pub fn toggle_loop(&mut self) -> bool {
        self.loop_walls = !self.loop_walls;
        self.loop_walls
    }

    pub fn set_loop_walls(&mut self, loop_walls: bool) {
        self.loop_walls = loop_walls;
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    /// Stores the turn for the next tick. Accepted in any state.
    pub fn change_direction(&mut self, direction: Direction) {
        self.snake.change_direction(direction);
    }

    pub fn fruits(&self) -> &[Vector] {
        &self.fruits
    }

    pub fn board(&self) -> Board {
        self.board
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_dead(&self) -> bool {
        self.snake.is_dead()
    }

    pub fn is_board_full(&self) -> bool {
        self.board_full
    }

    pub fn loop_walls(&self) -> bool {
        self.loop_walls
    }

    pub fn snapshot(&self, now: Instant) -> Snapshot<'_> {
        Snapshot {
            board: self.board,
            body: self.snake.body(),
            head_char: self.snake.head_char(),
            fruits: &self.fruits,
            paused: self.paused,
            dead: self.snake.is_dead(),
            board_full: self.board_full,
            loop_walls: self.loop_walls,
            message: self.message(now),
            score: self.snake.len() - 1,
        }
    }

    #[cfg(test)]
    pub(crate) fn place(&mut self, snake: Snake, fruits: Vec<Vector>) {
        self.snake = snake;
        self.fruits = fruits;
    }
}
