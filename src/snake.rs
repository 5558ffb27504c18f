use std::ops::Add;

use Direction::*;

/// A cell position or a step on the board.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct Vector {
    pub x: i32,
    pub y: i32,
}

impl Vector {
    pub const fn new(x: i32, y: i32) -> Self {
        Vector { x, y }
    }

    pub fn add(self, other: Vector) -> Vector {
        Vector::new(self.x + other.x, self.y + other.y)
    }
}

impl Add for Vector {
    type Output = Vector;

    fn add(self, other: Vector) -> Vector {
        Vector::add(self, other)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right
}

impl Direction {
    pub fn as_vector(self) -> Vector {
        match self {
            Up => Vector::new(0, -1),
            Down => Vector::new(0, 1),
            Left => Vector::new(-1, 0),
            Right => Vector::new(1, 0),
        }
    }
}

/// The player. `body[0]` is the head, the rest follows head-to-tail.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snake {
    body: Vec<Vector>,
    direction: Direction,
    dead: bool,
}

impl Snake {
    /// A single-segment snake at `pos`, facing up.
    pub fn new(pos: Vector) -> Self {
        Snake { body: vec![pos], direction: Up, dead: false }
    }

    pub fn body(&self) -> &[Vector] {
        &self.body
    }

    pub fn head(&self) -> Vector {
        self.body[0]
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    pub(crate) fn kill(&mut self) {
        self.dead = true;
    }

    /// Turns the snake, unless the turn would put the head straight back
    /// onto the second segment.
    pub fn change_direction(&mut self, new_direction: Direction) {
        if self.body.len() > 1 && self.head() + new_direction.as_vector() == self.body[1] {
            return;
        }

        self.direction = new_direction;
    }

    /// Pushes a new head one step ahead and drops the tail. Returns the new head.
    pub(crate) fn advance(&mut self) -> Vector {
        let new_head = self.head() + self.direction.as_vector();
        self.body.pop();
        self.body.insert(0, new_head);
        new_head
    }

    pub(crate) fn set_head(&mut self, pos: Vector) {
        self.body[0] = pos;
    }

    /// True when the head sits on any other segment.
    pub(crate) fn bites_itself(&self) -> bool {
        let head = self.head();
        self.body[1..].contains(&head)
    }

    /// Appends a copy of the last segment so the tail stays put for one step.
    pub(crate) fn grow(&mut self) {
        let tail = self.body[self.body.len() - 1];
        self.body.push(tail);
    }

    pub fn head_char(&self) -> char {
        match self.direction {
            Up => '^',
            Down => 'v',
            Left => '<',
            Right => '>',
        }
    }

    #[cfg(test)]
    pub(crate) fn from_parts(body: Vec<Vector>, direction: Direction) -> Self {
        assert!(!body.is_empty());
        Snake { body, direction, dead: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: i32, y: i32) -> Vector {
        Vector::new(x, y)
    }

    #[test]
    fn vectors_add_componentwise() {
        assert_eq!(v(3, -2).add(v(-1, 5)), v(2, 3));
        assert_eq!(v(0, 0) + Left.as_vector(), v(-1, 0));
    }

    #[test]
    fn new_snake_is_one_segment_facing_up() {
        let snake = Snake::new(v(4, 4));
        assert_eq!(snake.body(), &[v(4, 4)]);
        assert_eq!(snake.direction(), Up);
        assert!(!snake.is_dead());
    }

    #[test]
    fn reversal_is_ignored_when_it_would_hit_the_neck() {
        let mut snake = Snake::from_parts(vec![v(5, 4), v(5, 5)], Up);
        snake.change_direction(Down);
        assert_eq!(snake.direction(), Up);

        snake.change_direction(Left);
        assert_eq!(snake.direction(), Left);
    }

    #[test]
    fn single_segment_snake_may_reverse() {
        let mut snake = Snake::new(v(1, 1));
        snake.change_direction(Down);
        assert_eq!(snake.direction(), Down);
    }

    #[test]
    fn advance_shifts_the_body() {
        let mut snake = Snake::from_parts(vec![v(2, 2), v(2, 3), v(2, 4)], Right);
        assert_eq!(snake.advance(), v(3, 2));
        assert_eq!(snake.body(), &[v(3, 2), v(2, 2), v(2, 3)]);
    }

    #[test]
    fn grow_duplicates_the_tail() {
        let mut snake = Snake::from_parts(vec![v(2, 2), v(2, 3)], Up);
        snake.grow();
        assert_eq!(snake.body(), &[v(2, 2), v(2, 3), v(2, 3)]);
    }
}
