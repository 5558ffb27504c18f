//! Terminal snake: the game engine, input mapping and the loop that drives them.

pub mod driver;
pub mod error;
pub mod game;
pub mod intent;
pub mod snake;
pub mod term;
