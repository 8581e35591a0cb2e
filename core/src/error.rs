use thiserror::Error;

use crate::Coord;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Grid size {0} is not supported, expected 2 to 4")]
    InvalidGridSize(Coord),
    #[error("Number family {0} is out of range, expected 0 to 12")]
    InvalidNumberFamily(u8),
    #[error("At least one operator must be selected")]
    NoOperators,
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Key {0:?} is not a digit")]
    NotADigit(char),
}

pub type Result<T> = core::result::Result<T, GameError>;
