#![no_std]

extern crate alloc;

use core::ops::RangeInclusive;
use core::time::Duration;
use serde::{Deserialize, Serialize};

pub use answer::*;
pub use clock::*;
pub use error::*;
pub use event::*;
pub use generator::*;
pub use picture::*;
pub use problem::*;
pub use session::*;
pub use summary::*;
pub use tile::*;
pub use timer::*;
pub use types::*;

mod answer;
mod clock;
mod error;
mod event;
mod generator;
mod picture;
mod problem;
mod session;
mod summary;
mod tile;
mod timer;
mod types;

/// Grid sizes offered to the player, the grid has `size * size` tiles.
pub const GRID_SIZES: RangeInclusive<Coord> = 2..=4;

/// Options of a round, as chosen by the player.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub number_family: u8,
    pub grid_size: Coord,
    pub operators: Operators,
    #[serde(skip)]
    pub picture: Option<Picture>,
}

impl GameConfig {
    pub const fn new_unchecked(number_family: u8, grid_size: Coord, operators: Operators) -> Self {
        Self {
            number_family,
            grid_size,
            operators,
            picture: None,
        }
    }

    pub fn new(number_family: u8, grid_size: Coord, operators: Operators) -> Result<Self> {
        let config = Self::new_unchecked(number_family, grid_size, operators);
        config.validate()?;
        Ok(config)
    }

    pub fn with_picture(mut self, picture: Option<Picture>) -> Self {
        self.picture = picture;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !GRID_SIZES.contains(&self.grid_size) {
            return Err(GameError::InvalidGridSize(self.grid_size));
        }
        if self.number_family > NUMBER_MAX {
            return Err(GameError::InvalidNumberFamily(self.number_family));
        }
        if self.operators.is_empty() {
            return Err(GameError::NoOperators);
        }
        Ok(())
    }

    pub const fn total_tiles(&self) -> TileCount {
        mult(self.grid_size, self.grid_size)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new_unchecked(1, 2, Operators::ADD_SUB)
    }
}

/// Delays of the deferred tile transitions.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileTimings {
    /// How long "Correct!" shows before the image is revealed.
    pub correct_reveal: Duration,
    /// How long "Incorrect" shows before the answer clears.
    pub incorrect_retry: Duration,
    pub caret_blink: Duration,
}

impl Default for TileTimings {
    fn default() -> Self {
        Self {
            correct_reveal: Duration::from_millis(1500),
            incorrect_retry: Duration::from_millis(1000),
            caret_blink: Duration::from_millis(500),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileRules {
    /// Submissions allowed per tile, the last wrong one locks the tile.
    pub max_tries: u8,
    pub timings: TileTimings,
}

impl Default for TileRules {
    fn default() -> Self {
        Self {
            max_tries: 3,
            timings: TileTimings::default(),
        }
    }
}
