use alloc::string::String;
use alloc::sync::Arc;
use serde::{Deserialize, Serialize};

use crate::*;

/// Image hidden under the grid, as handed over by the presentation.
///
/// The core never decodes it; it only tracks which [`Segment`] each tile uncovers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Picture {
    label: String,
    data: Arc<[u8]>,
}

impl Picture {
    pub fn new(label: impl Into<String>, data: impl Into<Arc<[u8]>>) -> Self {
        Self {
            label: label.into(),
            data: data.into(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// The part of the picture under one tile.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub column: Coord,
    pub row: Coord,
    pub grid_size: Coord,
}

impl Segment {
    pub const fn new((column, row): Coord2, grid_size: Coord) -> Self {
        Self {
            column,
            row,
            grid_size,
        }
    }

    /// Pixel rectangle `(x, y, width, height)` of this segment in a `width` by `height` image.
    ///
    /// Edges are rounded down, so adjacent segments tile the image with no gap or overlap.
    pub fn pixel_rect(&self, width: u32, height: u32) -> (u32, u32, u32, u32) {
        let n = u64::from(self.grid_size.max(1));
        let edge = |index: Coord, extent: u32| (u64::from(index) * u64::from(extent) / n) as u32;
        let x0 = edge(self.column, width);
        let y0 = edge(self.row, height);
        let x1 = edge(self.column + 1, width);
        let y1 = edge(self.row + 1, height);
        (x0, y0, x1 - x0, y1 - y0)
    }
}
