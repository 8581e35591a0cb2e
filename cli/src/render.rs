use std::fmt::Write;

use mathtiles_core::*;

const CELL_WIDTH: usize = 16;

/// Text shown in a tile's cell of the board.
pub fn tile_label(tile: &TileController) -> String {
    match tile.state() {
        TileState::Covered if tile.is_highlighted() => ">> ? <<".to_string(),
        TileState::Covered => "?".to_string(),
        TileState::Open(ProblemState::Normal) => {
            format!("{} {}", tile.problem(), tile.answer_text())
        }
        TileState::Open(_) => {
            let feedback = tile.feedback().map(|f| f.to_string()).unwrap_or_default();
            format!("{} {}", tile.answer_text(), feedback)
        }
        TileState::Revealed => {
            let Segment { column, row, .. } = tile.segment();
            format!("[img {column},{row}]")
        }
    }
}

pub fn board<C: Clock>(session: &GameSession<C>) -> String {
    let size = session.grid_size();
    let mut out = String::new();

    let _ = write!(out, "   ");
    for x in 0..size {
        let _ = write!(out, "{:^width$}", x, width = CELL_WIDTH);
    }
    out.push('\n');

    for y in 0..size {
        let _ = write!(out, "{y:>2} ");
        for x in 0..size {
            let label = session
                .tile((x, y))
                .map(tile_label)
                .unwrap_or_default();
            let _ = write!(out, "{:^width$}", label, width = CELL_WIDTH);
        }
        out.push('\n');
    }

    if let Some(id) = session.active_tile() {
        if let Ok(tile) = session.tile(id) {
            let _ = write!(
                out,
                "tile {},{}: {} {}  (try {} of {})",
                id.0,
                id.1,
                tile.problem(),
                tile.answer_text(),
                tile.tries() + 1,
                tile.max_tries()
            );
            out.push('\n');
        }
    }
    out
}
