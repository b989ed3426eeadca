use crate::config::PrintConfig;
use crate::error::{Error, ErrorAccumulator, Result};
use crate::flow::{Border, Cell, Diagram, Glyph};
use crate::layout::PageLayout;
use crate::log;
use shakmaty::Piece;

/// One expanded square of a rank.
pub type Square = Option<Piece>;

/// Colors, sizes and glyph paths used to draw a diagram.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardStyle {
    pub light_tile_color: String,
    pub dark_tile_color: String,
    pub piece_images: String,
    pub tile_size: f32,
    pub glyph_size: f32,
}

impl BoardStyle {
    pub fn new(config: &PrintConfig, layout: &PageLayout) -> Self {
        Self {
            light_tile_color: config.light_tile_color.clone(),
            dark_tile_color: config.dark_tile_color.clone(),
            piece_images: config.piece_images.clone(),
            tile_size: layout.tile_length,
            glyph_size: layout.glyph_size,
        }
    }

    /// Even `rank + file` is a light tile; `(0, 0)` is a8.
    pub fn tile_color(&self, rank: usize, file: usize) -> &str {
        if (rank + file).is_multiple_of(2) {
            &self.light_tile_color
        } else {
            &self.dark_tile_color
        }
    }

    pub fn glyph(&self, piece: Piece) -> Glyph {
        let name = format!("{}{}", piece.color.char(), piece.role.char());
        Glyph {
            piece: piece.char(),
            image: self.piece_images.replace("{piece}", &name),
        }
    }
}

/// Strict expansion of one rank of piece placement into 8 squares.
pub fn expand_rank(rank_index: usize, rank: &str) -> Result<[Square; 8]> {
    let invalid = |reason: String| Error::InvalidRank {
        rank_index,
        rank: rank.to_string(),
        reason,
    };

    let mut squares = Vec::with_capacity(8);
    for tile in rank.chars() {
        if let Some(empty) = tile.to_digit(10) {
            squares.extend((0..empty).map(|_| None));
        } else if let Some(piece) = Piece::from_char(tile) {
            squares.push(Some(piece));
        } else {
            return Err(invalid(format!("'{tile}' is not a valid tile")));
        }
    }

    let count = squares.len();
    squares
        .try_into()
        .map_err(|_| invalid(format!("expands to {count} squares instead of 8")))
}

/// Renders the piece placement of `position` as a diagram.
///
/// Everything after the first space is ignored. Malformed input does not
/// fail: unknown characters are skipped, short ranks are padded with empty
/// squares and long ones truncated. Each problem is logged and collected in
/// `Diagram::diagnostics`.
pub fn render(position: &str, style: &BoardStyle) -> Diagram {
    let placement = position.split(' ').next().unwrap_or_default();
    let mut diagnostics = ErrorAccumulator::default();

    let ranks: Vec<&str> = placement.split('/').collect();
    if ranks.len() != 8 {
        report(
            &mut diagnostics,
            format!("'{placement}' has {} ranks instead of 8", ranks.len()),
        );
    }

    let cells = std::array::from_fn(|rank_index| {
        let rank = ranks.get(rank_index).copied().unwrap_or_default();
        let squares = lenient_rank(rank_index, rank, &mut diagnostics);
        std::array::from_fn(|file| Cell {
            color: style.tile_color(rank_index, file).to_string(),
            glyph: squares[file].map(|piece| style.glyph(piece)),
        })
    });

    Diagram {
        position: placement.to_string(),
        cells,
        tile_size: style.tile_size,
        glyph_size: style.glyph_size,
        border: Border::default(),
        keep_together: true,
        diagnostics: diagnostics.take(),
    }
}

fn lenient_rank(rank_index: usize, rank: &str, diagnostics: &mut ErrorAccumulator) -> [Square; 8] {
    let mut squares: Vec<Square> = Vec::with_capacity(8);
    for tile in rank.chars() {
        if let Some(empty) = tile.to_digit(10) {
            squares.extend((0..empty).map(|_| None));
        } else if let Some(piece) = Piece::from_char(tile) {
            squares.push(Some(piece));
        } else {
            report(
                diagnostics,
                format!("'{tile}' is not valid in rank {rank_index} '{rank}'"),
            );
        }
    }

    if squares.len() != 8 {
        report(
            diagnostics,
            format!(
                "Rank {rank_index} '{rank}' expands to {} squares instead of 8",
                squares.len()
            ),
        );
    }
    squares.resize(8, None);

    let mut expanded = [None; 8];
    expanded.copy_from_slice(&squares);
    expanded
}

fn report(diagnostics: &mut ErrorAccumulator, msg: String) {
    log::warn(&msg);
    diagnostics.push(&msg);
}
