use crate::config::{CM, PrintConfig};
use serde::Serialize;

/// A rectangle in points, origin at the bottom-left of the page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Frame {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Two-column page geometry plus the diagram sizes derived from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageLayout {
    pub page_width: f32,
    pub page_height: f32,
    pub margin: f32,
    pub columns: [Frame; 2],
    pub board_length: f32,
    pub tile_length: f32,
    pub glyph_size: f32,
}

impl PageLayout {
    pub fn two_column(config: &PrintConfig) -> Self {
        let (page_width, page_height) = config.page_size.dimensions();
        let margin = config.page_margin * CM;
        let gap = config.column_gap * CM;

        let content_width = (page_width - 2.0 * margin).max(0.0);
        let content_height = (page_height - 2.0 * margin).max(0.0);
        let column_width = (content_width / 2.0 - gap / 2.0).max(0.0);

        let left = Frame {
            x: margin,
            y: margin,
            width: column_width,
            height: content_height,
        };
        let right = Frame {
            x: margin + column_width + gap,
            ..left
        };

        let board_length = config.board_fraction * column_width;
        let tile_length = board_length / 8.0;

        Self {
            page_width,
            page_height,
            margin,
            columns: [left, right],
            board_length,
            tile_length,
            glyph_size: tile_length * (1.0 - config.tile_padding),
        }
    }

    pub fn column_width(&self) -> f32 {
        self.columns[0].width
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PageSize;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 0.01
    }

    #[test]
    fn test_two_column_a4_geometry() {
        let layout = PageLayout::two_column(&PrintConfig::default());

        // 21cm - 2 * 1.27cm = 18.46cm; (18.46 - 1) / 2 = 8.73cm per column.
        assert!(close(layout.column_width(), 8.73 * CM));
        assert!(close(layout.columns[0].x, 1.27 * CM));
        assert!(close(layout.columns[1].x, (1.27 + 8.73 + 1.0) * CM));
        assert!(close(layout.columns[0].height, (29.7 - 2.54) * CM));
        assert_eq!(layout.columns[0].y, layout.columns[1].y);
    }

    #[test]
    fn test_board_sizes_follow_column_width() {
        let layout = PageLayout::two_column(&PrintConfig::default());

        assert!(close(layout.board_length, 0.8 * layout.column_width()));
        assert!(close(layout.tile_length * 8.0, layout.board_length));
        assert!(close(layout.glyph_size, layout.tile_length * 0.9));
    }

    #[test]
    fn test_letter_is_wider_than_a4() {
        let a4 = PageLayout::two_column(&PrintConfig::default());
        let letter = PageLayout::two_column(&PrintConfig {
            page_size: PageSize::Letter,
            ..PrintConfig::default()
        });
        assert!(letter.column_width() > a4.column_width());
    }
}
