//! Output elements handed to the page-layout stage.
//!
//! A flow is an ordered list of [`Flowable`]s: styled text blocks and board
//! diagrams. Text can be rendered as plain text or as the inline markup the
//! layout stage understands (`<strong>`, `<i>`, `<font size=N>`, `<br/>`).

use serde::Serialize;
use std::fmt::Write;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Inline {
    Text {
        text: String,
        #[serde(skip_serializing_if = "std::ops::Not::not")]
        strong: bool,
        #[serde(skip_serializing_if = "std::ops::Not::not")]
        italic: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        size: Option<f32>,
    },
    LineBreak,
}

impl Inline {
    fn text(text: impl Into<String>, strong: bool) -> Self {
        Self::Text {
            text: text.into(),
            strong,
            italic: false,
            size: None,
        }
    }

    fn write_markup(&self, out: &mut String) {
        match self {
            Self::LineBreak => out.push_str("<br/>"),
            Self::Text {
                text,
                strong,
                italic,
                size,
            } => {
                if let Some(size) = size {
                    let _ = write!(out, "<font size={size}>");
                }
                if *strong {
                    out.push_str("<strong>");
                }
                if *italic {
                    out.push_str("<i>");
                }
                escape_markup(text, out);
                if *italic {
                    out.push_str("</i>");
                }
                if *strong {
                    out.push_str("</strong>");
                }
                if size.is_some() {
                    out.push_str("</font>");
                }
            }
        }
    }
}

fn escape_markup(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

/// A run of inline fragments.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct StyledText(Vec<Inline>);

impl StyledText {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plain(&mut self, text: impl Into<String>) -> &mut Self {
        self.0.push(Inline::text(text, false));
        self
    }

    pub fn strong(&mut self, text: impl Into<String>) -> &mut Self {
        self.0.push(Inline::text(text, true));
        self
    }

    pub fn sized(&mut self, text: impl Into<String>, strong: bool, size: f32) -> &mut Self {
        self.0.push(Inline::Text {
            text: text.into(),
            strong,
            italic: false,
            size: Some(size),
        });
        self
    }

    pub fn line_break(&mut self) -> &mut Self {
        self.0.push(Inline::LineBreak);
        self
    }

    pub fn append(&mut self, other: StyledText) -> &mut Self {
        self.0.extend(other.0);
        self
    }

    /// Marks every text fragment italic.
    pub fn italicized(mut self) -> Self {
        for inline in &mut self.0 {
            if let Inline::Text { italic, .. } = inline {
                *italic = true;
            }
        }
        self
    }

    pub fn inlines(&self) -> &[Inline] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|inline| match inline {
            Inline::Text { text, .. } => text.is_empty(),
            Inline::LineBreak => false,
        })
    }

    /// Text without styling; line breaks become `\n`.
    pub fn to_plain(&self) -> String {
        let mut out = String::new();
        for inline in &self.0 {
            match inline {
                Inline::Text { text, .. } => out.push_str(text),
                Inline::LineBreak => out.push('\n'),
            }
        }
        out
    }

    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        for inline in &self.0 {
            inline.write_markup(&mut out);
        }
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockStyle {
    /// Centered title and metadata.
    Header,
    MoveText,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextBlock {
    pub style: BlockStyle,
    pub content: StyledText,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Glyph {
    /// FEN letter of the piece.
    pub piece: char,
    pub image: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Cell {
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub glyph: Option<Glyph>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Border {
    pub width: f32,
    pub color: String,
}

impl Default for Border {
    fn default() -> Self {
        Self {
            width: 0.5,
            color: "#808080".to_string(),
        }
    }
}

/// An 8×8 board, rank 8 first, file a first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagram {
    pub position: String,
    pub cells: [[Cell; 8]; 8],
    pub tile_size: f32,
    pub glyph_size: f32,
    pub border: Border,
    pub keep_together: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Flowable {
    Text(TextBlock),
    Diagram(Box<Diagram>),
}

impl Flowable {
    pub fn as_text(&self) -> Option<&TextBlock> {
        match self {
            Self::Text(block) => Some(block),
            Self::Diagram(_) => None,
        }
    }

    pub fn as_diagram(&self) -> Option<&Diagram> {
        match self {
            Self::Text(_) => None,
            Self::Diagram(diagram) => Some(diagram),
        }
    }

    pub fn is_move_text(&self) -> bool {
        self.as_text()
            .is_some_and(|block| block.style == BlockStyle::MoveText)
    }
}
