//! Turns a [`Game`] into the ordered flow of text blocks and diagrams.

use crate::board::{self, BoardStyle};
use crate::config::PrintConfig;
use crate::error::Result;
use crate::flow::{BlockStyle, Flowable, StyledText, TextBlock};
use crate::layout::PageLayout;
use crate::log;
use crate::movetext::{MoveTextComposer, clean_comment};
use crate::trigger::TriggerSet;
use crate::types::Game;
use serde::Serialize;

/// Headers shown in the title lines rather than as `key: value`.
const TITLE_HEADERS: [&str; 4] = ["White", "Black", "WhiteElo", "BlackElo"];

/// Header value meaning "unknown".
const UNSET: &str = "?";

/// Title lines (players with ratings) followed by one line per other header.
pub fn header_block(game: &Game, config: &PrintConfig) -> TextBlock {
    let title_size = config.font_size + 2.0;
    // Player name in bold, the rating after it in bold italic.
    let player = |name: &str, elo: &str| {
        let mut line = StyledText::new();
        line.sized(game.header(name).unwrap_or(UNSET), true, title_size);
        if let Some(rating) = game.header(elo).filter(|r| !r.is_empty()) {
            let mut suffix = StyledText::new();
            suffix.sized(format!(" [{rating}]"), true, title_size);
            line.append(suffix.italicized());
        }
        line
    };

    let mut content = player("White", "WhiteElo");
    content
        .line_break()
        .sized("vs.", true, title_size)
        .line_break()
        .append(player("Black", "BlackElo"))
        .line_break();

    for (key, value) in &game.headers {
        if TITLE_HEADERS.contains(&key.as_str()) || value == UNSET {
            continue;
        }
        content.line_break().plain(format!("{key}: {value}"));
    }

    TextBlock {
        style: BlockStyle::Header,
        content,
    }
}

/// Move text accumulated between two diagrams.
#[derive(Default)]
struct Paragraph(StyledText);

impl Paragraph {
    fn push(&mut self, text: StyledText) {
        if text.is_empty() {
            return;
        }
        if !self.0.is_empty() {
            self.0.plain(" ");
        }
        self.0.append(text);
    }

    fn push_plain(&mut self, text: String) {
        let mut styled = StyledText::new();
        styled.plain(text);
        self.push(styled);
    }

    /// Moves the paragraph into `elements` unless it is empty.
    fn flush(&mut self, elements: &mut Vec<Flowable>) {
        let content = std::mem::take(&mut self.0);
        if content.is_empty() {
            return;
        }
        elements.push(Flowable::Text(TextBlock {
            style: BlockStyle::MoveText,
            content,
        }));
    }
}

/// Composes the header and the mainline of `game`, inserting a diagram after
/// every move whose index is in `triggers` or whose comment carries the
/// diagram marker.
///
/// A Black move printed right after a diagram gets its number (`"N... "`)
/// since the text column was broken. The game is only read.
pub fn compose(game: &Game, triggers: &TriggerSet, config: &PrintConfig) -> Vec<Flowable> {
    let layout = PageLayout::two_column(config);
    let board_style = BoardStyle::new(config, &layout);
    let marker = config.diagram_marker.as_str();
    let composer = MoveTextComposer::new(&game.tree, marker);

    let mut elements = vec![Flowable::Text(header_block(game, config))];
    let mut paragraph = Paragraph::default();
    let mut after_diagram = false;

    if let Some(intro) = game.intro_comment.as_deref().and_then(|c| clean_comment(c, marker)) {
        paragraph.push_plain(intro);
    }

    for (halfmove, id) in game.tree.mainline().enumerate() {
        let force_number = after_diagram && !halfmove.is_multiple_of(2);
        paragraph.push(composer.render_numbered(id, halfmove, force_number));
        after_diagram = false;

        let node = game.tree.node(id);
        if node.has_comment_containing(marker) || triggers.contains(halfmove) {
            paragraph.flush(&mut elements);
            let diagram = board::render(&node.board_fen(), &board_style);
            elements.push(Flowable::Diagram(Box::new(diagram)));
            after_diagram = true;
        }
    }

    if let Some(outcome) = game.outcome.as_deref().filter(|o| *o != "*") {
        paragraph.push_plain(outcome.to_string());
    }
    paragraph.flush(&mut elements);

    let diagrams = elements.iter().filter(|e| e.as_diagram().is_some()).count();
    log::info(format!(
        "Composed {} elements ({diagrams} diagrams) for '{}'",
        elements.len(),
        game.default_filename()
    ));
    elements
}

/// A composed game plus everything the layout stage needs to typeset it.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    pub filename: String,
    pub font_name: String,
    pub font_size: f32,
    pub leading: f32,
    pub space_before: f32,
    pub space_after: f32,
    pub layout: PageLayout,
    pub elements: Vec<Flowable>,
}

impl Document {
    pub fn build(game: &Game, triggers: &TriggerSet, config: &PrintConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            filename: game.default_filename(),
            font_name: config.font_name.clone(),
            font_size: config.font_size,
            leading: config.leading(),
            space_before: config.space_before,
            space_after: config.space_after,
            layout: PageLayout::two_column(config),
            elements: compose(game, triggers, config),
        })
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// One line per element: text blocks as inline markup, diagrams as a
    /// `<diagram/>` tag carrying the piece placement.
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        for element in &self.elements {
            match element {
                Flowable::Text(block) => {
                    let style = match block.style {
                        BlockStyle::Header => "header",
                        BlockStyle::MoveText => "move_text",
                    };
                    out.push_str(&format!(
                        "<para style=\"{style}\">{}</para>\n",
                        block.content.to_markup()
                    ));
                }
                Flowable::Diagram(diagram) => {
                    out.push_str(&format!("<diagram fen=\"{}\"/>\n", diagram.position));
                }
            }
        }
        out
    }
}
