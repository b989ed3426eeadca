use crate::error::ErrorAccumulator;
use crate::types::{Game, MoveTree, NodeId};

use pgn_reader::{Nag, Outcome, RawComment, RawTag, SanPlus, Skip, Visitor};
use shakmaty::fen::Fen;
use shakmaty::san::San;
use shakmaty::{CastlingMode, Chess, Position};
use std::mem;
use std::ops::ControlFlow;

/// Streaming PGN visitor (pgn-reader) that builds a [`MoveTree`].
///
/// Every SAN token is played on the position of its parent node, so each node
/// carries the position after its move. Variations push the current node on
/// a stack and resume from the parent of the move they replace. The first
/// illegal or unparsable move truncates the line it appears in; the problem is
/// recorded in `parse_error`. A `FEN` tag sets the position the tree starts
/// from.
pub struct GameVisitor {
    headers: Vec<(String, String)>,
    tree: MoveTree,
    current: NodeId,
    stack: Vec<NodeId>,
    /// Comment seen right after `(` and before the variation's first move.
    pending_starting_comment: Option<String>,
    at_variation_start: bool,
    /// Nesting depth of a variation being dropped after an illegal move in it.
    skip_depth: usize,
    intro_comment: Option<String>,
    result_marker: Option<String>,
    parse_error: ErrorAccumulator,
    pub current_game: Option<Game>,
}

impl Default for GameVisitor {
    fn default() -> Self {
        Self::new()
    }
}

impl GameVisitor {
    pub fn new() -> Self {
        Self {
            headers: Vec::new(),
            tree: MoveTree::default(),
            current: NodeId::ROOT,
            stack: Vec::new(),
            pending_starting_comment: None,
            at_variation_start: false,
            skip_depth: 0,
            intro_comment: None,
            result_marker: None,
            parse_error: ErrorAccumulator::default(),
            current_game: None,
        }
    }

    fn reset(&mut self) {
        *self = Self::new();
    }

    fn is_skipping(&self) -> bool {
        self.skip_depth > 0
    }

    fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn start_position(fen: &[u8]) -> Result<Chess, String> {
        let text = String::from_utf8_lossy(fen);
        let fen = Fen::from_ascii(text.trim().as_bytes())
            .map_err(|e| format!("Invalid FEN '{text}': {e}"))?;
        fen.into_position::<Chess>(CastlingMode::Standard)
            .map_err(|e| format!("Invalid FEN '{text}': {e}"))
    }

    fn normalize_comment(raw: &[u8]) -> Option<String> {
        let text = String::from_utf8_lossy(raw);
        let joined = text.split_whitespace().collect::<Vec<_>>().join(" ");
        (!joined.is_empty()).then_some(joined)
    }

    fn append_comment(slot: &mut Option<String>, comment: String) {
        match slot {
            Some(existing) => {
                existing.push(' ');
                existing.push_str(&comment);
            }
            None => *slot = Some(comment),
        }
    }

    fn play(&mut self, san_plus: &SanPlus) -> Result<(), String> {
        let token = san_plus.to_string();
        let san: San = san_plus
            .san
            .to_string()
            .parse()
            .map_err(|e| format!("Unparsable move '{token}': {e}"))?;

        let mut position = self.tree.node(self.current).position.clone();
        let m = san
            .to_move(&position)
            .map_err(|e| format!("Illegal move '{token}': {e}"))?;
        position.play_unchecked(m);

        let id = self.tree.push(self.current, token, position);
        if let Some(comment) = self.pending_starting_comment.take() {
            self.tree.node_mut(id).starting_comment = Some(comment);
        }
        self.current = id;
        Ok(())
    }

    fn build_game(&mut self) {
        let outcome = self
            .result_marker
            .take()
            .or_else(|| self.header("Result").map(str::to_string));

        self.current_game = Some(Game {
            headers: mem::take(&mut self.headers),
            intro_comment: self.intro_comment.take(),
            outcome,
            tree: mem::take(&mut self.tree),
            parse_error: self.parse_error.take(),
        });
    }

    pub fn finalize_game_with_error(&mut self, error_msg: String) {
        self.parse_error.push(&error_msg);
        self.build_game();
    }
}

impl Visitor for GameVisitor {
    type Tags = ();
    type Movetext = ();
    type Output = ();

    fn begin_tags(&mut self) -> ControlFlow<Self::Output, Self::Tags> {
        self.reset();
        ControlFlow::Continue(())
    }

    fn tag(
        &mut self,
        _: &mut Self::Tags,
        key: &[u8],
        value: RawTag<'_>,
    ) -> ControlFlow<Self::Output> {
        let key = String::from_utf8_lossy(key).into_owned();
        if self.header(&key).is_some() {
            return ControlFlow::Continue(());
        }
        if key == "FEN" {
            match Self::start_position(value.as_bytes()) {
                Ok(position) => self.tree = MoveTree::new(position),
                Err(msg) => self.parse_error.push(&msg),
            }
        }
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        self.headers.push((key, value));
        ControlFlow::Continue(())
    }

    fn begin_movetext(&mut self, _: Self::Tags) -> ControlFlow<Self::Output, Self::Movetext> {
        ControlFlow::Continue(())
    }

    fn san(&mut self, _: &mut Self::Movetext, san_plus: SanPlus) -> ControlFlow<Self::Output> {
        if self.is_skipping() {
            return ControlFlow::Continue(());
        }
        self.at_variation_start = false;

        match self.play(&san_plus) {
            Ok(()) => ControlFlow::Continue(()),
            Err(msg) => {
                self.parse_error.push(&msg);
                if self.stack.is_empty() {
                    // Nothing after a broken mainline move can be placed.
                    // `end_game` is not called after a break.
                    self.build_game();
                    ControlFlow::Break(())
                } else {
                    self.skip_depth = 1;
                    ControlFlow::Continue(())
                }
            }
        }
    }

    fn nag(&mut self, _: &mut Self::Movetext, _: Nag) -> ControlFlow<Self::Output> {
        ControlFlow::Continue(())
    }

    fn comment(
        &mut self,
        _: &mut Self::Movetext,
        comment: RawComment<'_>,
    ) -> ControlFlow<Self::Output> {
        if self.is_skipping() {
            return ControlFlow::Continue(());
        }
        let Some(comment) = Self::normalize_comment(comment.as_bytes()) else {
            return ControlFlow::Continue(());
        };

        if self.at_variation_start {
            Self::append_comment(&mut self.pending_starting_comment, comment);
        } else if self.current == NodeId::ROOT {
            Self::append_comment(&mut self.intro_comment, comment);
        } else {
            Self::append_comment(&mut self.tree.node_mut(self.current).comment, comment);
        }
        ControlFlow::Continue(())
    }

    fn begin_variation(&mut self, _: &mut Self::Movetext) -> ControlFlow<Self::Output, Skip> {
        if self.is_skipping() {
            self.skip_depth += 1;
            return ControlFlow::Continue(Skip(false));
        }

        self.stack.push(self.current);
        // A variation replaces the last move, so it starts from that move's parent.
        let Some(parent) = self.tree.node(self.current).parent else {
            self.parse_error
                .push("Variation before the first move was skipped");
            self.skip_depth = 1;
            return ControlFlow::Continue(Skip(false));
        };

        self.current = parent;
        self.at_variation_start = true;
        self.pending_starting_comment = None;
        ControlFlow::Continue(Skip(false))
    }

    fn end_variation(&mut self, _: &mut Self::Movetext) -> ControlFlow<Self::Output> {
        if self.is_skipping() {
            self.skip_depth -= 1;
            if self.is_skipping() {
                return ControlFlow::Continue(());
            }
        }
        if let Some(resume) = self.stack.pop() {
            self.current = resume;
        }
        self.at_variation_start = false;
        self.pending_starting_comment = None;
        ControlFlow::Continue(())
    }

    fn outcome(&mut self, _: &mut Self::Movetext, outcome: Outcome) -> ControlFlow<Self::Output> {
        self.result_marker = Some(outcome.to_string());
        ControlFlow::Continue(())
    }

    fn end_game(&mut self, _: Self::Movetext) -> Self::Output {
        if self.current_game.is_none() {
            self.build_game();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgn_reader::Reader;

    fn parse(pgn: &str) -> Game {
        let mut reader = Reader::new(pgn.as_bytes());
        let mut visitor = GameVisitor::new();
        reader.read_game(&mut visitor).unwrap();
        visitor.current_game.expect("Should have parsed a game")
    }

    fn sans(game: &Game) -> Vec<&str> {
        game.tree
            .mainline()
            .map(|id| game.tree.node(id).san.as_str())
            .collect()
    }

    #[test]
    fn test_visitor_builds_mainline_and_headers() {
        let game = parse(
            r#"[Event "Test Game"]
[White "Anderssen"]
[Black "Kieseritzky"]
[Result "1-0"]
1. e4 e5 2. Nf3 1-0"#,
        );

        assert_eq!(game.header("Event"), Some("Test Game"));
        assert_eq!(game.header("White"), Some("Anderssen"));
        assert_eq!(game.headers.len(), 4);
        assert_eq!(game.outcome.as_deref(), Some("1-0"));
        assert_eq!(sans(&game), vec!["e4", "e5", "Nf3"]);
        assert!(game.parse_error.is_none());
    }

    #[test]
    fn test_visitor_headers_keep_source_order_and_first_value() {
        let game = parse(
            r#"[Site "Somewhere"]
[Event "First"]
[Event "Second"]
1. e4 *"#,
        );

        assert_eq!(
            game.headers,
            vec![
                ("Site".to_string(), "Somewhere".to_string()),
                ("Event".to_string(), "First".to_string()),
            ]
        );
    }

    #[test]
    fn test_visitor_attaches_comments_to_moves() {
        let game = parse("{ intro } 1. e4 {  best   by test } e5 *");

        let mainline: Vec<_> = game.tree.mainline().collect();
        assert_eq!(game.intro_comment.as_deref(), Some("intro"));
        assert_eq!(
            game.tree.node(mainline[0]).comment.as_deref(),
            Some("best by test")
        );
        assert!(game.tree.node(mainline[1]).comment.is_none());
    }

    #[test]
    fn test_visitor_builds_variations_as_siblings() {
        let game = parse("1. e4 e5 (1... c5 2. Nf3 (2. c3 d5) d6) 2. Nf3 *");

        let mainline: Vec<_> = game.tree.mainline().collect();
        assert_eq!(sans(&game), vec!["e4", "e5", "Nf3"]);

        let alternatives = game.tree.alternatives(mainline[1]);
        assert_eq!(alternatives.len(), 1);
        let c5 = alternatives[0];
        assert_eq!(game.tree.node(c5).san, "c5");

        let line: Vec<_> = game
            .tree
            .mainline_from(c5)
            .map(|id| game.tree.node(id).san.as_str())
            .collect();
        assert_eq!(line, vec!["Nf3", "d6"]);

        let nf3 = game.tree.node(c5).variations[0];
        let sub = game.tree.alternatives(nf3);
        assert_eq!(sub.len(), 1);
        assert_eq!(game.tree.node(sub[0]).san, "c3");
    }

    #[test]
    fn test_visitor_starting_comment_of_variation() {
        let game = parse("1. e4 ({ or } 1. d4 { solid }) e5 *");

        let e4 = game.tree.mainline().next().unwrap();
        let d4 = game.tree.alternatives(e4)[0];
        assert_eq!(game.tree.node(d4).starting_comment.as_deref(), Some("or"));
        assert_eq!(game.tree.node(d4).comment.as_deref(), Some("solid"));
        assert!(game.tree.node(e4).comment.is_none());
    }

    #[test]
    fn test_visitor_positions_follow_moves() {
        let game = parse("1. e4 e5 (1... c5) *");

        let e4 = game.tree.mainline().next().unwrap();
        let e5 = game.tree.node(e4).variations[0];
        let c5 = game.tree.node(e4).variations[1];
        assert_eq!(
            game.tree.node(e5).board_fen(),
            "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR"
        );
        assert_eq!(
            game.tree.node(c5).board_fen(),
            "rnbqkbnr/pp1ppppp/8/2p5/4P3/8/PPPP1PPP/RNBQKBNR"
        );
    }

    #[test]
    fn test_visitor_skips_nags() {
        let game = parse("1. e4! $1 e5?? *");
        assert_eq!(sans(&game), vec!["e4", "e5"]);
    }

    #[test]
    fn test_visitor_illegal_mainline_move_truncates_and_records_error() {
        let game = parse("1. e4 e5 2. Ke3 Nc6 *");

        assert_eq!(sans(&game), vec!["e4", "e5"]);
        let error = game.parse_error.expect("Should record the illegal move");
        assert!(error.contains("Ke3"));
    }

    #[test]
    fn test_visitor_illegal_variation_move_keeps_mainline() {
        let game = parse("1. e4 (1. Ke2 d5) e5 2. Nf3 *");

        assert_eq!(sans(&game), vec!["e4", "e5", "Nf3"]);
        let e4 = game.tree.mainline().next().unwrap();
        assert!(game.tree.alternatives(e4).is_empty());
        assert!(game.parse_error.is_some_and(|e| e.contains("Ke2")));
    }

    #[test]
    fn test_visitor_starts_from_fen_tag() {
        let game = parse(
            r#"[SetUp "1"]
[FEN "4k3/8/8/8/8/8/8/4K2R w K - 0 1"]
1. O-O Kd7 2. Rf7+ *"#,
        );

        assert_eq!(sans(&game), vec!["O-O", "Kd7", "Rf7+"]);
        assert!(game.parse_error.is_none());
        assert_eq!(
            game.tree.node(game.tree.root()).board_fen(),
            "4k3/8/8/8/8/8/8/4K2R"
        );
        let last = game.tree.mainline().last().unwrap();
        assert_eq!(game.tree.node(last).board_fen(), "8/3k1R2/8/8/8/8/8/6K1");
    }

    #[test]
    fn test_visitor_invalid_fen_is_recorded() {
        let game = parse(
            r#"[FEN "not a position"]
1. e4 *"#,
        );

        assert_eq!(sans(&game), vec!["e4"]);
        assert!(game.parse_error.is_some_and(|e| e.contains("Invalid FEN")));
    }

    #[test]
    fn test_visitor_result_falls_back_to_tag() {
        let game = parse(
            r#"[Result "1/2-1/2"]
1. e4 e5"#,
        );
        assert_eq!(game.outcome.as_deref(), Some("1/2-1/2"));
    }
}
