use crate::flow::StyledText;
use crate::types::{MoveTree, NodeId};

/// Number prefix for the move at `halfmove`.
///
/// White always gets `"N. "`. Black gets `"N... "` only when `forced`.
pub fn move_prefix(halfmove: usize, forced: bool) -> Option<String> {
    let number = halfmove / 2 + 1;
    if halfmove.is_multiple_of(2) {
        Some(format!("{number}. "))
    } else if forced {
        Some(format!("{number}... "))
    } else {
        None
    }
}

/// Removes every occurrence of `marker` and collapses whitespace.
pub fn clean_comment(comment: &str, marker: &str) -> Option<String> {
    let stripped = if marker.is_empty() {
        comment.to_string()
    } else {
        comment.replace(marker, " ")
    };
    let joined = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    (!joined.is_empty()).then_some(joined)
}

/// Renders moves of a [`MoveTree`] together with the variations branching
/// off at them.
pub struct MoveTextComposer<'a> {
    tree: &'a MoveTree,
    marker: &'a str,
}

impl<'a> MoveTextComposer<'a> {
    pub fn new(tree: &'a MoveTree, marker: &'a str) -> Self {
        Self { tree, marker }
    }

    /// `node` played at `halfmove`, followed by one parenthesized group per
    /// alternative to it.
    pub fn render(&self, node: NodeId, halfmove: usize) -> StyledText {
        self.render_numbered(node, halfmove, false)
    }

    /// Like [`render`](Self::render), optionally forcing the number on a Black move.
    pub fn render_numbered(&self, node: NodeId, halfmove: usize, force_number: bool) -> StyledText {
        let mut text = self.render_move(node, halfmove, force_number);

        for &alternative in self.tree.alternatives(node) {
            text.plain(" (");
            text.append(self.render_variation(alternative, halfmove).italicized());
            text.plain(")");
        }
        text
    }

    fn render_move(&self, node: NodeId, halfmove: usize, force_number: bool) -> StyledText {
        let node = self.tree.node(node);
        let prefix = move_prefix(halfmove, force_number).unwrap_or_default();

        let mut text = StyledText::new();
        text.strong(format!("{prefix}{}", node.san));
        if let Some(comment) = self.comment(node.comment.as_deref()) {
            text.plain(format!(" {comment}"));
        }
        text
    }

    /// A whole alternative line. Only its first move has a forced number.
    fn render_variation(&self, first: NodeId, halfmove: usize) -> StyledText {
        let mut text = StyledText::new();
        if let Some(comment) = self.comment(self.tree.node(first).starting_comment.as_deref()) {
            text.plain(format!("{comment} "));
        }
        text.append(self.render_move(first, halfmove, true));

        for (step, node) in self.tree.mainline_from(first).enumerate() {
            text.plain(" ");
            text.append(self.render(node, halfmove + 1 + step));
        }
        text
    }

    fn comment(&self, comment: Option<&str>) -> Option<String> {
        clean_comment(comment?, self.marker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::parse_game;
    use crate::types::Game;

    fn mainline_text(game: &Game, halfmove: usize) -> StyledText {
        let node = game.tree.mainline().nth(halfmove).expect("move exists");
        MoveTextComposer::new(&game.tree, "<*>").render(node, halfmove)
    }

    #[test]
    fn test_move_prefix_rules() {
        assert_eq!(move_prefix(0, false).as_deref(), Some("1. "));
        assert_eq!(move_prefix(1, false), None);
        assert_eq!(move_prefix(1, true).as_deref(), Some("1... "));
        assert_eq!(move_prefix(4, true).as_deref(), Some("3. "));
        assert_eq!(move_prefix(19, true).as_deref(), Some("10... "));
    }

    #[test]
    fn test_white_move_is_numbered_black_is_not() {
        let game = parse_game("1. e4 e5 2. Nf3 *").unwrap();

        assert_eq!(mainline_text(&game, 0).to_plain(), "1. e4");
        assert_eq!(mainline_text(&game, 1).to_plain(), "e5");
        assert_eq!(mainline_text(&game, 2).to_plain(), "2. Nf3");
    }

    #[test]
    fn test_forced_number_on_black_move() {
        let game = parse_game("1. e4 e5 *").unwrap();
        let e5 = game.tree.mainline().nth(1).unwrap();
        let composer = MoveTextComposer::new(&game.tree, "<*>");

        assert_eq!(composer.render_numbered(e5, 1, true).to_plain(), "1... e5");
    }

    #[test]
    fn test_comment_follows_move_in_normal_style() {
        let game = parse_game("1. e4 { best by test } *").unwrap();
        let text = mainline_text(&game, 0);

        assert_eq!(text.to_plain(), "1. e4 best by test");
        assert_eq!(text.to_markup(), "<strong>1. e4</strong> best by test");
    }

    #[test]
    fn test_marker_is_stripped_from_comments() {
        let game = parse_game("1. e4 { <*> the key move } e5 { <*> } *").unwrap();

        assert_eq!(mainline_text(&game, 0).to_plain(), "1. e4 the key move");
        assert_eq!(mainline_text(&game, 1).to_plain(), "e5");
    }

    #[test]
    fn test_black_alternative_gets_forced_number() {
        let game = parse_game("1. e4 e5 (1... c5 2. Nf3) 2. Nf3 *").unwrap();
        let text = mainline_text(&game, 1);

        assert_eq!(text.to_plain(), "e5 (1... c5 2. Nf3)");
        assert_eq!(text.to_plain().matches('(').count(), 1);
        assert_eq!(text.to_plain().matches(')').count(), 1);
        assert_eq!(
            text.to_markup(),
            "<strong>e5</strong> (<strong><i>1... c5</i></strong><i> </i><strong><i>2. Nf3</i></strong>)"
        );
    }

    #[test]
    fn test_white_alternative_gets_plain_number() {
        let game = parse_game("1. e4 (1. d4 { solid } d5) e5 *").unwrap();

        assert_eq!(mainline_text(&game, 0).to_plain(), "1. e4 (1. d4 solid d5)");
    }

    #[test]
    fn test_nested_variations_recurse() {
        let game = parse_game("1. e4 e5 (1... c5 2. Nf3 (2. c3 d5) d6) 2. Nf3 *").unwrap();

        assert_eq!(
            mainline_text(&game, 1).to_plain(),
            "e5 (1... c5 2. Nf3 (2. c3 d5) d6)"
        );
    }

    #[test]
    fn test_several_alternatives_in_declaration_order() {
        let game = parse_game("1. e4 (1. d4) (1. c4 e5) e5 *").unwrap();

        assert_eq!(mainline_text(&game, 0).to_plain(), "1. e4 (1. d4) (1. c4 e5)");
    }

    #[test]
    fn test_variation_starting_comment_precedes_first_move() {
        let game = parse_game("1. e4 ({ or } 1. d4) e5 *").unwrap();

        assert_eq!(mainline_text(&game, 0).to_plain(), "1. e4 (or 1. d4)");
    }

    #[test]
    fn test_deep_variation_numbering_continues_from_branch_point() {
        let game = parse_game("1. e4 e5 2. Nf3 Nc6 (2... d6 3. d4 exd4 4. Nxd4) 3. Bb5 *").unwrap();

        assert_eq!(
            mainline_text(&game, 3).to_plain(),
            "Nc6 (2... d6 3. d4 exd4 4. Nxd4)"
        );
    }

    #[test]
    fn test_rendering_does_not_change_tree() {
        let game = parse_game("1. e4 e5 (1... c5) *").unwrap();
        let before = format!("{:?}", game.tree);

        let _ = mainline_text(&game, 1);
        assert_eq!(format!("{:?}", game.tree), before);
    }

    #[test]
    fn test_clean_comment() {
        assert_eq!(clean_comment("a<*>b", "<*>").as_deref(), Some("a b"));
        assert_eq!(clean_comment("  <*>  ", "<*>"), None);
        assert_eq!(clean_comment(" x  y ", "").as_deref(), Some("x y"));
    }
}
