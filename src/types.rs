use shakmaty::fen::Fen;
use shakmaty::{Chess, Color, EnPassantMode, Position};
use smallvec::SmallVec;

/// Index of a node inside a [`MoveTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);
}

pub type Variations = SmallVec<[NodeId; 2]>;

/// One half-move. The root node carries no move and holds the starting position.
#[derive(Debug, Clone)]
pub struct MoveNode {
    pub san: String,
    pub comment: Option<String>,
    /// Comment written before the first move of a variation.
    pub starting_comment: Option<String>,
    pub parent: Option<NodeId>,
    /// First entry continues the line, the rest are alternatives.
    pub variations: Variations,
    pub position: Chess,
}

impl MoveNode {
    fn root(position: Chess) -> Self {
        Self {
            san: String::new(),
            comment: None,
            starting_comment: None,
            parent: None,
            variations: Variations::new(),
            position,
        }
    }

    /// Side that played this move.
    pub fn mover(&self) -> Color {
        !self.position.turn()
    }

    /// Piece placement of the position after this move.
    pub fn board_fen(&self) -> String {
        let fen = Fen::from_position(&self.position, EnPassantMode::Legal).to_string();
        match fen.split_once(' ') {
            Some((board, _)) => board.to_string(),
            None => fen,
        }
    }

    pub fn has_comment_containing(&self, marker: &str) -> bool {
        self.comment
            .as_deref()
            .is_some_and(|comment| comment.contains(marker))
    }
}

/// Arena of move nodes. Node 0 is the root (starting position).
#[derive(Debug, Clone)]
pub struct MoveTree {
    nodes: Vec<MoveNode>,
}

impl Default for MoveTree {
    fn default() -> Self {
        Self::new(Chess::default())
    }
}

impl MoveTree {
    pub fn new(start: Chess) -> Self {
        Self {
            nodes: vec![MoveNode::root(start)],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    pub fn node(&self, id: NodeId) -> &MoveNode {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut MoveNode {
        &mut self.nodes[id.0]
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Appends a move below `parent`, after any existing variations.
    pub fn push(&mut self, parent: NodeId, san: String, position: Chess) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(MoveNode {
            san,
            comment: None,
            starting_comment: None,
            parent: Some(parent),
            variations: Variations::new(),
            position,
        });
        self.nodes[parent.0].variations.push(id);
        id
    }

    /// Alternatives to `id`: the parent's variations after the first.
    pub fn alternatives(&self, id: NodeId) -> &[NodeId] {
        match self.node(id).parent {
            Some(parent) => {
                let siblings = &self.node(parent).variations;
                if siblings.first() == Some(&id) {
                    &siblings[1..]
                } else {
                    &[]
                }
            }
            None => &[],
        }
    }

    /// Nodes following `from` along first children, excluding `from` itself.
    pub fn mainline_from(&self, from: NodeId) -> Mainline<'_> {
        Mainline {
            tree: self,
            current: from,
        }
    }

    pub fn mainline(&self) -> Mainline<'_> {
        self.mainline_from(NodeId::ROOT)
    }
}

pub struct Mainline<'a> {
    tree: &'a MoveTree,
    current: NodeId,
}

impl Iterator for Mainline<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let next = *self.tree.node(self.current).variations.first()?;
        self.current = next;
        Some(next)
    }
}

/// A parsed game: headers in source order plus its move tree.
#[derive(Debug, Clone, Default)]
pub struct Game {
    pub headers: Vec<(String, String)>,
    pub intro_comment: Option<String>,
    pub outcome: Option<String>,
    pub tree: MoveTree,
    pub parse_error: Option<String>,
}

impl Game {
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// `"{White} - {Black}.pdf"`, with `?` for missing names.
    pub fn default_filename(&self) -> String {
        format!(
            "{} - {}.pdf",
            self.header("White").unwrap_or("?"),
            self.header("Black").unwrap_or("?")
        )
    }
}
