//! Renders a PGN game into a printable two-column flow of move text and
//! board diagrams.
//!
//! ```no_run
//! use pgn_print::{Document, PrintConfig, TriggerSet, parse_game};
//!
//! let game = parse_game("1. e4 e5 2. Nf3 { <*> } Nc6 *")?;
//! let triggers = TriggerSet::parse("1w")?;
//! let document = Document::build(&game, &triggers, &PrintConfig::default())?;
//! println!("{}", document.to_json()?);
//! # Ok::<(), pgn_print::Error>(())
//! ```

pub mod board;
pub mod config;
pub mod document;
pub mod error;
pub mod flow;
pub mod layout;
pub mod log;
pub mod movetext;
pub mod reader;
pub mod trigger;
pub mod types;
pub mod visitor;

pub use config::{PageSize, PrintConfig};
pub use document::{Document, compose};
pub use error::{Error, Result};
pub use flow::{Diagram, Flowable, StyledText, TextBlock};
pub use reader::{load_game, parse_game, read_game};
pub use trigger::TriggerSet;
pub use types::{Game, MoveNode, MoveTree, NodeId};
