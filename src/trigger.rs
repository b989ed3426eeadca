use crate::error::{Error, Result};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

static TRIGGER_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)([A-Za-z])$").expect("valid trigger token regex"));

/// Mainline half-move indices after which a diagram is printed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriggerSet(BTreeSet<usize>);

impl TriggerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a whitespace-separated list such as `"2w 3b 10w"`.
    ///
    /// `Nw` is White's N-th move (index `2N - 2`), `Nb` Black's (index `2N - 1`).
    /// Any malformed token fails the whole list.
    pub fn parse(list: &str) -> Result<Self> {
        list.split_whitespace()
            .map(parse_token)
            .collect::<Result<BTreeSet<_>>>()
            .map(Self)
    }

    pub fn contains(&self, halfmove: usize) -> bool {
        self.0.contains(&halfmove)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }
}

pub fn parse_token(token: &str) -> Result<usize> {
    let invalid = |reason| Error::InvalidTrigger {
        token: token.to_string(),
        reason,
    };

    let captures = TRIGGER_TOKEN_RE
        .captures(token)
        .ok_or_else(|| invalid("expected a move number followed by 'w' or 'b'"))?;

    let number: usize = captures[1]
        .parse()
        .map_err(|_| invalid("move number out of range"))?;
    if number == 0 {
        return Err(invalid("move numbers start at 1"));
    }
    let doubled = number
        .checked_mul(2)
        .ok_or_else(|| invalid("move number out of range"))?;

    match &captures[2] {
        "w" => Ok(doubled - 2),
        "b" => Ok(doubled - 1),
        _ => Err(invalid("side must be 'w' or 'b'")),
    }
}
