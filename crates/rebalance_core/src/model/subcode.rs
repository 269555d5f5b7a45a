//! Ticker subcode alphabet.
//!
//! A ticker carries up to four subcode symbols that attest its place in the
//! [`crate::model::CategoryTree`]. The alphabet is fixed (one variant per
//! letter named in the glossary, plus [`Subcode::Unset`] for the `_`
//! placeholder); which letters are meaningful at a given tree node is a
//! property of the tree, not of the alphabet itself. The same letter can
//! attest different categories under different parents (e.g. `G` attests
//! both Bond's "Government" and Stock's "GrowthAndValue"; `O` attests
//! "Foreign" under both Stock and Bond). The walk in
//! [`crate::model::CategoryTree::classify`] matches one node's children at
//! a time; a code left unconsumed after that walk is still checked against
//! the rest of the tree to catch a ticker naming two incompatible branches.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Subcode {
    B,
    C,
    D,
    E,
    G,
    H,
    K,
    L,
    M,
    N,
    O,
    P,
    R,
    S,
    T,
    U,
    V,
    W,
    Y,
    Z,
}

impl Subcode {
    pub fn from_char(c: char) -> Option<Self> {
        use Subcode::*;
        Some(match c.to_ascii_uppercase() {
            'B' => B,
            'C' => C,
            'D' => D,
            'E' => E,
            'G' => G,
            'H' => H,
            'K' => K,
            'L' => L,
            'M' => M,
            'N' => N,
            'O' => O,
            'P' => P,
            'R' => R,
            'S' => S,
            'T' => T,
            'U' => U,
            'V' => V,
            'W' => W,
            'Y' => Y,
            'Z' => Z,
            '_' => return None,
            _ => return None,
        })
    }
}

/// Up to four subcode symbols (type / region / size / style per spec §3),
/// each optionally unset (the `_` placeholder).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Subcodes(pub [Option<Subcode>; 4]);

impl Subcodes {
    pub const NONE: Subcodes = Subcodes([None; 4]);

    pub fn new(codes: [Option<Subcode>; 4]) -> Self {
        Subcodes(codes)
    }

    pub fn single(code: Subcode) -> Self {
        Subcodes([Some(code), None, None, None])
    }

    /// Whether any of the four slots is populated.
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(Option::is_none)
    }

    pub fn contains(&self, code: Subcode) -> bool {
        self.0.iter().any(|c| *c == Some(code))
    }

    /// Parses up to four subcode characters (e.g. `"SDLG"`), skipping any
    /// that don't resolve to a known letter or the `_` placeholder. Used by
    /// [`crate::builder::TickerBuilder::subcodes_str`] for terse test/demo
    /// ticker definitions.
    pub fn from_str(s: &str) -> Self {
        let mut codes: [Option<Subcode>; 4] = [None; 4];
        for (slot, c) in codes.iter_mut().zip(s.chars()) {
            *slot = Subcode::from_char(c);
        }
        Subcodes(codes)
    }
}
