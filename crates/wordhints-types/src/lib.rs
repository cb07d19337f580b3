//! Shared types for the word hints pipeline.
//!
//! [`Pos`] is the coarse dictionary category used to key sense lookups
//! (WordNet's `n`/`v`/`a`/`r`), [`UniversalPos`] is the coarse tag the
//! dependency parser emits per token, and [`Difficulty`] is the result of
//! ranking a word against a learner-supplied threshold.
//!
//! ```rust
//! use wordhints_types::{Pos, UniversalPos};
//!
//! assert_eq!(Pos::from_penn_tag("VBD"), Some(Pos::Verb));
//! assert_eq!(Pos::from_char('s'), Some(Pos::Adj));
//! assert_eq!(UniversalPos::from_tag("PROPN"), UniversalPos::ProperNoun);
//! ```

use std::fmt;

/// Dictionary part of speech, matching the WordNet category characters
/// (`n`, `v`, `a`/`s`, `r`).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Pos {
    Noun,
    Verb,
    Adj,
    Adv,
}

impl Pos {
    /// Parse a WordNet POS character into an enum.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'n' => Some(Pos::Noun),
            'v' => Some(Pos::Verb),
            'a' | 's' => Some(Pos::Adj),
            'r' => Some(Pos::Adv),
            _ => None,
        }
    }

    /// Emit the POS character used in WordNet data files.
    pub fn to_char(self) -> char {
        match self {
            Pos::Noun => 'n',
            Pos::Verb => 'v',
            Pos::Adj => 'a',
            Pos::Adv => 'r',
        }
    }

    /// Map a Penn Treebank fine-grained tag to the dictionary category.
    ///
    /// Returns `None` for tags outside the content-word set (determiners,
    /// pronouns, punctuation and so on); those tokens are never hinted.
    pub fn from_penn_tag(tag: &str) -> Option<Self> {
        match tag {
            "JJ" | "JJR" | "JJS" => Some(Pos::Adj),
            "RB" | "RBR" | "RBS" => Some(Pos::Adv),
            "NN" | "NNP" | "NNS" => Some(Pos::Noun),
            "VB" | "VBD" | "VBG" | "VBN" | "VBP" | "VBZ" => Some(Pos::Verb),
            _ => None,
        }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Pos::Noun => "noun",
            Pos::Verb => "verb",
            Pos::Adj => "adj",
            Pos::Adv => "adv",
        })
    }
}

/// Coarse universal POS as produced by the dependency parser.
///
/// Only the categories the pipeline branches on are distinguished;
/// everything else collapses into [`UniversalPos::Other`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum UniversalPos {
    Noun,
    Verb,
    Adj,
    Adv,
    ProperNoun,
    Other,
}

impl UniversalPos {
    /// Parse a universal POS tag string (`NOUN`, `VERB`, `PROPN`, ...).
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "NOUN" => UniversalPos::Noun,
            "VERB" => UniversalPos::Verb,
            "ADJ" => UniversalPos::Adj,
            "ADV" => UniversalPos::Adv,
            "PROPN" => UniversalPos::ProperNoun,
            _ => UniversalPos::Other,
        }
    }

    /// Emit the universal tag string; `Other` becomes `X`.
    pub fn as_tag(self) -> &'static str {
        match self {
            UniversalPos::Noun => "NOUN",
            UniversalPos::Verb => "VERB",
            UniversalPos::Adj => "ADJ",
            UniversalPos::Adv => "ADV",
            UniversalPos::ProperNoun => "PROPN",
            UniversalPos::Other => "X",
        }
    }
}

/// How a word ranks against a difficulty threshold.
///
/// `Unknown` is distinct from both ends: a word absent from every ranking
/// layer must never be hinted, regardless of the threshold.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Difficulty {
    Hard,
    Easy,
    Unknown,
}
