//! Core of the word-hints pipeline: find the hard words in an English
//! text, work out which sense each one is used in, and attach a
//! learner-friendly definition to its span.
//!
//! The heavy NLP lifting (dependency parsing, word-sense
//! disambiguation) and the dictionary live behind the [`Parser`],
//! [`SenseClassifier`] and [`Lexicon`] traits; the service crate plugs
//! in remote clients and the WordNet reader, tests plug in fakes.

pub mod definitions;
pub mod hints;
pub mod holder;
pub mod phrasal;
pub mod token;

use std::collections::HashMap;

use anyhow::Result;
use wordhints_types::Pos;

pub use crate::definitions::{
    DefinitionResolver, EASY_SYNONYM_MAX_RANK, MAX_REASONABLE_DEFINITION_LEN, shorten_definition,
};
pub use crate::hints::{Hint, HintsProvider};
pub use crate::holder::{HolderError, PhrasalStateError, TextHolder, TokenRef};
pub use crate::phrasal::flag_phrasal_verbs;
pub use crate::token::ParsedToken;

/// Dependency parser for raw text.
pub trait Parser {
    fn parse(&self, text: &str) -> Result<Vec<ParsedToken>>;
}

/// Word-sense disambiguation over a parsed text. `targets` are token
/// indices into the holder; the result maps each target that could be
/// disambiguated to its WordNet sense key. Targets the classifier has
/// no answer for are simply absent from the map.
pub trait SenseClassifier {
    fn disambiguate(
        &self,
        holder: &TextHolder,
        targets: &[usize],
    ) -> Result<HashMap<usize, String>>;
}

/// Dictionary lookups by sense key.
pub trait Lexicon {
    fn definition_of(&self, sense_key: &str) -> Option<String>;
    fn synonyms_of(&self, sense_key: &str) -> Vec<String>;
    fn pos_of(&self, sense_key: &str) -> Option<Pos>;
}

/// Object-safe entry point the service holds on to.
pub trait HintsEngine: Send + Sync {
    fn get_hints(&self, text: &str, difficulty: u32, avoid_repetitions: bool) -> Result<Vec<Hint>>;
}
