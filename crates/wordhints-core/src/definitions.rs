//! Turn a disambiguated sense into a learner-friendly definition.
//!
//! Resolution order: a hand-simplified definition when one exists for
//! the sense, otherwise the dictionary gloss shortened to its first
//! clause. A shortened gloss that is still long gets replaced by an easy
//! synonym from the same synset when one exists; failing that, the
//! shortened gloss is used as is. Phrasal verbs get their extended lemma
//! prepended so the learner sees which words the definition covers.

use wordhints_assets::{DifficultyRanking, SimpleDefinitions};

use crate::Lexicon;
use crate::holder::TokenRef;

/// Definitions longer than this are worth trading for an easy synonym.
pub const MAX_REASONABLE_DEFINITION_LEN: usize = 50;

/// A synonym only qualifies as "easy" below this frequency rank.
pub const EASY_SYNONYM_MAX_RANK: u32 = 300;

pub struct DefinitionResolver<'a> {
    simple: &'a SimpleDefinitions,
    ranking: &'a DifficultyRanking,
    lexicon: &'a dyn Lexicon,
}

impl<'a> DefinitionResolver<'a> {
    pub fn new(
        simple: &'a SimpleDefinitions,
        ranking: &'a DifficultyRanking,
        lexicon: &'a dyn Lexicon,
    ) -> Self {
        Self {
            simple,
            ranking,
            lexicon,
        }
    }

    /// Best definition for a token's sense, or `None` when neither the
    /// simplified store nor the lexicon knows the sense.
    pub fn definition_for(&self, token: TokenRef<'_>, sense_key: &str) -> Option<String> {
        if let Some(simple) = self.simple.get(sense_key) {
            return Some(self.with_phrasal_prefix(token, simple.to_string()));
        }

        let gloss = self.lexicon.definition_of(sense_key)?;
        let shortened = shorten_definition(&gloss);
        if shortened.chars().count() <= MAX_REASONABLE_DEFINITION_LEN {
            return Some(self.with_phrasal_prefix(token, shortened));
        }

        if let Some(pos) = self.lexicon.pos_of(sense_key) {
            for synonym in self.lexicon.synonyms_of(sense_key) {
                if synonym.to_lowercase() == token.lemma().to_lowercase() {
                    continue;
                }
                if let Some(rank) = self.ranking.score(None, &synonym, pos)
                    && rank <= EASY_SYNONYM_MAX_RANK
                {
                    return Some(self.with_phrasal_prefix(token, synonym));
                }
            }
        }
        Some(self.with_phrasal_prefix(token, shortened))
    }

    fn with_phrasal_prefix(&self, token: TokenRef<'_>, definition: String) -> String {
        if matches!(token.is_phrasal_base_verb(), Ok(true)) {
            format!("{} = {definition}", token.lemma_extended())
        } else {
            definition
        }
    }
}

/// Shorten a dictionary gloss: drop parenthesized asides, cut at the
/// first top-level semicolon, and collapse the doubled spaces that
/// removing an aside leaves behind.
pub fn shorten_definition(definition: &str) -> String {
    let mut kept = String::with_capacity(definition.len());
    let mut depth = 0usize;
    for ch in definition.chars() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ';' if depth == 0 => break,
            _ if depth == 0 => kept.push(ch),
            _ => {}
        }
    }

    let mut out = String::with_capacity(kept.len());
    let mut previous_was_space = false;
    for ch in kept.chars() {
        if ch == ' ' {
            if !previous_was_space {
                out.push(ch);
            }
            previous_was_space = true;
        } else {
            out.push(ch);
            previous_was_space = false;
        }
    }
    out.trim().to_string()
}
