//! The hint pipeline: parse, flag phrasal verbs, pick hard words,
//! disambiguate them in one batch, then emit one hint per surviving
//! word.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, warn};
use wordhints_assets::{DifficultyRanking, PhrasalVerbSet, SimpleDefinitions};
use wordhints_types::Difficulty;

use crate::definitions::DefinitionResolver;
use crate::holder::TextHolder;
use crate::phrasal::flag_phrasal_verbs;
use crate::{HintsEngine, Lexicon, Parser, SenseClassifier};

/// One hint attached to a span of the input text. Positions are
/// character offsets, end exclusive.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Hint {
    pub word: String,
    pub start_position: usize,
    pub end_position: usize,
    pub definition: String,
    pub part_of_speech: String,
    pub difficulty_ranking: u32,
    pub sense_id: String,
}

/// Assembles hints from a parser, a sense classifier, a lexicon and the
/// shared lookup tables. The collaborators are generic so tests can
/// substitute fakes for the remote services.
pub struct HintsProvider<P, C, L> {
    parser: P,
    classifier: C,
    lexicon: L,
    ranking: Arc<DifficultyRanking>,
    phrasal_verbs: Arc<PhrasalVerbSet>,
    simple_definitions: Arc<SimpleDefinitions>,
}

impl<P, C, L> HintsProvider<P, C, L>
where
    P: Parser,
    C: SenseClassifier,
    L: Lexicon,
{
    pub fn new(
        parser: P,
        classifier: C,
        lexicon: L,
        ranking: Arc<DifficultyRanking>,
        phrasal_verbs: Arc<PhrasalVerbSet>,
        simple_definitions: Arc<SimpleDefinitions>,
    ) -> Self {
        Self {
            parser,
            classifier,
            lexicon,
            ranking,
            phrasal_verbs,
            simple_definitions,
        }
    }

    /// Hints for every hard word in `text`. A word that cannot be
    /// disambiguated, ranked or defined is silently skipped; it only
    /// loses its own hint.
    pub fn get_hints(
        &self,
        text: &str,
        difficulty: u32,
        avoid_repetitions: bool,
    ) -> Result<Vec<Hint>> {
        let parsed = self.parser.parse(text)?;
        let mut holder = TextHolder::new(text, parsed)?;
        flag_phrasal_verbs(&mut holder, &self.phrasal_verbs);

        let targets: Vec<usize> = holder
            .iter()
            .filter(|token| token.is_translatable())
            .filter(|token| {
                let Some(pos) = token.simple_pos() else {
                    return false;
                };
                self.ranking
                    .classify(None, token.lemma(), pos, difficulty)
                    == Difficulty::Hard
            })
            .map(|token| token.index())
            .collect();
        debug!("{} hard words out of {} tokens", targets.len(), holder.len());

        // One classifier round trip for the whole text. Classifier
        // failure costs the senses, not the request.
        let senses = match self.classifier.disambiguate(&holder, &targets) {
            Ok(senses) => senses,
            Err(err) => {
                warn!("sense classification failed: {err:#}");
                HashMap::new()
            }
        };

        let resolver =
            DefinitionResolver::new(&self.simple_definitions, &self.ranking, &self.lexicon);
        let mut hints = Vec::new();
        let mut seen: HashSet<(String, String)> = HashSet::new();
        for &index in &targets {
            let token = holder.token(index);
            let Some(sense) = senses.get(&index) else {
                continue;
            };
            let repetition_key = (token.lemma().to_lowercase(), token.tag().to_string());
            if avoid_repetitions && seen.contains(&repetition_key) {
                continue;
            }
            let Some(pos) = token.simple_pos() else {
                continue;
            };
            let Some(rank) = self.ranking.score(Some(sense.as_str()), token.lemma(), pos) else {
                continue;
            };
            let Some(definition) = resolver.definition_for(token, sense) else {
                continue;
            };
            hints.push(Hint {
                word: token.text_extended(),
                start_position: token.start(),
                end_position: token.end_extended()?,
                definition,
                part_of_speech: token.tag().to_string(),
                difficulty_ranking: rank,
                sense_id: sense.clone(),
            });
            seen.insert(repetition_key);
        }
        Ok(hints)
    }
}

impl<P, C, L> HintsEngine for HintsProvider<P, C, L>
where
    P: Parser + Send + Sync,
    C: SenseClassifier + Send + Sync,
    L: Lexicon + Send + Sync,
{
    fn get_hints(&self, text: &str, difficulty: u32, avoid_repetitions: bool) -> Result<Vec<Hint>> {
        HintsProvider::get_hints(self, text, difficulty, avoid_repetitions)
    }
}
