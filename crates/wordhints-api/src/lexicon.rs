use std::sync::Arc;

use wordhints_core::Lexicon;
use wordhints_types::Pos;
use wordhints_wordnet::WordNetLexicon;

/// Plugs the WordNet reader into the pipeline's dictionary seam.
#[derive(Clone)]
pub struct WordNetDictionary {
    lexicon: Arc<WordNetLexicon>,
}

impl WordNetDictionary {
    pub fn new(lexicon: Arc<WordNetLexicon>) -> Self {
        Self { lexicon }
    }
}

impl Lexicon for WordNetDictionary {
    fn definition_of(&self, sense_key: &str) -> Option<String> {
        self.lexicon.definition_of(sense_key)
    }

    fn synonyms_of(&self, sense_key: &str) -> Vec<String> {
        self.lexicon.synonyms_of(sense_key)
    }

    fn pos_of(&self, sense_key: &str) -> Option<Pos> {
        self.lexicon.pos_of(sense_key)
    }
}
