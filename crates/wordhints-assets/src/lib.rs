//! Load the delimited text assets the hint pipeline needs at startup.
//!
//! Four assets exist, all read exactly once per process and shared
//! read-only across requests afterwards:
//!
//! - a sense-annotated frequency ranking (`key|lemma|pos`, one row per
//!   sense, row order is the rank) feeding [`DifficultyRanking`];
//! - a naive frequency word list (one word per line, line order is the
//!   rank), the last fallback layer of [`DifficultyRanking`];
//! - the phrasal-verb idiom list (`lemma particle [preposition]` phrases,
//!   one per line) behind [`PhrasalVerbSet`];
//! - pre-simplified definitions (`key|simple_definition|original_definition`)
//!   behind [`SimpleDefinitions`].
//!
//! Loading fails fast on a missing or malformed file; the service must
//! never come up with a partially loaded table.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::info;
use wordhints_types::{Difficulty, Pos};

const SENSE_RANKING_HEADER: &str = "key|lemma|pos";
const SIMPLE_DEFINITIONS_HEADER: &str = "key|simple_definition|original_definition";

/// Three-layer difficulty lookup: sense key, then `(lemma, pos)`, then
/// bare lemma. Lower rank means more common.
#[derive(Debug, Default)]
pub struct DifficultyRanking {
    by_sense_key: HashMap<String, u32>,
    by_lemma_pos: HashMap<(String, Pos), u32>,
    by_lemma: HashMap<String, u32>,
}

impl DifficultyRanking {
    /// Build the ranking from the sense-annotated ranking file and the
    /// naive frequency word list.
    pub fn load(sense_ranking_path: &Path, wordlist_path: &Path) -> Result<Self> {
        let mut ranking = Self::default();

        let sense_text = fs::read_to_string(sense_ranking_path)
            .with_context(|| format!("read {}", sense_ranking_path.display()))?;
        let mut lines = sense_text.lines().enumerate();
        match lines.next() {
            Some((_, header)) if header.trim() == SENSE_RANKING_HEADER => {}
            _ => bail!(
                "{}: expected header `{SENSE_RANKING_HEADER}`",
                sense_ranking_path.display()
            ),
        }
        let mut rank = 0u32;
        for (lineno, line) in lines {
            if line.trim().is_empty() {
                continue;
            }
            let mut fields = line.splitn(3, '|');
            let (Some(key), Some(lemma), Some(pos_field)) =
                (fields.next(), fields.next(), fields.next())
            else {
                bail!(
                    "{}:{} malformed ranking row (expected key|lemma|pos)",
                    sense_ranking_path.display(),
                    lineno + 1
                );
            };
            let pos = pos_field
                .trim()
                .chars()
                .next()
                .and_then(Pos::from_char)
                .with_context(|| {
                    format!(
                        "{}:{} invalid pos `{}`",
                        sense_ranking_path.display(),
                        lineno + 1,
                        pos_field
                    )
                })?;
            ranking.insert_sense(key.trim(), rank);
            ranking.insert_lemma_pos(lemma.trim(), pos, rank);
            rank += 1;
        }

        let wordlist_text = fs::read_to_string(wordlist_path)
            .with_context(|| format!("read {}", wordlist_path.display()))?;
        let mut word_rank = 0u32;
        for line in wordlist_text.lines() {
            let word = line.trim();
            if word.is_empty() {
                continue;
            }
            ranking.insert_lemma(word, word_rank);
            word_rank += 1;
        }

        info!(
            "loaded difficulty ranking: {} senses, {} lemma/pos pairs, {} lemmas",
            ranking.by_sense_key.len(),
            ranking.by_lemma_pos.len(),
            ranking.by_lemma.len()
        );
        Ok(ranking)
    }

    /// Empty ranking, for incremental construction in tests and tooling.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn insert_sense(&mut self, sense_key: &str, rank: u32) {
        self.by_sense_key.insert(sense_key.to_string(), rank);
    }

    /// First-seen rank wins for a `(lemma, pos)` pair.
    pub fn insert_lemma_pos(&mut self, lemma: &str, pos: Pos, rank: u32) {
        self.by_lemma_pos
            .entry((lemma.to_lowercase(), pos))
            .or_insert(rank);
    }

    /// First-seen rank wins for a bare lemma.
    pub fn insert_lemma(&mut self, lemma: &str, rank: u32) {
        self.by_lemma.entry(lemma.to_lowercase()).or_insert(rank);
    }

    /// Resolve a rank, trying the sense key, then `(lemma, pos)`, then
    /// the bare lemma. `None` means the word is unknown to every layer.
    pub fn score(&self, sense_key: Option<&str>, lemma: &str, pos: Pos) -> Option<u32> {
        if let Some(key) = sense_key
            && let Some(rank) = self.by_sense_key.get(key)
        {
            return Some(*rank);
        }
        let lemma = lemma.to_lowercase();
        if let Some(rank) = self.by_lemma_pos.get(&(lemma.clone(), pos)) {
            return Some(*rank);
        }
        self.by_lemma.get(&lemma).copied()
    }

    /// Classify a word against a threshold. Harder than the threshold
    /// means worth hinting; unknown words are never hinted.
    pub fn classify(
        &self,
        sense_key: Option<&str>,
        lemma: &str,
        pos: Pos,
        threshold: u32,
    ) -> Difficulty {
        match self.score(sense_key, lemma, pos) {
            Some(rank) if rank > threshold => Difficulty::Hard,
            Some(_) => Difficulty::Easy,
            None => Difficulty::Unknown,
        }
    }
}

/// Closed set of known multi-word verb idioms, lowercased
/// (`"give up"`, `"look after"`, `"get around to"`).
#[derive(Debug, Default)]
pub struct PhrasalVerbSet {
    phrases: HashSet<String>,
}

impl PhrasalVerbSet {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        let phrases: HashSet<String> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_lowercase)
            .collect();
        if phrases.is_empty() {
            bail!("{}: phrasal verb list is empty", path.display());
        }
        info!("loaded {} phrasal verbs", phrases.len());
        Ok(Self { phrases })
    }

    pub fn from_phrases<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            phrases: phrases.into_iter().map(|p| p.into().to_lowercase()).collect(),
        }
    }

    pub fn contains(&self, phrase: &str) -> bool {
        self.phrases.contains(phrase)
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }
}

/// Pre-simplified definitions keyed by sense identifier.
#[derive(Debug, Default)]
pub struct SimpleDefinitions {
    by_sense_key: HashMap<String, String>,
}

impl SimpleDefinitions {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        let mut lines = text.lines().enumerate();
        match lines.next() {
            Some((_, header)) if header.trim() == SIMPLE_DEFINITIONS_HEADER => {}
            _ => bail!(
                "{}: expected header `{SIMPLE_DEFINITIONS_HEADER}`",
                path.display()
            ),
        }
        let mut by_sense_key = HashMap::new();
        for (lineno, line) in lines {
            if line.trim().is_empty() {
                continue;
            }
            let mut fields = line.splitn(3, '|');
            let (Some(key), Some(simple), Some(_original)) =
                (fields.next(), fields.next(), fields.next())
            else {
                bail!(
                    "{}:{} malformed definition row (expected {SIMPLE_DEFINITIONS_HEADER})",
                    path.display(),
                    lineno + 1
                );
            };
            by_sense_key.insert(key.trim().to_string(), clean_simple_definition(simple));
        }
        info!("loaded {} simplified definitions", by_sense_key.len());
        Ok(Self { by_sense_key })
    }

    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            by_sense_key: entries
                .into_iter()
                .map(|(k, v)| (k.into(), clean_simple_definition(&v.into())))
                .collect(),
        }
    }

    pub fn get(&self, sense_key: &str) -> Option<&str> {
        self.by_sense_key.get(sense_key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_sense_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_sense_key.is_empty()
    }
}

/// Some rows carry a `headword = definition` form; keep only the part
/// after the final ` = `.
fn clean_simple_definition(raw: &str) -> String {
    match raw.rsplit_once(" = ") {
        Some((_, definition)) => definition.trim().to_string(),
        None => raw.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    fn write_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn sample_ranking() -> DifficultyRanking {
        let senses = write_file(
            "key|lemma|pos\n\
             be%2:42:03::|be|v\n\
             plant%1:03:00::|plant|n\n\
             plant%1:06:01::|plant|n\n",
        );
        let words = write_file("the\nbe\nplant\nplant\n");
        DifficultyRanking::load(senses.path(), words.path()).expect("load ranking")
    }

    #[test]
    fn sense_key_layer_wins_over_lemma_layers() {
        let ranking = sample_ranking();
        // The bare-lemma layer says rank 2, the sense layer rank 1.
        assert_eq!(ranking.score(None, "plant", Pos::Noun), Some(1));
        assert_eq!(
            ranking.score(Some("plant%1:03:00::"), "plant", Pos::Noun),
            Some(1)
        );
        assert_eq!(
            ranking.score(Some("plant%1:06:01::"), "plant", Pos::Noun),
            Some(2)
        );
    }

    #[test]
    fn lemma_pos_layer_is_first_seen_and_falls_back_to_bare_lemma() {
        let ranking = sample_ranking();
        // Two noun rows for "plant": the first one (rank 1) sticks.
        assert_eq!(ranking.score(None, "PLANT", Pos::Noun), Some(1));
        // No verb row for "plant": falls through to the word list.
        assert_eq!(ranking.score(None, "plant", Pos::Verb), Some(2));
        assert_eq!(ranking.score(None, "quixotic", Pos::Adj), None);
    }

    #[test]
    fn classify_distinguishes_unknown_from_easy() {
        let ranking = sample_ranking();
        assert_eq!(
            ranking.classify(None, "plant", Pos::Noun, 0),
            Difficulty::Hard
        );
        assert_eq!(
            ranking.classify(None, "plant", Pos::Noun, 1000),
            Difficulty::Easy
        );
        assert_eq!(
            ranking.classify(None, "quixotic", Pos::Adj, 1000),
            Difficulty::Unknown
        );
    }

    #[test]
    fn ranking_load_rejects_bad_header_and_rows() {
        let bad_header = write_file("lemma|key|pos\n");
        let words = write_file("the\n");
        assert!(DifficultyRanking::load(bad_header.path(), words.path()).is_err());

        let bad_row = write_file("key|lemma|pos\nbe%2:42:03::|be\n");
        assert!(DifficultyRanking::load(bad_row.path(), words.path()).is_err());

        let bad_pos = write_file("key|lemma|pos\nbe%2:42:03::|be|q\n");
        assert!(DifficultyRanking::load(bad_pos.path(), words.path()).is_err());
    }

    #[test]
    fn phrasal_verbs_are_lowercased_and_looked_up_verbatim() {
        let file = write_file("Give Up\nlook after\nget around to\n\n");
        let set = PhrasalVerbSet::load(file.path()).expect("load phrasal verbs");
        assert_eq!(set.len(), 3);
        assert!(set.contains("give up"));
        assert!(set.contains("get around to"));
        assert!(!set.contains("give in"));
    }

    #[test]
    fn empty_phrasal_verb_list_is_a_startup_error() {
        let file = write_file("\n\n");
        assert!(PhrasalVerbSet::load(file.path()).is_err());
    }

    #[test]
    fn simple_definitions_strip_headword_prefix() {
        let file = write_file(
            "key|simple_definition|original_definition\n\
             give_up%2:40:00::|give up = stop trying|cease an attempt\n\
             pie%1:13:00::|a baked dish|dish baked in pastry\n",
        );
        let defs = SimpleDefinitions::load(file.path()).expect("load definitions");
        assert_eq!(defs.get("give_up%2:40:00::"), Some("stop trying"));
        assert_eq!(defs.get("pie%1:13:00::"), Some("a baked dish"));
        assert_eq!(defs.get("missing%1:00:00::"), None);
    }

    #[test]
    fn equals_cleanup_keeps_text_after_final_separator() {
        assert_eq!(clean_simple_definition("a = b = c"), "c");
        assert_eq!(clean_simple_definition("plain text"), "plain text");
    }
}
