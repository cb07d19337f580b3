//! Sense-key lexicon backed by WordNet dictionary files.
//!
//! Unlike a full WordNet reader, the only query this crate answers is
//! "given a sense key, what are the definition, the synonyms and the part
//! of speech". `index.sense` is parsed eagerly into a map from sense key
//! to the byte offset of its synset line; the `data.*` files are kept as
//! raw buffers (memory-mapped by default) and the synset line is parsed
//! on demand when a sense is looked up.
//!
//! Construction fails fast on missing or unreadable files; lookups on an
//! unknown or malformed sense return `None` instead of erroring, since a
//! missing sense only suppresses one hint.
//!
//! ```no_run
//! use wordhints_wordnet::{LoadMode, WordNetLexicon};
//!
//! # fn main() -> anyhow::Result<()> {
//! let wn = WordNetLexicon::load("/path/to/dict", LoadMode::Mmap)?;
//! if let Some(def) = wn.definition_of("plant%1:03:00::") {
//!     println!("{def}");
//! }
//! # Ok(()) }
//! ```

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use memmap2::Mmap;
use wordhints_types::Pos;

/// Strategy for loading dictionary files.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LoadMode {
    /// Memory-map each data file (fast, zero-copy).
    Mmap,
    /// Read each file into an owned buffer (portable fallback).
    Owned,
}

#[derive(Debug)]
enum Buffer {
    Mmap(Mmap),
    Owned(Vec<u8>),
}

impl Buffer {
    fn as_slice(&self) -> &[u8] {
        match self {
            Buffer::Mmap(m) => m.as_ref(),
            Buffer::Owned(v) => v.as_slice(),
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct SenseEntry {
    pos: Pos,
    offset: usize,
}

/// Lexicon over a WordNet `dict` directory.
#[derive(Debug)]
pub struct WordNetLexicon {
    data_noun: Buffer,
    data_verb: Buffer,
    data_adj: Buffer,
    data_adv: Buffer,
    senses: HashMap<String, SenseEntry>,
}

impl WordNetLexicon {
    /// Load from a directory containing `data.*` files and `index.sense`.
    pub fn load(dict_dir: impl AsRef<Path>, mode: LoadMode) -> Result<Self> {
        let dir = dict_dir.as_ref();
        for name in [
            "data.noun",
            "data.verb",
            "data.adj",
            "data.adv",
            "index.sense",
        ] {
            let path = dir.join(name);
            if !path.exists() {
                bail!("missing required WordNet file: {}", path.display());
            }
        }

        let data_noun = load_file(dir.join("data.noun"), mode)?;
        let data_verb = load_file(dir.join("data.verb"), mode)?;
        let data_adj = load_file(dir.join("data.adj"), mode)?;
        let data_adv = load_file(dir.join("data.adv"), mode)?;

        let index_path = dir.join("index.sense");
        let index = std::fs::read_to_string(&index_path)
            .with_context(|| format!("read {}", index_path.display()))?;
        let senses = parse_sense_index(&index, &index_path)?;

        Ok(Self {
            data_noun,
            data_verb,
            data_adj,
            data_adv,
            senses,
        })
    }

    /// Number of sense keys indexed.
    pub fn sense_count(&self) -> usize {
        self.senses.len()
    }

    /// Whether a sense key is known to this lexicon.
    pub fn contains(&self, sense_key: &str) -> bool {
        self.senses.contains_key(sense_key)
    }

    /// Dictionary POS of a sense, decoded from the key's `ss_type` field.
    pub fn pos_of(&self, sense_key: &str) -> Option<Pos> {
        self.senses.get(sense_key).map(|entry| entry.pos)
    }

    /// The sense's gloss with quoted usage examples removed.
    pub fn definition_of(&self, sense_key: &str) -> Option<String> {
        let (_, gloss) = self.synset_fields(sense_key)?;
        let definition = gloss.split('"').next().unwrap_or("");
        let definition = definition.trim().trim_end_matches(';').trim_end();
        if definition.is_empty() {
            None
        } else {
            Some(definition.to_string())
        }
    }

    /// All lemmas of the sense's synset, with underscores turned into
    /// spaces for display.
    pub fn synonyms_of(&self, sense_key: &str) -> Vec<String> {
        match self.synset_fields(sense_key) {
            Some((words, _)) => words
                .into_iter()
                .map(|word| word.replace('_', " "))
                .collect(),
            None => Vec::new(),
        }
    }

    fn data(&self, pos: Pos) -> &[u8] {
        match pos {
            Pos::Noun => self.data_noun.as_slice(),
            Pos::Verb => self.data_verb.as_slice(),
            Pos::Adj => self.data_adj.as_slice(),
            Pos::Adv => self.data_adv.as_slice(),
        }
    }

    /// Slice the synset line out of the data file and split it into the
    /// synset's words and its gloss.
    fn synset_fields(&self, sense_key: &str) -> Option<(Vec<&str>, &str)> {
        let entry = self.senses.get(sense_key)?;
        let bytes = self.data(entry.pos);
        let rest = bytes.get(entry.offset..)?;
        let line_end = rest
            .iter()
            .position(|b| *b == b'\n')
            .unwrap_or(rest.len());
        let line = std::str::from_utf8(&rest[..line_end]).ok()?;
        parse_synset_line(line)
    }
}

fn load_file(path: PathBuf, mode: LoadMode) -> Result<Buffer> {
    match mode {
        LoadMode::Mmap => {
            let file = File::open(&path).with_context(|| format!("open {}", path.display()))?;
            unsafe { Mmap::map(&file) }
                .map(Buffer::Mmap)
                .with_context(|| format!("mmap {}", path.display()))
        }
        LoadMode::Owned => {
            let mut file = File::open(&path).with_context(|| format!("open {}", path.display()))?;
            let mut buf = Vec::new();
            file.read_to_end(&mut buf)
                .with_context(|| format!("read {}", path.display()))?;
            Ok(Buffer::Owned(buf))
        }
    }
}

/// `index.sense` lines: `sense_key synset_offset sense_number tag_cnt`.
fn parse_sense_index(text: &str, path: &Path) -> Result<HashMap<String, SenseEntry>> {
    let mut senses = HashMap::new();
    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim_end();
        if line.is_empty() || line.starts_with(' ') {
            continue;
        }
        let mut fields = line.split_ascii_whitespace();
        let (Some(key), Some(offset_field)) = (fields.next(), fields.next()) else {
            bail!("{}:{} malformed sense index line", path.display(), lineno + 1);
        };
        let pos = sense_key_pos(key).with_context(|| {
            format!(
                "{}:{} sense key has no valid ss_type: {key}",
                path.display(),
                lineno + 1
            )
        })?;
        let offset: usize = offset_field.parse().with_context(|| {
            format!("{}:{} invalid synset offset", path.display(), lineno + 1)
        })?;
        senses.insert(key.to_string(), SenseEntry { pos, offset });
    }
    Ok(senses)
}

/// Decode the POS from a sense key's `ss_type` digit
/// (`lemma%ss_type:lex_filenum:lex_id:head:head_id`).
pub fn sense_key_pos(sense_key: &str) -> Option<Pos> {
    let (_, rest) = sense_key.split_once('%')?;
    match rest.split(':').next()? {
        "1" => Some(Pos::Noun),
        "2" => Some(Pos::Verb),
        "3" | "5" => Some(Pos::Adj),
        "4" => Some(Pos::Adv),
        _ => None,
    }
}

/// Parse a `data.*` line: `offset lex_filenum ss_type w_cnt word lex_id
/// [word lex_id ...] ... | gloss`. Only the words and the gloss matter
/// here; pointer and frame blocks are skipped wholesale.
fn parse_synset_line(line: &str) -> Option<(Vec<&str>, &str)> {
    let (left, gloss) = match line.split_once('|') {
        Some((l, g)) => (l, g.trim()),
        None => (line, ""),
    };
    let mut tokens = left.split_ascii_whitespace();
    // offset, lex_filenum, ss_type
    tokens.next()?;
    tokens.next()?;
    tokens.next()?;
    let w_cnt = usize::from_str_radix(tokens.next()?, 16).ok()?;
    let mut words = Vec::with_capacity(w_cnt);
    for _ in 0..w_cnt {
        words.push(tokens.next()?);
        tokens.next()?; // lex_id
    }
    Some((words, gloss))
}
