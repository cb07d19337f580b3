//! A parsed text with per-token phrasal-verb state.
//!
//! [`TextHolder`] owns the raw text and its tokens, anchors every token
//! to character offsets, and tracks which verbs head a phrasal verb and
//! which tokens have been absorbed into one. Tokens are handed out as
//! cheap [`TokenRef`] handles; multi-token questions (the extended span,
//! the extended lemma) are answered there so the composition rules live
//! in one place.

use thiserror::Error;
use wordhints_types::{Pos, UniversalPos};

use crate::token::ParsedToken;

/// Errors detected while anchoring a parse to its source text.
#[derive(Debug, Error)]
pub enum HolderError {
    #[error("token {index}: head {head} out of range for {len} tokens")]
    HeadOutOfRange { index: usize, head: usize, len: usize },
    #[error("token {index}: text {text:?} not found in the source text")]
    TokenNotInText { index: usize, text: String },
}

/// Errors from reading phrasal state in the wrong order or off the wrong
/// token. Both indicate a pipeline bug, not bad input.
#[derive(Debug, Error)]
pub enum PhrasalStateError {
    #[error("token {0}: phrasal flags read before detection ran")]
    NotFlagged(usize),
    #[error("token {0}: not a phrasal base verb")]
    NotBaseVerb(usize),
}

/// Phrasal role of a single token. Every token starts [`Unset`]; the
/// detection pass rewrites all flags, so [`Unset`] surviving past it
/// means detection never ran.
///
/// [`Unset`]: PhrasalFlag::Unset
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum PhrasalFlag {
    Unset,
    /// Verb heading a phrasal verb; at least one of the two attachments
    /// is always present.
    Base {
        particle: Option<usize>,
        preposition: Option<usize>,
    },
    NotBase,
}

#[derive(Clone, Debug)]
pub(crate) struct Token {
    pub(crate) text: String,
    pub(crate) lemma: String,
    pub(crate) pos: UniversalPos,
    pub(crate) tag: String,
    pub(crate) dep: String,
    pub(crate) head: usize,
    pub(crate) is_sent_start: bool,
    /// Character offsets into the raw text, end exclusive.
    pub(crate) start: usize,
    pub(crate) end: usize,
}

/// A parsed text plus the phrasal-verb annotations layered on top.
pub struct TextHolder {
    raw: String,
    pub(crate) tokens: Vec<Token>,
    pub(crate) phrasal: Vec<PhrasalFlag>,
    /// For particles and prepositions that were absorbed into a phrasal
    /// verb, the index of the base verb that owns them.
    pub(crate) attached_to: Vec<Option<usize>>,
}

impl TextHolder {
    /// Anchor a parse to its source text. Fails if a head index is out
    /// of range or a token's text cannot be located left to right in
    /// the raw text.
    pub fn new(raw: &str, parsed: Vec<ParsedToken>) -> Result<Self, HolderError> {
        let len = parsed.len();
        let raw_chars: Vec<char> = raw.chars().collect();
        let mut tokens = Vec::with_capacity(len);
        let mut cursor = 0usize;
        for (index, token) in parsed.into_iter().enumerate() {
            if token.head >= len {
                return Err(HolderError::HeadOutOfRange {
                    index,
                    head: token.head,
                    len,
                });
            }
            let needle: Vec<char> = token.text.chars().collect();
            let start = find_chars(&raw_chars, &needle, cursor).ok_or_else(|| {
                HolderError::TokenNotInText {
                    index,
                    text: token.text.clone(),
                }
            })?;
            let end = start + needle.len();
            cursor = end;
            tokens.push(Token {
                text: token.text,
                lemma: token.lemma,
                pos: token.pos,
                tag: token.tag,
                dep: token.dep,
                head: token.head,
                is_sent_start: token.is_sent_start,
                start,
                end,
            });
        }
        Ok(Self {
            raw: raw.to_string(),
            phrasal: vec![PhrasalFlag::Unset; len],
            attached_to: vec![None; len],
            tokens,
        })
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn raw_text(&self) -> &str {
        &self.raw
    }

    /// Handle to the token at `index`. Panics if out of range.
    pub fn token(&self, index: usize) -> TokenRef<'_> {
        assert!(index < self.tokens.len(), "token index out of range");
        TokenRef { holder: self, index }
    }

    pub fn iter(&self) -> impl Iterator<Item = TokenRef<'_>> {
        (0..self.tokens.len()).map(|index| TokenRef { holder: self, index })
    }

    pub(crate) fn reset_phrasal_flags(&mut self) {
        self.phrasal.fill(PhrasalFlag::NotBase);
        self.attached_to.fill(None);
    }

    pub(crate) fn attach_particle(&mut self, verb: usize, particle: usize) {
        let preposition = match self.phrasal[verb] {
            PhrasalFlag::Base { preposition, .. } => preposition,
            _ => None,
        };
        self.phrasal[verb] = PhrasalFlag::Base {
            particle: Some(particle),
            preposition,
        };
        self.attached_to[particle] = Some(verb);
    }

    pub(crate) fn attach_preposition(&mut self, verb: usize, preposition: usize) {
        let particle = match self.phrasal[verb] {
            PhrasalFlag::Base { particle, .. } => particle,
            _ => None,
        };
        self.phrasal[verb] = PhrasalFlag::Base {
            particle,
            preposition: Some(preposition),
        };
        self.attached_to[preposition] = Some(verb);
    }
}

/// Search `haystack` for `needle` starting at char position `from`.
fn find_chars(haystack: &[char], needle: &[char], from: usize) -> Option<usize> {
    let last_start = haystack.len().checked_sub(needle.len())?;
    (from..=last_start).find(|&i| &haystack[i..i + needle.len()] == needle)
}

/// Cheap handle to one token inside a [`TextHolder`].
#[derive(Clone, Copy)]
pub struct TokenRef<'a> {
    holder: &'a TextHolder,
    index: usize,
}

impl<'a> TokenRef<'a> {
    fn tok(&self) -> &'a Token {
        &self.holder.tokens[self.index]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn text(&self) -> &'a str {
        &self.tok().text
    }

    pub fn lemma(&self) -> &'a str {
        &self.tok().lemma
    }

    pub fn pos(&self) -> UniversalPos {
        self.tok().pos
    }

    pub fn tag(&self) -> &'a str {
        &self.tok().tag
    }

    pub fn dep(&self) -> &'a str {
        &self.tok().dep
    }

    pub fn start(&self) -> usize {
        self.tok().start
    }

    pub fn end(&self) -> usize {
        self.tok().end
    }

    pub fn is_sent_start(&self) -> bool {
        self.tok().is_sent_start
    }

    pub fn head(&self) -> TokenRef<'a> {
        TokenRef {
            holder: self.holder,
            index: self.tok().head,
        }
    }

    pub fn is_verb(&self) -> bool {
        self.tok().pos == UniversalPos::Verb
    }

    /// Dictionary POS derived from the fine-grained tag; `None` for
    /// tags no dictionary entry can match (punctuation, pronouns, ...).
    pub fn simple_pos(&self) -> Option<Pos> {
        Pos::from_penn_tag(self.tag())
    }

    /// Whether this token was absorbed into some verb's phrasal verb.
    pub fn is_phrasal_attachment(&self) -> bool {
        self.holder.attached_to[self.index].is_some()
    }

    /// Whether this verb heads a phrasal verb. Errors if phrasal
    /// detection has not run on the holder yet.
    pub fn is_phrasal_base_verb(&self) -> Result<bool, PhrasalStateError> {
        match self.holder.phrasal[self.index] {
            PhrasalFlag::Unset => Err(PhrasalStateError::NotFlagged(self.index)),
            PhrasalFlag::Base { .. } => Ok(true),
            PhrasalFlag::NotBase => Ok(false),
        }
    }

    pub fn particle(&self) -> Result<Option<TokenRef<'a>>, PhrasalStateError> {
        match self.holder.phrasal[self.index] {
            PhrasalFlag::Unset => Err(PhrasalStateError::NotFlagged(self.index)),
            PhrasalFlag::NotBase => Err(PhrasalStateError::NotBaseVerb(self.index)),
            PhrasalFlag::Base { particle, .. } => Ok(particle.map(|index| TokenRef {
                holder: self.holder,
                index,
            })),
        }
    }

    pub fn preposition(&self) -> Result<Option<TokenRef<'a>>, PhrasalStateError> {
        match self.holder.phrasal[self.index] {
            PhrasalFlag::Unset => Err(PhrasalStateError::NotFlagged(self.index)),
            PhrasalFlag::NotBase => Err(PhrasalStateError::NotBaseVerb(self.index)),
            PhrasalFlag::Base { preposition, .. } => Ok(preposition.map(|index| TokenRef {
                holder: self.holder,
                index,
            })),
        }
    }

    /// Whether this token should be considered for a hint at all:
    /// it must map to a dictionary POS, not be a particle or preposition
    /// absorbed into a phrasal verb, and not be a proper noun.
    pub fn is_translatable(&self) -> bool {
        self.simple_pos().is_some()
            && !self.is_phrasal_attachment()
            && self.pos() != UniversalPos::ProperNoun
    }

    /// Surface form extended with the phrasal attachments, space joined
    /// regardless of how far apart the pieces sit in the text.
    pub fn text_extended(&self) -> String {
        self.extended(Token::text_field)
    }

    /// Lemma extended with the phrasal attachments' surface forms.
    pub fn lemma_extended(&self) -> String {
        self.extended(Token::lemma_field)
    }

    fn extended(&self, base_field: fn(&Token) -> &str) -> String {
        let mut out = base_field(self.tok()).to_string();
        if let PhrasalFlag::Base {
            particle,
            preposition,
        } = self.holder.phrasal[self.index]
        {
            if let Some(p) = particle {
                out.push(' ');
                out.push_str(&self.holder.tokens[p].text);
            }
            if let Some(p) = preposition {
                out.push(' ');
                out.push_str(&self.holder.tokens[p].text);
            }
        }
        out
    }

    /// End offset of the highlight span. The span only stretches over
    /// attachments that sit immediately after the base verb; a detached
    /// attachment ("think the issue *over*") keeps the span on the verb
    /// alone so the highlight never swallows unrelated words.
    pub fn end_extended(&self) -> Result<usize, PhrasalStateError> {
        let (particle, preposition) = match self.holder.phrasal[self.index] {
            PhrasalFlag::Unset => return Err(PhrasalStateError::NotFlagged(self.index)),
            PhrasalFlag::NotBase => return Ok(self.end()),
            PhrasalFlag::Base {
                particle,
                preposition,
            } => (particle, preposition),
        };
        let i = self.index;
        let end_of = |index: usize| self.holder.tokens[index].end;
        Ok(match (particle, preposition) {
            (Some(prt), Some(prep)) if prt == i + 1 && prep == prt + 1 => end_of(prep),
            (Some(prt), _) if prt == i + 1 => end_of(prt),
            (None, Some(prep)) if prep == i + 1 => end_of(prep),
            _ => self.end(),
        })
    }
}

impl Token {
    fn text_field(&self) -> &str {
        &self.text
    }

    fn lemma_field(&self) -> &str {
        &self.lemma
    }
}
