use wordhints_types::UniversalPos;

/// One token as delivered by the dependency parser, before it is tied to
/// character offsets in the source text.
///
/// `head` is the index of the syntactic head within the same parse; the
/// parser marks roots by pointing them at themselves.
#[derive(Clone, Debug)]
pub struct ParsedToken {
    pub text: String,
    pub lemma: String,
    pub pos: UniversalPos,
    /// Fine-grained (Penn treebank) tag, e.g. `VBD` or `NNS`.
    pub tag: String,
    /// Dependency relation to the head, e.g. `prt` or `prep`.
    pub dep: String,
    pub head: usize,
    pub is_sent_start: bool,
}

impl ParsedToken {
    pub fn new(
        text: impl Into<String>,
        lemma: impl Into<String>,
        pos: UniversalPos,
        tag: impl Into<String>,
        dep: impl Into<String>,
        head: usize,
    ) -> Self {
        Self {
            text: text.into(),
            lemma: lemma.into(),
            pos,
            tag: tag.into(),
            dep: dep.into(),
            head,
            is_sent_start: false,
        }
    }

    pub fn sent_start(mut self) -> Self {
        self.is_sent_start = true;
        self
    }
}
