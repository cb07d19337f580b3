//! Phrasal-verb detection over a dependency parse.
//!
//! Two backward passes over the tokens. The first pass collects particle
//! tokens (`dep == "prt"` headed by a verb) and hands each one to its
//! verb when the scan reaches it. The second pass does the same for
//! prepositions, but only when the preposition sits immediately after
//! the verb (or after its particle) and the resulting phrase is a known
//! idiom; bare verb+preposition pairs like "went to" are not phrasal
//! verbs, so the closed idiom list is the gatekeeper there.
//!
//! Scanning backward means every verb sees its candidates before the
//! scan reaches the verb itself, since attachments always follow their
//! base verb in English.

use wordhints_assets::PhrasalVerbSet;
use wordhints_types::UniversalPos;

use crate::holder::{PhrasalFlag, TextHolder};

/// Rewrite all phrasal flags on the holder. Safe to run repeatedly; the
/// flags are reset up front so the result only depends on the parse and
/// the idiom list.
pub fn flag_phrasal_verbs(holder: &mut TextHolder, idioms: &PhrasalVerbSet) {
    let len = holder.len();
    holder.reset_phrasal_flags();

    // Pass 1: particles.
    let mut candidates: Vec<usize> = Vec::new();
    for i in (0..len).rev() {
        let head = holder.tokens[i].head;
        if holder.tokens[i].dep == "prt" && holder.tokens[head].pos == UniversalPos::Verb {
            candidates.push(i);
        } else if holder.tokens[i].pos == UniversalPos::Verb
            && let Some(slot) = candidates
                .iter()
                .position(|&c| holder.tokens[c].head == i)
        {
            let particle = candidates.remove(slot);
            holder.attach_particle(i, particle);
        }
    }

    // Pass 2: prepositions, restricted to known idioms.
    let mut candidates: Vec<usize> = Vec::new();
    for i in (0..len).rev() {
        if holder.attached_to[i].is_some() {
            continue;
        }
        if is_preposition_candidate(holder, i, idioms) {
            candidates.push(i);
        } else if holder.tokens[i].pos == UniversalPos::Verb
            && let Some(slot) = candidates
                .iter()
                .position(|&c| holder.tokens[c].head == i)
        {
            let preposition = candidates.remove(slot);
            holder.attach_preposition(i, preposition);
        }
    }
}

/// A token extends a phrasal verb as a preposition when its head is a
/// verb, it sits immediately after that verb's particle (or after the
/// verb itself when there is none), and `lemma [particle] word` is a
/// known idiom.
fn is_preposition_candidate(holder: &TextHolder, i: usize, idioms: &PhrasalVerbSet) -> bool {
    let head = holder.tokens[i].head;
    if head == i || holder.tokens[head].pos != UniversalPos::Verb {
        return false;
    }
    let anchor = match holder.phrasal[head] {
        PhrasalFlag::Base {
            particle: Some(particle),
            ..
        } => particle,
        _ => head,
    };
    i == anchor + 1 && idioms.contains(&idiom_phrase(holder, head, i))
}

fn idiom_phrase(holder: &TextHolder, verb: usize, preposition: usize) -> String {
    let mut phrase = holder.tokens[verb].lemma.to_lowercase();
    if let PhrasalFlag::Base {
        particle: Some(particle),
        ..
    } = holder.phrasal[verb]
    {
        phrase.push(' ');
        phrase.push_str(&holder.tokens[particle].text.to_lowercase());
    }
    phrase.push(' ');
    phrase.push_str(&holder.tokens[preposition].text.to_lowercase());
    phrase
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::ParsedToken;

    fn tok(text: &str, lemma: &str, pos: UniversalPos, dep: &str, head: usize) -> ParsedToken {
        let tag = match pos {
            UniversalPos::Verb => "VBD",
            UniversalPos::Noun => "NN",
            _ => "XX",
        };
        ParsedToken::new(text, lemma, pos, tag, dep, head)
    }

    fn idioms() -> PhrasalVerbSet {
        PhrasalVerbSet::from_phrases(["give up", "get around to", "look after", "put up with"])
    }

    #[test]
    fn attaches_adjacent_particle() {
        // "He gave up smoking"
        let parsed = vec![
            tok("He", "he", UniversalPos::Other, "nsubj", 1),
            tok("gave", "give", UniversalPos::Verb, "ROOT", 1),
            tok("up", "up", UniversalPos::Other, "prt", 1),
            tok("smoking", "smoking", UniversalPos::Noun, "dobj", 1),
        ];
        let mut holder = TextHolder::new("He gave up smoking", parsed).expect("anchor");
        flag_phrasal_verbs(&mut holder, &idioms());

        let verb = holder.token(1);
        assert_eq!(verb.is_phrasal_base_verb().expect("flagged"), true);
        assert_eq!(verb.particle().expect("base").expect("particle").index(), 2);
        assert!(verb.preposition().expect("base").is_none());
        assert_eq!(verb.lemma_extended(), "give up");
        // Contiguous particle stretches the span to its end.
        assert_eq!(verb.end_extended().expect("end"), holder.token(2).end());
        assert!(holder.token(2).is_phrasal_attachment());
    }

    #[test]
    fn attaches_detached_particle() {
        // "She thought the issue over"
        let parsed = vec![
            tok("She", "she", UniversalPos::Other, "nsubj", 1),
            tok("thought", "think", UniversalPos::Verb, "ROOT", 1),
            tok("the", "the", UniversalPos::Other, "det", 3),
            tok("issue", "issue", UniversalPos::Noun, "dobj", 1),
            tok("over", "over", UniversalPos::Other, "prt", 1),
        ];
        let mut holder = TextHolder::new("She thought the issue over", parsed).expect("anchor");
        flag_phrasal_verbs(&mut holder, &idioms());

        let verb = holder.token(1);
        assert_eq!(verb.particle().expect("base").expect("particle").index(), 4);
        assert_eq!(verb.text_extended(), "thought over");
        // Detached particle keeps the span on the verb.
        assert_eq!(verb.end_extended().expect("end"), verb.end());
    }

    #[test]
    fn attaches_particle_then_preposition() {
        // "You should get around to it"
        let parsed = vec![
            tok("You", "you", UniversalPos::Other, "nsubj", 2),
            tok("should", "should", UniversalPos::Verb, "aux", 2),
            tok("get", "get", UniversalPos::Verb, "ROOT", 2),
            tok("around", "around", UniversalPos::Other, "prt", 2),
            tok("to", "to", UniversalPos::Other, "prep", 2),
            tok("it", "it", UniversalPos::Other, "pobj", 4),
        ];
        let mut holder = TextHolder::new("You should get around to it", parsed).expect("anchor");
        flag_phrasal_verbs(&mut holder, &idioms());

        let verb = holder.token(2);
        assert_eq!(verb.particle().expect("base").expect("particle").index(), 3);
        assert_eq!(
            verb.preposition().expect("base").expect("preposition").index(),
            4
        );
        assert_eq!(verb.lemma_extended(), "get around to");
        assert!(holder.token(4).is_phrasal_attachment());
    }

    #[test]
    fn unknown_verb_preposition_pairs_are_not_idioms() {
        // "He went to school": "go to" is not in the idiom list.
        let parsed = vec![
            tok("He", "he", UniversalPos::Other, "nsubj", 1),
            tok("went", "go", UniversalPos::Verb, "ROOT", 1),
            tok("to", "to", UniversalPos::Other, "prep", 1),
            tok("school", "school", UniversalPos::Noun, "pobj", 2),
        ];
        let mut holder = TextHolder::new("He went to school", parsed).expect("anchor");
        flag_phrasal_verbs(&mut holder, &idioms());

        assert_eq!(holder.token(1).is_phrasal_base_verb().expect("flagged"), false);
        assert!(!holder.token(2).is_phrasal_attachment());
    }

    #[test]
    fn known_idiom_preposition_attaches_without_particle() {
        // "She looks after the kids"
        let parsed = vec![
            tok("She", "she", UniversalPos::Other, "nsubj", 1),
            tok("looks", "look", UniversalPos::Verb, "ROOT", 1),
            tok("after", "after", UniversalPos::Other, "prep", 1),
            tok("kids", "kid", UniversalPos::Noun, "pobj", 2),
        ];
        let mut holder = TextHolder::new("She looks after kids", parsed).expect("anchor");
        flag_phrasal_verbs(&mut holder, &idioms());

        let verb = holder.token(1);
        assert!(verb.particle().expect("base").is_none());
        assert_eq!(
            verb.preposition().expect("base").expect("preposition").index(),
            2
        );
        assert_eq!(verb.lemma_extended(), "look after");
        // Contiguous preposition with no particle stretches the span to
        // the preposition's end.
        assert_eq!(verb.end_extended().expect("end"), holder.token(2).end());
    }

    #[test]
    fn detection_is_idempotent() {
        let parsed = vec![
            tok("He", "he", UniversalPos::Other, "nsubj", 1),
            tok("gave", "give", UniversalPos::Verb, "ROOT", 1),
            tok("up", "up", UniversalPos::Other, "prt", 1),
        ];
        let mut holder = TextHolder::new("He gave up", parsed).expect("anchor");
        let idioms = idioms();
        flag_phrasal_verbs(&mut holder, &idioms);
        flag_phrasal_verbs(&mut holder, &idioms);

        let verb = holder.token(1);
        assert_eq!(verb.particle().expect("base").expect("particle").index(), 2);
        assert!(verb.preposition().expect("base").is_none());
    }

    #[test]
    fn two_verbs_each_claim_their_own_particle() {
        // "He gave up and she gave in" (only "give up" is an idiom here,
        // but particles attach by dependency, not by the idiom list).
        let parsed = vec![
            tok("He", "he", UniversalPos::Other, "nsubj", 1),
            tok("gave", "give", UniversalPos::Verb, "ROOT", 1),
            tok("up", "up", UniversalPos::Other, "prt", 1),
            tok("and", "and", UniversalPos::Other, "cc", 1),
            tok("she", "she", UniversalPos::Other, "nsubj", 5),
            tok("gave", "give", UniversalPos::Verb, "conj", 1),
            tok("in", "in", UniversalPos::Other, "prt", 5),
        ];
        let mut holder =
            TextHolder::new("He gave up and she gave in", parsed).expect("anchor");
        flag_phrasal_verbs(&mut holder, &idioms());

        assert_eq!(
            holder.token(1).particle().expect("base").expect("particle").index(),
            2
        );
        assert_eq!(
            holder.token(5).particle().expect("base").expect("particle").index(),
            6
        );
    }
}
