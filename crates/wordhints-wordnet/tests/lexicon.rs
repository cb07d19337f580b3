use std::fmt::Write as _;
use std::fs;

use tempfile::TempDir;
use wordhints_types::Pos;
use wordhints_wordnet::{LoadMode, WordNetLexicon};

/// Build a minimal dict directory. Synset offsets in `index.sense` must
/// be real byte offsets into the data file, so the file contents are
/// assembled line by line while tracking positions.
fn fake_dict() -> TempDir {
    let dir = TempDir::new().expect("temp dir");

    let mut data_verb = String::new();
    let verb_lines = [
        "00001740 29 v 01 get_around_to 0 001 @ 00002000 v 0000 01 + 02 00 \
         | do something despite obstacles such as lack of time; \
         \"he finally got around to cleaning the garage\"",
        "00002000 29 v 02 leave 0 depart 0 000 | go away from a place; \"leave the room\"",
    ];
    let mut verb_offsets = Vec::new();
    for line in verb_lines {
        verb_offsets.push(data_verb.len());
        writeln!(data_verb, "{line}").unwrap();
    }
    fs::write(dir.path().join("data.verb"), &data_verb).unwrap();

    let mut data_noun = String::new();
    let noun_line = "00004258 03 n 02 plant 0 flora 0 000 \
                     | (botany) a living organism lacking the power of locomotion";
    let noun_offset = data_noun.len();
    writeln!(data_noun, "{noun_line}").unwrap();
    fs::write(dir.path().join("data.noun"), &data_noun).unwrap();

    fs::write(dir.path().join("data.adj"), "").unwrap();
    fs::write(dir.path().join("data.adv"), "").unwrap();

    let index = format!(
        "get_around_to%2:30:00:: {} 1 0\n\
         leave%2:38:00:: {} 1 12\n\
         plant%1:03:00:: {} 1 6\n",
        verb_offsets[0], verb_offsets[1], noun_offset
    );
    fs::write(dir.path().join("index.sense"), index).unwrap();

    dir
}

#[test]
fn loads_and_resolves_senses_in_both_modes() {
    let dict = fake_dict();
    for mode in [LoadMode::Mmap, LoadMode::Owned] {
        let wn = WordNetLexicon::load(dict.path(), mode).expect("load lexicon");
        assert_eq!(wn.sense_count(), 3);
        assert!(wn.contains("leave%2:38:00::"));

        assert_eq!(
            wn.definition_of("get_around_to%2:30:00::").as_deref(),
            Some("do something despite obstacles such as lack of time")
        );
        assert_eq!(
            wn.definition_of("plant%1:03:00::").as_deref(),
            Some("(botany) a living organism lacking the power of locomotion")
        );
        assert_eq!(wn.definition_of("missing%1:03:00::"), None);

        assert_eq!(
            wn.synonyms_of("get_around_to%2:30:00::"),
            vec!["get around to".to_string()]
        );
        assert_eq!(
            wn.synonyms_of("leave%2:38:00::"),
            vec!["leave".to_string(), "depart".to_string()]
        );

        assert_eq!(wn.pos_of("plant%1:03:00::"), Some(Pos::Noun));
        assert_eq!(wn.pos_of("leave%2:38:00::"), Some(Pos::Verb));
        assert_eq!(wn.pos_of("missing%1:03:00::"), None);
    }
}

#[test]
fn missing_files_fail_fast() {
    let dir = TempDir::new().expect("temp dir");
    fs::write(dir.path().join("data.noun"), "").unwrap();
    let err = WordNetLexicon::load(dir.path(), LoadMode::Owned).unwrap_err();
    assert!(err.to_string().contains("missing required WordNet file"));
}

#[test]
fn malformed_sense_index_fails_fast() {
    let dict = fake_dict();
    fs::write(dict.path().join("index.sense"), "justakey\n").unwrap();
    assert!(WordNetLexicon::load(dict.path(), LoadMode::Owned).is_err());
}
