#![allow(missing_docs)]

use std::{fs, path::Path};

use serde_json::Value;

use tempfile::TempDir;
use wordsets::{
    WordSetCollection, WordSetError, import::SkipReason, import_file,
};

const MASTER: &str = r#"{
    "sets": [
        {
            "id": "A",
            "name": "Set A",
            "description": "first",
            "icon": "🔤",
            "words": [
                {
                    "text": "jump",
                    "meaning": "zıplamak"
                }
            ]
        },
        {
            "id": "B",
            "name": "Set B",
            "description": "second",
            "words": []
        }
    ]
}"#;

fn workspace(txt: &str) -> TempDir {
    let dir = tempfile::tempdir().expect("create temp dir");
    fs::write(dir.path().join("words.json"), MASTER).expect("write master");
    fs::write(dir.path().join("new.txt"), txt).expect("write txt");
    dir
}

fn master(dir: &Path) -> String {
    fs::read_to_string(dir.join("words.json")).expect("read master")
}

#[test]
fn import_updates_and_appends() {
    let dir = workspace("A | Jump | zıplamak atlamak\nA | Run | koşmak\n");
    let summary = import_file(
        dir.path().join("new.txt"),
        dir.path().join("words.json"),
        false,
    )
    .expect("import");

    assert_eq!(summary.added, 1);
    assert_eq!(summary.updated, 1);
    assert_eq!(summary.skipped_count(), 0);
    assert!(summary.written);

    let collection = WordSetCollection::load(dir.path().join("words.json"))
        .expect("reload master");
    let words = &collection.sets[0].words;
    assert_eq!(words.len(), 2);
    assert_eq!(words[0].text(), "jump");
    assert_eq!(words[0].meaning(), "zıplamak atlamak");
    assert_eq!(words[1].text(), "Run");
    assert_eq!(words[1].meaning(), "koşmak");
    assert_eq!(collection.sets[0].icon(), Some("🔤"));
}

#[test]
fn second_import_changes_nothing() {
    let dir = workspace("B | walk | yürümek\nA | jump | sıçramak\n");
    let txt = dir.path().join("new.txt");
    let words = dir.path().join("words.json");

    let first = import_file(&txt, &words, false).expect("first import");
    assert!(first.has_changes());
    let after_first = master(dir.path());

    let second = import_file(&txt, &words, false).expect("second import");
    assert_eq!(second.added, 0);
    assert_eq!(second.updated, 0);
    assert_eq!(second.unchanged, 2);
    assert_eq!(master(dir.path()), after_first);
}

#[test]
fn unchanged_import_leaves_the_file_alone() {
    let dir = workspace("# nothing new\n\nA | JUMP | zıplamak\nA | bad line\n");
    let summary = import_file(
        dir.path().join("new.txt"),
        dir.path().join("words.json"),
        false,
    )
    .expect("import");

    assert!(!summary.has_changes());
    assert!(!summary.written);
    assert_eq!(summary.skipped_count(), 1);
    assert_eq!(summary.skipped[0].line, 4);
    assert_eq!(summary.skipped[0].reason, SkipReason::Malformed);
    // Byte for byte, including the original formatting
    assert_eq!(master(dir.path()), MASTER);
}

#[test]
fn unknown_sets_are_skipped() {
    let dir = workspace("nouns | table | masa\nB | table | masa\n");
    let summary = import_file(
        dir.path().join("new.txt"),
        dir.path().join("words.json"),
        false,
    )
    .expect("import");

    assert_eq!(summary.added, 1);
    assert_eq!(
        summary.skipped[0].reason,
        SkipReason::UnknownSet(String::from("nouns")),
    );
    assert_eq!(summary.skipped[0].line, 1);
}

#[test]
fn dry_run_does_not_write() {
    let dir = workspace("A | Run | koşmak\n");
    let summary = import_file(
        dir.path().join("new.txt"),
        dir.path().join("words.json"),
        true,
    )
    .expect("import");

    assert_eq!(summary.added, 1);
    assert!(!summary.written);
    assert_eq!(master(dir.path()), MASTER);
}

#[test]
fn missing_master_is_reported_before_the_text_file() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let result = import_file(
        dir.path().join("also-missing.txt"),
        dir.path().join("words.json"),
        false,
    );
    match result {
        Err(WordSetError::MissingFile(path)) => {
            assert!(path.ends_with("words.json"))
        },
        other => panic!("expected a missing master document, got {other:?}"),
    }
}

#[test]
fn missing_text_file_leaves_master_untouched() {
    let dir = workspace("");
    let result = import_file(
        dir.path().join("missing.txt"),
        dir.path().join("words.json"),
        false,
    );
    match result {
        Err(WordSetError::MissingFile(path)) => {
            assert!(path.ends_with("missing.txt"))
        },
        other => panic!("expected a missing text file, got {other:?}"),
    }
    assert_eq!(master(dir.path()), MASTER);
}

#[test]
fn invalid_utf8_aborts_without_writing() {
    let dir = workspace("");
    fs::write(dir.path().join("new.txt"), b"A | Run | kos\nA | x | \xff\xfe\n")
        .expect("write txt");
    let result = import_file(
        dir.path().join("new.txt"),
        dir.path().join("words.json"),
        false,
    );
    assert!(matches!(result, Err(WordSetError::FailedToRead(..))));
    assert_eq!(master(dir.path()), MASTER);
}

#[test]
fn malformed_master_is_rejected() {
    let dir = workspace("A | Run | koşmak\n");
    fs::write(dir.path().join("words.json"), r#"{"collections": []}"#)
        .expect("write master");
    let result = import_file(
        dir.path().join("new.txt"),
        dir.path().join("words.json"),
        false,
    );
    assert!(matches!(result, Err(WordSetError::InvalidJson(..))));
}

#[test]
fn rewrite_keeps_key_order_and_nulls() {
    let dir = tempfile::tempdir().expect("create temp dir");
    fs::write(
        dir.path().join("words.json"),
        r#"{
            "sets": [{
                "words": [{"meaning": "zıplamak", "text": "jump"}],
                "id": "A",
                "name": "Set A",
                "description": "first",
                "icon": null,
                "category": null
            }]
        }"#,
    )
    .expect("write master");
    fs::write(dir.path().join("new.txt"), "A | run | koşmak\n")
        .expect("write txt");

    let summary = import_file(
        dir.path().join("new.txt"),
        dir.path().join("words.json"),
        false,
    )
    .expect("import");
    assert!(summary.written);

    let rewritten: Value =
        serde_json::from_str(&master(dir.path())).expect("parse master");
    let set = rewritten["sets"][0].as_object().expect("set object");
    assert_eq!(
        set.keys().map(String::as_str).collect::<Vec<_>>(),
        ["words", "id", "name", "description", "icon", "category"],
    );
    assert!(set["icon"].is_null());
    assert!(set["category"].is_null());
    let first_word = set["words"][0].as_object().expect("word object");
    assert_eq!(
        first_word.keys().map(String::as_str).collect::<Vec<_>>(),
        ["meaning", "text"],
    );
    assert_eq!(set["words"][1]["text"], "run");
}
