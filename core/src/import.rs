//! Merging `set_id | text | meaning` text files into a [`WordSetCollection`].
//!
//! Each non-blank, non-comment line names a set, a word and its meaning:
//!
//! ```text
//! # comments and blank lines are ignored
//! verbs | jump | zıplamak
//! verbs | run  | koşmak
//! ```
//!
//! Words are matched against the named set case-insensitively. New words are
//! appended, words with a different meaning are updated in place, and words
//! that are already present with the same meaning are left alone, so
//! importing the same file twice changes nothing the second time.
use std::{
    fmt,
    fs::File,
    io::{self, Read},
    path::Path,
};

use log::{debug, info, warn};

use crate::{
    collection::{Merge, WordSetCollection},
    errors::WordSetError,
};

const FIELD_SEPARATOR: char = '|';
const COMMENT_PREFIX: char = '#';

/// A single parsed line of an import file.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Line<'a> {
    /// Blank or a comment.
    Ignored,
    /// Fewer than three `|`-separated fields.
    Malformed,
    /// A word to merge into a set.
    Record {
        /// The id of the set to merge into.
        set_id: &'a str,
        /// The word.
        text: &'a str,
        /// Its meaning.
        meaning: &'a str,
    },
}

/// Split `text` into lines, ending a line at `\n`, `\r\n` or a lone `\r`.
fn lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n')
        .flat_map(|line| line.strip_suffix('\r').unwrap_or(line).split('\r'))
}

/// Parse one line of an import file.
///
/// Fields are trimmed. Anything after the third field is ignored.
#[must_use]
pub fn parse_line(line: &str) -> Line<'_> {
    let line = line.trim();
    if line.is_empty() || line.starts_with(COMMENT_PREFIX) {
        return Line::Ignored;
    }
    let mut fields = line.split(FIELD_SEPARATOR).map(str::trim);
    match (fields.next(), fields.next(), fields.next()) {
        (Some(set_id), Some(text), Some(meaning)) => Line::Record {
            set_id,
            text,
            meaning,
        },
        _ => Line::Malformed,
    }
}

/// Why a line was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The line didn't have three fields.
    Malformed,
    /// No set has this id.
    UnknownSet(String),
}

/// A line that couldn't be merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    /// 1-based line number.
    pub line: usize,
    /// Why it was skipped.
    pub reason: SkipReason,
}

impl fmt::Display for Skipped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            SkipReason::Malformed => write!(
                f,
                "line {}: invalid format (expected set_id | text | meaning)",
                self.line,
            ),
            SkipReason::UnknownSet(set_id) => {
                write!(f, "line {}: set id {set_id:?} not found", self.line)
            },
        }
    }
}

/// What an import did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Words appended to a set.
    pub added: usize,
    /// Words whose meaning was replaced.
    pub updated: usize,
    /// Words that were already present with the same meaning.
    pub unchanged: usize,
    /// Lines that couldn't be merged, in file order.
    pub skipped: Vec<Skipped>,
    /// Whether the master document was rewritten. Always `false` for a dry
    /// run or an import without changes.
    pub written: bool,
}

impl ImportSummary {
    /// Returns `true` if any word was added or updated.
    #[inline]
    #[must_use]
    pub const fn has_changes(&self) -> bool {
        self.added > 0 || self.updated > 0
    }

    /// Get how many lines were skipped.
    #[inline]
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    fn skip(&mut self, line: usize, reason: SkipReason) {
        let skipped = Skipped { line, reason };
        warn!("skipping {skipped}");
        self.skipped.push(skipped);
    }
}

/// Merge every line of `input` into `collection`.
///
/// Lines may end in `\n`, `\r\n` or `\r`.
///
/// Malformed lines and lines naming unknown sets are recorded in the
/// returned [`ImportSummary`] and don't stop the import. A read error does;
/// `collection` may then hold some of the merged words, so callers shouldn't
/// persist it.
pub fn merge(
    collection: &mut WordSetCollection,
    mut input: impl Read,
) -> Result<ImportSummary, io::Error> {
    let mut content = String::new();
    input.read_to_string(&mut content)?;
    let index = collection.index();
    let mut summary = ImportSummary::default();

    for (line_index, line) in lines(&content).enumerate() {
        let line_number = line_index + 1;
        let (set_id, text, meaning) = match parse_line(line) {
            Line::Ignored => continue,
            Line::Malformed => {
                summary.skip(line_number, SkipReason::Malformed);
                continue;
            },
            Line::Record {
                set_id,
                text,
                meaning,
            } => (set_id, text, meaning),
        };
        let Some(position) = index.get(set_id) else {
            summary
                .skip(line_number, SkipReason::UnknownSet(set_id.to_owned()));
            continue;
        };
        let set = &mut collection.sets[position];
        match set.upsert(text, meaning) {
            Merge::Added => {
                debug!("line {line_number}: added {text:?} to {set_id}");
                summary.added += 1;
            },
            Merge::Updated => {
                debug!("line {line_number}: updated {text:?} in {set_id}");
                summary.updated += 1;
            },
            Merge::Unchanged => summary.unchanged += 1,
        }
    }

    Ok(summary)
}

/// Import `txt_path` into the master document at `master_path`.
///
/// The master document is loaded first; if it's missing the text file is
/// never opened. All changes are held in memory and the master document is
/// only rewritten, in full, once the whole text file has been read and at
/// least one word was added or updated. With `dry_run` it is never written.
pub fn import_file(
    txt_path: impl AsRef<Path>,
    master_path: impl AsRef<Path>,
    dry_run: bool,
) -> Result<ImportSummary, WordSetError> {
    let txt_path = txt_path.as_ref();
    let master_path = master_path.as_ref();

    let mut collection = WordSetCollection::load(master_path)?;
    let txt_file = File::open(txt_path)
        .map_err(|io_err| WordSetError::read(txt_path, io_err))?;
    let mut summary = merge(&mut collection, txt_file).map_err(
        |io_err| WordSetError::FailedToRead(txt_path.to_owned(), io_err),
    )?;

    if !summary.has_changes() {
        info!("no changes made from {}", txt_path.display());
    } else if dry_run {
        info!("dry run, not writing {}", master_path.display());
    } else {
        collection.save(master_path)?;
        summary.written = true;
        info!("updated {}", master_path.display());
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::{Word, WordSet};

    fn collection() -> WordSetCollection {
        let mut a = WordSet::new("A", "A", "a");
        a.words.push(Word::new("jump", "zıplamak"));
        let b = WordSet::new("B", "B", "b");
        WordSetCollection::new(vec![a, b])
    }

    #[test]
    fn parse_line_ignores_blanks_and_comments() {
        assert_eq!(parse_line(""), Line::Ignored);
        assert_eq!(parse_line("   \t"), Line::Ignored);
        assert_eq!(parse_line("# A | x | y"), Line::Ignored);
        assert_eq!(parse_line("   # indented comment"), Line::Ignored);
    }

    #[test]
    fn parse_line_trims_fields() {
        assert_eq!(
            parse_line("  verbs |  run |koşmak  "),
            Line::Record {
                set_id: "verbs",
                text: "run",
                meaning: "koşmak",
            },
        );
    }

    #[test]
    fn parse_line_ignores_extra_fields() {
        assert_eq!(
            parse_line("a | b | c | d"),
            Line::Record {
                set_id: "a",
                text: "b",
                meaning: "c",
            },
        );
    }

    #[test]
    fn parse_line_needs_three_fields() {
        assert_eq!(parse_line("A | jump"), Line::Malformed);
        assert_eq!(parse_line("just words"), Line::Malformed);
        // Empty fields still count
        assert_eq!(
            parse_line("A | |"),
            Line::Record {
                set_id: "A",
                text: "",
                meaning: "",
            },
        );
    }

    #[test]
    fn merge_adds_and_updates() {
        let mut collection = collection();
        let input = "A | Jump | zıplamak atlamak\nA | Run | koşmak\n";
        let summary = merge(&mut collection, input.as_bytes()).unwrap();
        assert_eq!(summary.added, 1);
        assert_eq!(summary.updated, 1);
        assert_eq!(summary.skipped_count(), 0);
        assert_eq!(
            collection.sets[0].words,
            vec![
                Word::new("jump", "zıplamak atlamak"),
                Word::new("Run", "koşmak"),
            ],
        );
    }

    #[test]
    fn merge_reports_skipped_lines_with_line_numbers() {
        let mut collection = collection();
        let input = "# header\n\nA | only two\nZ | x | y\nB | x | y\n";
        let summary = merge(&mut collection, input.as_bytes()).unwrap();
        assert_eq!(summary.added, 1);
        assert_eq!(
            summary.skipped,
            vec![
                Skipped {
                    line: 3,
                    reason: SkipReason::Malformed,
                },
                Skipped {
                    line: 4,
                    reason: SkipReason::UnknownSet(String::from("Z")),
                },
            ],
        );
        assert_eq!(collection.sets[0].words.len(), 1);
    }

    #[test]
    fn merge_sees_earlier_lines_for_the_same_set() {
        let mut collection = collection();
        let input = "B | walk | yürümek\nB | Walk | yürümek\nB | WALK | gezmek";
        let summary = merge(&mut collection, input.as_bytes()).unwrap();
        assert_eq!(summary.added, 1);
        assert_eq!(summary.unchanged, 1);
        assert_eq!(summary.updated, 1);
        assert_eq!(collection.sets[1].words, vec![Word::new("walk", "gezmek")]);
    }

    #[test]
    fn merge_is_idempotent() {
        let mut collection = collection();
        let input = "A | Jump | zıplamak atlamak\nA | Run | koşmak\n";
        merge(&mut collection, input.as_bytes()).unwrap();
        let after_first = collection.clone();
        let summary = merge(&mut collection, input.as_bytes()).unwrap();
        assert!(!summary.has_changes());
        assert_eq!(summary.unchanged, 2);
        assert_eq!(collection, after_first);
    }

    #[test]
    fn lines_end_at_any_newline_style() {
        let text = "a\nb\r\nc\rd\r\re";
        assert_eq!(
            lines(text).collect::<Vec<_>>(),
            ["a", "b", "c", "d", "", "e"],
        );
    }

    #[test]
    fn merge_splits_classic_mac_line_endings() {
        let mut collection = collection();
        let input = "A | Run | koşmak\rA | Walk | yürümek\r";
        let summary = merge(&mut collection, input.as_bytes()).unwrap();
        assert_eq!(summary.added, 2);
        assert_eq!(collection.sets[0].words[1], Word::new("Run", "koşmak"));
        assert_eq!(collection.sets[0].words[2], Word::new("Walk", "yürümek"));
    }

    #[test]
    fn line_numbers_count_carriage_returns() {
        let mut collection = collection();
        let input = "# header\r\nA | x\rZ | a | b\n";
        let summary = merge(&mut collection, input.as_bytes()).unwrap();
        let lines: Vec<_> = summary.skipped.iter().map(|s| s.line).collect();
        assert_eq!(lines, [2, 3]);
    }

    #[test]
    fn skipped_lines_display_their_cause() {
        let unknown = Skipped {
            line: 7,
            reason: SkipReason::UnknownSet(String::from("nope")),
        };
        assert_eq!(unknown.to_string(), "line 7: set id \"nope\" not found");
    }
}
