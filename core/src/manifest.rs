//! Splitting a [`WordSetCollection`] into one file per set, plus a manifest
//! describing all of them.
use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::NaiveDate;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{
    ManifestConfig,
    collection::{Word, WordSet, WordSetCollection},
    errors::WordSetError,
    to_pretty_json,
};

/// Set files and the manifest are written with 2-space indentation.
const OUTPUT_INDENT: &[u8] = b"  ";

/// Directory, relative to the output directory, that set files go in.
pub const SETS_DIR: &str = "sets";
/// File name of the manifest, relative to the output directory.
pub const MANIFEST_FILE: &str = "sets.json";

/// The contents of `sets/<id>.json`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetFile<'a> {
    /// The set's id.
    pub set_id: &'a str,
    /// [`ManifestConfig::version`].
    pub version: &'a str,
    /// The set's words.
    pub words: &'a [Word],
}

/// A set as described by the manifest, without its words.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    /// The set's id.
    pub id: String,
    /// The set's name.
    pub name: String,
    /// The set's description.
    pub description: String,
    /// The set's icon, or [`ManifestConfig::default_icon`].
    pub icon: String,
    /// Display label of the set's category.
    pub category: String,
    /// The set's difficulty, or [`ManifestConfig::default_difficulty`].
    pub difficulty: String,
    /// How many words the set file contains.
    pub word_count: usize,
    /// Size of the set file, e.g. `"1.5 KB"`.
    pub size: String,
    /// Where the set file can be downloaded from.
    pub url: String,
    /// [`ManifestConfig::version`].
    pub version: String,
}

impl ManifestEntry {
    fn new(set: &WordSet, file_len: usize, config: &ManifestConfig) -> Self {
        let category_key = set.category().unwrap_or(set.id());
        ManifestEntry {
            id: set.id().to_owned(),
            name: set.name().to_owned(),
            description: set.description().to_owned(),
            icon: set
                .icon()
                .unwrap_or(config.default_icon.as_str())
                .to_owned(),
            category: config.resolve_category(category_key),
            difficulty: set
                .difficulty()
                .unwrap_or(config.default_difficulty.as_str())
                .to_owned(),
            word_count: set.words.len(),
            size: format_size(file_len),
            url: config.set_url(set.id()),
            version: config.version.clone(),
        }
    }
}

/// The contents of `sets.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// [`ManifestConfig::version`].
    pub version: String,
    /// When the manifest was generated, serialized as `YYYY-MM-DD`.
    pub last_updated: NaiveDate,
    /// One entry per set, in collection order.
    pub sets: Vec<ManifestEntry>,
}

/// Every output file of a split, serialized and ready to write.
///
/// Returned by [`split`].
#[derive(Debug)]
pub struct Split {
    set_files: Vec<(String, Vec<u8>)>,
    manifest: Manifest,
    manifest_bytes: Vec<u8>,
}

impl Split {
    /// The manifest.
    #[inline]
    #[must_use]
    pub const fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Iterate through set ids and the serialized contents of their files.
    pub fn set_files(&self) -> impl ExactSizeIterator<Item = (&str, &[u8])> {
        self.set_files
            .iter()
            .map(|(id, bytes)| (id.as_str(), bytes.as_slice()))
    }

    /// Write every set file into `<out_dir>/sets/`, then the manifest to
    /// `<out_dir>/sets.json`.
    ///
    /// Existing files are overwritten. Returns the path of the manifest.
    pub fn write_to(
        &self,
        out_dir: impl AsRef<Path>,
    ) -> Result<PathBuf, WordSetError> {
        let out_dir = out_dir.as_ref();
        let sets_dir = out_dir.join(SETS_DIR);
        fs::create_dir_all(&sets_dir).map_err(|io_err| {
            WordSetError::FailedToWrite(sets_dir.clone(), io_err)
        })?;

        self.set_files.iter().try_for_each(|(id, bytes)| {
            let path = sets_dir.join(format!("{id}.json"));
            write(&path, bytes)?;
            info!("created {}", path.display());
            Ok::<_, WordSetError>(())
        })?;

        let manifest_path = out_dir.join(MANIFEST_FILE);
        write(&manifest_path, &self.manifest_bytes)?;
        info!(
            "created {} describing {} sets",
            manifest_path.display(),
            self.manifest.sets.len(),
        );
        Ok(manifest_path)
    }
}

fn write(path: &Path, bytes: &[u8]) -> Result<(), WordSetError> {
    fs::write(path, bytes)
        .map_err(|io_err| WordSetError::FailedToWrite(path.to_owned(), io_err))
}

/// Serialize every set in `collection` into its own file and describe them in
/// a manifest dated `date`.
///
/// Nothing is written to disk; see [`Split::write_to`]. Fails if any set's id
/// can't be used as a file name.
pub fn split(
    collection: &WordSetCollection,
    config: &ManifestConfig,
    date: NaiveDate,
) -> Result<Split, WordSetError> {
    let mut set_files = Vec::with_capacity(collection.sets.len());
    let mut entries = Vec::with_capacity(collection.sets.len());

    for set in &collection.sets {
        validate_set_id(set.id())?;
        let set_file = SetFile {
            set_id: set.id(),
            version: &config.version,
            words: &set.words,
        };
        let bytes = to_pretty_json(&set_file, OUTPUT_INDENT)?;
        debug!(
            "{}: {} words, {} bytes",
            set.id(),
            set.words.len(),
            bytes.len(),
        );
        entries.push(ManifestEntry::new(set, bytes.len(), config));
        set_files.push((set.id().to_owned(), bytes));
    }

    let manifest = Manifest {
        version: config.version.clone(),
        last_updated: date,
        sets: entries,
    };
    let manifest_bytes = to_pretty_json(&manifest, OUTPUT_INDENT)?;
    Ok(Split {
        set_files,
        manifest,
        manifest_bytes,
    })
}

fn validate_set_id(id: &str) -> Result<(), WordSetError> {
    let usable = !id.is_empty()
        && id != "."
        && id != ".."
        && !id.contains(['/', '\\']);
    if usable {
        Ok(())
    } else {
        Err(WordSetError::InvalidSetId(id.to_owned()))
    }
}

/// Format a byte count as kilobytes to one decimal place.
fn format_size(bytes: usize) -> String {
    format!("{:.1} KB", bytes as f64 / 1024.0)
}
