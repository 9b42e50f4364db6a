#![cfg_attr(docsrs, feature(doc_cfg))]
//! Tools for maintaining vocabulary word sets.
//!
//! All sets live in one master document (usually `words.json`):
//!
//! ```json
//! {
//!     "sets": [
//!         {
//!             "id": "verbs",
//!             "name": "Verbs",
//!             "description": "Common verbs",
//!             "words": [{"text": "run", "meaning": "koşmak"}]
//!         }
//!     ]
//! }
//! ```
//!
//! Two operations work on it:
//! - [`import::import_file`] merges `set_id | text | meaning` lines from a
//!   text file into the master document.
//! - [`split`] turns the master document into one file per set and a manifest
//!   describing all of them, ready to be served for download.

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

pub use crate::{
    collection::{Merge, SetIndex, Word, WordSet, WordSetCollection},
    config::ManifestConfig,
    errors::WordSetError,
    import::{ImportSummary, import_file},
    manifest::{Manifest, ManifestEntry, Split, split},
};

mod collection;
mod config;
pub mod errors;
pub mod import;
pub mod manifest;

/// Pretty-print `value` with the given indentation, leaving non-ASCII
/// characters unescaped.
fn to_pretty_json<T: Serialize + ?Sized>(
    value: &T,
    indent: &[u8],
) -> Result<Vec<u8>, serde_json::Error> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(indent);
    let mut serializer = Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    Ok(buf)
}
