use std::{
    collections::{HashMap, hash_map::Entry},
    fs,
    path::Path,
};

use log::{debug, warn};
use serde::{
    Deserialize, Serialize, Serializer, de::DeserializeOwned, ser::SerializeMap,
};
use serde_json::{Map, Value};

use crate::{
    errors::{ShapeError, WordSetError},
    to_pretty_json,
};

/// Master documents are written with 4-space indentation.
const DOCUMENT_INDENT: &[u8] = b"    ";

const TEXT: &str = "text";
const MEANING: &str = "meaning";
const ID: &str = "id";
const NAME: &str = "name";
const DESCRIPTION: &str = "description";
const ICON: &str = "icon";
const CATEGORY: &str = "category";
const DIFFICULTY: &str = "difficulty";
const WORDS: &str = "words";
const SETS: &str = "sets";

// Every object keeps its JSON fields as read, in order, so rewriting a
// document only changes what was actually edited. Lists of nested objects are
// moved out into typed fields; their key stays behind holding a placeholder.

fn require_str(
    fields: &Map<String, Value>,
    key: &'static str,
) -> Result<(), ShapeError> {
    match fields.get(key) {
        Some(Value::String(_)) => Ok(()),
        _ => Err(ShapeError::NotAString(key)),
    }
}

fn str_field<'a>(fields: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    fields.get(key).and_then(Value::as_str)
}

fn take_list<T: DeserializeOwned>(
    fields: &mut Map<String, Value>,
    key: &'static str,
) -> Result<Vec<T>, ShapeError> {
    let slot = fields.get_mut(key).ok_or(ShapeError::Missing(key))?;
    serde_json::from_value(slot.take())
        .map_err(|json_err| ShapeError::InvalidList(key, json_err))
}

fn serialize_with_list<S: Serializer, T: Serialize>(
    fields: &Map<String, Value>,
    key: &str,
    list: &[T],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(fields.len()))?;
    for (field, value) in fields {
        if field == key {
            map.serialize_entry(field, list)?;
        } else {
            map.serialize_entry(field, value)?;
        }
    }
    map.end()
}

/// A vocabulary entry: the word itself and what it means.
///
/// Any other fields the entry has in the master document are kept as they
/// are.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct Word {
    fields: Map<String, Value>,
}

impl TryFrom<Map<String, Value>> for Word {
    type Error = ShapeError;

    fn try_from(fields: Map<String, Value>) -> Result<Self, Self::Error> {
        require_str(&fields, TEXT)?;
        require_str(&fields, MEANING)?;
        Ok(Word { fields })
    }
}

impl Serialize for Word {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

impl Word {
    /// Create a new word with no additional fields.
    pub fn new(text: impl Into<String>, meaning: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert(TEXT.to_owned(), Value::String(text.into()));
        fields.insert(MEANING.to_owned(), Value::String(meaning.into()));
        Word { fields }
    }

    /// The word. Compared case-insensitively within a set.
    #[must_use]
    pub fn text(&self) -> &str {
        str_field(&self.fields, TEXT).unwrap_or_default()
    }

    /// The meaning. Compared case-sensitively.
    #[must_use]
    pub fn meaning(&self) -> &str {
        str_field(&self.fields, MEANING).unwrap_or_default()
    }

    fn set_meaning(&mut self, meaning: String) {
        self.fields.insert(MEANING.to_owned(), Value::String(meaning));
    }
}

/// A named, identified collection of words sharing a topic.
///
/// Fields other than the words are kept as read from the master document,
/// including ones this crate doesn't know about.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct WordSet {
    /// The words, in insertion order.
    pub words: Vec<Word>,
    fields: Map<String, Value>,
}

impl TryFrom<Map<String, Value>> for WordSet {
    type Error = ShapeError;

    fn try_from(mut fields: Map<String, Value>) -> Result<Self, Self::Error> {
        require_str(&fields, ID)?;
        require_str(&fields, NAME)?;
        require_str(&fields, DESCRIPTION)?;
        let words = take_list(&mut fields, WORDS)?;
        Ok(WordSet { words, fields })
    }
}

impl Serialize for WordSet {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serialize_with_list(&self.fields, WORDS, &self.words, serializer)
    }
}

/// What [`WordSet::upsert`] did.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Merge {
    /// No word with that text existed, so it was appended.
    Added,
    /// A word with that text existed with a different meaning, which has been
    /// replaced.
    Updated,
    /// The word already existed with exactly that meaning.
    Unchanged,
}

impl WordSet {
    /// Create an empty set with no optional fields.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        let mut fields = Map::new();
        fields.insert(ID.to_owned(), Value::String(id.into()));
        fields.insert(NAME.to_owned(), Value::String(name.into()));
        fields
            .insert(DESCRIPTION.to_owned(), Value::String(description.into()));
        fields.insert(WORDS.to_owned(), Value::Null);
        WordSet {
            words: Vec::new(),
            fields,
        }
    }

    /// Unique within a [`WordSetCollection`].
    #[must_use]
    pub fn id(&self) -> &str {
        str_field(&self.fields, ID).unwrap_or_default()
    }

    /// Human-readable name.
    #[must_use]
    pub fn name(&self) -> &str {
        str_field(&self.fields, NAME).unwrap_or_default()
    }

    /// Human-readable description.
    #[must_use]
    pub fn description(&self) -> &str {
        str_field(&self.fields, DESCRIPTION).unwrap_or_default()
    }

    /// Icon shown next to the set, usually an emoji.
    ///
    /// `None` if absent, `null`, or not a string.
    #[must_use]
    pub fn icon(&self) -> Option<&str> {
        str_field(&self.fields, ICON)
    }

    /// Category key, looked up in
    /// [`ManifestConfig::categories`](crate::ManifestConfig::categories).
    #[must_use]
    pub fn category(&self) -> Option<&str> {
        str_field(&self.fields, CATEGORY)
    }

    /// Difficulty label.
    #[must_use]
    pub fn difficulty(&self) -> Option<&str> {
        str_field(&self.fields, DIFFICULTY)
    }

    /// Set the icon.
    pub fn set_icon(&mut self, icon: impl Into<String>) {
        self.fields.insert(ICON.to_owned(), Value::String(icon.into()));
    }

    /// Set the category key.
    pub fn set_category(&mut self, category: impl Into<String>) {
        self.fields
            .insert(CATEGORY.to_owned(), Value::String(category.into()));
    }

    /// Set the difficulty label.
    pub fn set_difficulty(&mut self, difficulty: impl Into<String>) {
        self.fields
            .insert(DIFFICULTY.to_owned(), Value::String(difficulty.into()));
    }

    /// Find the word whose text matches `text`, ignoring case.
    #[must_use]
    pub fn find_word(&self, text: &str) -> Option<&Word> {
        self.position_of(text).map(|index| &self.words[index])
    }

    fn position_of(&self, text: &str) -> Option<usize> {
        let needle = text.to_lowercase();
        self.words
            .iter()
            .position(|word| word.text().to_lowercase() == needle)
    }

    /// Add a word, or update the meaning of the existing word with the same
    /// (case-insensitive) text.
    ///
    /// The stored text keeps its original casing when updating.
    pub fn upsert(
        &mut self,
        text: impl Into<String>,
        meaning: impl Into<String>,
    ) -> Merge {
        let text = text.into();
        let meaning = meaning.into();
        match self.position_of(&text) {
            Some(index) => {
                let existing = &mut self.words[index];
                if existing.meaning() == meaning {
                    Merge::Unchanged
                } else {
                    existing.set_meaning(meaning);
                    Merge::Updated
                }
            },
            None => {
                self.words.push(Word::new(text, meaning));
                Merge::Added
            },
        }
    }
}

/// The master document: every word set, in file order.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct WordSetCollection {
    /// The sets, order preserved on write.
    pub sets: Vec<WordSet>,
    fields: Map<String, Value>,
}

impl TryFrom<Map<String, Value>> for WordSetCollection {
    type Error = ShapeError;

    fn try_from(mut fields: Map<String, Value>) -> Result<Self, Self::Error> {
        let sets = take_list(&mut fields, SETS)?;
        Ok(WordSetCollection { sets, fields })
    }
}

impl Serialize for WordSetCollection {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serialize_with_list(&self.fields, SETS, &self.sets, serializer)
    }
}

impl WordSetCollection {
    /// Create a collection from sets.
    #[must_use]
    pub fn new(sets: Vec<WordSet>) -> Self {
        let mut fields = Map::new();
        fields.insert(SETS.to_owned(), Value::Null);
        WordSetCollection { sets, fields }
    }

    /// Load a master document from disk.
    ///
    /// Fails with [`WordSetError::MissingFile`] if `path` doesn't exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, WordSetError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|io_err| WordSetError::read(path, io_err))?;
        let collection = Self::from_json(&content).map_err(|json_err| {
            WordSetError::InvalidJson(path.to_owned(), json_err)
        })?;
        debug!(
            "loaded {} sets from {}",
            collection.sets.len(),
            path.display(),
        );
        Ok(collection)
    }

    /// Parse a master document.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize the whole document, as it would be written by
    /// [`WordSetCollection::save`].
    pub fn to_json(&self) -> Result<Vec<u8>, WordSetError> {
        Ok(to_pretty_json(self, DOCUMENT_INDENT)?)
    }

    /// Overwrite `path` with the whole document.
    ///
    /// The document is fully serialized before the file is opened.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), WordSetError> {
        let path = path.as_ref();
        let bytes = self.to_json()?;
        fs::write(path, bytes).map_err(|io_err| {
            WordSetError::FailedToWrite(path.to_owned(), io_err)
        })?;
        debug!("wrote {}", path.display());
        Ok(())
    }

    /// Build an index of set ids to their position in [`Self::sets`].
    ///
    /// If an id appears more than once, the last set with that id wins.
    #[must_use]
    pub fn index(&self) -> SetIndex {
        let mut positions = HashMap::with_capacity(self.sets.len());
        self.sets.iter().enumerate().for_each(|(position, set)| {
            match positions.entry(set.id().to_owned()) {
                Entry::Occupied(mut occupied) => {
                    warn!("duplicate set id {:?}, using the last one", set.id());
                    occupied.insert(position);
                },
                Entry::Vacant(vacant) => {
                    vacant.insert(position);
                },
            }
        });
        SetIndex(positions)
    }
}

/// Maps set ids to their position in a [`WordSetCollection`].
///
/// Returned by [`WordSetCollection::index`]. Only valid while the collection's
/// set sequence isn't reordered.
#[derive(Debug, Clone, Default)]
pub struct SetIndex(HashMap<String, usize>);

impl SetIndex {
    /// Look up the position of the set with `id`.
    #[inline]
    #[must_use]
    pub fn get(&self, id: &str) -> Option<usize> {
        self.0.get(id).copied()
    }

    /// Get how many distinct ids are indexed.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no ids are indexed.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
