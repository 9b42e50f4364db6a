use std::{collections::BTreeMap, fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::errors::WordSetError;

/// Settings for [`split`](crate::split): what to put in the manifest where a
/// set doesn't say, and how to present it.
///
/// [`ManifestConfig::default`] holds the built-in settings. Any of them can be
/// overridden from a TOML file with [`ManifestConfig::load`]; a fully
/// specified file may look like this:
///
/// ```toml
/// version = "1.0.0"
/// base_url = "https://example.com/wordsets/sets"
/// default_icon = "📚"
/// default_difficulty = "intermediate"
///
/// [categories]
/// verbs = "AKADEMİK KELİMELER"
/// travel = "SEYAHAT"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ManifestConfig {
    /// Version tag written to every set file and the manifest.
    pub version: String,
    /// Set files are expected to be served from `<base_url>/<id>.json`.
    pub base_url: String,
    /// Used for sets without an `icon`.
    pub default_icon: String,
    /// Used for sets without a `difficulty`.
    pub default_difficulty: String,
    /// Category keys to display labels.
    pub categories: BTreeMap<String, String>,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        let categories = [
            ("verbs", "AKADEMİK KELİMELER"),
            ("academic", "AKADEMİK KELİMELER"),
            ("daily", "GÜNLÜK HAYAT"),
            ("business", "İŞ HAYATI"),
            ("travel", "SEYAHAT"),
            ("exam", "SINAV HAZIRLIĞI"),
        ]
        .into_iter()
        .map(|(key, label)| (key.to_owned(), label.to_owned()))
        .collect();

        ManifestConfig {
            version: String::from("1.0.0"),
            base_url: String::from("https://example.com/wordsets/sets"),
            default_icon: String::from("📚"),
            default_difficulty: String::from("intermediate"),
            categories,
        }
    }
}

impl ManifestConfig {
    /// Load settings from a TOML file.
    ///
    /// Settings missing from the file keep their default. Note that a
    /// `[categories]` table replaces the built-in one entirely.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, WordSetError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|io_err| WordSetError::read(path, io_err))?;
        toml::from_str(&content).map_err(|toml_err| {
            WordSetError::ConfigError(path.to_owned(), toml_err)
        })
    }

    /// Get the display label for a category key.
    ///
    /// Unknown keys are shown uppercased.
    #[must_use]
    pub fn resolve_category(&self, key: &str) -> String {
        self.categories
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_uppercase())
    }

    /// Get the download URL of a set's file.
    #[must_use]
    pub fn set_url(&self, set_id: &str) -> String {
        format!("{}/{set_id}.json", self.base_url.trim_end_matches('/'))
    }
}
