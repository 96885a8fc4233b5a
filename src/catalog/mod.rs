//! Dialogue catalog: the closed set of authored content addressable by key

use crate::errors::CatalogError;
use crate::types::dialogue::{Choice, DialogueContent, DialogueMessage};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Key to content lookup table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DialogueCatalog {
    entries: HashMap<String, DialogueContent>,
}

impl DialogueCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a catalog from a JSON object of `key -> entry`
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let catalog: Self = serde_json::from_str(json)?;
        log::debug!("[Catalog] Loaded {} entries", catalog.len());
        Ok(catalog)
    }

    pub fn to_json(&self) -> Result<String, CatalogError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Add or replace an entry
    pub fn insert(&mut self, key: impl Into<String>, content: DialogueContent) {
        self.entries.insert(key.into(), content);
    }

    pub fn with_entry(mut self, key: impl Into<String>, content: DialogueContent) -> Self {
        self.insert(key, content);
        self
    }

    /// Shorthand for a plain line
    pub fn with_line(
        self,
        key: impl Into<String>,
        speaker_name: &str,
        avatar: &str,
        message: &str,
    ) -> Self {
        self.with_entry(
            key,
            DialogueContent::plain(DialogueMessage::new(message, avatar, speaker_name)),
        )
    }

    /// Shorthand for a line with choices
    pub fn with_question(
        self,
        key: impl Into<String>,
        speaker_name: &str,
        avatar: &str,
        message: &str,
        choices: &[&str],
    ) -> Self {
        self.with_entry(
            key,
            DialogueContent::with_choices(
                DialogueMessage::new(message, avatar, speaker_name),
                choices.iter().map(|text| Choice::new(*text)).collect(),
            ),
        )
    }

    /// Look up content by key. Unknown keys are an error, never skipped.
    pub fn get(&self, key: &str) -> Result<&DialogueContent, CatalogError> {
        self.entries
            .get(key)
            .ok_or_else(|| CatalogError::not_found(key))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// All known keys, sorted
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DialogueCatalog {
        DialogueCatalog::new()
            .with_line("greet", "Keeper", "keeper.png", "Welcome to the lighthouse.")
            .with_question("lamp", "Keeper", "keeper.png", "Light the lamp?", &["yes", "no"])
    }

    #[test]
    fn get_returns_tagged_content() {
        let catalog = sample();

        assert!(!catalog.get("greet").unwrap().has_choices());
        let lamp = catalog.get("lamp").unwrap();
        assert_eq!(lamp.message().message, "Light the lamp?");
        assert_eq!(lamp.choices().len(), 2);
    }

    #[test]
    fn unknown_key_fails() {
        let catalog = sample();
        match catalog.get("missing") {
            Err(CatalogError::ContentNotFound { key }) => assert_eq!(key, "missing"),
            other => panic!("Expected ContentNotFound, got {other:?}"),
        }
    }

    #[test]
    fn keys_are_sorted() {
        assert_eq!(sample().keys(), vec!["greet", "lamp"]);
    }

    #[test]
    fn json_round_trip_keeps_entries() {
        let catalog = sample();
        let json = catalog.to_json().unwrap();
        let restored = DialogueCatalog::from_json(&json).unwrap();
        assert_eq!(catalog, restored);
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        let result = DialogueCatalog::from_json("[1, 2]");
        assert!(matches!(result, Err(CatalogError::Parse(_))));
    }
}
