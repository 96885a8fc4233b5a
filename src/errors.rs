//! Error types for catalog lookup, playback and scene handling

use thiserror::Error;

/// Catalog errors
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The key is not part of the catalog. This is a content authoring bug.
    #[error("no dialogue content for key '{key}'")]
    ContentNotFound { key: String },

    #[error("invalid catalog document: {0}")]
    Parse(#[from] serde_json::Error),
}

impl CatalogError {
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::ContentNotFound { key: key.into() }
    }
}

/// Errors returned when starting a run
#[derive(Debug, Error)]
pub enum SequenceError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl SequenceError {
    /// The missing key, if this error is a failed lookup
    pub fn missing_key(&self) -> Option<&str> {
        match self {
            Self::Catalog(CatalogError::ContentNotFound { key }) => Some(key),
            Self::Catalog(_) => None,
        }
    }
}

/// Errors from selecting a choice on a presentation slot
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("no dialogue is currently shown")]
    NothingShown,

    #[error("the current dialogue has no choices")]
    NoChoices,

    #[error("choice index {index} out of range (0-{max})")]
    OutOfRange { index: usize, max: usize },
}

/// Errors from building or walking a scene graph
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("unknown scene node '{node}'")]
    UnknownNode { node: String },

    #[error("unknown effect '{effect}'")]
    UnknownEffect { effect: String },

    #[error("the sequence player was dropped")]
    PlayerGone,

    #[error("scene failed validation with {errors} error(s): {first}")]
    Invalid { errors: usize, first: String },

    #[error(transparent)]
    Sequence(#[from] SequenceError),
}

impl SceneError {
    pub fn unknown_node(node: impl Into<String>) -> Self {
        Self::UnknownNode { node: node.into() }
    }

    pub fn unknown_effect(effect: impl Into<String>) -> Self {
        Self::UnknownEffect {
            effect: effect.into(),
        }
    }
}

impl From<CatalogError> for SceneError {
    fn from(error: CatalogError) -> Self {
        SceneError::Sequence(SequenceError::Catalog(error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_is_reported_through_layers() {
        let error = SequenceError::from(CatalogError::not_found("intro"));
        assert_eq!(error.missing_key(), Some("intro"));
        assert_eq!(error.to_string(), "no dialogue content for key 'intro'");

        let scene: SceneError = CatalogError::not_found("outro").into();
        assert!(scene.to_string().contains("outro"));
    }

    #[test]
    fn out_of_range_message_lists_bounds() {
        let error = SelectionError::OutOfRange { index: 3, max: 1 };
        assert_eq!(error.to_string(), "choice index 3 out of range (0-1)");
    }
}
