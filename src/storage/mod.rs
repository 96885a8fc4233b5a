//! Scene documents and where they are loaded from
//!
//! A scene document bundles the pacing config, the dialogue catalog and the
//! continuation graph of one scene as JSON:
//!
//! ```json
//! {
//!   "config": { "inter_message_gap_ms": 200 },
//!   "catalog": { "hello": { "message": "Hello.", "speaker_name": "Keeper" } },
//!   "graph": { "root": "start", "nodes": { "start": { "steps": [{ "key": "hello" }] } } }
//! }
//! ```

use crate::catalog::DialogueCatalog;
use crate::config::PlayerConfig;
use crate::graph::SceneGraph;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// One scene: catalog, graph and pacing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDocument {
    #[serde(default)]
    pub config: PlayerConfig,
    pub catalog: DialogueCatalog,
    pub graph: SceneGraph,
}

impl SceneDocument {
    pub fn from_json(json: &str) -> Result<Self, RepositoryError> {
        serde_json::from_str(json).map_err(|e| RepositoryError::InvalidFormat {
            message: e.to_string(),
            source: Some(Box::new(e)),
        })
    }

    /// Read the document at `path`, whatever its extension
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, RepositoryError> {
        let path = path.as_ref();
        read_document(path, &path.display().to_string()).await
    }

    pub fn to_json(&self) -> Result<String, RepositoryError> {
        serde_json::to_string_pretty(self).map_err(|e| RepositoryError::InvalidFormat {
            message: e.to_string(),
            source: Some(Box::new(e)),
        })
    }
}

/// Source of scene documents
#[async_trait]
pub trait SceneRepository: Send + Sync {
    /// Load the scene named `id`
    async fn load_scene(&self, id: &str) -> Result<SceneDocument, RepositoryError>;

    /// Names of every available scene, sorted
    async fn list_scenes(&self) -> Result<Vec<String>, RepositoryError>;
}

/// Repository errors
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("scene not found: {id}")]
    SceneNotFound { id: String },

    #[error("IO error: {message}")]
    IoError {
        message: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid scene document: {message}")]
    InvalidFormat {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl RepositoryError {
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::SceneNotFound { id: id.into() }
    }
}

/// Reads `<base>/<id>.json`
pub struct FileSystemSceneRepository {
    base_path: PathBuf,
}

impl FileSystemSceneRepository {
    pub fn new<P: Into<PathBuf>>(base_path: P) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn scene_path(&self, id: &str) -> PathBuf {
        self.base_path.join(format!("{id}.json"))
    }
}

#[async_trait]
impl SceneRepository for FileSystemSceneRepository {
    async fn load_scene(&self, id: &str) -> Result<SceneDocument, RepositoryError> {
        read_document(&self.scene_path(id), id).await
    }

    async fn list_scenes(&self) -> Result<Vec<String>, RepositoryError> {
        let mut entries =
            tokio::fs::read_dir(&self.base_path)
                .await
                .map_err(|e| RepositoryError::IoError {
                    message: format!("failed to read directory {}", self.base_path.display()),
                    source: e,
                })?;

        let mut scenes = Vec::new();
        while let Some(entry) =
            entries
                .next_entry()
                .await
                .map_err(|e| RepositoryError::IoError {
                    message: "failed to read directory entry".to_string(),
                    source: e,
                })?
        {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) == Some("json")
                && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
            {
                scenes.push(stem.to_string());
            }
        }

        scenes.sort();
        Ok(scenes)
    }
}

/// Read and parse one scene file. A missing file is reported as scene `id`.
async fn read_document(path: &Path, id: &str) -> Result<SceneDocument, RepositoryError> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(RepositoryError::not_found(id));
        }
        Err(e) => {
            return Err(RepositoryError::IoError {
                message: format!("failed to read scene file {}", path.display()),
                source: e,
            });
        }
    };

    log::debug!("[Storage] Loaded scene '{}' from {}", id, path.display());
    SceneDocument::from_json(&content)
}

/// In-memory scenes, for tests and embedded content
#[derive(Default)]
pub struct InMemorySceneRepository {
    scenes: RwLock<HashMap<String, SceneDocument>>,
}

impl InMemorySceneRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_scene(&self, id: impl Into<String>, scene: SceneDocument) {
        if let Ok(mut scenes) = self.scenes.write() {
            scenes.insert(id.into(), scene);
        }
    }
}

#[async_trait]
impl SceneRepository for InMemorySceneRepository {
    async fn load_scene(&self, id: &str) -> Result<SceneDocument, RepositoryError> {
        let scenes = self.scenes.read().map_err(|_| RepositoryError::InvalidFormat {
            message: "scene store poisoned".to_string(),
            source: None,
        })?;
        scenes
            .get(id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found(id))
    }

    async fn list_scenes(&self) -> Result<Vec<String>, RepositoryError> {
        let scenes = self.scenes.read().map_err(|_| RepositoryError::InvalidFormat {
            message: "scene store poisoned".to_string(),
            source: None,
        })?;
        let mut ids: Vec<String> = scenes.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENE: &str = r#"{
        "catalog": {
            "hello": { "message": "Hello.", "speaker_name": "Keeper" },
            "lamp": { "message": "Light it?", "choices": [{ "text": "yes" }, { "text": "no" }] }
        },
        "graph": {
            "root": "start",
            "nodes": {
                "start": {
                    "steps": [{ "key": "hello", "delay_ms": 1000 }, { "key": "lamp" }],
                    "choices": [
                        { "then": { "node": "lit" }, "effects": ["light"] },
                        { "then": "finish" }
                    ]
                },
                "lit": { "steps": [{ "key": "hello" }] }
            }
        }
    }"#;

    #[test]
    fn parses_scene_document_with_default_config() {
        let scene = SceneDocument::from_json(SCENE).unwrap();

        assert_eq!(scene.config, PlayerConfig::default());
        assert_eq!(scene.catalog.len(), 2);
        let start = scene.graph.node("start").unwrap();
        assert_eq!(start.steps[0].delay_ms, Some(1000));
        assert_eq!(start.choices[0].effects, vec!["light".to_string()]);
        assert_eq!(start.choices[1].then, crate::graph::Next::Finish);
    }

    #[test]
    fn invalid_document_keeps_source() {
        let error = SceneDocument::from_json("{}").unwrap_err();
        match error {
            RepositoryError::InvalidFormat { source, .. } => assert!(source.is_some()),
            other => panic!("Expected InvalidFormat, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn in_memory_repository_loads_and_lists() {
        let repository = InMemorySceneRepository::new();
        repository.add_scene("b", SceneDocument::from_json(SCENE).unwrap());
        repository.add_scene("a", SceneDocument::from_json(SCENE).unwrap());

        assert_eq!(repository.list_scenes().await.unwrap(), vec!["a", "b"]);
        assert!(repository.load_scene("a").await.is_ok());
        assert!(matches!(
            repository.load_scene("c").await,
            Err(RepositoryError::SceneNotFound { .. })
        ));
    }
}
