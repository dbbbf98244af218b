use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

use crate::errors::ApiError;

pub const RECIPE_IMAGES_DIR: &str = "recipes_images";
pub const AVATAR_IMAGES_DIR: &str = "avatar_images";

// Stockage des fichiers médias hors BD; la BD ne garde que le chemin relatif
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Enregistre le fichier et renvoie son chemin relatif ("dir/filename")
    async fn save(&self, dir: &str, filename: &str, bytes: &[u8]) -> Result<String, ApiError>;

    /// Supprime un fichier; absent = pas une erreur
    async fn delete(&self, path: &str) -> Result<(), ApiError>;

    /// URL publique d'un chemin relatif
    fn url(&self, path: &str) -> String;
}

/// Suppression au mieux: un échec est journalisé, jamais remonté
pub async fn discard_media(media: &dyn MediaStore, path: &str) {
    if let Err(e) = media.delete(path).await {
        log::warn!("Could not remove media file {}: {}", path, e);
    }
}

#[derive(Debug, Clone)]
pub struct LocalMediaStore {
    root: PathBuf,
    base_url: String,
}

impl LocalMediaStore {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Contenu d'un fichier servi sous MEDIA_URL; absent → 404
    pub async fn read(&self, path: &str) -> Result<Vec<u8>, ApiError> {
        if path.is_empty() || path.ends_with('/') {
            return Err(ApiError::NotFound("File"));
        }
        let target = self.resolve(path).map_err(|_| ApiError::NotFound("File"))?;
        match tokio::fs::read(&target).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(ApiError::NotFound("File")),
            Err(e) => Err(e.into()),
        }
    }

    // Refuse les chemins absolus et les ".." pour rester sous MEDIA_ROOT
    fn resolve(&self, relative: &str) -> Result<PathBuf, ApiError> {
        let relative = Path::new(relative);
        let is_safe = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
        if !is_safe {
            return Err(ApiError::Internal(format!(
                "Refusing media path outside of root: {}",
                relative.display()
            )));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    async fn save(&self, dir: &str, filename: &str, bytes: &[u8]) -> Result<String, ApiError> {
        let relative = format!("{}/{}", dir, filename);
        let target = self.resolve(&relative)?;

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, bytes).await?;

        log::debug!("Stored media file {}", target.display());
        Ok(relative)
    }

    async fn delete(&self, path: &str) -> Result<(), ApiError> {
        if path.is_empty() {
            return Ok(());
        }
        let target = self.resolve(path)?;
        match tokio::fs::remove_file(&target).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}
