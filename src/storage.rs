// src/storage.rs

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

use crate::common::error::AppError;

/// Armazenamento de arquivos endereçado por caminho.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Grava os bytes em `path` e devolve a URL pública.
    async fn upload(&self, path: &str, bytes: &[u8]) -> Result<String, AppError>;

    async fn download_url(&self, path: &str) -> Result<String, AppError>;

    async fn delete(&self, path: &str) -> Result<(), AppError>;
}

// Blobs em disco local, servidos pelo próprio app em /files
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
    public_url: String,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>, public_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_url: public_url.into().trim_end_matches('/').to_string(),
        }
    }

    // Aceita tanto o caminho quanto a URL pública (registros antigos só guardam a URL)
    fn relative_path<'a>(&self, path_or_url: &'a str) -> &'a str {
        path_or_url
            .strip_prefix(self.public_url.as_str())
            .unwrap_or(path_or_url)
            .trim_start_matches('/')
    }

    fn resolve(&self, path_or_url: &str) -> Result<PathBuf, AppError> {
        let relative = Path::new(self.relative_path(path_or_url));

        // Nada de "..", raiz absoluta ou prefixos: o blob tem que ficar dentro de `root`
        let safe = !relative.as_os_str().is_empty()
            && relative.components().all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(AppError::StoreUnavailable(format!(
                "caminho de blob inválido: {}",
                path_or_url
            )));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn upload(&self, path: &str, bytes: &[u8]) -> Result<String, AppError> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, bytes).await?;
        self.download_url(path).await
    }

    async fn download_url(&self, path: &str) -> Result<String, AppError> {
        let relative = self.relative_path(path);
        Ok(format!("{}/{}", self.public_url, relative))
    }

    async fn delete(&self, path: &str) -> Result<(), AppError> {
        let target = self.resolve(path)?;
        tokio::fs::remove_file(&target).await?;
        Ok(())
    }
}
