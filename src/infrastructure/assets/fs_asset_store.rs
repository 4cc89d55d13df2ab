//! Filesystem-backed QR code renderer.

use async_trait::async_trait;
use qrcode::QrCode;
use qrcode::render::svg;
use serde_json::json;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

use crate::domain::repositories::AssetStore;
use crate::error::AppError;

const MIN_DIMENSION: u32 = 240;

/// Writes one `{token}.svg` file per code into `dir`.
///
/// The encoded payload is `{base_url}/r/{token}`, the public redirect path.
/// Files are created with create-new semantics so two codes can never share
/// (or clobber) an image.
pub struct FsAssetStore {
    dir: PathBuf,
    base_url: String,
}

impl FsAssetStore {
    /// Creates the store. `base_url` must not end with a slash.
    pub fn new(dir: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Creates the asset directory if it does not exist yet.
    pub async fn ensure_dir(&self) -> Result<(), AppError> {
        fs::create_dir_all(&self.dir).await.map_err(|e| {
            AppError::internal(
                "Failed to create asset directory",
                json!({ "dir": self.dir.display().to_string(), "reason": e.to_string() }),
            )
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The URL a scanner lands on for `token`.
    pub fn redirect_url(&self, token: &str) -> String {
        format!("{}/r/{}", self.base_url, token)
    }

    fn render_svg(&self, token: &str) -> Result<String, AppError> {
        let code = QrCode::new(self.redirect_url(token).as_bytes()).map_err(|e| {
            AppError::internal("Failed to encode QR code", json!({ "reason": e.to_string() }))
        })?;

        Ok(code
            .render::<svg::Color>()
            .min_dimensions(MIN_DIMENSION, MIN_DIMENSION)
            .dark_color(svg::Color("#000000"))
            .light_color(svg::Color("#ffffff"))
            .build())
    }

    /// Resolves a stored reference to a path inside the asset directory.
    ///
    /// References are plain file names; anything with a path separator is refused.
    fn path_of(&self, asset_reference: &str) -> Option<PathBuf> {
        let is_plain = !asset_reference.is_empty()
            && !asset_reference.contains(['/', '\\'])
            && asset_reference != "."
            && asset_reference != "..";

        is_plain.then(|| self.dir.join(asset_reference))
    }
}

#[async_trait]
impl AssetStore for FsAssetStore {
    async fn render(&self, token: &str) -> Result<String, AppError> {
        let asset_reference = format!("{token}.svg");
        let path = self.path_of(&asset_reference).ok_or_else(|| {
            AppError::internal("Token is not a valid file name", json!({ "token": token }))
        })?;
        let svg = self.render_svg(token)?;

        let mut file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(AppError::token_collision(
                    "QR image already exists",
                    json!({ "token": token }),
                ));
            }
            Err(e) => {
                return Err(AppError::internal(
                    "Failed to create QR image",
                    json!({ "path": path.display().to_string(), "reason": e.to_string() }),
                ));
            }
        };

        if let Err(e) = file.write_all(svg.as_bytes()).await {
            drop(file);
            let _ = fs::remove_file(&path).await;
            return Err(AppError::internal(
                "Failed to write QR image",
                json!({ "path": path.display().to_string(), "reason": e.to_string() }),
            ));
        }

        file.flush().await.map_err(|e| {
            AppError::internal("Failed to flush QR image", json!({ "reason": e.to_string() }))
        })?;

        tracing::debug!(token, asset = %asset_reference, "QR image rendered");

        Ok(asset_reference)
    }

    async fn remove(&self, asset_reference: &str) -> Result<(), AppError> {
        let Some(path) = self.path_of(asset_reference) else {
            return Err(AppError::internal(
                "Invalid asset reference",
                json!({ "asset": asset_reference }),
            ));
        };

        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::internal(
                "Failed to remove QR image",
                json!({ "path": path.display().to_string(), "reason": e.to_string() }),
            )),
        }
    }

    async fn exists(&self, asset_reference: &str) -> bool {
        match self.path_of(asset_reference) {
            Some(path) => fs::try_exists(path).await.unwrap_or(false),
            None => false,
        }
    }
}
