use crate::config::MediaConfig;
use crate::error::Error;
use anyhow::Result;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

/// Photo folders under the media root
pub const ATTENDANCE_PHOTOS: &str = "attendance_photos";
pub const REPORT_PHOTOS: &str = "report_photos";
pub const PROFILE_PICTURES: &str = "profile_pictures";

/// One file taken from a multipart form
#[derive(Debug, Clone)]
pub struct Upload {
    /// Form field the file arrived in
    pub field: String,
    pub file_name: String,
    pub content: Vec<u8>,
}

/// Local directory for uploaded photos.
///
/// Records keep the returned relative reference verbatim; file contents are
/// never inspected.
#[derive(Debug, Clone)]
pub struct MediaStorage {
    root: PathBuf,
    allowed_extensions: Vec<String>,
}

impl MediaStorage {
    pub fn new(config: &MediaConfig) -> Self {
        Self {
            root: config.root.clone(),
            allowed_extensions: config
                .allowed_extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn extension_of(&self, upload: &Upload) -> Result<String> {
        let ext = Path::new(&upload.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .ok_or_else(|| Error::invalid(&upload.field, "Uploaded file has no extension"))?;

        if !self.allowed_extensions.contains(&ext) {
            return Err(Error::invalid(
                &upload.field,
                format!("Files of type .{} are not accepted", ext),
            )
            .into());
        }
        Ok(ext)
    }

    /// Write an upload to `<root>/<category>/<uuid>.<ext>` and return the
    /// relative reference
    pub async fn store(&self, category: &str, upload: &Upload) -> Result<String> {
        if upload.content.is_empty() {
            return Err(Error::invalid(&upload.field, "Uploaded file is empty").into());
        }
        let ext = self.extension_of(upload)?;

        let dir = self.root.join(category);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| Error::Storage(format!("Failed to create {:?}: {}", dir, e)))?;

        let file_name = format!("{}.{}", Uuid::new_v4(), ext);
        let path = dir.join(&file_name);
        tokio::fs::write(&path, &upload.content)
            .await
            .map_err(|e| Error::Storage(format!("Failed to write {:?}: {}", path, e)))?;

        debug!("Stored {} bytes at {:?}", upload.content.len(), path);

        Ok(format!("{}/{}", category, file_name))
    }

    /// Best-effort removal of a stored upload
    pub async fn discard(&self, reference: &str) {
        let relative = Path::new(reference);
        if !relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)))
        {
            warn!("Refusing to discard media outside the root: {}", reference);
            return;
        }

        if let Err(e) = tokio::fs::remove_file(self.root.join(relative)).await {
            warn!("Failed to discard media {}: {}", reference, e);
        }
    }
}
