//! Photo selection for the add-tree form.
//!
//! Files reach [`FilePreviewController::select`] either from a picker or from a
//! [`DropZone`]. Image files get a preview handle, a revocable reference
//! registered in a shared [`PreviewRegistry`]; the handle is revoked when the
//! selection is replaced, cleared, or the controller is dropped.

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
    sync::Arc,
};

use parking_lot::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    client::ApiClient,
    errors::{UploadError, ValidationError},
};

/// Largest photo accepted by the add-tree form.
pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

/// A file the user picked or dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub size: u64,
    pub mime: String,
    /// Where the contents are read from on submit; `None` for a bare description.
    pub path: Option<PathBuf>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, size: u64, mime: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size,
            mime: mime.into(),
            path: None,
        }
    }

    /// Reads name and size from disk; the MIME type is inferred from the extension.
    pub async fn from_path(path: &Path) -> Result<Self, UploadError> {
        let meta = tokio::fs::metadata(path).await.map_err(|source| UploadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mime = mime_for(&name).to_string();
        Ok(Self {
            path: Some(path.to_path_buf()),
            ..Self::new(name, meta.len(), mime)
        })
    }

    pub fn is_image(&self) -> bool {
        self.mime.starts_with("image/")
    }
}

/// MIME type for the extensions the add-tree form accepts (`image/*`, pdf, doc, docx).
pub fn mime_for(name: &str) -> &'static str {
    let ext = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        "heic" => "image/heic",
        "tif" | "tiff" => "image/tiff",
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
}

/// Keeps track of preview references that are still live.
#[derive(Debug, Default)]
pub struct PreviewRegistry {
    live: Mutex<HashSet<String>>,
}

impl PreviewRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn create(self: &Arc<Self>, file: &SelectedFile) -> PreviewHandle {
        let url = format!("blob:greenmin/{}", Uuid::new_v4());
        self.live.lock().insert(url.clone());
        debug!(%url, name = %file.name, "preview created");
        PreviewHandle {
            url,
            registry: Arc::clone(self),
        }
    }

    fn revoke(&self, url: &str) {
        if self.live.lock().remove(url) {
            debug!(%url, "preview revoked");
        }
    }

    pub fn is_live(&self, url: &str) -> bool {
        self.live.lock().contains(url)
    }

    pub fn live_count(&self) -> usize {
        self.live.lock().len()
    }
}

/// A preview reference. Revoked on drop.
#[derive(Debug)]
pub struct PreviewHandle {
    url: String,
    registry: Arc<PreviewRegistry>,
}

impl PreviewHandle {
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.registry.revoke(&self.url);
    }
}

/// Selection state of one upload field.
#[derive(Debug)]
pub struct FilePreviewController {
    registry: Arc<PreviewRegistry>,
    file: Option<SelectedFile>,
    preview: Option<PreviewHandle>,
}

impl FilePreviewController {
    pub fn new(registry: Arc<PreviewRegistry>) -> Self {
        Self {
            registry,
            file: None,
            preview: None,
        }
    }

    /// Takes the first file of `files`. An empty list leaves the selection alone.
    pub fn select(&mut self, files: Vec<SelectedFile>) {
        let Some(file) = files.into_iter().next() else {
            return;
        };
        // assigning drops the previous handle, which revokes it
        self.preview = if file.is_image() {
            Some(self.registry.create(&file))
        } else {
            None
        };
        self.file = Some(file);
    }

    pub fn clear(&mut self) {
        self.preview = None;
        self.file = None;
    }

    pub fn file(&self) -> Option<&SelectedFile> {
        self.file.as_ref()
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file.as_ref().map(|f| f.name.as_str())
    }

    pub fn file_size(&self) -> Option<u64> {
        self.file.as_ref().map(|f| f.size)
    }

    pub fn preview_url(&self) -> Option<&str> {
        self.preview.as_ref().map(PreviewHandle::url)
    }
}

/// Drag-and-drop target feeding a [`FilePreviewController`].
#[derive(Debug, Default)]
pub struct DropZone {
    dragging: bool,
}

impl DropZone {
    pub fn drag_over(&mut self) {
        self.dragging = true;
    }

    pub fn drag_leave(&mut self) {
        self.dragging = false;
    }

    pub fn drop_files(&mut self, files: Vec<SelectedFile>, target: &mut FilePreviewController) {
        self.dragging = false;
        target.select(files);
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn hint(&self) -> &'static str {
        if self.dragging {
            "Drop file here"
        } else {
            "Drag and drop or click to upload"
        }
    }
}

/// Checks the selected photo before anything is sent.
pub fn validate_file(
    file: Option<&SelectedFile>,
    limit: u64,
) -> Result<&SelectedFile, ValidationError> {
    let file = file.ok_or(ValidationError::FileRequired)?;
    if file.size > limit {
        warn!(name = %file.name, size = file.size, limit, "photo rejected");
        return Err(ValidationError::FileTooLarge {
            size: file.size,
            limit,
        });
    }
    Ok(file)
}

/// The add-tree form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeDraft {
    pub name: String,
    pub species: String,
    pub location: String,
}

impl TreeDraft {
    /// Required: name, species and a photo within `limit`. Location is optional.
    pub fn validate<'a>(
        &self,
        photo: Option<&'a SelectedFile>,
        limit: u64,
    ) -> Result<&'a SelectedFile, ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::Required("Name"));
        }
        if self.species.trim().is_empty() {
            return Err(ValidationError::Required("Species"));
        }
        validate_file(photo, limit)
    }

    /// The geo location, if one was entered.
    pub fn geo_location(&self) -> Option<&str> {
        Some(self.location.trim()).filter(|l| !l.is_empty())
    }
}

/// Validates the add-tree form and posts the selected photo to the
/// image-detection service. Nothing is sent when validation fails.
///
/// The size limit is checked again on the bytes actually read, since the file
/// may have changed on disk after it was selected.
pub async fn submit_tree_photo(
    client: &ApiClient,
    draft: &TreeDraft,
    selection: &FilePreviewController,
    limit: u64,
) -> Result<serde_json::Value, UploadError> {
    let file = draft.validate(selection.file(), limit)?;
    let path = file.path.as_deref().ok_or(ValidationError::FileRequired)?;
    let bytes = tokio::fs::read(path).await.map_err(|source| UploadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let read = bytes.len() as u64;
    if read > limit {
        warn!(name = %file.name, size = read, limit, "photo grew past the limit");
        return Err(ValidationError::FileTooLarge { size: read, limit }.into());
    }

    let detected = client.detect_image(file, bytes).await?;
    info!(
        name = %draft.name,
        species = %draft.species,
        location = draft.geo_location().unwrap_or("-"),
        photo = %file.name,
        "photo submitted"
    );
    Ok(detected)
}
