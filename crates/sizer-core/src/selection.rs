use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::consts::FALLBACK_MIME;
use crate::error::Result;

/// The selected file as it will be uploaded.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingFile {
    pub name: String,
    pub mime: String,
    pub data: Arc<[u8]>,
}

impl PendingFile {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, data: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            data: data.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Loaded image content a crop widget is bound to. Shares its bytes with
/// the `PendingFile` it came from.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageSource {
    pub name: String,
    pub data: Arc<[u8]>,
}

impl From<&PendingFile> for ImageSource {
    fn from(file: &PendingFile) -> Self {
        Self {
            name: file.name.clone(),
            data: Arc::clone(&file.data),
        }
    }
}

/// Identifies one file read. Only the most recently issued ticket may
/// complete a selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReadTicket(u64);

/// The file-selection control plus the sections that appear once a file
/// is chosen (selected name line and ratio panel).
#[derive(Debug, Default)]
pub struct FileSelection {
    pending: Option<PendingFile>,
    selected_name: Option<String>,
    sections_visible: bool,
    generation: u64,
}

impl FileSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new selection. Any read still in flight is superseded.
    pub fn begin(&mut self, name: impl Into<String>) -> ReadTicket {
        self.generation += 1;
        self.pending = None;
        self.selected_name = Some(name.into());
        self.sections_visible = true;
        ReadTicket(self.generation)
    }

    /// Finish the read for `ticket`. Returns the source to crop, or `None`
    /// when a newer selection has been made since the ticket was issued.
    pub fn complete(&mut self, ticket: ReadTicket, file: PendingFile) -> Option<ImageSource> {
        if ticket.0 != self.generation || self.selected_name.is_none() {
            debug!(
                ticket = ticket.0,
                current = self.generation,
                "Discarding stale file read"
            );
            return None;
        }
        info!(name = %file.name, bytes = file.len(), "File loaded");
        let source = ImageSource::from(&file);
        self.pending = Some(file);
        Some(source)
    }

    /// Empty the control and hide the dependent sections.
    pub fn clear(&mut self) {
        self.generation += 1;
        self.pending = None;
        self.selected_name = None;
        self.sections_visible = false;
    }

    pub fn pending(&self) -> Option<&PendingFile> {
        self.pending.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_none() && self.selected_name.is_none()
    }

    pub fn sections_visible(&self) -> bool {
        self.sections_visible
    }

    /// Text of the selected-file line while it is visible.
    pub fn file_name_text(&self) -> Option<String> {
        if !self.sections_visible {
            return None;
        }
        self.selected_name
            .as_ref()
            .map(|name| format!("Selected: {name}"))
    }
}

/// Reads a selected file into memory.
#[allow(async_fn_in_trait)]
pub trait FileLoader {
    async fn load(&self, path: &Path) -> Result<PendingFile>;
}

/// Loads files from the local filesystem.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsLoader;

impl FileLoader for FsLoader {
    async fn load(&self, path: &Path) -> Result<PendingFile> {
        let data = tokio::fs::read(path).await?;
        Ok(PendingFile::new(display_name(path), mime_for(path), data))
    }
}

/// Final path component, lossily converted.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// MIME type guessed from the file extension.
pub fn mime_for(path: &Path) -> &'static str {
    image::ImageFormat::from_path(path)
        .map(|format| format.to_mime_type())
        .unwrap_or(FALLBACK_MIME)
}
