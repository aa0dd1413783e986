//! Page-level aggregate.
//!
//! `Workbench` owns the form, the file selection, the crop session and the
//! upload controller, and exposes the user-facing transitions:
//!
//! ```text
//! select file -> crop surface opens at 16:9
//!   set ratio / apply custom ratio (any number of times)
//!   confirm -> geometry committed, surface closed
//!   cancel  -> everything torn down, file selection emptied
//! recrop -> surface reopens from the cached image
//! submit -> validate, send, save or show error, back to idle
//! ```

use std::path::Path;

use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::crop::{CropGeometry, CropSession, CropSessionState, CropWidgetFactory};
use crate::error::Result;
use crate::form::UploadForm;
use crate::ratio::{AspectRatio, RatioSelector};
use crate::selection::{display_name, FileLoader, FileSelection, PendingFile, ReadTicket};
use crate::upload::{
    DownloadSink, ResponseHandler, SubmissionResult, SubmitButton, SubmitStatus, Transport,
    UploadController,
};

/// Snapshot of everything the user can see.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewState {
    pub crop_surface: bool,
    /// "Selected: <name>" while the file sections are shown.
    pub file_name: Option<String>,
    pub ratio_panel: bool,
    /// "Current ratio: <label>".
    pub ratio_display: String,
    pub submit: SubmitButton,
    pub loading: bool,
    pub error: Option<String>,
}

pub struct Workbench<F, T, S>
where
    F: CropWidgetFactory,
    T: Transport,
    S: DownloadSink,
{
    pub form: UploadForm,
    selection: FileSelection,
    session: CropSession<F>,
    upload: UploadController<T, S>,
}

impl<F, T, S> Workbench<F, T, S>
where
    F: CropWidgetFactory,
    T: Transport,
    S: DownloadSink,
{
    pub fn new(factory: F, transport: T, sink: S, config: &ClientConfig) -> Self {
        let handler = ResponseHandler::new(sink, config.default_filename.clone());
        Self {
            form: UploadForm::new(config.default_min_size_mb, config.default_target_size_mb),
            selection: FileSelection::new(),
            session: CropSession::new(factory),
            upload: UploadController::new(transport, handler, config.upload_url()),
        }
    }

    /// A file was picked; its read is now in flight.
    pub fn begin_selection(&mut self, name: impl Into<String>) -> ReadTicket {
        self.selection.begin(name)
    }

    /// The read for `ticket` finished. Opens the crop surface unless a newer
    /// selection superseded it, in which case `Ok(false)` is returned.
    pub fn finish_selection(&mut self, ticket: ReadTicket, file: PendingFile) -> Result<bool> {
        match self.selection.complete(ticket, file) {
            Some(source) => {
                self.session.open(source, &mut self.form)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Select and read `path`, then open the crop surface. A failed read
    /// tears down the selection and any previous crop session.
    pub async fn select_file<L: FileLoader>(&mut self, loader: &L, path: &Path) -> Result<bool> {
        let ticket = self.begin_selection(display_name(path));
        let file = match loader.load(path).await {
            Ok(file) => file,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "File read failed");
                self.cancel();
                return Err(e);
            }
        };
        self.finish_selection(ticket, file)
    }

    /// The file control was emptied without a new file.
    pub fn clear_selection(&mut self) {
        debug!("File selection cleared");
        self.selection.clear();
    }

    /// Reopen the crop surface on the already loaded image.
    pub fn recrop(&mut self) -> Result<bool> {
        self.session.recrop(&mut self.form)
    }

    pub fn set_ratio(&mut self, ratio: impl Into<AspectRatio>) {
        self.session.set_ratio(ratio, &mut self.form);
    }

    /// Apply the custom width/height inputs. Non-positive or non-numeric
    /// input is rejected and nothing changes.
    pub fn apply_custom_ratio(&mut self) -> Result<()> {
        let ratio = self.form.custom.positive_ratio()?;
        self.set_ratio(ratio);
        Ok(())
    }

    pub fn confirm(&mut self) -> Option<CropGeometry> {
        self.session.confirm(&mut self.form)
    }

    pub fn cancel(&mut self) {
        self.session.cancel(&mut self.selection);
    }

    pub async fn submit(&mut self) -> Result<SubmissionResult> {
        self.upload
            .submit(self.selection.pending(), &self.form)
            .await
    }

    pub fn view(&self) -> ViewState {
        let status = self.upload.status();
        ViewState {
            crop_surface: self.session.is_surface_visible(),
            file_name: self.selection.file_name_text(),
            ratio_panel: self.selection.sections_visible(),
            ratio_display: self.session.selector().display_text(),
            submit: status.submit,
            loading: status.loading,
            error: status.error.message().map(str::to_owned),
        }
    }

    pub fn state(&self) -> CropSessionState {
        self.session.state()
    }

    pub fn selection(&self) -> &FileSelection {
        &self.selection
    }

    pub fn session(&self) -> &CropSession<F> {
        &self.session
    }

    pub fn widget_mut(&mut self) -> Option<&mut F::Widget> {
        self.session.widget_mut()
    }

    pub fn selector(&self) -> &RatioSelector {
        self.session.selector()
    }

    pub fn status(&self) -> &SubmitStatus {
        self.upload.status()
    }

    pub fn upload(&self) -> &UploadController<T, S> {
        &self.upload
    }
}
