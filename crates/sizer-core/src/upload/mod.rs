pub mod response;
pub mod transport;

use std::ops::{Deref, DerefMut};

use tracing::{info, warn};

use crate::error::{Result, SizerError};
use crate::form::UploadForm;
use crate::selection::PendingFile;

pub use response::{
    DirectorySink, DownloadSink, ErrorRegion, ResponseHandler, SubmissionResult,
};
pub use transport::{FormPart, HttpTransport, PartValue, Transport, TransportResponse, UploadRequest};

/// Submit affordance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubmitButton {
    pub enabled: bool,
    /// Busy flag exposed to assistive technology.
    pub busy: bool,
}

impl Default for SubmitButton {
    fn default() -> Self {
        Self {
            enabled: true,
            busy: false,
        }
    }
}

/// Submit button, loading indicator and error region.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SubmitStatus {
    pub submit: SubmitButton,
    pub loading: bool,
    pub error: ErrorRegion,
}

impl SubmitStatus {
    pub fn is_busy(&self) -> bool {
        !self.submit.enabled
    }
}

/// Holds the busy state for the duration of a request. Dropping it restores
/// the submit button, whichever way the request ended.
struct BusyGuard<'a> {
    status: &'a mut SubmitStatus,
}

impl<'a> BusyGuard<'a> {
    fn engage(status: &'a mut SubmitStatus) -> Self {
        status.submit.enabled = false;
        status.submit.busy = true;
        status.loading = true;
        status.error.clear();
        Self { status }
    }
}

impl Deref for BusyGuard<'_> {
    type Target = SubmitStatus;

    fn deref(&self) -> &SubmitStatus {
        self.status
    }
}

impl DerefMut for BusyGuard<'_> {
    fn deref_mut(&mut self) -> &mut SubmitStatus {
        self.status
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.status.loading = false;
        self.status.submit.enabled = true;
        self.status.submit.busy = false;
    }
}

/// Validates, sends and resolves one submission at a time.
pub struct UploadController<T: Transport, S: DownloadSink> {
    transport: T,
    handler: ResponseHandler<S>,
    url: String,
    status: SubmitStatus,
}

impl<T: Transport, S: DownloadSink> UploadController<T, S> {
    pub fn new(transport: T, handler: ResponseHandler<S>, url: impl Into<String>) -> Self {
        Self {
            transport,
            handler,
            url: url.into(),
            status: SubmitStatus::default(),
        }
    }

    /// Submit `file` with every field of `form`.
    ///
    /// Validation and gating errors are returned before any request is made.
    /// Once the request is issued every outcome, including transport errors,
    /// resolves to a `SubmissionResult`.
    pub async fn submit(
        &mut self,
        file: Option<&PendingFile>,
        form: &UploadForm,
    ) -> Result<SubmissionResult> {
        if self.status.is_busy() {
            return Err(SizerError::SubmissionInProgress);
        }
        let file = file.ok_or(SizerError::NoFileSelected)?;

        if let Err(e) = form.validate_sizes() {
            warn!(error = %e, "Submission rejected before sending");
            self.status.error.show(e.to_string());
            return Err(e);
        }

        let request = UploadRequest {
            url: self.url.clone(),
            parts: form.parts(file),
        };
        info!(url = %self.url, name = %file.name, bytes = file.len(), "Submitting");

        let mut guard = BusyGuard::engage(&mut self.status);
        let outcome = match self.transport.post(request).await {
            Ok(response) => self.handler.handle(response, &mut guard.error),
            Err(e) => {
                warn!(error = %e, "Upload failed");
                self.handler.fail(e.to_string(), &mut guard.error)
            }
        };
        drop(guard);

        Ok(outcome)
    }

    pub fn status(&self) -> &SubmitStatus {
        &self.status
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn handler(&self) -> &ResponseHandler<S> {
        &self.handler
    }
}
