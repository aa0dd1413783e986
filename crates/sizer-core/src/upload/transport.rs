use std::sync::Arc;
use std::time::Duration;

use reqwest::header::CONTENT_DISPOSITION;
use reqwest::multipart::{Form, Part};
use tracing::debug;

use crate::error::{Result, SizerError};
use crate::selection::PendingFile;

/// Value of one multipart field.
#[derive(Clone, Debug, PartialEq)]
pub enum PartValue {
    Text(String),
    File {
        filename: String,
        mime: String,
        data: Arc<[u8]>,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct FormPart {
    pub name: String,
    pub value: PartValue,
}

impl FormPart {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: PartValue::Text(value.into()),
        }
    }

    pub fn file(name: impl Into<String>, file: &PendingFile) -> Self {
        Self {
            name: name.into(),
            value: PartValue::File {
                filename: file.name.clone(),
                mime: file.mime.clone(),
                data: Arc::clone(&file.data),
            },
        }
    }

    /// Text value, `None` for the file part.
    pub fn as_text(&self) -> Option<&str> {
        match &self.value {
            PartValue::Text(s) => Some(s),
            PartValue::File { .. } => None,
        }
    }
}

/// One multipart POST.
#[derive(Clone, Debug, PartialEq)]
pub struct UploadRequest {
    pub url: String,
    pub parts: Vec<FormPart>,
}

impl UploadRequest {
    pub fn field(&self, name: &str) -> Option<&FormPart> {
        self.parts.iter().find(|p| p.name == name)
    }
}

/// A fully read response.
#[derive(Clone, Debug, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub content_disposition: Option<String>,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends upload requests. Network failures, timeouts and unreadable bodies
/// all surface as `SizerError::Transport`.
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn post(&self, request: UploadRequest) -> Result<TransportResponse>;
}

/// `reqwest`-backed transport.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// `timeout` bounds the whole request; `None` waits indefinitely.
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(transport_error)?;
        Ok(Self { client })
    }

    fn build_form(parts: Vec<FormPart>) -> Result<Form> {
        let mut form = Form::new();
        for part in parts {
            form = match part.value {
                PartValue::Text(value) => form.text(part.name, value),
                PartValue::File {
                    filename,
                    mime,
                    data,
                } => {
                    let body = Part::bytes(data.to_vec())
                        .file_name(filename)
                        .mime_str(&mime)
                        .map_err(transport_error)?;
                    form.part(part.name, body)
                }
            };
        }
        Ok(form)
    }
}

impl Transport for HttpTransport {
    async fn post(&self, request: UploadRequest) -> Result<TransportResponse> {
        let form = Self::build_form(request.parts)?;
        debug!(url = %request.url, "Sending upload");

        let response = self
            .client
            .post(&request.url)
            .multipart(form)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status().as_u16();
        let content_disposition = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let body = response.bytes().await.map_err(transport_error)?.to_vec();

        Ok(TransportResponse {
            status,
            content_disposition,
            body,
        })
    }
}

fn transport_error(e: reqwest::Error) -> SizerError {
    if e.is_timeout() {
        SizerError::Transport("request timed out".into())
    } else {
        SizerError::Transport(e.to_string())
    }
}
