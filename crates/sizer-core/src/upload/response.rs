use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use super::transport::TransportResponse;
use crate::consts::{DEFAULT_FILENAME, GENERIC_FAILURE_MESSAGE};
use crate::error::Result;

static EXTENDED_FILENAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)filename\*=UTF-8''([^;]+)").expect("valid regex"));

static PLAIN_FILENAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)filename=(?:"([^"]+)"|([^";]+))"#).expect("valid regex"));

/// Outcome of one submission.
#[derive(Clone, Debug, PartialEq)]
pub enum SubmissionResult {
    /// The processed file was saved as `filename` at `location`.
    Success {
        filename: String,
        location: PathBuf,
        size: usize,
    },
    Failure {
        message: String,
    },
}

impl SubmissionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// The single persistent error line. The last message shown wins.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ErrorRegion {
    message: Option<String>,
}

impl ErrorRegion {
    pub fn show(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }

    pub fn clear(&mut self) {
        self.message = None;
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn is_visible(&self) -> bool {
        self.message.is_some()
    }
}

/// Where processed files are saved.
pub trait DownloadSink {
    fn save(&mut self, filename: &str, bytes: Vec<u8>) -> Result<PathBuf>;
}

/// Saves into a directory, using only the final component of the name.
#[derive(Clone, Debug)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DownloadSink for DirectorySink {
    fn save(&mut self, filename: &str, bytes: Vec<u8>) -> Result<PathBuf> {
        let path = self.dir.join(safe_file_name(filename));
        std::fs::write(&path, &bytes)?;
        Ok(path)
    }
}

/// Strip any directory part so a header cannot point outside the target.
pub fn safe_file_name(filename: &str) -> &str {
    match filename.rsplit(['/', '\\']).next().map(str::trim) {
        Some(name) if !name.is_empty() && name != "." && name != ".." => name,
        _ => DEFAULT_FILENAME,
    }
}

/// Recover the save name from a `Content-Disposition` value: the extended
/// UTF-8 form first, then the plain form, then `fallback`.
pub fn filename_from_content_disposition(header: Option<&str>, fallback: &str) -> String {
    let Some(header) = header else {
        return fallback.to_owned();
    };

    if let Some(encoded) = EXTENDED_FILENAME.captures(header).and_then(|c| c.get(1)) {
        match urlencoding::decode(encoded.as_str().trim()) {
            Ok(decoded) if !decoded.is_empty() => return decoded.into_owned(),
            Ok(_) => {}
            Err(e) => warn!(error = %e, "Undecodable extended filename"),
        }
    }

    if let Some(caps) = PLAIN_FILENAME.captures(header) {
        if let Some(name) = caps.get(1).or_else(|| caps.get(2)) {
            let name = name.as_str().trim();
            if !name.is_empty() {
                return name.to_owned();
            }
        }
    }

    fallback.to_owned()
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<Value>,
}

/// Message for a failure body: its `detail` string, the joined `msg`
/// entries of a `detail` list, or the generic message.
pub fn failure_message(body: &[u8]) -> String {
    let detail = match serde_json::from_slice::<ErrorBody>(body) {
        Ok(parsed) => parsed.detail,
        Err(_) => None,
    };

    match detail {
        Some(Value::String(s)) if !s.is_empty() => s,
        Some(Value::Array(items)) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            if messages.is_empty() {
                GENERIC_FAILURE_MESSAGE.to_owned()
            } else {
                messages.join("; ")
            }
        }
        _ => GENERIC_FAILURE_MESSAGE.to_owned(),
    }
}

/// Turns responses into saved files or surfaced errors.
pub struct ResponseHandler<S: DownloadSink> {
    sink: S,
    fallback_filename: String,
}

impl<S: DownloadSink> ResponseHandler<S> {
    pub fn new(sink: S, fallback_filename: impl Into<String>) -> Self {
        Self {
            sink,
            fallback_filename: fallback_filename.into(),
        }
    }

    pub fn handle(&mut self, response: TransportResponse, errors: &mut ErrorRegion) -> SubmissionResult {
        if !response.is_success() {
            warn!(status = response.status, "Upload rejected");
            return self.fail(failure_message(&response.body), errors);
        }

        let filename = filename_from_content_disposition(
            response.content_disposition.as_deref(),
            &self.fallback_filename,
        );
        let size = response.body.len();

        // The body is moved into the sink and dropped once saved.
        match self.sink.save(&filename, response.body) {
            Ok(location) => {
                info!(%filename, size, location = %location.display(), "Processed file saved");
                SubmissionResult::Success {
                    filename,
                    location,
                    size,
                }
            }
            Err(e) => self.fail(format!("Failed to save {filename}: {e}"), errors),
        }
    }

    /// Show `message` and report it as the outcome.
    pub fn fail(&self, message: impl Into<String>, errors: &mut ErrorRegion) -> SubmissionResult {
        let message = message.into();
        errors.show(message.clone());
        SubmissionResult::Failure { message }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_file_name_strips_directories() {
        assert_eq!(safe_file_name("../../etc/passwd"), "passwd");
        assert_eq!(safe_file_name("C:\\tmp\\x.jpg"), "x.jpg");
        assert_eq!(safe_file_name(".."), DEFAULT_FILENAME);
        assert_eq!(safe_file_name("dir/"), DEFAULT_FILENAME);
        assert_eq!(safe_file_name("photo.jpg"), "photo.jpg");
    }

    #[test]
    fn test_plain_unquoted_stops_at_semicolon() {
        let name = filename_from_content_disposition(
            Some("attachment; filename=a.png; size=10"),
            DEFAULT_FILENAME,
        );
        assert_eq!(name, "a.png");
    }

    #[test]
    fn test_invalid_utf8_falls_through_to_plain() {
        let name = filename_from_content_disposition(
            Some("attachment; filename*=UTF-8''%FF%FE.jpg; filename=\"plain.jpg\""),
            DEFAULT_FILENAME,
        );
        assert_eq!(name, "plain.jpg");
    }
}
