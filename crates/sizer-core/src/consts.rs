/// Tolerance for matching a ratio against presets and selectable controls.
pub const RATIO_TOLERANCE: f64 = 0.01;

/// Tolerance for matching a ratio against the typed custom width/height pair.
pub const CUSTOM_PAIR_TOLERANCE: f64 = 0.001;

/// Landscape preset, also the ratio every crop session opens with.
pub const WIDE_RATIO: f64 = 16.0 / 9.0;

/// Portrait preset.
pub const PORTRAIT_RATIO: f64 = 7.0 / 9.0;

/// Crop box restricted to the image bounds.
pub const DEFAULT_VIEW_MODE: u8 = 1;

/// Fraction of the image the initial crop box covers.
pub const DEFAULT_AUTO_CROP_AREA: f64 = 1.0;

/// Save name used when the response carries no usable filename.
pub const DEFAULT_FILENAME: &str = "processed_image.jpg";

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8000";

pub const UPLOAD_ENDPOINT: &str = "/upload";

pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

pub const DEFAULT_MIN_SIZE_MB: f64 = 0.0;

pub const DEFAULT_TARGET_SIZE_MB: f64 = 2.0;

/// Shown when a failure response carries no structured detail.
pub const GENERIC_FAILURE_MESSAGE: &str = "Upload failed";

pub const SIZE_RANGE_MESSAGE: &str = "Minimum file size must be smaller than maximum file size.";

pub const CUSTOM_RATIO_MESSAGE: &str = "Please enter a valid width and height";

pub const FALLBACK_MIME: &str = "application/octet-stream";
