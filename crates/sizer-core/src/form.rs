use crate::crop::CropGeometry;
use crate::error::{Result, SizerError};
use crate::ratio::CustomRatioInput;
use crate::selection::PendingFile;
use crate::upload::transport::FormPart;

pub const FIELD_FILE: &str = "file";
pub const FIELD_CROP_X: &str = "crop-x";
pub const FIELD_CROP_Y: &str = "crop-y";
pub const FIELD_CROP_WIDTH: &str = "crop-width";
pub const FIELD_CROP_HEIGHT: &str = "crop-height";
pub const FIELD_TARGET_RATIO: &str = "target-ratio";
pub const FIELD_MIN_SIZE: &str = "min_size_mb";
pub const FIELD_TARGET_SIZE: &str = "target_size_mb";

/// Every field the upload form carries besides the file itself.
///
/// Size fields hold the raw input text; they are parsed only for the
/// client-side range check and sent verbatim otherwise.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UploadForm {
    /// Committed crop box, `None` until the first confirm.
    pub crop: Option<CropGeometry>,
    /// Hidden ratio field, `None` until a fixed ratio is selected.
    pub target_ratio: Option<f64>,
    pub min_size_mb: String,
    pub target_size_mb: String,
    /// Custom ratio inputs. Not serialized.
    pub custom: CustomRatioInput,
}

impl UploadForm {
    pub fn new(min_size_mb: f64, target_size_mb: f64) -> Self {
        Self {
            min_size_mb: min_size_mb.to_string(),
            target_size_mb: target_size_mb.to_string(),
            ..Default::default()
        }
    }

    /// Parsed `(min, max)` sizes in megabytes; unparsable input is NaN.
    pub fn size_range(&self) -> (f64, f64) {
        (parse_size(&self.min_size_mb), parse_size(&self.target_size_mb))
    }

    /// Reject a minimum that is not below the maximum. NaN on either side
    /// never compares, so malformed sizes are left to the endpoint.
    pub fn validate_sizes(&self) -> Result<()> {
        let (min_mb, max_mb) = self.size_range();
        if min_mb >= max_mb {
            return Err(SizerError::InvalidSizeRange { min_mb, max_mb });
        }
        Ok(())
    }

    /// Multipart parts for `file` and every populated field.
    pub fn parts(&self, file: &PendingFile) -> Vec<FormPart> {
        let mut parts = vec![FormPart::file(FIELD_FILE, file)];

        if let Some(crop) = self.crop {
            parts.push(FormPart::text(FIELD_CROP_X, crop.x.to_string()));
            parts.push(FormPart::text(FIELD_CROP_Y, crop.y.to_string()));
            parts.push(FormPart::text(FIELD_CROP_WIDTH, crop.width.to_string()));
            parts.push(FormPart::text(FIELD_CROP_HEIGHT, crop.height.to_string()));
        }
        if let Some(ratio) = self.target_ratio {
            parts.push(FormPart::text(FIELD_TARGET_RATIO, ratio.to_string()));
        }
        parts.push(FormPart::text(FIELD_MIN_SIZE, self.min_size_mb.clone()));
        parts.push(FormPart::text(FIELD_TARGET_SIZE, self.target_size_mb.clone()));
        parts
    }
}

fn parse_size(raw: &str) -> f64 {
    raw.trim().parse::<f64>().unwrap_or(f64::NAN)
}
