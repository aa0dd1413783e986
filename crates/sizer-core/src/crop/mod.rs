pub mod autofit;
pub mod session;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_AUTO_CROP_AREA, DEFAULT_VIEW_MODE, WIDE_RATIO};
use crate::error::Result;
use crate::ratio::AspectRatio;
use crate::selection::ImageSource;

pub use autofit::{AutoFitCropper, AutoFitFactory};
pub use session::{CropSession, CropSessionState};

/// A rectangle in source image pixel coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CropGeometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CropGeometry {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn ratio(&self) -> Option<f64> {
        (self.height > 0.0).then(|| self.width / self.height)
    }
}

impl fmt::Display for CropGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.0}x{:.0} at ({:.0}, {:.0})",
            self.width, self.height, self.x, self.y
        )
    }
}

/// Parses `X,Y,W,H`.
impl FromStr for CropGeometry {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let values: Vec<f64> = s
            .split(',')
            .map(|v| v.trim().parse::<f64>())
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| format!("invalid crop value in '{s}': {e}"))?;

        match values.as_slice() {
            &[x, y, width, height] if values.iter().all(|v| v.is_finite() && *v >= 0.0) => {
                Ok(Self::new(x, y, width, height))
            }
            &[_, _, _, _] => Err(format!("crop values must be non-negative: '{s}'")),
            _ => Err(format!("expected X,Y,W,H, got '{s}'")),
        }
    }
}

/// Construction options handed to a crop widget.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CropOptions {
    pub aspect_ratio: AspectRatio,
    /// 0 lets the crop box leave the image, 1 and above keep it inside.
    pub view_mode: u8,
    /// Fraction of the image the initial crop box covers.
    pub auto_crop_area: f64,
}

impl Default for CropOptions {
    fn default() -> Self {
        Self {
            aspect_ratio: AspectRatio::Fixed(WIDE_RATIO),
            view_mode: DEFAULT_VIEW_MODE,
            auto_crop_area: DEFAULT_AUTO_CROP_AREA,
        }
    }
}

/// An interactive crop surface bound to one image.
pub trait CropWidget {
    fn set_aspect_ratio(&mut self, ratio: AspectRatio);

    /// Current crop box in source image coordinates.
    fn data(&self) -> CropGeometry;

    /// Release the widget. It must not be used afterwards.
    fn destroy(&mut self);
}

/// Builds crop widgets for loaded images.
pub trait CropWidgetFactory {
    type Widget: CropWidget;

    fn construct(&mut self, source: &ImageSource, options: &CropOptions) -> Result<Self::Widget>;
}
