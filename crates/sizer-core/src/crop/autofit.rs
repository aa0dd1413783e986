//! Headless crop widget.
//!
//! Places the largest crop box of the active ratio centered on the image,
//! scaled by the auto crop area, and re-fits whenever the ratio changes.
//! A manual selection stands in for the user dragging the box.

use std::io::Cursor;

use image::ImageReader;
use tracing::debug;

use super::{CropGeometry, CropOptions, CropWidget, CropWidgetFactory};
use crate::error::{Result, SizerError};
use crate::ratio::AspectRatio;
use crate::selection::ImageSource;

#[derive(Clone, Debug)]
pub struct AutoFitCropper {
    image_width: f64,
    image_height: f64,
    ratio: AspectRatio,
    view_mode: u8,
    auto_crop_area: f64,
    rect: CropGeometry,
    destroyed: bool,
}

impl AutoFitCropper {
    pub fn new(image_width: u32, image_height: u32, options: &CropOptions) -> Result<Self> {
        if image_width == 0 || image_height == 0 {
            return Err(SizerError::InvalidDimensions {
                width: image_width,
                height: image_height,
            });
        }

        let mut cropper = Self {
            image_width: image_width as f64,
            image_height: image_height as f64,
            ratio: options.aspect_ratio,
            view_mode: options.view_mode,
            auto_crop_area: options.auto_crop_area.clamp(0.0, 1.0),
            rect: CropGeometry::default(),
            destroyed: false,
        };
        cropper.fit();
        Ok(cropper)
    }

    /// Probe the image header for its dimensions without decoding pixels.
    pub fn from_source(source: &ImageSource, options: &CropOptions) -> Result<Self> {
        let (width, height) = ImageReader::new(Cursor::new(&source.data[..]))
            .with_guessed_format()?
            .into_dimensions()?;
        debug!(name = %source.name, width, height, "Crop widget bound");
        Self::new(width, height, options)
    }

    pub fn image_size(&self) -> (f64, f64) {
        (self.image_width, self.image_height)
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Largest centered box of the active ratio, scaled by the auto crop area.
    fn fit(&mut self) {
        let (iw, ih) = (self.image_width, self.image_height);
        let (mut w, mut h) = match self.ratio.fixed() {
            Some(r) if r > 0.0 && r.is_finite() => {
                if iw / ih > r {
                    (ih * r, ih)
                } else {
                    (iw, iw / r)
                }
            }
            _ => (iw, ih),
        };
        w *= self.auto_crop_area;
        h *= self.auto_crop_area;

        self.rect = CropGeometry::new((iw - w) / 2.0, (ih - h) / 2.0, w, h);
    }

    /// Replace the crop box, as a drag would. With a fixed ratio the box is
    /// snapped around its center; with view mode 1+ it is kept inside the image.
    pub fn select(&mut self, rect: CropGeometry) {
        let mut next = rect;

        if let Some(r) = self.ratio.fixed().filter(|r| *r > 0.0 && r.is_finite()) {
            let cx = next.x + next.width / 2.0;
            let cy = next.y + next.height / 2.0;

            // Keep width, adjust height
            let mut w = next.width;
            let mut h = w / r;
            if self.view_mode >= 1 {
                if h > self.image_height {
                    h = self.image_height;
                    w = h * r;
                }
                if w > self.image_width {
                    w = self.image_width;
                    h = w / r;
                }
            }
            next = CropGeometry::new(cx - w / 2.0, cy - h / 2.0, w, h);
        }

        if self.view_mode >= 1 {
            next.width = next.width.min(self.image_width);
            next.height = next.height.min(self.image_height);
            next.x = next.x.max(0.0).min(self.image_width - next.width);
            next.y = next.y.max(0.0).min(self.image_height - next.height);
        }
        self.rect = next;
    }
}

impl CropWidget for AutoFitCropper {
    fn set_aspect_ratio(&mut self, ratio: AspectRatio) {
        self.ratio = ratio;
        self.fit();
    }

    fn data(&self) -> CropGeometry {
        self.rect
    }

    fn destroy(&mut self) {
        self.destroyed = true;
    }
}

/// Builds an `AutoFitCropper` from the image header of each source.
#[derive(Clone, Copy, Debug, Default)]
pub struct AutoFitFactory;

impl CropWidgetFactory for AutoFitFactory {
    type Widget = AutoFitCropper;

    fn construct(&mut self, source: &ImageSource, options: &CropOptions) -> Result<AutoFitCropper> {
        AutoFitCropper::from_source(source, options)
    }
}
