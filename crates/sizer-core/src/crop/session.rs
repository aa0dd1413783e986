use tracing::{debug, info, warn};

use super::{CropGeometry, CropOptions, CropWidget, CropWidgetFactory};
use crate::consts::WIDE_RATIO;
use crate::error::Result;
use crate::form::UploadForm;
use crate::ratio::{AspectRatio, RatioSelector};
use crate::selection::{FileSelection, ImageSource};

/// Observable state of the crop surface.
#[derive(Clone, Debug, PartialEq)]
pub enum CropSessionState {
    Closed,
    Open { source: String, ratio: AspectRatio },
}

/// Owns the crop surface, the single live widget, the cached image source
/// and the ratio selector.
///
/// At most one widget is alive at a time: every `open` destroys the previous
/// instance before constructing the next one.
pub struct CropSession<F: CropWidgetFactory> {
    factory: F,
    widget: Option<F::Widget>,
    current_source: Option<ImageSource>,
    surface_visible: bool,
    selector: RatioSelector,
}

impl<F: CropWidgetFactory> CropSession<F> {
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            widget: None,
            current_source: None,
            surface_visible: false,
            selector: RatioSelector::new(),
        }
    }

    /// Show the surface for `source` with a fresh widget at 16:9.
    ///
    /// On construction failure the surface is hidden again and no widget is
    /// left alive.
    pub fn open(&mut self, source: ImageSource, form: &mut UploadForm) -> Result<()> {
        self.surface_visible = true;
        self.release();

        let options = CropOptions::default();
        match self.factory.construct(&source, &options) {
            Ok(widget) => self.widget = Some(widget),
            Err(e) => {
                warn!(name = %source.name, error = %e, "Crop widget construction failed");
                self.surface_visible = false;
                self.current_source = None;
                return Err(e);
            }
        }
        info!(name = %source.name, "Crop session opened");
        self.current_source = Some(source);

        self.set_ratio(AspectRatio::Fixed(WIDE_RATIO), form);
        Ok(())
    }

    /// Reopen from the cached source. Returns `false` when nothing is cached.
    pub fn recrop(&mut self, form: &mut UploadForm) -> Result<bool> {
        match self.current_source.clone() {
            Some(source) => {
                self.open(source, form)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Hide the surface. The widget stays alive for a later re-crop.
    pub fn close(&mut self) {
        self.surface_visible = false;
    }

    /// Commit the widget's crop box into the form and close. No-op without
    /// a live widget.
    pub fn confirm(&mut self, form: &mut UploadForm) -> Option<CropGeometry> {
        let geometry = self.widget.as_ref()?.data();
        form.crop = Some(geometry);
        self.close();
        info!(%geometry, "Crop confirmed");
        Some(geometry)
    }

    /// Close, empty the file selection, and tear everything down.
    pub fn cancel(&mut self, selection: &mut FileSelection) {
        self.close();
        selection.clear();
        self.release();
        self.current_source = None;
        info!("Crop session cancelled");
    }

    /// Push `ratio` to the live widget, then update label, highlight and
    /// the hidden ratio field.
    pub fn set_ratio(&mut self, ratio: impl Into<AspectRatio>, form: &mut UploadForm) {
        let ratio = ratio.into();
        if let Some(widget) = self.widget.as_mut() {
            widget.set_aspect_ratio(ratio);
        }
        self.selector.set_ratio(ratio, form);
    }

    fn release(&mut self) {
        if let Some(mut widget) = self.widget.take() {
            widget.destroy();
            debug!("Crop widget released");
        }
    }

    pub fn state(&self) -> CropSessionState {
        match (&self.widget, &self.current_source) {
            (Some(_), Some(source)) if self.surface_visible => CropSessionState::Open {
                source: source.name.clone(),
                ratio: self.selector.active(),
            },
            _ => CropSessionState::Closed,
        }
    }

    pub fn is_surface_visible(&self) -> bool {
        self.surface_visible
    }

    pub fn has_widget(&self) -> bool {
        self.widget.is_some()
    }

    pub fn widget(&self) -> Option<&F::Widget> {
        self.widget.as_ref()
    }

    pub fn widget_mut(&mut self) -> Option<&mut F::Widget> {
        self.widget.as_mut()
    }

    pub fn current_source(&self) -> Option<&ImageSource> {
        self.current_source.as_ref()
    }

    pub fn selector(&self) -> &RatioSelector {
        &self.selector
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }
}

impl<F: CropWidgetFactory> Drop for CropSession<F> {
    fn drop(&mut self) {
        self.release();
    }
}
