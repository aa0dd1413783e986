//! Aspect ratio selection: presets, custom width/height pairs, the
//! human-readable label and the highlighted control.
//!
//! Matching is always tolerance based. A ratio computed from `16 / 9`, typed
//! as `1.78` or derived from a `1920:1080` pair must all select the same
//! preset, so strict float equality is never used here.

use std::fmt;

use tracing::debug;

use crate::consts::{CUSTOM_PAIR_TOLERANCE, PORTRAIT_RATIO, RATIO_TOLERANCE, WIDE_RATIO};
use crate::error::{Result, SizerError};
use crate::form::UploadForm;

/// Width-to-height ratio constraining the crop box.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum AspectRatio {
    /// Unconstrained cropping.
    #[default]
    Free,
    Fixed(f64),
}

impl AspectRatio {
    /// Numeric value at the widget boundary, NaN for free.
    pub fn value(&self) -> f64 {
        match self {
            Self::Free => f64::NAN,
            Self::Fixed(r) => *r,
        }
    }

    /// Return the fixed ratio, or `None` for free.
    pub fn fixed(&self) -> Option<f64> {
        match self {
            Self::Free => None,
            Self::Fixed(r) => Some(*r),
        }
    }

    pub fn is_free(&self) -> bool {
        matches!(self, Self::Free)
    }

    /// Compare within `tolerance`. Two free ratios are equal; free never
    /// matches a fixed ratio.
    pub fn matches(&self, other: &AspectRatio, tolerance: f64) -> bool {
        match (self, other) {
            (Self::Free, Self::Free) => true,
            (Self::Fixed(a), Self::Fixed(b)) => (a - b).abs() < tolerance,
            _ => false,
        }
    }
}

impl From<f64> for AspectRatio {
    fn from(value: f64) -> Self {
        if value.is_nan() {
            Self::Free
        } else {
            Self::Fixed(value)
        }
    }
}

/// Selectable ratio presets, in display order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RatioPreset {
    Wide,
    Portrait,
    Free,
}

impl RatioPreset {
    pub const ALL: &'static [Self] = &[Self::Wide, Self::Portrait, Self::Free];

    pub fn ratio(&self) -> AspectRatio {
        match self {
            Self::Wide => AspectRatio::Fixed(WIDE_RATIO),
            Self::Portrait => AspectRatio::Fixed(PORTRAIT_RATIO),
            Self::Free => AspectRatio::Free,
        }
    }
}

impl fmt::Display for RatioPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wide => write!(f, "16:9"),
            Self::Portrait => write!(f, "7:9"),
            Self::Free => write!(f, "free adjust"),
        }
    }
}

/// One ratio button and its highlight state.
#[derive(Clone, Debug, PartialEq)]
pub struct RatioControl {
    pub preset: RatioPreset,
    pub selected: bool,
}

/// The active ratio as presented to the user.
#[derive(Clone, Debug, PartialEq)]
pub struct RatioChoice {
    pub ratio: AspectRatio,
    pub label: String,
    pub is_preset: bool,
}

/// Raw text of the custom width and height inputs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CustomRatioInput {
    pub width: String,
    pub height: String,
}

impl CustomRatioInput {
    pub fn new(width: impl Into<String>, height: impl Into<String>) -> Self {
        Self {
            width: width.into(),
            height: height.into(),
        }
    }

    /// Both inputs when they are set to non-zero numbers.
    pub fn pair(&self) -> Option<(f64, f64)> {
        let w = parse_input(&self.width)?;
        let h = parse_input(&self.height)?;
        (w != 0.0 && h != 0.0).then_some((w, h))
    }

    /// `width / height` when both inputs are positive numbers.
    pub fn positive_ratio(&self) -> Result<f64> {
        match (parse_input(&self.width), parse_input(&self.height)) {
            (Some(w), Some(h)) if w > 0.0 && h > 0.0 => Ok(w / h),
            _ => Err(SizerError::InvalidCustomRatio),
        }
    }
}

fn parse_input(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Derive the label for `ratio`, in priority order: free, the two presets,
/// the typed custom pair, then the ratio rounded to two decimals.
pub fn ratio_label(ratio: AspectRatio, custom: &CustomRatioInput) -> String {
    let Some(r) = ratio.fixed() else {
        return RatioPreset::Free.to_string();
    };

    if (r - WIDE_RATIO).abs() < RATIO_TOLERANCE {
        return RatioPreset::Wide.to_string();
    }
    if (r - PORTRAIT_RATIO).abs() < RATIO_TOLERANCE {
        return RatioPreset::Portrait.to_string();
    }

    match custom.pair() {
        Some((w, h)) if (r - w / h).abs() < CUSTOM_PAIR_TOLERANCE => format!("custom ({w}:{h})"),
        _ => format!("custom ({:.2})", round_half_up(r)),
    }
}

/// Two decimals, ties away from zero.
fn round_half_up(r: f64) -> f64 {
    (r * 100.0).round() / 100.0
}

/// Tracks the active ratio, its label and which control is highlighted.
#[derive(Clone, Debug)]
pub struct RatioSelector {
    controls: Vec<RatioControl>,
    active: AspectRatio,
    label: String,
}

impl Default for RatioSelector {
    fn default() -> Self {
        let mut selector = Self {
            controls: RatioPreset::ALL
                .iter()
                .map(|&preset| RatioControl {
                    preset,
                    selected: false,
                })
                .collect(),
            active: AspectRatio::Free,
            label: String::new(),
        };
        selector.refresh(&CustomRatioInput::default());
        selector
    }
}

impl RatioSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `ratio` active: relabel, re-highlight and, for a fixed ratio,
    /// write it into the form's hidden ratio field. A free ratio leaves the
    /// last committed value in place.
    pub fn set_ratio(&mut self, ratio: AspectRatio, form: &mut UploadForm) {
        self.active = ratio;
        self.refresh(&form.custom);

        if let Some(r) = ratio.fixed() {
            form.target_ratio = Some(r);
        }
        debug!(ratio = %ratio.value(), label = %self.label, "Ratio selected");
    }

    fn refresh(&mut self, custom: &CustomRatioInput) {
        self.label = ratio_label(self.active, custom);
        for control in &mut self.controls {
            control.selected = control
                .preset
                .ratio()
                .matches(&self.active, RATIO_TOLERANCE);
        }
    }

    pub fn active(&self) -> AspectRatio {
        self.active
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Text of the ratio display line.
    pub fn display_text(&self) -> String {
        format!("Current ratio: {}", self.label)
    }

    pub fn controls(&self) -> &[RatioControl] {
        &self.controls
    }

    /// The highlighted preset, if the active ratio matches one.
    pub fn selected_preset(&self) -> Option<RatioPreset> {
        self.controls
            .iter()
            .find(|c| c.selected)
            .map(|c| c.preset)
    }

    pub fn choice(&self) -> RatioChoice {
        RatioChoice {
            ratio: self.active,
            label: self.label.clone(),
            is_preset: self.selected_preset().is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_input_rejects_non_finite() {
        assert_eq!(parse_input(" 4 "), Some(4.0));
        assert_eq!(parse_input("inf"), None);
        assert_eq!(parse_input("NaN"), None);
        assert_eq!(parse_input(""), None);
    }

    #[test]
    fn test_pair_requires_non_zero() {
        assert_eq!(CustomRatioInput::new("0", "3").pair(), None);
        assert_eq!(CustomRatioInput::new("4", "3").pair(), Some((4.0, 3.0)));
    }

    #[test]
    fn test_nan_converts_to_free() {
        assert_eq!(AspectRatio::from(f64::NAN), AspectRatio::Free);
        assert!(AspectRatio::Free.value().is_nan());
    }
}
