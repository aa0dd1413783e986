pub mod config;
pub mod inspect;
pub mod upload;

use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use sizer_core::config::ClientConfig;
use sizer_core::form::UploadForm;
use sizer_core::ratio::{AspectRatio, CustomRatioInput, RatioPreset};

/// `--ratio` value: a preset name, a `W:H` pair or a plain number.
#[derive(Clone, Debug, PartialEq)]
pub enum RatioArg {
    Free,
    Pair { width: String, height: String },
    Value(f64),
}

impl FromStr for RatioArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("free") {
            return Ok(Self::Free);
        }
        if let Some((width, height)) = s.split_once(':') {
            return Ok(Self::Pair {
                width: width.trim().to_owned(),
                height: height.trim().to_owned(),
            });
        }
        match s.parse::<f64>() {
            Ok(v) if v.is_finite() && v > 0.0 => Ok(Self::Value(v)),
            _ => Err(format!(
                "expected free, W:H or a positive number, got '{s}'"
            )),
        }
    }
}

impl RatioArg {
    /// Resolve to the ratio to select. A pair goes through the custom
    /// width/height inputs so it is labelled like a typed custom ratio.
    pub fn resolve(&self, form: &mut UploadForm) -> sizer_core::error::Result<AspectRatio> {
        match self {
            Self::Free => Ok(RatioPreset::Free.ratio()),
            Self::Value(v) => Ok(AspectRatio::Fixed(*v)),
            Self::Pair { width, height } => {
                let custom = CustomRatioInput::new(width.as_str(), height.as_str());
                let ratio = custom.positive_ratio()?;
                form.custom = custom;
                Ok(AspectRatio::Fixed(ratio))
            }
        }
    }
}

/// Read a TOML client config, or fall back to the defaults.
pub fn load_config(path: Option<&Path>) -> Result<ClientConfig> {
    let Some(path) = path else {
        return Ok(ClientConfig::default());
    };
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    toml::from_str(&contents).context("Invalid client config")
}
