use core::fmt;

use serde::{Deserialize, Serialize};

use crate::annotation::AnnotationSet;
use crate::color::Color;
use crate::metrics::TextStyle;
use crate::placement::AnnotationAlign;
use crate::wrap::WrapPolicy;

/// Styling and behavior for a [`FuriganaView`](crate::FuriganaView).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Base text color.
    pub text_color: Color,
    /// Base text size in pixels.
    pub text_size_px: f32,
    /// Ruby text color.
    pub annotation_color: Color,
    /// Ruby text size in pixels.
    pub annotation_size_px: f32,
    /// Annotate only the first line each target appears on.
    pub first_occurrence_only: bool,
    /// Surface fill drawn before any text.
    pub background_color: Color,
    /// Ruby anchoring over its target.
    pub annotation_align: AnnotationAlign,
    /// Line splitting policy.
    pub wrap_policy: WrapPolicy,
}

impl ViewConfig {
    pub const DEFAULT_TEXT_SIZE_PX: f32 = 18.0;
    pub const DEFAULT_ANNOTATION_SIZE_PX: f32 = 12.0;

    /// Parse a JSON config; absent fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject sizes that cannot produce glyphs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("text_size_px", self.text_size_px),
            ("annotation_size_px", self.annotation_size_px),
        ] {
            check_size(field, value)?;
        }
        Ok(())
    }

    pub fn text_style(&self) -> TextStyle {
        TextStyle::new(self.text_color, self.text_size_px)
    }

    pub fn annotation_style(&self) -> TextStyle {
        TextStyle::new(self.annotation_color, self.annotation_size_px)
    }
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            text_color: Color::BLACK,
            text_size_px: Self::DEFAULT_TEXT_SIZE_PX,
            annotation_color: Color::BLACK,
            annotation_size_px: Self::DEFAULT_ANNOTATION_SIZE_PX,
            first_occurrence_only: false,
            background_color: Color::WHITE,
            annotation_align: AnnotationAlign::Start,
            wrap_policy: WrapPolicy::FixedWidthApproximate,
        }
    }
}

/// Source text, annotations and config in one serializable bundle.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FuriganaDocument {
    pub text: String,
    #[serde(default)]
    pub annotations: AnnotationSet,
    #[serde(default)]
    pub config: ViewConfig,
}

impl FuriganaDocument {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let doc: Self = serde_json::from_str(json)?;
        doc.config.validate()?;
        Ok(doc)
    }
}

/// Error returned when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// JSON was malformed or carried invalid values (bad color, empty target).
    Json(serde_json::Error),
    /// A type size was not a positive finite number.
    InvalidSize { field: &'static str, value: f32 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(err) => write!(f, "invalid config JSON: {}", err),
            Self::InvalidSize { field, value } => {
                write!(f, "{} must be a positive size (got {})", field, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::InvalidSize { .. } => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

pub(crate) fn check_size(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigError::InvalidSize { field, value });
    }
    Ok(())
}
