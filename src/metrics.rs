use serde::{Deserialize, Serialize};

use crate::color::Color;

/// Paint style for one text layer (base text or annotation).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    /// Fill color.
    pub color: Color,
    /// Type size in pixels.
    pub size_px: f32,
}

impl TextStyle {
    pub const fn new(color: Color, size_px: f32) -> Self {
        Self { color, size_px }
    }
}

/// Integer font metrics for one type size.
///
/// Values follow the y-down convention: `ascent` and `top` are negative
/// offsets above the baseline, `descent` and `bottom` are positive offsets
/// below it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontMetrics {
    /// Recommended distance above the baseline.
    pub ascent: i32,
    /// Recommended distance below the baseline.
    pub descent: i32,
    /// Maximum distance above the baseline for any glyph.
    pub top: i32,
    /// Maximum distance below the baseline for any glyph.
    pub bottom: i32,
}

impl FontMetrics {
    /// Vertical span of one line without external leading.
    pub const fn line_extent(self) -> i32 {
        self.descent - self.ascent
    }

    /// Offset that moves a baseline so the glyph box is vertically centered.
    ///
    /// Integer arithmetic; `(bottom - top) / 2` truncates toward zero.
    pub const fn half_metrics_bias(self) -> i32 {
        (self.bottom - self.top) / 2 - self.bottom
    }
}

/// Host text measurement hook.
///
/// Offsets are character (Unicode scalar) indices into `text`, with `end`
/// exclusive. Implementations must be pure for a given input.
pub trait TextMeasurer: Send + Sync {
    /// Width in pixels of `text[start..end]` rendered with `style`.
    fn measure_text_px(&self, text: &str, start: usize, end: usize, style: &TextStyle) -> f32;

    /// Metrics for `style`.
    fn font_metrics(&self, style: &TextStyle) -> FontMetrics;

    /// Width of the whole string.
    fn measure_str_px(&self, text: &str, style: &TextStyle) -> f32 {
        self.measure_text_px(text, 0, text.chars().count(), style)
    }
}

/// Fixed-advance measurer: every character is `advance_em * size_px` wide.
///
/// Useful for headless layout and as a deterministic stand-in in tests.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedAdvanceMeasurer {
    /// Horizontal advance per character, as a multiple of the type size.
    pub advance_em: f32,
    /// Ascent as a multiple of the type size (positive).
    pub ascent_em: f32,
    /// Descent as a multiple of the type size (positive).
    pub descent_em: f32,
}

impl Default for FixedAdvanceMeasurer {
    fn default() -> Self {
        Self {
            advance_em: 1.0,
            ascent_em: 0.88,
            descent_em: 0.24,
        }
    }
}

impl TextMeasurer for FixedAdvanceMeasurer {
    fn measure_text_px(&self, _text: &str, start: usize, end: usize, style: &TextStyle) -> f32 {
        end.saturating_sub(start) as f32 * self.advance_em * style.size_px
    }

    fn font_metrics(&self, style: &TextStyle) -> FontMetrics {
        let ascent = -(self.ascent_em * style.size_px).round() as i32;
        let descent = (self.descent_em * style.size_px).round() as i32;
        FontMetrics {
            ascent,
            descent,
            top: ascent - 1,
            bottom: descent + 1,
        }
    }
}
