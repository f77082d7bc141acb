//! embedded-graphics backend for `furigana` views.

#![cfg_attr(
    not(test),
    deny(
        clippy::disallowed_methods,
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::panic_in_result_fn,
        clippy::todo,
        clippy::unimplemented
    )
)]

use embedded_graphics::{
    mono_font::{
        ascii::{FONT_10X20, FONT_4X6, FONT_6X10, FONT_7X13, FONT_9X15, FONT_9X18},
        MonoFont, MonoTextStyle,
    },
    pixelcolor::Rgb888,
    prelude::*,
    text::{Baseline, Text},
};
use furigana::{Color, FontMetrics, FuriganaView, Surface, TextMeasurer, TextStyle};
use std::sync::Arc;

/// Backend-local font identifier (size bucket index).
pub type FontId = u8;

/// Maps type sizes onto the built-in ASCII mono fonts.
#[derive(Clone, Copy, Debug, Default)]
pub struct MonoFontBackend;

impl MonoFontBackend {
    const SIZE_TINY: FontId = 0;
    const SIZE_SMALL: FontId = 1;
    const SIZE_MEDIUM: FontId = 2;
    const SIZE_LARGE: FontId = 3;
    const SIZE_XL: FontId = 4;
    const SIZE_XXL: FontId = 5;

    /// Size bucket for a style.
    pub fn font_id_for(style: &TextStyle) -> FontId {
        let px = style.size_px;
        if px >= 24.0 {
            Self::SIZE_XXL
        } else if px >= 18.0 {
            Self::SIZE_XL
        } else if px >= 15.0 {
            Self::SIZE_LARGE
        } else if px >= 12.0 {
            Self::SIZE_MEDIUM
        } else if px >= 9.0 {
            Self::SIZE_SMALL
        } else {
            Self::SIZE_TINY
        }
    }

    pub fn font_for(font_id: FontId) -> &'static MonoFont<'static> {
        match font_id {
            Self::SIZE_TINY => &FONT_4X6,
            Self::SIZE_SMALL => &FONT_6X10,
            Self::SIZE_MEDIUM => &FONT_7X13,
            Self::SIZE_LARGE => &FONT_9X15,
            Self::SIZE_XL => &FONT_9X18,
            _ => &FONT_10X20,
        }
    }

    fn font_for_style(style: &TextStyle) -> &'static MonoFont<'static> {
        Self::font_for(Self::font_id_for(style))
    }

    /// Metrics derived from the glyph cell: everything above the baseline
    /// is ascent, everything below is descent.
    pub fn metrics(font_id: FontId) -> FontMetrics {
        let font = Self::font_for(font_id);
        let ascent = -(font.baseline as i32);
        let descent = font.character_size.height as i32 - font.baseline as i32;
        FontMetrics {
            ascent,
            descent,
            top: ascent,
            bottom: descent,
        }
    }

    /// Width of `chars` glyphs including inter-glyph spacing.
    pub fn run_width(font_id: FontId, chars: usize) -> i32 {
        if chars == 0 {
            return 0;
        }
        let font = Self::font_for(font_id);
        let n = chars as i32;
        n * font.character_size.width as i32 + (n - 1) * font.character_spacing as i32
    }
}

/// `TextMeasurer` backed by the mono font cells.
#[derive(Clone, Copy, Debug, Default)]
pub struct EgTextMeasurer;

impl EgTextMeasurer {
    pub fn new() -> Self {
        Self
    }

    /// Shared measurer for [`FuriganaView::new`].
    pub fn shared() -> Arc<dyn TextMeasurer> {
        Arc::new(Self::new())
    }
}

impl TextMeasurer for EgTextMeasurer {
    fn measure_text_px(&self, _text: &str, start: usize, end: usize, style: &TextStyle) -> f32 {
        MonoFontBackend::run_width(MonoFontBackend::font_id_for(style), end.saturating_sub(start))
            as f32
    }

    fn font_metrics(&self, style: &TextStyle) -> FontMetrics {
        MonoFontBackend::metrics(MonoFontBackend::font_id_for(style))
    }
}

/// Convert a packed ARGB color; alpha is dropped.
pub fn to_rgb888(color: Color) -> Rgb888 {
    Rgb888::new(color.red(), color.green(), color.blue())
}

/// [`Surface`] over any RGB888 `DrawTarget`.
pub struct EgSurface<'a, D> {
    display: &'a mut D,
}

impl<'a, D> EgSurface<'a, D>
where
    D: DrawTarget<Color = Rgb888>,
{
    pub fn new(display: &'a mut D) -> Self {
        Self { display }
    }
}

impl<D> Surface for EgSurface<'_, D>
where
    D: DrawTarget<Color = Rgb888>,
{
    type Error = D::Error;

    fn fill_background(&mut self, color: Color) -> Result<(), Self::Error> {
        if color.alpha() == 0 {
            log::trace!("transparent background; leaving display untouched");
            return Ok(());
        }
        self.display.clear(to_rgb888(color))
    }

    fn draw_text(
        &mut self,
        text: &str,
        x: f32,
        y: f32,
        style: &TextStyle,
    ) -> Result<(), Self::Error> {
        if style.color.alpha() == 0 || text.is_empty() {
            log::trace!("skipping invisible text run {:?}", text);
            return Ok(());
        }
        let font = MonoFontBackend::font_for_style(style);
        let origin = Point::new(x.round() as i32, y.round() as i32);
        let text_style = MonoTextStyle::new(font, to_rgb888(style.color));
        Text::with_baseline(text, origin, text_style, Baseline::Alphabetic)
            .draw(&mut *self.display)?;
        Ok(())
    }
}

/// Draw one full pass of `view` onto `display`.
pub fn render_view<D>(view: &FuriganaView, display: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    let mut surface = EgSurface::new(display);
    view.draw(&mut surface)
}
