use core::convert::Infallible;

use embedded_graphics::draw_target::DrawTarget;
use embedded_graphics::geometry::{OriginDimensions, Size};
use embedded_graphics::pixelcolor::{Rgb888, RgbColor};
use embedded_graphics::Pixel;
use furigana::{Color, FuriganaDocument, FuriganaView, LayoutConstraints};
use furigana_embedded_graphics::{render_view, to_rgb888, EgTextMeasurer};

struct RowDisplay {
    size: Size,
    pixels: Vec<Rgb888>,
}

impl RowDisplay {
    fn new(width: u32, height: u32) -> Self {
        Self {
            size: Size::new(width, height),
            pixels: vec![Rgb888::BLACK; (width * height) as usize],
        }
    }

    fn rows_with(&self, color: Rgb888) -> Vec<u32> {
        (0..self.size.height)
            .filter(|&y| {
                (0..self.size.width)
                    .any(|x| self.pixels[(y * self.size.width + x) as usize] == color)
            })
            .collect()
    }
}

impl OriginDimensions for RowDisplay {
    fn size(&self) -> Size {
        self.size
    }
}

impl DrawTarget for RowDisplay {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if point.x >= 0
                && point.y >= 0
                && (point.x as u32) < self.size.width
                && (point.y as u32) < self.size.height
            {
                self.pixels[(point.y as u32 * self.size.width + point.x as u32) as usize] = color;
            }
        }
        Ok(())
    }
}

const DOC: &str = r##"{
    "text": "watashi wa nihongo o benkyou shite imasu",
    "annotations": [
        {"target": "nihongo", "ruby": "NIHONGO"},
        {"target": "benkyou", "ruby": "BENKYOU"}
    ],
    "config": {
        "text_color": "#000000",
        "annotation_color": "#CC0000",
        "background_color": "#FFFFFF"
    }
}"##;

#[test]
fn wrapped_document_renders_ruby_band_above_each_text_band() {
    let doc = FuriganaDocument::from_json_str(DOC).unwrap();
    let mut view = FuriganaView::new(doc.config, EgTextMeasurer::shared());
    view.set_source_text(doc.text);
    view.set_annotation_set(doc.annotations);

    let (w, h) = view.measure(LayoutConstraints::at_most_width(180));
    assert_eq!(w, 180);
    assert!(view.wrapped_lines().len() >= 2);

    let mut display = RowDisplay::new(w as u32, (h.max(1) as u32) + 40);
    render_view(&view, &mut display).unwrap();

    let ruby_rows = display.rows_with(to_rgb888(Color::rgb(0xCC, 0, 0)));
    let text_rows = display.rows_with(Rgb888::BLACK);
    assert!(!ruby_rows.is_empty());
    assert!(!text_rows.is_empty());
    assert!(ruby_rows[0] < text_rows[0]);
}

#[test]
fn background_color_covers_untouched_pixels() {
    let doc = FuriganaDocument::from_json_str(DOC).unwrap();
    let mut view = FuriganaView::new(doc.config, EgTextMeasurer::shared());
    view.set_source_text("");
    let mut display = RowDisplay::new(4, 4);
    render_view(&view, &mut display).unwrap();
    assert_eq!(display.rows_with(Rgb888::WHITE).len(), 4);
    assert!(display.rows_with(Rgb888::BLACK).is_empty());
}
