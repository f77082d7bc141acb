use std::env;
use std::process::ExitCode;

use embedded_graphics::draw_target::DrawTarget;
use embedded_graphics::geometry::{OriginDimensions, Size};
use embedded_graphics::pixelcolor::{Rgb888, RgbColor};
use embedded_graphics::Pixel;
use furigana::{FuriganaDocument, FuriganaView, LayoutConstraints, MeasureSpec};
use furigana_embedded_graphics::{render_view, EgTextMeasurer};

#[derive(Clone, Debug)]
struct Args {
    doc_path: String,
    out_path: String,
    width: u32,
    height: Option<u32>,
}

fn main() -> ExitCode {
    match run(env::args().collect()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("error: {}", msg);
            eprintln!("{}", help_text());
            ExitCode::FAILURE
        }
    }
}

fn run(args: Vec<String>) -> Result<(), String> {
    let cfg = parse_args(args)?;
    let json = std::fs::read_to_string(&cfg.doc_path)
        .map_err(|e| format!("unable to read {}: {}", cfg.doc_path, e))?;
    let doc = FuriganaDocument::from_json_str(&json).map_err(|e| e.to_string())?;

    let mut view = FuriganaView::new(doc.config, EgTextMeasurer::shared());
    view.set_source_text(doc.text);
    view.set_annotation_set(doc.annotations);

    let height_spec = match cfg.height {
        Some(h) => MeasureSpec::Exact(h as i32),
        None => MeasureSpec::Unconstrained,
    };
    let (width, height) = view.measure(LayoutConstraints::new(
        MeasureSpec::AtMost(cfg.width as i32),
        height_spec,
    ));

    let mut display = BitmapDisplay::new(width.max(1) as u32, height.max(1) as u32);
    render_view(&view, &mut display).map_err(|_| "render backend failed".to_string())?;
    display.save_ppm(&cfg.out_path)?;

    println!(
        "rendered {}x{} ({} wrapped line(s)) to {}",
        width,
        height,
        view.wrapped_lines().len(),
        cfg.out_path
    );
    Ok(())
}

fn parse_args(args: Vec<String>) -> Result<Args, String> {
    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        return Err("help requested".to_string());
    }

    let mut cfg = Args {
        doc_path: args[1].clone(),
        out_path: "target/furigana.ppm".to_string(),
        width: 320,
        height: None,
    };

    let mut i = 2usize;
    while i < args.len() {
        match args[i].as_str() {
            "--out" => {
                let v = args
                    .get(i + 1)
                    .ok_or_else(|| "--out requires a value".to_string())?;
                cfg.out_path = v.clone();
                i += 2;
            }
            "--width" => {
                let v = args
                    .get(i + 1)
                    .ok_or_else(|| "--width requires a value".to_string())?;
                cfg.width = v
                    .parse::<u32>()
                    .map_err(|_| format!("invalid --width value '{}'", v))?;
                i += 2;
            }
            "--height" => {
                let v = args
                    .get(i + 1)
                    .ok_or_else(|| "--height requires a value".to_string())?;
                cfg.height = Some(
                    v.parse::<u32>()
                        .map_err(|_| format!("invalid --height value '{}'", v))?,
                );
                i += 2;
            }
            other => return Err(format!("unknown option '{}'", other)),
        }
    }

    if cfg.width == 0 || cfg.height == Some(0) {
        return Err("--width and --height must be > 0".to_string());
    }
    Ok(cfg)
}

fn help_text() -> &'static str {
    "usage: visualize <document.json> [--out FILE.ppm] [--width PX] [--height PX]\n\
     \n\
     Renders a furigana document with the built-in mono fonts and writes a\n\
     binary PPM image. Width is an advisory cap; --height fixes the height."
}

struct BitmapDisplay {
    size: Size,
    pixels: Vec<Rgb888>,
}

impl BitmapDisplay {
    fn new(width: u32, height: u32) -> Self {
        let len = width.saturating_mul(height) as usize;
        Self {
            size: Size::new(width, height),
            pixels: vec![Rgb888::WHITE; len],
        }
    }

    fn save_ppm(&self, path: &str) -> Result<(), String> {
        let mut data = Vec::with_capacity(self.pixels.len() * 3 + 64);
        data.extend_from_slice(
            format!("P6\n{} {}\n255\n", self.size.width, self.size.height).as_bytes(),
        );
        for color in &self.pixels {
            data.extend_from_slice(&[color.r(), color.g(), color.b()]);
        }
        std::fs::write(path, data).map_err(|e| e.to_string())
    }
}

impl OriginDimensions for BitmapDisplay {
    fn size(&self) -> Size {
        self.size
    }
}

impl DrawTarget for BitmapDisplay {
    type Color = Rgb888;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let w = self.size.width as i32;
        let h = self.size.height as i32;
        for Pixel(point, color) in pixels {
            if point.x < 0 || point.y < 0 || point.x >= w || point.y >= h {
                continue;
            }
            let idx = (point.y as u32 * self.size.width + point.x as u32) as usize;
            self.pixels[idx] = color;
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        for pixel in &mut self.pixels {
            *pixel = color;
        }
        Ok(())
    }
}
