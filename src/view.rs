use std::sync::Arc;

use crate::annotation::{AnnotationError, AnnotationSet};
use crate::color::Color;
use crate::config::{check_size, ConfigError, ViewConfig};
use crate::constraints::LayoutConstraints;
use crate::metrics::{FontMetrics, TextMeasurer, TextStyle};
use crate::placement::AnnotationLayoutEngine;
use crate::render_ir::{DrawCommand, Surface, TextCommand, TextLayer};
use crate::wrap::{LineWrapper, Measurement, WrapStrategy, WrappedLines};

/// Upward nudge applied to ruby baselines on wrapped lines.
pub const WRAPPED_ANNOTATION_NUDGE_PX: f32 = 10.0;

/// Ruby baseline when the text stays on one logical line.
///
/// Half the annotation extent plus the base font's half-metrics bias. This is
/// not the wrapped formula evaluated for line 0.
pub fn unwrapped_annotation_baseline(annotation: FontMetrics, base: FontMetrics) -> f32 {
    annotation.line_extent() as f32 / 2.0 + base.half_metrics_bias() as f32
}

/// Base text baseline when the text stays on one logical line.
pub fn unwrapped_text_baseline(annotation: FontMetrics, base: FontMetrics) -> f32 {
    (annotation.line_extent() + base.line_extent()) as f32
}

/// Height of one wrapped line: annotation extent stacked on base extent.
pub fn wrapped_line_height(annotation: FontMetrics, base: FontMetrics) -> i32 {
    annotation.line_extent() + base.line_extent()
}

/// Ruby baseline above a wrapped line whose base baseline is `line_origin_y`.
///
/// `line_height / 2` is integer division.
pub fn wrapped_annotation_baseline(line_origin_y: f32, line_height: i32) -> f32 {
    line_origin_y - (line_height / 2) as f32 - WRAPPED_ANNOTATION_NUDGE_PX
}

/// Single-style text view with furigana above annotated substrings.
///
/// Call [`measure`](Self::measure) before [`draw`](Self::draw): wrapped lines
/// computed by the last measurement are reused by every draw pass until the
/// text or a style changes.
pub struct FuriganaView {
    cfg: ViewConfig,
    text: String,
    annotations: AnnotationSet,
    measurer: Arc<dyn TextMeasurer>,
    wrap_strategy: Option<Box<dyn WrapStrategy>>,
    lines: WrappedLines,
    last_measurement: Option<Measurement>,
}

impl core::fmt::Debug for FuriganaView {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FuriganaView")
            .field("cfg", &self.cfg)
            .field("text", &self.text)
            .field("annotations", &self.annotations.len())
            .field("has_custom_wrap_strategy", &self.wrap_strategy.is_some())
            .field("lines", &self.lines.len())
            .finish()
    }
}

impl FuriganaView {
    /// Create an empty view.
    pub fn new(cfg: ViewConfig, measurer: Arc<dyn TextMeasurer>) -> Self {
        Self {
            cfg,
            text: String::new(),
            annotations: AnnotationSet::new(),
            measurer,
            wrap_strategy: None,
            lines: WrappedLines::new(),
            last_measurement: None,
        }
    }

    /// Install a custom wrap strategy, overriding `cfg.wrap_policy`.
    pub fn with_wrap_strategy(mut self, strategy: Box<dyn WrapStrategy>) -> Self {
        self.wrap_strategy = Some(strategy);
        self.invalidate_layout();
        self
    }

    pub fn config(&self) -> &ViewConfig {
        &self.cfg
    }

    pub fn source_text(&self) -> &str {
        &self.text
    }

    pub fn set_source_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.invalidate_layout();
    }

    /// Replace every annotation with `(target, ruby)` pairs.
    ///
    /// On error the previous set is kept.
    pub fn set_annotations<I, T, R>(&mut self, pairs: I) -> Result<(), AnnotationError>
    where
        I: IntoIterator<Item = (T, R)>,
        T: Into<String>,
        R: Into<String>,
    {
        self.annotations = AnnotationSet::from_pairs(pairs)?;
        Ok(())
    }

    /// Replace every annotation with a prebuilt set.
    pub fn set_annotation_set(&mut self, annotations: AnnotationSet) {
        self.annotations = annotations;
    }

    pub fn annotations(&self) -> &AnnotationSet {
        &self.annotations
    }

    pub fn set_first_occurrence_only(&mut self, enabled: bool) {
        self.cfg.first_occurrence_only = enabled;
    }

    /// Change the base text paint. Sizes must be finite and positive; on
    /// error the view is left untouched.
    pub fn set_text_style(&mut self, color: Color, size_px: f32) -> Result<(), ConfigError> {
        check_size("text_size_px", size_px)?;
        self.cfg.text_color = color;
        self.cfg.text_size_px = size_px;
        self.invalidate_layout();
        Ok(())
    }

    /// Change the ruby paint, validated like [`set_text_style`](Self::set_text_style).
    pub fn set_annotation_style(&mut self, color: Color, size_px: f32) -> Result<(), ConfigError> {
        check_size("annotation_size_px", size_px)?;
        self.cfg.annotation_color = color;
        self.cfg.annotation_size_px = size_px;
        self.invalidate_layout();
        Ok(())
    }

    pub fn set_background_color(&mut self, color: Color) {
        self.cfg.background_color = color;
    }

    /// Lines produced by the last measurement; empty when no wrap was needed.
    pub fn wrapped_lines(&self) -> &WrappedLines {
        &self.lines
    }

    pub fn last_measurement(&self) -> Option<&Measurement> {
        self.last_measurement.as_ref()
    }

    /// Resolve the view size for `constraints`, wrapping text when needed.
    pub fn measure(&mut self, constraints: LayoutConstraints) -> (i32, i32) {
        let wrapper = LineWrapper::new(
            self.measurer.as_ref(),
            self.cfg.text_style(),
            self.cfg.annotation_style(),
        );
        let strategy: &dyn WrapStrategy = match &self.wrap_strategy {
            Some(custom) => custom.as_ref(),
            None => &self.cfg.wrap_policy,
        };
        let (measurement, lines) = wrapper.layout(&self.text, constraints, strategy);
        self.lines = lines;
        self.last_measurement = Some(measurement);
        (measurement.width, measurement.height)
    }

    /// Build the commands of one full draw pass.
    ///
    /// Each call starts a fresh match session, so first-occurrence state never
    /// carries over from a previous pass.
    pub fn draw_commands(&self) -> Vec<DrawCommand> {
        let mut out = vec![DrawCommand::Background {
            color: self.cfg.background_color,
        }];
        if self.text.is_empty() {
            return out;
        }

        let base_style = self.cfg.text_style();
        let annotation_style = self.cfg.annotation_style();
        let base = self.measurer.font_metrics(&base_style);
        let annotation = self.measurer.font_metrics(&annotation_style);
        let engine =
            AnnotationLayoutEngine::new(self.measurer.as_ref(), base_style, annotation_style)
                .with_align(self.cfg.annotation_align);
        let mut session = self.annotations.start_session();
        let first_only = self.cfg.first_occurrence_only;

        let mut push_line = |line: &str, text_y: f32, annotation_y: f32| {
            for placement in
                engine.place_annotations(line, &self.annotations, &mut session, first_only)
            {
                out.push(DrawCommand::Text(TextCommand {
                    x: placement.x,
                    baseline_y: annotation_y,
                    text: placement.text,
                    style: annotation_style,
                    layer: TextLayer::Annotation,
                }));
            }
            out.push(DrawCommand::Text(TextCommand {
                x: 0.0,
                baseline_y: text_y,
                text: line.to_string(),
                style: base_style,
                layer: TextLayer::Base,
            }));
        };

        if self.lines.is_empty() {
            push_line(
                &self.text,
                unwrapped_text_baseline(annotation, base),
                unwrapped_annotation_baseline(annotation, base),
            );
        } else {
            let line_height = wrapped_line_height(annotation, base);
            let mut origin_y = line_height as f32;
            for line in self.lines.iter() {
                push_line(
                    line,
                    origin_y,
                    wrapped_annotation_baseline(origin_y, line_height),
                );
                origin_y += line_height as f32;
            }
        }
        log::debug!(
            "draw pass: {} command(s), {} annotation(s) applied",
            out.len(),
            session.applied_count()
        );
        out
    }

    /// Run one full draw pass against `surface`.
    pub fn draw<S>(&self, surface: &mut S) -> Result<(), S::Error>
    where
        S: Surface + ?Sized,
    {
        for cmd in self.draw_commands() {
            surface.execute(&cmd)?;
        }
        Ok(())
    }

    fn invalidate_layout(&mut self) {
        self.lines.clear();
        self.last_measurement = None;
    }
}
