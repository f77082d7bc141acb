use serde::{Deserialize, Serialize};

use crate::constraints::{LayoutConstraints, MeasureSpec};
use crate::metrics::{FontMetrics, TextMeasurer, TextStyle};

/// Ordered line strings produced by a wrap pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WrappedLines {
    lines: Vec<String>,
}

impl WrappedLines {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.lines.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.lines
    }

    /// Lines joined back together in order.
    pub fn concat(&self) -> String {
        self.lines.concat()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

impl From<Vec<String>> for WrappedLines {
    fn from(lines: Vec<String>) -> Self {
        Self { lines }
    }
}

/// Space available to a wrap pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WrapBudget {
    /// Horizontal budget in pixels.
    pub max_width: i32,
    /// Vertical budget in pixels; `None` is unbounded.
    pub max_height: Option<i32>,
    /// Base text line extent used to convert the height budget into lines.
    pub base_line_extent: i32,
}

impl WrapBudget {
    /// Maximum number of lines the height budget admits.
    pub fn max_lines(self) -> usize {
        match self.max_height {
            Some(height) if self.base_line_extent > 0 => {
                usize::try_from(height / self.base_line_extent).unwrap_or(0)
            }
            _ => usize::MAX,
        }
    }
}

/// Policy that splits source text into lines.
pub trait WrapStrategy: Send + Sync {
    fn wrap(
        &self,
        text: &str,
        budget: WrapBudget,
        measurer: &dyn TextMeasurer,
        style: &TextStyle,
    ) -> WrappedLines;
}

/// Monospace approximation: the first character's width sets a fixed
/// characters-per-line count for the whole text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FixedWidthApproximateWrap;

impl WrapStrategy for FixedWidthApproximateWrap {
    fn wrap(
        &self,
        text: &str,
        budget: WrapBudget,
        measurer: &dyn TextMeasurer,
        style: &TextStyle,
    ) -> WrappedLines {
        if text.is_empty() {
            return WrappedLines::new();
        }
        let single_char_width = measurer.measure_text_px(text, 0, 1, style) as i32;
        let chars_per_line = if single_char_width <= 0 {
            log::warn!("first glyph measured {}px; wrapping one char per line", single_char_width);
            1
        } else {
            usize::try_from(budget.max_width / single_char_width)
                .unwrap_or(0)
                .max(1)
        };

        let bounds = char_boundaries(text);
        let char_count = bounds.len() - 1;
        let max_lines = budget.max_lines();
        let mut lines = Vec::new();
        let mut start = 0usize;
        while start < char_count {
            let end = (start + chars_per_line).min(char_count);
            lines.push(text[bounds[start]..bounds[end]].to_string());
            start = end;
            if lines.len() >= max_lines {
                break;
            }
        }
        if start < char_count {
            log::warn!(
                "height budget admits {} line(s); dropped {} trailing char(s)",
                lines.len(),
                char_count - start
            );
        }
        log::debug!(
            "fixed-width wrap: {} char(s)/line, {} line(s)",
            chars_per_line,
            lines.len()
        );
        WrappedLines::from(lines)
    }
}

/// Greedy wrap using real prefix widths: each line takes as many characters
/// as fit `max_width`, and never fewer than one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GreedyMeasuredWrap;

impl WrapStrategy for GreedyMeasuredWrap {
    fn wrap(
        &self,
        text: &str,
        budget: WrapBudget,
        measurer: &dyn TextMeasurer,
        style: &TextStyle,
    ) -> WrappedLines {
        let bounds = char_boundaries(text);
        let char_count = bounds.len() - 1;
        let max_lines = budget.max_lines();
        let limit = budget.max_width as f32;
        let mut lines = Vec::new();
        let mut start = 0usize;
        while start < char_count {
            let mut end = start + 1;
            while end < char_count && measurer.measure_text_px(text, start, end + 1, style) <= limit
            {
                end += 1;
            }
            lines.push(text[bounds[start]..bounds[end]].to_string());
            start = end;
            if lines.len() >= max_lines {
                break;
            }
        }
        if start < char_count {
            log::warn!(
                "height budget admits {} line(s); dropped {} trailing char(s)",
                lines.len(),
                char_count - start
            );
        }
        log::debug!("greedy wrap: {} line(s)", lines.len());
        WrappedLines::from(lines)
    }
}

/// Named wrap policy selectable from configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WrapPolicy {
    #[default]
    FixedWidthApproximate,
    GreedyMeasured,
}

impl WrapStrategy for WrapPolicy {
    fn wrap(
        &self,
        text: &str,
        budget: WrapBudget,
        measurer: &dyn TextMeasurer,
        style: &TextStyle,
    ) -> WrappedLines {
        match self {
            Self::FixedWidthApproximate => {
                FixedWidthApproximateWrap.wrap(text, budget, measurer, style)
            }
            Self::GreedyMeasured => GreedyMeasuredWrap.wrap(text, budget, measurer, style),
        }
    }
}

/// Outcome of one measurement pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Measurement {
    /// Measured width in pixels.
    pub width: i32,
    /// Measured height in pixels.
    pub height: i32,
    /// Text had to be split into several lines.
    pub wrap_needed: bool,
    /// Number of wrapped lines (0 when the text stays on one logical line).
    pub line_count: usize,
    /// Height of one annotated line before wrap adjustment.
    pub single_line_height: i32,
    /// Horizontal wrap budget derived from the width constraint.
    pub wrap_width: i32,
    /// Vertical wrap budget; `None` is unbounded.
    pub height_budget: Option<i32>,
}

/// Measures annotated text and decides whether and how it wraps.
pub struct LineWrapper<'a> {
    measurer: &'a dyn TextMeasurer,
    base_style: TextStyle,
    annotation_style: TextStyle,
}

impl<'a> LineWrapper<'a> {
    pub fn new(
        measurer: &'a dyn TextMeasurer,
        base_style: TextStyle,
        annotation_style: TextStyle,
    ) -> Self {
        Self {
            measurer,
            base_style,
            annotation_style,
        }
    }

    fn base_metrics(&self) -> FontMetrics {
        self.measurer.font_metrics(&self.base_style)
    }

    fn annotation_metrics(&self) -> FontMetrics {
        self.measurer.font_metrics(&self.annotation_style)
    }

    /// Resolve width, height and the wrap decision without splitting text.
    pub fn measure(&self, text: &str, constraints: LayoutConstraints) -> Measurement {
        let base = self.base_metrics();
        let annotation = self.annotation_metrics();
        let single_line_height =
            base.line_extent() + annotation.line_extent() + annotation.half_metrics_bias();

        if text.is_empty() {
            return Measurement {
                width: match constraints.width {
                    MeasureSpec::Exact(w) => w,
                    _ => 0,
                },
                height: match constraints.height {
                    MeasureSpec::Exact(h) => h,
                    _ => 0,
                },
                single_line_height,
                ..Measurement::default()
            };
        }

        let text_width = self.measurer.measure_str_px(text, &self.base_style) as i32;
        let (width, wrap_width, wrap_needed) = match constraints.width {
            MeasureSpec::AtMost(bound) if text_width > bound => (bound, bound, true),
            MeasureSpec::AtMost(bound) => (text_width, bound, false),
            MeasureSpec::Exact(w) => (w, w, text_width > w),
            MeasureSpec::Unconstrained => (text_width, 0, false),
        };
        let (height, height_budget) = match constraints.height {
            MeasureSpec::Exact(h) => (h, Some(h)),
            MeasureSpec::AtMost(_) | MeasureSpec::Unconstrained => (single_line_height, None),
        };

        Measurement {
            width,
            height,
            wrap_needed,
            line_count: 0,
            single_line_height,
            wrap_width,
            height_budget,
        }
    }

    /// Measure, wrap when needed, and apply the wrapped height adjustment.
    pub fn layout(
        &self,
        text: &str,
        constraints: LayoutConstraints,
        strategy: &dyn WrapStrategy,
    ) -> (Measurement, WrappedLines) {
        let mut measurement = self.measure(text, constraints);
        if !measurement.wrap_needed {
            log::debug!(
                "measured {}x{} without wrapping",
                measurement.width,
                measurement.height
            );
            return (measurement, WrappedLines::new());
        }

        let budget = WrapBudget {
            max_width: measurement.wrap_width,
            max_height: measurement.height_budget,
            base_line_extent: self.base_metrics().line_extent(),
        };
        let lines = strategy.wrap(text, budget, self.measurer, &self.base_style);
        measurement.line_count = lines.len();
        if !constraints.height_is_exact() {
            measurement.height = wrapped_height(
                measurement.single_line_height,
                lines.len(),
                self.annotation_metrics().line_extent(),
            );
        }
        log::debug!(
            "measured {}x{} across {} wrapped line(s)",
            measurement.width,
            measurement.height,
            measurement.line_count
        );
        (measurement, lines)
    }
}

/// Advisory height of `line_count` wrapped lines.
///
/// Subtracts one annotation extent from the stacked single-line heights
/// rather than using `line_count * line_height`. Saturates at `i32` bounds.
fn wrapped_height(single_line_height: i32, line_count: usize, annotation_extent: i32) -> i32 {
    let lines = i32::try_from(line_count).unwrap_or(i32::MAX);
    single_line_height
        .saturating_mul(lines)
        .saturating_sub(annotation_extent)
}

fn char_boundaries(text: &str) -> Vec<usize> {
    text.char_indices()
        .map(|(idx, _)| idx)
        .chain(core::iter::once(text.len()))
        .collect()
}
