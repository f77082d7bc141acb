//! Furigana layout: measure, wrap, and place ruby annotations above text.
//!
//! The crate is host-agnostic. Text widths and font metrics come from a
//! [`TextMeasurer`], and output is either a list of [`DrawCommand`]s or calls
//! on a [`Surface`].
//!
//! ```
//! use std::sync::Arc;
//! use furigana::{FixedAdvanceMeasurer, FuriganaView, LayoutConstraints, ViewConfig};
//!
//! let mut view = FuriganaView::new(ViewConfig::default(), Arc::new(FixedAdvanceMeasurer::default()));
//! view.set_source_text("日本語を勉強する");
//! view.set_annotations([("日本語", "にほんご"), ("勉強", "べんきょう")]).unwrap();
//! let (width, height) = view.measure(LayoutConstraints::at_most_width(320));
//! assert!(width > 0 && height > 0);
//! assert!(view.draw_commands().len() > 1);
//! ```

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

mod annotation;
mod color;
mod config;
mod constraints;
mod metrics;
mod placement;
mod render_ir;
mod view;
mod wrap;

pub use annotation::{Annotation, AnnotationError, AnnotationSet, MatchSession};
pub use color::{Color, ColorParseError};
pub use config::{ConfigError, FuriganaDocument, ViewConfig};
pub use constraints::{LayoutConstraints, MeasureSpec};
pub use metrics::{FixedAdvanceMeasurer, FontMetrics, TextMeasurer, TextStyle};
pub use placement::{AnnotationAlign, AnnotationLayoutEngine, LinePlacements, Placement};
pub use render_ir::{CommandRecorder, DrawCommand, Surface, TextCommand, TextLayer};
pub use view::{
    unwrapped_annotation_baseline, unwrapped_text_baseline, wrapped_annotation_baseline,
    wrapped_line_height, FuriganaView, WRAPPED_ANNOTATION_NUDGE_PX,
};
pub use wrap::{
    FixedWidthApproximateWrap, GreedyMeasuredWrap, LineWrapper, Measurement, WrapBudget,
    WrapPolicy, WrapStrategy, WrappedLines,
};
