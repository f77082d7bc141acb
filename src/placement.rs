use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::annotation::{AnnotationSet, MatchSession};
use crate::metrics::{TextMeasurer, TextStyle};

/// Horizontal anchoring of ruby text relative to its target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationAlign {
    /// Ruby starts at the left edge of the target.
    #[default]
    Start,
    /// Ruby is centered over the target.
    Center,
}

/// One annotation occurrence to draw above a line.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// Character offset of the matched target within the line.
    pub offset: usize,
    /// Left x of the ruby text in pixels.
    pub x: f32,
    /// Ruby glyphs.
    pub text: String,
}

/// Placements for one line; most lines carry only a few.
pub type LinePlacements = SmallVec<[Placement; 4]>;

/// Finds annotation targets in a line and converts matches to pixel positions.
pub struct AnnotationLayoutEngine<'a> {
    measurer: &'a dyn TextMeasurer,
    base_style: TextStyle,
    annotation_style: TextStyle,
    align: AnnotationAlign,
}

impl<'a> AnnotationLayoutEngine<'a> {
    pub fn new(
        measurer: &'a dyn TextMeasurer,
        base_style: TextStyle,
        annotation_style: TextStyle,
    ) -> Self {
        Self {
            measurer,
            base_style,
            annotation_style,
            align: AnnotationAlign::Start,
        }
    }

    pub fn with_align(mut self, align: AnnotationAlign) -> Self {
        self.align = align;
        self
    }

    /// Place every annotation occurrence in `line`.
    ///
    /// Annotations are visited in set order. Matches may overlap: after a
    /// match at `k` the search resumes at `k + 1`. In first-occurrence-only
    /// mode an annotation already placed earlier in `session` is skipped,
    /// but all of its matches on the first line it appears in are kept.
    pub fn place_annotations(
        &self,
        line: &str,
        annotations: &AnnotationSet,
        session: &mut MatchSession,
        first_occurrence_only: bool,
    ) -> LinePlacements {
        let mut out = LinePlacements::new();
        for (index, annotation) in annotations.iter().enumerate() {
            if first_occurrence_only && !session.is_unapplied(index) {
                continue;
            }
            let target = annotation.target();
            let target_chars = target.chars().count();
            let mut byte_cursor = 0usize;
            let mut char_cursor = 0usize;
            while let Some(found) = line[byte_cursor..].find(target) {
                let match_byte = byte_cursor + found;
                let offset = char_cursor + line[byte_cursor..match_byte].chars().count();
                out.push(Placement {
                    offset,
                    x: self.ruby_x(line, offset, target_chars, annotation.ruby()),
                    text: annotation.ruby().to_string(),
                });
                session.mark_applied(index);

                let step = line[match_byte..]
                    .chars()
                    .next()
                    .map_or(1, char::len_utf8);
                byte_cursor = match_byte + step;
                char_cursor = offset + 1;
            }
        }
        log::trace!("placed {} annotation(s) on line of {} byte(s)", out.len(), line.len());
        out
    }

    fn ruby_x(&self, line: &str, offset: usize, target_chars: usize, ruby: &str) -> f32 {
        let left = self
            .measurer
            .measure_text_px(line, 0, offset, &self.base_style);
        match self.align {
            AnnotationAlign::Start => left,
            AnnotationAlign::Center => {
                let target_width = self.measurer.measure_text_px(
                    line,
                    offset,
                    offset + target_chars,
                    &self.base_style,
                );
                let ruby_width = self.measurer.measure_str_px(ruby, &self.annotation_style);
                left + (target_width - ruby_width) / 2.0
            }
        }
    }
}
