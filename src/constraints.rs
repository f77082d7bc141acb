use serde::{Deserialize, Serialize};

/// One axis of a host layout request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "px", rename_all = "snake_case")]
pub enum MeasureSpec {
    /// The dimension is fixed to this size.
    Exact(i32),
    /// Advisory upper bound.
    AtMost(i32),
    /// No bound at all.
    #[default]
    Unconstrained,
}

impl MeasureSpec {
    /// Pixel bound, if any.
    pub const fn size(self) -> Option<i32> {
        match self {
            Self::Exact(px) | Self::AtMost(px) => Some(px),
            Self::Unconstrained => None,
        }
    }

    pub const fn is_exact(self) -> bool {
        matches!(self, Self::Exact(_))
    }
}

/// Width and height request for one measurement pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutConstraints {
    pub width: MeasureSpec,
    pub height: MeasureSpec,
}

impl LayoutConstraints {
    pub const fn new(width: MeasureSpec, height: MeasureSpec) -> Self {
        Self { width, height }
    }

    /// Both axes unbounded.
    pub const fn unconstrained() -> Self {
        Self::new(MeasureSpec::Unconstrained, MeasureSpec::Unconstrained)
    }

    /// Advisory width cap with free height, the common "wrap content" request.
    pub const fn at_most_width(width: i32) -> Self {
        Self::new(MeasureSpec::AtMost(width), MeasureSpec::Unconstrained)
    }

    /// Fixed box.
    pub const fn exact(width: i32, height: i32) -> Self {
        Self::new(MeasureSpec::Exact(width), MeasureSpec::Exact(height))
    }

    pub const fn max_width(self) -> Option<i32> {
        self.width.size()
    }

    pub const fn max_height(self) -> Option<i32> {
        self.height.size()
    }

    pub const fn width_is_exact(self) -> bool {
        self.width.is_exact()
    }

    pub const fn height_is_exact(self) -> bool {
        self.height.is_exact()
    }
}

#[cfg(test)]
mod tests {
    use super::{LayoutConstraints, MeasureSpec};

    #[test]
    fn accessors_report_bounds_and_exactness() {
        let c = LayoutConstraints::new(MeasureSpec::AtMost(120), MeasureSpec::Exact(40));
        assert_eq!(c.max_width(), Some(120));
        assert_eq!(c.max_height(), Some(40));
        assert!(!c.width_is_exact());
        assert!(c.height_is_exact());
        assert_eq!(LayoutConstraints::unconstrained().max_width(), None);
    }

    #[test]
    fn measure_spec_json_is_tagged() {
        let json = serde_json::to_string(&MeasureSpec::AtMost(64)).unwrap();
        assert_eq!(json, r#"{"mode":"at_most","px":64}"#);
        let back: MeasureSpec = serde_json::from_str(r#"{"mode":"exact","px":12}"#).unwrap();
        assert_eq!(back, MeasureSpec::Exact(12));
    }
}
