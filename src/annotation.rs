use core::fmt;

use serde::{Deserialize, Serialize};

/// Ruby text attached to every occurrence of a target substring.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawAnnotation")]
pub struct Annotation {
    target: String,
    ruby: String,
}

#[derive(Deserialize)]
struct RawAnnotation {
    target: String,
    ruby: String,
}

impl TryFrom<RawAnnotation> for Annotation {
    type Error = AnnotationError;

    fn try_from(raw: RawAnnotation) -> Result<Self, Self::Error> {
        Self::new(raw.target, raw.ruby)
    }
}

impl Annotation {
    /// Create an annotation. `target` must be non-empty.
    pub fn new(target: impl Into<String>, ruby: impl Into<String>) -> Result<Self, AnnotationError> {
        let target = target.into();
        if target.is_empty() {
            return Err(AnnotationError::EmptyTarget { index: 0 });
        }
        Ok(Self {
            target,
            ruby: ruby.into(),
        })
    }

    /// Substring of the base text to annotate.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Glyphs drawn above the target.
    pub fn ruby(&self) -> &str {
        &self.ruby
    }
}

/// Error returned when building annotations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnnotationError {
    /// Annotation at `index` has an empty target string.
    EmptyTarget { index: usize },
}

impl fmt::Display for AnnotationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTarget { index } => {
                write!(f, "annotation {} has an empty target", index)
            }
        }
    }
}

impl std::error::Error for AnnotationError {}

/// Ordered annotation list. Order is the tie-break for overlapping targets.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnotationSet {
    items: Vec<Annotation>,
}

impl AnnotationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(target, ruby)` pairs; works for slices of tuples and maps.
    pub fn from_pairs<I, T, R>(pairs: I) -> Result<Self, AnnotationError>
    where
        I: IntoIterator<Item = (T, R)>,
        T: Into<String>,
        R: Into<String>,
    {
        let items = pairs
            .into_iter()
            .enumerate()
            .map(|(index, (target, ruby))| {
                Annotation::new(target, ruby).map_err(|_| AnnotationError::EmptyTarget { index })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { items })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> core::slice::Iter<'_, Annotation> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Annotation] {
        &self.items
    }

    /// Start a fresh match session sized for this set.
    pub fn start_session(&self) -> MatchSession {
        MatchSession::new(self.items.len())
    }
}

impl From<Vec<Annotation>> for AnnotationSet {
    fn from(items: Vec<Annotation>) -> Self {
        Self { items }
    }
}

impl<'a> IntoIterator for &'a AnnotationSet {
    type Item = &'a Annotation;
    type IntoIter = core::slice::Iter<'a, Annotation>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Per-draw-pass record of which annotations have already been placed.
///
/// Indices match positions in the [`AnnotationSet`] the session was started
/// from. A session lives for exactly one draw pass so first-occurrence state
/// never leaks between passes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MatchSession {
    unapplied: Vec<bool>,
}

impl MatchSession {
    pub fn new(annotation_count: usize) -> Self {
        Self {
            unapplied: vec![true; annotation_count],
        }
    }

    /// True until the annotation at `index` has been placed once.
    ///
    /// Indices past the session size report `true`.
    pub fn is_unapplied(&self, index: usize) -> bool {
        self.unapplied.get(index).copied().unwrap_or(true)
    }

    pub fn mark_applied(&mut self, index: usize) {
        if index >= self.unapplied.len() {
            self.unapplied.resize(index + 1, true);
        }
        self.unapplied[index] = false;
    }

    /// Number of annotations placed at least once in this pass.
    pub fn applied_count(&self) -> usize {
        self.unapplied.iter().filter(|flag| !**flag).count()
    }
}

#[cfg(test)]
mod tests {
    use super::{Annotation, AnnotationError, AnnotationSet, MatchSession};
    use std::collections::BTreeMap;

    #[test]
    fn empty_target_is_rejected_with_its_index() {
        let err = AnnotationSet::from_pairs([("日本", "にほん"), ("", "x")]).unwrap_err();
        assert_eq!(err, AnnotationError::EmptyTarget { index: 1 });
        assert!(Annotation::new("", "x").is_err());
    }

    #[test]
    fn pairs_keep_caller_order() {
        let set = AnnotationSet::from_pairs([("語", "ご"), ("日本", "にほん")]).unwrap();
        let targets: Vec<&str> = set.iter().map(Annotation::target).collect();
        assert_eq!(targets, vec!["語", "日本"]);
    }

    #[test]
    fn maps_are_accepted_as_pairs() {
        let mut map = BTreeMap::new();
        map.insert("東京".to_string(), "とうきょう".to_string());
        let set = AnnotationSet::from_pairs(map).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.as_slice()[0].ruby(), "とうきょう");
    }

    #[test]
    fn json_deserialize_validates_targets() {
        let ok: AnnotationSet =
            serde_json::from_str(r#"[{"target":"日本","ruby":"にほん"}]"#).unwrap();
        assert_eq!(ok.len(), 1);
        let bad = serde_json::from_str::<AnnotationSet>(r#"[{"target":"","ruby":"x"}]"#);
        assert!(bad.is_err());
    }

    #[test]
    fn session_flags_start_unapplied_and_flip_once() {
        let mut session = MatchSession::new(2);
        assert!(session.is_unapplied(0));
        session.mark_applied(0);
        assert!(!session.is_unapplied(0));
        assert!(session.is_unapplied(1));
        assert_eq!(session.applied_count(), 1);
    }

    #[test]
    fn fresh_session_forgets_previous_pass() {
        let set = AnnotationSet::from_pairs([("a", "x")]).unwrap();
        let mut first = set.start_session();
        first.mark_applied(0);
        let second = set.start_session();
        assert!(second.is_unapplied(0));
    }
}
