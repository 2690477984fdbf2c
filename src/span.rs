use serde::{Deserialize, Serialize};

/// Detection layer that proposed a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpanSource {
    Pattern,
    Neural,
    Generative,
}

/// A candidate region of the input text.
///
/// All three layers emit this one record so overlap resolution and
/// validation never care where a span came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntitySpan {
    pub entity_type: String,
    pub start: usize,
    pub end: usize,
    pub score: f32,
    pub source: SpanSource,
}

impl EntitySpan {
    pub fn new(
        entity_type: impl Into<String>,
        start: usize,
        end: usize,
        score: f32,
        source: SpanSource,
    ) -> Self {
        Self {
            entity_type: entity_type.into(),
            start,
            end,
            score: score.clamp(0.0, 1.0),
            source,
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// `a.start < b.end && b.start < a.end`
    pub fn overlaps(&self, other: &EntitySpan) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn text<'t>(&self, text: &'t str) -> &'t str {
        &text[self.start..self.end]
    }
}

/// An accepted span together with its assigned placeholder, as reported by
/// `redact`. Offsets refer to the input text; the document layer depends on
/// that.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedactedEntity {
    pub entity_type: String,
    pub original_start: usize,
    pub original_end: usize,
    pub placeholder: String,
}

/// Mask an original for `analyze` output: keep the first and last
/// `max(1, len/4)` characters, star the middle. Short strings are fully
/// starred.
pub fn partial_mask(original: &str) -> String {
    let chars: Vec<char> = original.chars().collect();
    let n = chars.len();
    if n <= 4 {
        return "*".repeat(n);
    }
    let keep = std::cmp::max(1, n / 4);
    let mut masked = String::with_capacity(n);
    masked.extend(&chars[..keep]);
    masked.extend(std::iter::repeat('*').take(n - 2 * keep));
    masked.extend(&chars[n - keep..]);
    masked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlap_is_strict_interval_intersection() {
        let a = EntitySpan::new("PERSON", 0, 5, 0.9, SpanSource::Pattern);
        let b = EntitySpan::new("PERSON", 5, 10, 0.9, SpanSource::Pattern);
        let c = EntitySpan::new("PERSON", 4, 6, 0.9, SpanSource::Neural);

        assert!(!a.overlaps(&b), "touching spans do not overlap");
        assert!(a.overlaps(&c));
        assert!(b.overlaps(&c));
    }

    #[test]
    fn mask_keeps_quarter_on_each_side() {
        assert_eq!(partial_mask("john@example.com"), "john********.com");
        assert_eq!(partial_mask("abcde"), "a***e");
    }

    #[test]
    fn mask_stars_short_strings_entirely() {
        assert_eq!(partial_mask("abcd"), "****");
        assert_eq!(partial_mask("a"), "*");
        assert_eq!(partial_mask(""), "");
    }
}
