//! Pattern-layer recognizers.
//!
//! A registry owns an ordered list of recognizer records: entity type,
//! compiled patterns, context keywords, and an optional deny-list of terms
//! that are themselves matched (whole-token, case-insensitive). Runtime
//! `configure` calls append user patterns that participate in overlap
//! resolution on equal footing with the built-ins.

mod builtin;
mod medical;
mod secrets;

use crate::config::CustomPatternSpec;
use crate::constants::{CONTEXT_KEYWORD_BOOST, CONTEXT_WINDOW_CHARS};
use crate::error::RedactError;
use crate::span::{EntitySpan, SpanSource};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

/// One compiled pattern inside a recognizer.
pub struct PatternDef {
    pub name: &'static str,
    pub regex: Regex,
    pub base_score: f32,
    /// Capture group carrying the entity (0 = whole match).
    pub group: usize,
    /// Extra acceptance check on the matched text (Luhn, stoplists).
    pub check: Option<fn(&str) -> bool>,
}

impl PatternDef {
    fn new(name: &'static str, pattern: &str, base_score: f32) -> Self {
        Self {
            name,
            regex: Regex::new(pattern).expect("built-in pattern must compile"),
            base_score,
            group: 0,
            check: None,
        }
    }

    fn with_group(mut self, group: usize) -> Self {
        self.group = group;
        self
    }

    fn with_check(mut self, check: fn(&str) -> bool) -> Self {
        self.check = Some(check);
        self
    }
}

/// Term list matched as whole tokens, case-insensitively.
pub struct DenyList {
    matcher: Regex,
    score: f32,
}

impl DenyList {
    fn new(terms: &[&str], score: f32) -> Self {
        let alternation = terms
            .iter()
            .map(|t| regex::escape(t))
            .collect::<Vec<_>>()
            .join("|");
        Self {
            matcher: Regex::new(&format!(r"(?i)\b(?:{})\b", alternation))
                .expect("deny-list alternation must compile"),
            score,
        }
    }
}

/// A recognizer record with a fixed entity type.
pub struct RecognizerDef {
    pub entity_type: &'static str,
    pub patterns: Vec<PatternDef>,
    pub context_keywords: &'static [&'static str],
    pub deny_list: Option<DenyList>,
}

impl RecognizerDef {
    fn new(entity_type: &'static str, patterns: Vec<PatternDef>) -> Self {
        Self {
            entity_type,
            patterns,
            context_keywords: &[],
            deny_list: None,
        }
    }

    fn with_context(mut self, keywords: &'static [&'static str]) -> Self {
        self.context_keywords = keywords;
        self
    }

    fn with_deny_list(mut self, terms: &[&str], score: f32) -> Self {
        self.deny_list = Some(DenyList::new(terms, score));
        self
    }
}

lazy_static! {
    static ref BUILTIN_RECOGNIZERS: Vec<RecognizerDef> = {
        let mut defs = builtin::defs();
        defs.extend(secrets::defs());
        defs.extend(medical::defs());
        defs
    };
}

/// A user-registered pattern added through `configure`.
pub struct CustomPattern {
    pub entity_type: String,
    pub regex: Regex,
    pub score: f32,
}

impl CustomPattern {
    /// Compile a runtime pattern spec. Entity tags are normalized to the
    /// placeholder alphabet `[A-Z0-9_]+`.
    pub fn compile(spec: &CustomPatternSpec) -> Result<Self, RedactError> {
        let entity_type = normalize_tag(&spec.name);
        if entity_type.is_empty() {
            return Err(RedactError::InvalidPattern {
                name: spec.name.clone(),
                reason: "name must contain at least one alphanumeric character".into(),
            });
        }
        if !(0.0..=1.0).contains(&spec.score) {
            return Err(RedactError::InvalidPattern {
                name: spec.name.clone(),
                reason: format!("score {} outside [0, 1]", spec.score),
            });
        }
        let regex = Regex::new(&spec.regex).map_err(|e| RedactError::InvalidPattern {
            name: spec.name.clone(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            entity_type,
            regex,
            score: spec.score,
        })
    }
}

#[derive(Default)]
pub struct RecognizerRegistry {
    custom: Vec<CustomPattern>,
}

impl RecognizerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile and append a runtime pattern.
    pub fn register(&mut self, spec: &CustomPatternSpec) -> Result<(), RedactError> {
        let pattern = CustomPattern::compile(spec)?;
        self.push(pattern);
        Ok(())
    }

    /// Append an already-compiled pattern.
    pub fn push(&mut self, pattern: CustomPattern) {
        self.custom.push(pattern);
    }

    /// Entity types this registry can currently produce.
    pub fn active_entities(&self, disabled: &HashSet<String>) -> Vec<String> {
        let mut out: Vec<String> = crate::constants::CANONICAL_ENTITY_TYPES
            .iter()
            .map(|t| t.to_string())
            .chain(self.custom.iter().map(|c| c.entity_type.clone()))
            .filter(|t| !disabled.contains(t))
            .collect();
        out.sort();
        out.dedup();
        out
    }

    /// Run every enabled recognizer over the text and collect candidates.
    pub fn scan(
        &self,
        text: &str,
        filter: Option<&HashSet<String>>,
        disabled: &HashSet<String>,
    ) -> Vec<EntitySpan> {
        let enabled = |entity_type: &str| {
            !disabled.contains(entity_type)
                && filter.map_or(true, |f| f.contains(entity_type))
        };

        let mut candidates = Vec::new();

        for def in BUILTIN_RECOGNIZERS.iter() {
            if !enabled(def.entity_type) {
                continue;
            }
            for pattern in &def.patterns {
                scan_pattern(text, def, pattern, &mut candidates);
            }
            if let Some(deny) = &def.deny_list {
                for m in deny.matcher.find_iter(text) {
                    let score = boosted(text, m.start(), m.end(), deny.score, def.context_keywords);
                    candidates.push(EntitySpan::new(
                        def.entity_type,
                        m.start(),
                        m.end(),
                        score,
                        SpanSource::Pattern,
                    ));
                }
            }
        }

        for custom in &self.custom {
            if !enabled(&custom.entity_type) {
                continue;
            }
            for m in custom.regex.find_iter(text) {
                if m.start() == m.end() {
                    continue;
                }
                candidates.push(EntitySpan::new(
                    custom.entity_type.clone(),
                    m.start(),
                    m.end(),
                    custom.score,
                    SpanSource::Pattern,
                ));
            }
        }

        candidates
    }
}

/// Walk one pattern with manual restarts so that a match rejected by its
/// check does not swallow a real entity that begins inside it.
fn scan_pattern(text: &str, def: &RecognizerDef, pattern: &PatternDef, out: &mut Vec<EntitySpan>) {
    let mut pos = 0;
    while pos <= text.len() {
        let Some(caps) = pattern.regex.captures_at(text, pos) else {
            break;
        };
        let whole = caps.get(0).expect("group 0 always present");
        let Some(m) = caps.get(pattern.group) else {
            pos = whole.end().max(pos + 1);
            continue;
        };
        if let Some(check) = pattern.check {
            if !check(m.as_str()) {
                pos = whole.start() + 1;
                continue;
            }
        }
        let score = boosted(text, m.start(), m.end(), pattern.base_score, def.context_keywords);
        out.push(EntitySpan::new(
            def.entity_type,
            m.start(),
            m.end(),
            score,
            SpanSource::Pattern,
        ));
        pos = whole.end().max(pos + 1);
    }
}

/// Add the context boost when any keyword appears within the fixed window
/// (30 chars each side of the match), capped at 1.0.
fn boosted(text: &str, start: usize, end: usize, base: f32, keywords: &[&str]) -> f32 {
    if keywords.is_empty() {
        return base;
    }
    let lo = floor_char_boundary(text, start.saturating_sub(CONTEXT_WINDOW_CHARS));
    let hi = ceil_char_boundary(text, (end + CONTEXT_WINDOW_CHARS).min(text.len()));
    let window = text[lo..hi].to_lowercase();
    if keywords.iter().any(|k| window.contains(k)) {
        (base + CONTEXT_KEYWORD_BOOST).min(1.0)
    } else {
        base
    }
}

fn floor_char_boundary(text: &str, mut idx: usize) -> usize {
    while idx > 0 && !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

fn ceil_char_boundary(text: &str, mut idx: usize) -> usize {
    while idx < text.len() && !text.is_char_boundary(idx) {
        idx += 1;
    }
    idx
}

fn normalize_tag(name: &str) -> String {
    let tag: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    tag.trim_matches('_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CustomPatternSpec;

    fn scan_all(text: &str) -> Vec<EntitySpan> {
        RecognizerRegistry::new().scan(text, None, &HashSet::new())
    }

    #[test]
    fn email_and_phone_candidates() {
        let spans = scan_all("Contact john@example.com or call (555) 123-4567.");
        assert!(spans
            .iter()
            .any(|s| s.entity_type == "EMAIL_ADDRESS" && s.score >= 0.9));
        assert!(spans.iter().any(|s| s.entity_type == "PHONE_NUMBER"));
    }

    #[test]
    fn context_keyword_boosts_postal_code() {
        let without = scan_all("The number 90210 appears here.");
        let with = scan_all("Please mail this to zip code 90210 today.");

        let plain = without
            .iter()
            .find(|s| s.entity_type == "POSTAL_CODE")
            .unwrap();
        let boosted = with
            .iter()
            .filter(|s| s.entity_type == "POSTAL_CODE")
            .map(|s| s.score)
            .fold(0.0f32, f32::max);
        assert!(boosted > plain.score);
    }

    #[test]
    fn luhn_rejection_does_not_mask_later_matches() {
        // Invalid card followed by a valid one on the same line.
        let spans = scan_all("cards 4539-1488-0343-6468 and 4539-1488-0343-6467 here");
        let cards: Vec<_> = spans
            .iter()
            .filter(|s| s.entity_type == "CREDIT_CARD")
            .collect();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].start, 30);
    }

    #[test]
    fn deny_list_matches_whole_tokens_case_insensitively() {
        let spans = scan_all("Prescribed Metformin twice daily; metformina is not a word.");
        let drugs: Vec<_> = spans
            .iter()
            .filter(|s| s.entity_type == "DRUG_NAME")
            .collect();
        assert_eq!(drugs.len(), 1);
        assert_eq!(drugs[0].start, 11);
    }

    #[test]
    fn custom_pattern_registration_and_scan() {
        let mut registry = RecognizerRegistry::new();
        registry
            .register(&CustomPatternSpec {
                name: "employee id".into(),
                regex: r"\bEMP-\d{6}\b".into(),
                score: 0.8,
            })
            .unwrap();

        let spans = registry.scan("Badge EMP-004211 issued.", None, &HashSet::new());
        assert!(spans
            .iter()
            .any(|s| s.entity_type == "EMPLOYEE_ID" && s.score == 0.8));
    }

    #[test]
    fn invalid_custom_regex_is_rejected() {
        let mut registry = RecognizerRegistry::new();
        let err = registry.register(&CustomPatternSpec {
            name: "broken".into(),
            regex: "(".into(),
            score: 0.5,
        });
        assert!(err.is_err());
    }

    #[test]
    fn disabled_entities_are_skipped() {
        let disabled: HashSet<String> = ["EMAIL_ADDRESS".to_string()].into();
        let spans =
            RecognizerRegistry::new().scan("mail john@example.com", None, &disabled);
        assert!(!spans.iter().any(|s| s.entity_type == "EMAIL_ADDRESS"));
    }

    #[test]
    fn filter_restricts_entity_types() {
        let filter: HashSet<String> = ["US_SSN".to_string()].into();
        let spans = RecognizerRegistry::new().scan(
            "SSN 123-45-6789, email a@b.com",
            Some(&filter),
            &HashSet::new(),
        );
        assert!(spans.iter().all(|s| s.entity_type == "US_SSN"));
        assert!(!spans.is_empty());
    }
}
