//! Overlap resolution and per-type validation.
//!
//! Candidates from all layers funnel through here twice: once after the
//! pattern/neural gather and again after the generative reviewer adds its
//! spans. Sources carry no intrinsic priority; only score and length decide.

use crate::span::EntitySpan;
use lazy_static::lazy_static;
use regex::Regex;
use std::cmp::Ordering;

lazy_static! {
    static ref SWIFT_EXACT: Regex = Regex::new(r"^[A-Z]{6}[A-Z0-9]{2,5}$").unwrap();
    static ref IBAN_EXACT: Regex = Regex::new(r"^[A-Z]{2}\d{2}[A-Z0-9]{4,}$").unwrap();
    static ref SSN_EXACT: Regex = Regex::new(r"^\d{3}-?\d{2}-?\d{4}$").unwrap();
    static ref IP_EXACT: Regex = Regex::new(r"^\d{1,3}(\.\d{1,3}){3}$").unwrap();
}

/// Deterministic candidate ordering: higher score first, then longer span,
/// then earlier start, then alphabetical entity type.
fn precedence(a: &EntitySpan, b: &EntitySpan) -> Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| b.len().cmp(&a.len()))
        .then_with(|| a.start.cmp(&b.start))
        .then_with(|| a.entity_type.cmp(&b.entity_type))
}

/// Greedy selection of pairwise non-overlapping spans.
///
/// The returned spans are sorted left-to-right.
pub fn resolve_overlaps(mut candidates: Vec<EntitySpan>) -> Vec<EntitySpan> {
    candidates.sort_by(precedence);

    let mut kept: Vec<EntitySpan> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if kept.iter().all(|k| !k.overlaps(&candidate)) {
            kept.push(candidate);
        }
    }
    kept.sort_by_key(|s| s.start);
    kept
}

/// Drop spans below the score floor. 0.0 admits all, 1.0 rejects all.
pub fn apply_threshold(candidates: Vec<EntitySpan>, threshold: f32) -> Vec<EntitySpan> {
    if threshold >= 1.0 {
        return Vec::new();
    }
    candidates
        .into_iter()
        .filter(|s| s.score >= threshold)
        .collect()
}

/// Per-type syntactic check on the matched substring. Types without a check
/// pass; the score threshold alone gates them.
pub fn validate_span_text(entity_type: &str, original: &str) -> bool {
    match entity_type {
        "SWIFT_CODE" => SWIFT_EXACT.is_match(original),
        "IBAN" => {
            let compact: String = original.chars().filter(|c| *c != ' ').collect();
            IBAN_EXACT.is_match(&compact)
        }
        "CREDIT_CARD" => {
            let digits = original.chars().filter(char::is_ascii_digit).count();
            (13..=19).contains(&digits)
        }
        "US_SSN" => SSN_EXACT.is_match(original),
        "EMAIL_ADDRESS" => {
            let Some((_, domain)) = original.split_once('@') else {
                return false;
            };
            domain.contains('.')
        }
        "IP_ADDRESS" => IP_EXACT.is_match(original),
        "PHONE_NUMBER" => original.chars().filter(char::is_ascii_digit).count() >= 7,
        _ => true,
    }
}

/// Retain spans whose substring survives the type check.
pub fn validate_spans(text: &str, spans: Vec<EntitySpan>) -> Vec<EntitySpan> {
    spans
        .into_iter()
        .filter(|s| {
            let ok = validate_span_text(&s.entity_type, s.text(text));
            if !ok {
                tracing::debug!(
                    entity_type = %s.entity_type,
                    start = s.start,
                    end = s.end,
                    "dropping span that failed format validation"
                );
            }
            ok
        })
        .collect()
}

/// Luhn checksum used by the CREDIT_CARD recognizer.
pub fn luhn_valid(number: &str) -> bool {
    let digits: Vec<u32> = number
        .chars()
        .filter(|c| c.is_ascii_digit())
        .filter_map(|c| c.to_digit(10))
        .collect();

    if digits.len() < 13 || digits.len() > 19 {
        return false;
    }

    let mut sum = 0;
    let mut alternate = false;
    for digit in digits.iter().rev() {
        let mut d = *digit;
        if alternate {
            d *= 2;
            if d > 9 {
                d -= 9;
            }
        }
        sum += d;
        alternate = !alternate;
    }

    sum % 10 == 0
}
