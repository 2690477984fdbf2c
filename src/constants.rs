/// Application-wide constants
///
/// This module centralizes magic numbers, thresholds, and tuning values
/// for easier maintenance.
// ============================================================================
// Detection thresholds
// ============================================================================
/// Minimum score a candidate span needs to enter overlap resolution
pub const DEFAULT_SCORE_THRESHOLD: f32 = 0.4;

/// Characters inspected on each side of a match for context keywords
pub const CONTEXT_WINDOW_CHARS: usize = 30;

/// Additive score boost when a context keyword appears in the window
pub const CONTEXT_KEYWORD_BOOST: f32 = 0.2;

/// Fixed confidence assigned to spans accepted from the generative reviewer
pub const REVIEWER_SPAN_SCORE: f32 = 0.7;

/// Score assigned to deny-list term matches (drug names)
pub const DENY_LIST_SCORE: f32 = 0.7;

// ============================================================================
// Sessions
// ============================================================================
/// Default session lifetime before lazy expiry
pub const DEFAULT_SESSION_TTL_SECS: i64 = 3600;

// ============================================================================
// Layer budgets
// ============================================================================
/// Wall-clock budget for one generative reviewer round trip
pub const DEFAULT_REVIEWER_TIMEOUT_SECS: u64 = 20;

/// Default Layer 2 model (token-classification NER)
pub const DEFAULT_NEURAL_MODEL: &str = "dslim/bert-base-NER";

/// Model revision pinned for reproducible downloads
pub const DEFAULT_NEURAL_REVISION: &str = "main";

// ============================================================================
// Documents
// ============================================================================
/// Maximum input document size
pub const MAX_FILE_SIZE: u64 = 50 * 1024 * 1024; // 50MB

/// File extensions routed through the plain-text projector
pub const TEXT_EXTENSIONS: &[&str] = &["txt", "csv", "log", "md"];

// ============================================================================
// Canonical entity types
// ============================================================================
/// Entity types with built-in recognizers or neural label mappings.
/// User-registered patterns extend this set at runtime.
pub const CANONICAL_ENTITY_TYPES: &[&str] = &[
    "PERSON",
    "ORGANIZATION",
    "EMAIL_ADDRESS",
    "PHONE_NUMBER",
    "US_SSN",
    "CREDIT_CARD",
    "IBAN",
    "SWIFT_CODE",
    "POSTAL_CODE",
    "IP_ADDRESS",
    "URL",
    "API_KEY",
    "AWS_ACCESS_KEY",
    "CONNECTION_STRING",
    "SSH_PRIVATE_KEY",
    "NPI_NUMBER",
    "DEA_NUMBER",
    "INSURANCE_ID",
    "DRUG_NAME",
    "MEDICAL_CONDITION",
    "ICD10_CODE",
    "MEDICAL_RECORD_NUMBER",
    "LOCATION",
    "DATE_TIME",
    "USERNAME",
];
