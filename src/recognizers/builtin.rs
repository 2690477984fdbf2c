//! General-purpose recognizers: identity, contact, financial, network, and
//! date/location patterns.

use super::{PatternDef, RecognizerDef};
use crate::overlap::luhn_valid;

/// Full-match phrases that look like names but never are.
const NAME_FALSE_POSITIVES: &[&str] = &[
    "United States",
    "New York",
    "Los Angeles",
    "San Francisco",
    "First Amendment",
    "Second Circuit",
    "Third Party",
    "Fourth Quarter",
    "Fifth Avenue",
    "Sixth Street",
    "Federal Court",
    "Supreme Court",
    "District Court",
    "Circuit Court",
];

/// Capitalized sentence-leading words that start false two-word "names".
const NAME_LEADING_STOPWORDS: &[&str] = &[
    "The", "This", "That", "These", "Those", "Contact", "Email", "Call", "Phone", "Please",
    "Dear", "Hello", "From", "Sent", "Subject", "About", "After", "Before", "Thanks", "Thank",
    "Regards", "Best", "Meet", "Invoice", "Order", "Account", "Card", "Case", "Date", "Every",
    "Some", "Many", "Most", "Each", "Our", "Your", "Their", "His", "Her", "Its", "See", "Use",
    "Agent", "Judge", "Attorney",
];

fn plausible_person_name(text: &str) -> bool {
    if NAME_FALSE_POSITIVES.contains(&text) {
        return false;
    }
    match text.split_whitespace().next() {
        Some(first) => !NAME_LEADING_STOPWORDS.contains(&first),
        None => false,
    }
}

pub(super) fn defs() -> Vec<RecognizerDef> {
    vec![
        RecognizerDef::new(
            "EMAIL_ADDRESS",
            vec![PatternDef::new(
                "rfc_like_address",
                r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b",
                0.9,
            )],
        )
        .with_context(&["email", "e-mail", "mail", "contact"]),
        RecognizerDef::new(
            "PHONE_NUMBER",
            vec![PatternDef::new(
                "us_phone",
                r"\b(?:\+?1[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}\b",
                0.7,
            )],
        )
        .with_context(&["phone", "call", "tel", "mobile", "cell", "fax"]),
        RecognizerDef::new(
            "US_SSN",
            vec![
                PatternDef::new("ssn_dashed", r"\b\d{3}-\d{2}-\d{4}\b", 0.85),
                PatternDef::new("ssn_spaced", r"\b\d{3} \d{2} \d{4}\b", 0.5),
            ],
        )
        .with_context(&["ssn", "social security", "social-security"]),
        RecognizerDef::new(
            "CREDIT_CARD",
            vec![PatternDef::new(
                "card_16_digit",
                r"\b(?:\d{4}[-\s]?){3}\d{4}\b",
                0.9,
            )
            .with_check(luhn_valid)],
        )
        .with_context(&["card", "credit", "visa", "mastercard", "amex", "payment"]),
        RecognizerDef::new(
            "IP_ADDRESS",
            vec![PatternDef::new(
                "ipv4",
                r"\b(?:(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\b",
                0.8,
            )],
        )
        .with_context(&["ip", "server", "host", "address"]),
        RecognizerDef::new(
            "URL",
            vec![
                PatternDef::new("http_url", r#"\bhttps?://[^\s<>"']+"#, 0.6),
                PatternDef::new(
                    "www_url",
                    r#"\bwww\.[A-Za-z0-9.-]+\.[A-Za-z]{2,}[^\s<>"']*"#,
                    0.5,
                ),
            ],
        ),
        RecognizerDef::new(
            "IBAN",
            vec![PatternDef::new(
                "iban",
                r"\b[A-Z]{2}\d{2}(?: ?[A-Z0-9]){12,30}\b",
                0.8,
            )],
        )
        .with_context(&["iban", "account", "bank", "transfer"]),
        RecognizerDef::new(
            "SWIFT_CODE",
            vec![
                PatternDef::new("swift_11", r"\b[A-Z]{6}[A-Z0-9]{5}\b", 0.7),
                PatternDef::new("swift_8", r"\b[A-Z]{6}[A-Z0-9]{2}\b", 0.5),
            ],
        )
        .with_context(&["swift", "bic", "bank", "wire", "routing"]),
        RecognizerDef::new(
            "POSTAL_CODE",
            vec![
                PatternDef::new("uk_postcode", r"\b[A-Z]{1,2}\d[A-Z0-9]? ?\d[A-Z]{2}\b", 0.5),
                PatternDef::new("us_zip", r"\b\d{5}(?:-\d{4})?\b", 0.3),
                PatternDef::new("generic_5_digit", r"\b\d{5}\b", 0.2),
            ],
        )
        .with_context(&["zip", "postal", "postcode", "mail", "address"]),
        RecognizerDef::new(
            "DATE_TIME",
            vec![
                PatternDef::new(
                    "slash_date",
                    r"\b(?:0?[1-9]|1[0-2])[/-](?:0?[1-9]|[12]\d|3[01])[/-](?:19|20)\d{2}\b",
                    0.6,
                ),
                PatternDef::new(
                    "iso_date",
                    r"\b(?:19|20)\d{2}-(?:0[1-9]|1[0-2])-(?:0[1-9]|[12]\d|3[01])\b",
                    0.6,
                ),
                PatternDef::new(
                    "month_name_date",
                    r"\b(?:January|February|March|April|May|June|July|August|September|October|November|December|Jan|Feb|Mar|Apr|Jun|Jul|Aug|Sept?|Oct|Nov|Dec)\.? \d{1,2},? \d{4}\b",
                    0.6,
                ),
            ],
        )
        .with_context(&["date", "born", "dob", "birth"]),
        RecognizerDef::new(
            "PERSON",
            vec![
                PatternDef::new(
                    "titled_name",
                    r"\b(?:Mr\.|Mrs\.|Ms\.|Dr\.|Prof\.|Judge|Attorney|Counselor)\s+([A-Z][a-z]+(?: [A-Z][a-z]+)?)\b",
                    0.7,
                )
                .with_group(1),
                PatternDef::new(
                    "capitalized_pair",
                    r"\b([A-Z][a-z]+ (?:[A-Z]\. )?[A-Z][a-z]+)\b",
                    0.45,
                )
                .with_check(plausible_person_name),
            ],
        )
        .with_context(&["name", "contact", "dear", "attn", "regards", "sincerely"]),
        RecognizerDef::new(
            "ORGANIZATION",
            vec![
                PatternDef::new(
                    "corporate_suffix",
                    r"\b([A-Z][A-Za-z&\s]+ (?:Inc|LLC|LLP|Corp|Corporation|Company|Partners|Group|Associates|Firm|LTD|Limited))\b",
                    0.6,
                ),
                PatternDef::new(
                    "law_firm",
                    r"\b(?:Law (?:Office|Firm) of |The )([A-Z][a-z]+ (?:& )?[A-Z][a-z]+)\b",
                    0.6,
                )
                .with_group(1),
            ],
        )
        .with_context(&["company", "corporation", "firm", "agency", "employer"]),
        RecognizerDef::new(
            "LOCATION",
            vec![
                PatternDef::new(
                    "street_address",
                    r"\b\d+\s+[\w\s]+(?:Street|St|Avenue|Ave|Road|Rd|Boulevard|Blvd|Lane|Ln|Drive|Dr|Court|Ct|Circle|Cir|Plaza|Pl|Way|Parkway|Pkwy)\b",
                    0.6,
                ),
                PatternDef::new(
                    "city_state",
                    r"\b[A-Z][a-z]+(?: [A-Z][a-z]+)*, [A-Z]{2}\b",
                    0.5,
                ),
            ],
        )
        .with_context(&["address", "located", "city", "street", "live", "office"]),
        RecognizerDef::new(
            "USERNAME",
            vec![
                PatternDef::new("handle", r"@[A-Za-z0-9_]{3,}\b", 0.5),
                PatternDef::new(
                    "labeled_username",
                    r"(?i)\buser(?:name)?\s*[:=]\s*(\S+)",
                    0.6,
                )
                .with_group(1),
            ],
        )
        .with_context(&["username", "user", "login", "handle", "account"]),
    ]
}
