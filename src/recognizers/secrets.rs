//! Credential and secret recognizers: provider-prefixed API keys, cloud
//! access keys, connection strings, and private-key material.

use super::{PatternDef, RecognizerDef};

const KEY_CONTEXT: &[&str] = &["key", "token", "api", "secret", "bearer", "authorization"];

pub(super) fn defs() -> Vec<RecognizerDef> {
    vec![
        RecognizerDef::new(
            "API_KEY",
            vec![
                PatternDef::new("openai_key", r"\bsk-[A-Za-z0-9_-]{20,}\b", 0.9),
                PatternDef::new("github_token", r"\bghp_[A-Za-z0-9]{36,}\b", 0.9),
                PatternDef::new("gitlab_token", r"\bglpat-[A-Za-z0-9_-]{20,}\b", 0.9),
                PatternDef::new(
                    "stripe_key",
                    r"\b[sp]k_(?:live|test)_[A-Za-z0-9]{16,}\b",
                    0.9,
                ),
                PatternDef::new("google_api_key", r"\bAIzaSy[A-Za-z0-9_-]{33}\b", 0.9),
                PatternDef::new("slack_token", r"\bxox[bpoas]-[A-Za-z0-9-]{10,}\b", 0.9),
                PatternDef::new(
                    "jwt",
                    r"\beyJ[A-Za-z0-9_-]{10,}\.[A-Za-z0-9_-]{10,}\.[A-Za-z0-9_-]{10,}\b",
                    0.9,
                ),
            ],
        )
        .with_context(KEY_CONTEXT),
        RecognizerDef::new(
            "AWS_ACCESS_KEY",
            vec![PatternDef::new("aws_access_key_id", r"\bAKIA[0-9A-Z]{16}\b", 0.9)],
        )
        .with_context(&["aws", "access", "key", "amazon"]),
        RecognizerDef::new(
            "CONNECTION_STRING",
            vec![PatternDef::new(
                "database_uri",
                r"\b(?:postgres(?:ql)?|mysql|mongodb(?:\+srv)?|rediss?)://\S+",
                0.9,
            )],
        )
        .with_context(&["database", "connection", "dsn", "url"]),
        RecognizerDef::new(
            "SSH_PRIVATE_KEY",
            vec![PatternDef::new(
                "pem_header",
                r"-----BEGIN (?:RSA|EC|DSA|OPENSSH) PRIVATE KEY-----",
                0.95,
            )],
        ),
    ]
}
