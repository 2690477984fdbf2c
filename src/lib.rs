//! Reversible PII detection and redaction engine.
//!
//! Text goes in, placeholder-substituted text and a session id come out;
//! the session's placeholder → original map makes the substitution
//! reversible. Detection stacks three layers: deterministic pattern
//! recognizers, a neural tagger for context-dependent types, and an
//! optional generative reviewer. The document layer projects engine output
//! into DOCX, XLSX, PDF, and plain-text files without collapsing
//! formatting.

pub mod config;
pub mod constants;
pub mod documents;
pub mod engine;
pub mod error;
pub mod neural;
pub mod overlap;
pub mod recognizers;
pub mod reviewer;
pub mod session;
pub mod span;
pub mod tools;

// Re-export commonly used types
pub use config::{CustomPatternSpec, EngineConfig};
pub use documents::{DocumentRedactor, FileRedaction, FileRestoration};
pub use engine::{
    AnalyzedEntity, ConfigureOutcome, RedactionEngine, RedactionOutcome, Restoration,
};
pub use error::RedactError;
pub use session::SessionStore;
pub use span::{EntitySpan, RedactedEntity, SpanSource};

/// Install a global tracing subscriber honoring `RUST_LOG`. Call once from
/// the host binary; repeat calls are ignored.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}
