//! Function-level JSON entry points.
//!
//! The transport-level dispatch layer lives outside this crate; these
//! functions are the equivalents it wraps. Parameters and results are
//! JSON-compatible values, and failures come back as `{ "error": ... }`
//! objects rather than transport faults.

use crate::config::CustomPatternSpec;
use crate::documents::DocumentRedactor;
use crate::engine::RedactionEngine;
use serde_json::{json, Value};
use std::path::Path;
use tracing::error;

fn error_value(message: impl std::fmt::Display) -> Value {
    error!(%message, "tool call failed");
    json!({ "error": message.to_string() })
}

/// `redact(text, entity_types?)`
pub async fn redact(engine: &RedactionEngine, params: &Value) -> Value {
    let Some(text) = params["text"].as_str() else {
        return error_value("missing text parameter");
    };
    let entity_types = string_list(&params["entity_types"]);
    let outcome = engine.redact(text, entity_types.as_deref()).await;
    serde_json::to_value(outcome).unwrap_or_else(error_value)
}

/// `unredact(redacted_text, session_id)`
pub async fn unredact(engine: &RedactionEngine, params: &Value) -> Value {
    let Some(text) = params["redacted_text"].as_str() else {
        return error_value("missing redacted_text parameter");
    };
    let Some(session_id) = params["session_id"].as_str() else {
        return error_value("missing session_id parameter");
    };
    match engine.unredact(text, session_id).await {
        Ok(restoration) => serde_json::to_value(restoration).unwrap_or_else(error_value),
        Err(e) => error_value(e),
    }
}

/// `analyze(text, entity_types?)`
pub async fn analyze(engine: &RedactionEngine, params: &Value) -> Value {
    let Some(text) = params["text"].as_str() else {
        return error_value("missing text parameter");
    };
    let entity_types = string_list(&params["entity_types"]);
    let entities = engine.analyze(text, entity_types.as_deref()).await;
    json!({ "entities": entities })
}

/// `configure(custom_patterns?, disabled_entities?, score_threshold?)`
pub async fn configure(engine: &RedactionEngine, params: &Value) -> Value {
    let custom_patterns: Option<Vec<CustomPatternSpec>> = match params.get("custom_patterns") {
        None | Some(Value::Null) => None,
        Some(value) => match serde_json::from_value(value.clone()) {
            Ok(patterns) => Some(patterns),
            Err(e) => return error_value(format!("malformed custom_patterns: {e}")),
        },
    };
    let disabled_entities = string_list(&params["disabled_entities"]);
    let score_threshold = params["score_threshold"].as_f64().map(|v| v as f32);

    match engine
        .configure(custom_patterns, disabled_entities, score_threshold)
        .await
    {
        Ok(outcome) => {
            let mut value = serde_json::to_value(&outcome).unwrap_or_else(error_value);
            if let Some(map) = value.as_object_mut() {
                map.insert("status".to_string(), json!("ok"));
            }
            value
        }
        Err(e) => error_value(e),
    }
}

/// `redact_file(file_path, entity_types?, use_placeholders = true)`
pub async fn redact_file(engine: &RedactionEngine, params: &Value) -> Value {
    let Some(file_path) = params["file_path"].as_str() else {
        return error_value("missing file_path parameter");
    };
    let entity_types = string_list(&params["entity_types"]);
    let use_placeholders = params["use_placeholders"].as_bool().unwrap_or(true);

    let redactor = DocumentRedactor::new(engine);
    match redactor
        .redact_file(Path::new(file_path), entity_types.as_deref(), use_placeholders)
        .await
    {
        Ok(outcome) => serde_json::to_value(outcome).unwrap_or_else(error_value),
        Err(e) => error_value(e),
    }
}

/// `unredact_file(file_path, session_id)`
pub async fn unredact_file(engine: &RedactionEngine, params: &Value) -> Value {
    let Some(file_path) = params["file_path"].as_str() else {
        return error_value("missing file_path parameter");
    };
    let Some(session_id) = params["session_id"].as_str() else {
        return error_value("missing session_id parameter");
    };

    let redactor = DocumentRedactor::new(engine);
    match redactor
        .unredact_file(Path::new(file_path), session_id)
        .await
    {
        Ok(outcome) => serde_json::to_value(outcome).unwrap_or_else(error_value),
        Err(e) => error_value(e),
    }
}

fn string_list(value: &Value) -> Option<Vec<String>> {
    value.as_array().map(|items| {
        items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect()
    })
}
