//! Response parsing: model reply text → stage results.
//!
//! The model is an untrusted text generator. Each reply must be a JSON object
//! carrying the keys the prompt asked for, but one non-conforming reply must
//! not abort the document. Two layers reflect that:
//!
//! * `try_parse_*` are strict and return [`MalformedResponse`] when the reply
//!   is not a JSON object.
//! * `parse_*` never fail: they log the problem together with the raw reply
//!   and return empty fields.
//!
//! In both layers a missing key, or a key whose value is not a string, yields
//! an empty field. Present string values are trimmed.

use crate::error::MalformedResponse;
use crate::prompts::{KEY_KEYWORDS, KEY_SUMMARY, KEY_ZH_KEYWORDS, KEY_ZH_PARAGRAPH, KEY_ZH_SUMMARY};
use crate::record::{StageOneResult, StageTwoResult};
use serde_json::{Map, Value};
use tracing::{debug, error, warn};

/// Strictly parse a summarize reply.
pub fn try_parse_stage_one(text: &str) -> Result<StageOneResult, MalformedResponse> {
    let obj = parse_object(text)?;
    Ok(StageOneResult {
        summary: string_field(&obj, KEY_SUMMARY),
        keywords: string_field(&obj, KEY_KEYWORDS),
    })
}

/// Strictly parse a translate reply.
pub fn try_parse_stage_two(text: &str) -> Result<StageTwoResult, MalformedResponse> {
    let obj = parse_object(text)?;
    Ok(StageTwoResult {
        zh_paragraph: string_field(&obj, KEY_ZH_PARAGRAPH),
        zh_summary: string_field(&obj, KEY_ZH_SUMMARY),
        zh_keywords: string_field(&obj, KEY_ZH_KEYWORDS),
    })
}

/// Parse a summarize reply, degrading to empty fields on malformed output.
pub fn parse_stage_one(text: &str) -> StageOneResult {
    try_parse_stage_one(text).unwrap_or_else(|e| {
        error!("JSON parse error (English summary and keywords): {}", e);
        debug!("Reply text: {}", text);
        StageOneResult::default()
    })
}

/// Parse a translate reply, degrading to empty fields on malformed output.
pub fn parse_stage_two(text: &str) -> StageTwoResult {
    try_parse_stage_two(text).unwrap_or_else(|e| {
        error!("JSON parse error (Chinese translation): {}", e);
        debug!("Reply text: {}", text);
        StageTwoResult::default()
    })
}

fn parse_object(text: &str) -> Result<Map<String, Value>, MalformedResponse> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(obj)) => Ok(obj),
        Ok(_) => Err(MalformedResponse::NotAnObject),
        Err(e) => Err(MalformedResponse::InvalidJson(e.to_string())),
    }
}

fn string_field(obj: &Map<String, Value>, key: &str) -> String {
    match obj.get(key) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Null) | None => String::new(),
        Some(other) => {
            warn!("Key '{}' is not a string ({}), using empty value", key, type_name(other));
            String::new()
        }
    }
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
