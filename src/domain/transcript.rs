//! Transcript result value object

use std::fmt;

use serde_json::Value;

/// Field names checked, in order, when looking for the transcript text
const TEXT_FIELDS: &[&str] = &["text", "transcription", "transcript"];

/// JSON body returned by the transcription endpoint.
/// The shape is endpoint-defined, so it is kept as a raw JSON value.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptResult {
    body: Value,
}

impl TranscriptResult {
    /// Wrap a parsed JSON response body
    pub fn new(body: Value) -> Self {
        Self { body }
    }

    /// Raw JSON body
    pub fn body(&self) -> &Value {
        &self.body
    }

    /// Transcript text, if the body carries it in a well-known top-level field
    pub fn text(&self) -> Option<&str> {
        TEXT_FIELDS
            .iter()
            .find_map(|field| self.body.get(*field).and_then(Value::as_str))
    }

    /// Pretty-printed JSON, two-space indented
    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(&self.body).unwrap_or_else(|_| self.body.to_string())
    }
}

impl fmt::Display for TranscriptResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_pretty_json())
    }
}
