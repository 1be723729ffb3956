//! JSON output formatting

use serde::{Deserialize, Serialize};

/// Failure envelope printed in JSON mode
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorOutput {
    pub errors: Vec<String>,
}

impl ErrorOutput {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            errors: vec![message.into()],
        }
    }
}

/// Format data as pretty-printed JSON
pub fn format_json<T: Serialize + ?Sized>(data: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(data)
}

/// Single-line error envelope, e.g. `{"errors":["..."]}`
pub fn format_errors(message: impl Into<String>) -> String {
    let output = ErrorOutput::new(message);
    serde_json::to_string(&output).unwrap_or_else(|_| r#"{"errors":["unknown error"]}"#.into())
}
