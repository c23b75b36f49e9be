//! Conversion of a successful run's output into a response body.

use serde_json::{Map, Value};

/// Turns captured streams of a zero-exit run into a JSON body.
///
/// Stdout that parses as one JSON value, surrounding whitespace aside, is
/// returned verbatim. Anything else is wrapped as `{"output": ...}` with the
/// trimmed stdout, plus `"stderr"` when trimmed stderr is non-empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultNormalizer;

impl ResultNormalizer {
    /// Normalizes captured output.
    #[must_use]
    pub fn normalize(self, stdout: &str, stderr: &str) -> Value {
        let trimmed = stdout.trim();
        if let Ok(parsed) = serde_json::from_str::<Value>(trimmed) {
            return parsed;
        }

        let mut body = Map::new();
        body.insert("output".to_owned(), Value::String(trimmed.to_owned()));
        let stderr_trimmed = stderr.trim();
        if !stderr_trimmed.is_empty() {
            body.insert("stderr".to_owned(), Value::String(stderr_trimmed.to_owned()));
        }
        Value::Object(body)
    }
}
