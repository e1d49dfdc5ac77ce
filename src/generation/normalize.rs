//! Candidate extraction from raw LLM replies.
//!
//! Turns the first reply of a generation into a bare SQL string. Replies may be
//! wrapped in markdown fences or be a JSON object with an `sql` field.

use crate::error::{GateError, Result};

/// Fence markers stripped from replies, longest first.
const FENCE_MARKERS: [&str; 3] = ["```sql", "```json", "```"];

/// Strips code-fence markers and surrounding whitespace from a reply.
pub fn clean_generation_result(reply: &str) -> String {
    let mut cleaned = reply.to_string();
    for marker in FENCE_MARKERS {
        cleaned = cleaned.replace(marker, "");
    }
    cleaned.trim().to_string()
}

/// Extracts the SQL candidate from a list of LLM replies.
///
/// Only the first reply is consulted. A reply that starts with `{` after
/// cleaning must be a JSON object with a string `sql` field.
pub fn extract_candidate<S: AsRef<str>>(replies: &[S]) -> Result<String> {
    let reply = replies
        .first()
        .ok_or_else(|| GateError::candidate("No replies to classify"))?;

    let cleaned = clean_generation_result(reply.as_ref());
    if !cleaned.starts_with('{') {
        return Ok(cleaned);
    }

    let envelope: serde_json::Value = serde_json::from_str(&cleaned)
        .map_err(|e| GateError::candidate(format!("Invalid JSON reply: {e}")))?;

    envelope
        .get("sql")
        .and_then(|sql| sql.as_str())
        .map(|sql| sql.trim().to_string())
        .ok_or_else(|| GateError::candidate("JSON reply has no string 'sql' field"))
}
