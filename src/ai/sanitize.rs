//! Model reply cleanup.

/// Strip surrounding code-fence markers and whitespace from a model reply so
/// it can be parsed as JSON or scanned for patterns.
pub fn strip_code_fences(reply: &str) -> &str {
    let mut s = reply.trim();
    s = s.strip_prefix("```json").unwrap_or(s);
    s = s.strip_prefix("```").unwrap_or(s);
    s = s.strip_suffix("```").unwrap_or(s);
    s.trim()
}
