//! Helpers for emitting Graphviz DOT text.

/// Escapes a string for use inside a quoted DOT label.
///
/// Statement labels are rendered from source expressions, so they routinely contain quotes,
/// comparison operators and (for multi-line dumps) newlines.
///
/// # Arguments
///
/// * `s` - The raw label text
///
/// # Returns
///
/// The label with every DOT-significant character escaped.
#[must_use]
pub fn escape_dot(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            '<' => escaped.push_str("\\<"),
            '>' => escaped.push_str("\\>"),
            '{' => escaped.push_str("\\{"),
            '}' => escaped.push_str("\\}"),
            '|' => escaped.push_str("\\|"),
            other => escaped.push(other),
        }
    }
    escaped
}
