//! HTML escaping for message text.

/// Escape HTML-significant characters in a free-text field.
///
/// Telegram rejects a message whose entities fail to parse, so every
/// interpolated field goes through here before it reaches the wire.
/// Only `&`, `<`, `>`, `"` and `'` are rewritten; everything else
/// passes through untouched.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            other => out.push(other),
        }
    }
    out
}
