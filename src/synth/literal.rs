//! Quoted string literals for generated JavaScript.
//!
//! Everything a spec author wrote (titles, labels, option text, units) reaches
//! the generated module only through [`quote`]. The result is a double-quoted
//! JS literal that stays a single literal wherever it is placed: in an
//! expression, a JSX attribute (`attr={...}`), a JSX child (`{...}`), or
//! after a line comment.

/// Serialize `text` as a double-quoted JavaScript string literal.
///
/// Escapes quotes, backslashes, control characters and the two Unicode line
/// terminators. Backticks and angle brackets become `\u` escapes so the
/// literal stays inert if it is ever moved into a template string or an
/// inline `<script>`.
pub fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '`' => out.push_str("\\u0060"),
            '<' => out.push_str("\\u003c"),
            '>' => out.push_str("\\u003e"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c if (c as u32) < 0x20 || c == '\u{7f}' => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// A quoted literal in JSX child position: `{"text"}`.
pub fn jsx_text(text: &str) -> String {
    format!("{{{}}}", quote(text))
}

/// A quoted literal in JSX attribute position: `name={"text"}`.
pub fn jsx_attr(name: &str, text: &str) -> String {
    format!("{}={{{}}}", name, quote(text))
}

/// Numeric literal; integral values are written without a fraction.
pub fn number(value: f64) -> String {
    crate::spec::raw::format_number(value)
}
