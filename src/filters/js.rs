use crate::content::{resolve, ContentType, Value, ValueKind};
use crate::scanner::is_js_ident_part;

fn json_string(text: &str) -> String {
    serde_json::Value::from(text).to_string()
}

// NOTE: `<`, `>` and `&` would let a value close the script element or start a comment. The
// line separators are line terminators in JS, but not in JSON.
fn make_html_safe(json: &str) -> String {
    let mut safe = String::with_capacity(json.len() + 8);

    for ch in json.chars() {
        match ch {
            '<' => safe.push_str("\\u003c"),
            '>' => safe.push_str("\\u003e"),
            '&' => safe.push_str("\\u0026"),
            '\u{2028}' => safe.push_str("\\u2028"),
            '\u{2029}' => safe.push_str("\\u2029"),
            _ => safe.push(ch),
        }
    }

    safe
}

// NOTE: `x` + value + `y` must not merge with the value into a single token, as in `return1`.
fn pad(js: String) -> String {
    let bytes = js.as_bytes();
    let needs_padding = match (bytes.first(), bytes.last()) {
        (Some(&first), Some(&last)) => is_js_ident_part(first) || is_js_ident_part(last),
        _ => false,
    };

    if needs_padding {
        format!(" {js} ")
    } else {
        js
    }
}

/// Writes a value as a JS expression: strings become string literals, numbers, booleans and
/// JSON values become the corresponding literals.
pub(super) fn escape_js_value(value: &dyn Value) -> String {
    let json = match resolve(value) {
        ValueKind::Trusted(ContentType::Js, js) => return js.to_owned(),
        ValueKind::Trusted(ContentType::JsStr, js) => return format!("\"{js}\""),
        ValueKind::Str(s) | ValueKind::Trusted(_, s) => json_string(s),
        ValueKind::Number(n) => n.to_string(),
        ValueKind::Bool(b) => b.to_string(),
        ValueKind::Null | ValueKind::Ref(_) => "null".to_owned(),
        ValueKind::Json(v) => v.to_string(),
        ValueKind::Display(d) => json_string(&d.to_string()),
        ValueKind::Error(e) => json_string(&e.to_string()),
    };

    pad(make_html_safe(&json))
}

/// Writes text as a JS expression, for filters that only see the text of the value.
pub(super) fn escape_js_text(text: &str, content_type: ContentType) -> String {
    match content_type {
        ContentType::Js => text.to_owned(),
        ContentType::JsStr => format!("\"{text}\""),
        _ => pad(make_html_safe(&json_string(text))),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Table {
    Str,
    // NOTE: keeps `\`: trusted JS string fragments are already escaped.
    StrNorm,
    Regexp,
}

impl Table {
    fn replacement(self, ch: char) -> Option<&'static str> {
        let regexp = self == Table::Regexp;

        Some(match ch {
            '\0' => "\\u0000",
            '\t' => "\\t",
            '\n' => "\\n",
            '\x0b' => "\\u000b",
            '\x0c' => "\\f",
            '\r' => "\\r",
            // NOTE: encode HTML specials as hex so the output can be embedded in HTML
            // attributes without further encoding.
            '"' => "\\u0022",
            '&' => "\\u0026",
            '\'' => "\\u0027",
            '+' => "\\u002b",
            '/' => "\\/",
            '<' => "\\u003c",
            '>' => "\\u003e",
            '`' => "\\u0060",
            '\\' if self == Table::StrNorm => return None,
            '\\' => "\\\\",
            '\u{2028}' => "\\u2028",
            '\u{2029}' => "\\u2029",
            '$' if regexp => "\\$",
            '(' if regexp => "\\(",
            ')' if regexp => "\\)",
            '*' if regexp => "\\*",
            '-' if regexp => "\\-",
            '.' if regexp => "\\.",
            '?' if regexp => "\\?",
            '[' if regexp => "\\[",
            ']' if regexp => "\\]",
            '^' if regexp => "\\^",
            '{' if regexp => "\\{",
            '|' if regexp => "\\|",
            '}' if regexp => "\\}",
            _ => return None,
        })
    }
}

fn replace(text: &str, table: Table) -> String {
    let mut escaped = String::with_capacity(text.len() + 16);

    for ch in text.chars() {
        match table.replacement(ch) {
            Some(replacement) => escaped.push_str(replacement),
            None => escaped.push(ch),
        }
    }

    escaped
}

pub(super) fn escape_js_str(text: &str, content_type: ContentType) -> String {
    if content_type == ContentType::JsStr {
        return replace(text, Table::StrNorm);
    }

    replace(text, Table::Str)
}

pub(super) fn escape_js_regexp(text: &str) -> String {
    let escaped = replace(text, Table::Regexp);

    // NOTE: `//` is a line comment, not an empty regexp.
    if escaped.is_empty() {
        return "(?:)".to_owned();
    }

    escaped
}
