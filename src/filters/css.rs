use super::FAILSAFE;
use crate::content::ContentType;
use crate::scanner::{decode_css, is_css_nmchar};

fn replacement(ch: char) -> Option<&'static str> {
    Some(match ch {
        '\0' => "\\0",
        '\t' => "\\9",
        '\n' => "\\a",
        '\x0c' => "\\c",
        '\r' => "\\d",
        // NOTE: encode HTML specials as hex so the output can be embedded in HTML attributes
        // without further encoding.
        '"' => "\\22",
        '&' => "\\26",
        '\'' => "\\27",
        '(' => "\\28",
        ')' => "\\29",
        '+' => "\\2b",
        '/' => "\\2f",
        ':' => "\\3a",
        ';' => "\\3b",
        '<' => "\\3c",
        '>' => "\\3e",
        '\\' => "\\\\",
        '{' => "\\7b",
        '}' => "\\7d",
        _ => return None,
    })
}

#[inline]
fn is_css_space(ch: char) -> bool {
    matches!(ch, '\t' | '\n' | '\x0c' | '\r' | ' ')
}

/// Escapes text for a CSS string or an unquoted `url(...)`.
pub(super) fn escape_css(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 16);
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        let Some(replacement) = replacement(ch) else {
            escaped.push(ch);
            continue;
        };

        escaped.push_str(replacement);

        // NOTE: a hex escape swallows the hex digits and one whitespace after it.
        if replacement != "\\\\" {
            let needs_space = chars
                .peek()
                .map_or(true, |&next| next.is_ascii_hexdigit() || is_css_space(next));

            if needs_space {
                escaped.push(' ');
            }
        }
    }

    escaped
}

/// Passes through CSS values that can't break out of a declaration, replaces the rest with
/// `ZgotmplZ`.
pub(super) fn filter_css_value(text: &str, content_type: ContentType) -> String {
    if content_type == ContentType::Css {
        return text.to_owned();
    }

    let decoded = decode_css(text);
    let mut ident = String::with_capacity(decoded.len());
    let mut prev = None;

    for ch in decoded.chars() {
        match ch {
            '\0' | '"' | '\'' | '(' | ')' | '/' | ';' | '@' | '[' | '\\' | ']' | '`' | '{'
            | '}' | '<' | '>' => return FAILSAFE.to_owned(),
            // NOTE: `--` is not a part of valid identifiers, but is of `<!--` and `-->`.
            '-' => {
                if prev == Some('-') {
                    return FAILSAFE.to_owned();
                }
            }
            _ if ch.is_ascii() && is_css_nmchar(ch) => ident.push(ch.to_ascii_lowercase()),
            _ => (),
        }

        prev = Some(ch);
    }

    // NOTE: `expression` runs script in old IE, `mozbinding` in old Firefox.
    if ident.contains("expression") || ident.contains("mozbinding") {
        return FAILSAFE.to_owned();
    }

    decoded.into_owned()
}
