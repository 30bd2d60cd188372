use crate::base::Chunk;
use crate::context::{Context, State, UrlPart};
use crate::errors::ErrorKind;
use std::borrow::Cow;

use super::url::url_part_after;
use super::Step;

const CSS_WHITESPACE: [char; 5] = ['\t', '\n', '\x0c', '\r', ' '];

/// The CSS3 `nmchar` production, ignoring escape sequences.
#[inline]
pub(crate) fn is_css_nmchar(ch: char) -> bool {
    ch.is_ascii_alphanumeric()
        || ch == '-'
        || ch == '_'
        || matches!(ch, '\u{80}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..)
}

// NOTE: encoded keywords (`\75\72\6c`) are not recognized: the URI production doesn't allow
// them.
fn ends_with_css_keyword(text: &str, keyword: &str) -> bool {
    let Some(start) = text.len().checked_sub(keyword.len()) else {
        return false;
    };

    if !text.is_char_boundary(start) {
        return false;
    }

    if text[..start].chars().next_back().is_some_and(is_css_nmchar) {
        return false;
    }

    text[start..].eq_ignore_ascii_case(keyword)
}

// The length of a trailing identifier (and the whitespace after it) that could turn out to be
// `url` in front of a `(` in the next chunk.
fn possible_keyword_suffix_len(text: &str) -> usize {
    let trimmed = text.trim_end_matches(CSS_WHITESPACE);
    let ident = trimmed.trim_end_matches(is_css_nmchar);

    if ident.len() == trimmed.len() {
        0
    } else {
        text.len() - ident.len()
    }
}

pub(super) fn t_css(mut c: Context, input: &Chunk<'_>) -> Step {
    let bytes = input.as_bytes();
    let mut k = 0;

    // NOTE: all strings are treated as URLs. They rarely are anything else: font names don't
    // contain `?` or `#`, `content` values don't trip the scheme check.
    while let Some(i) = bytes[k..]
        .iter()
        .position(|b| matches!(b, b'(' | b'"' | b'\'' | b'/'))
        .map(|i| i + k)
    {
        match bytes[i] {
            b'(' => {
                let before = input[..i].trim_end_matches(CSS_WHITESPACE);

                if ends_with_css_keyword(before, "url") {
                    let j = input.len() - input[i + 1..].trim_start_matches(CSS_WHITESPACE).len();

                    c.url_part = UrlPart::None;

                    return match bytes.get(j) {
                        None if !input.is_last() => Step::blocked(c, before.len() - 3),
                        Some(b'"') => {
                            c.state = State::CssDqUrl;
                            Step::to(c, j + 1)
                        }
                        Some(b'\'') => {
                            c.state = State::CssSqUrl;
                            Step::to(c, j + 1)
                        }
                        _ => {
                            c.state = State::CssUrl;
                            Step::to(c, j)
                        }
                    };
                }
            }
            b'/' => match bytes.get(i + 1) {
                None if !input.is_last() => return Step::blocked(c, i),
                Some(b'/') => {
                    c.state = State::CssLineComment;
                    return Step::to(c, i + 2);
                }
                Some(b'*') => {
                    c.state = State::CssBlockComment;
                    return Step::to(c, i + 2);
                }
                _ => (),
            },
            b'"' => {
                c.state = State::CssDqStr;
                c.url_part = UrlPart::None;

                return Step::to(c, i + 1);
            }
            _ => {
                c.state = State::CssSqStr;
                c.url_part = UrlPart::None;

                return Step::to(c, i + 1);
            }
        }

        k = i + 1;
    }

    if !input.is_last() {
        let keep = possible_keyword_suffix_len(&input[k..]);

        if keep > 0 {
            return Step::blocked(c, input.len() - keep);
        }
    }

    Step::to(c, input.len())
}

pub(super) fn t_css_str(mut c: Context, input: &Chunk<'_>) -> Step {
    let end_and_esc: &[u8] = match c.state {
        State::CssDqStr | State::CssDqUrl => b"\\\"",
        State::CssSqStr | State::CssSqUrl => b"\\'",
        // NOTE: unquoted URLs end with whitespace or `)`.
        _ => b"\\\t\n\x0c\r )",
    };

    let bytes = input.as_bytes();
    let mut k = 0;

    while let Some(i) = bytes[k..]
        .iter()
        .position(|b| end_and_esc.contains(b))
        .map(|i| i + k)
    {
        if bytes[i] != b'\\' {
            c.state = State::Css;
            c.url_part = UrlPart::None;

            return Step::to(c, i + 1);
        }

        let escape_end = bytes[i + 1..]
            .iter()
            .take(6)
            .position(|b| !b.is_ascii_hexdigit())
            .map_or((i + 7).min(bytes.len()), |j| i + 1 + j);

        // NOTE: `\3` followed by `f` is `?`, not U+0003 and `f`.
        let incomplete = i + 1 == bytes.len() || (escape_end == bytes.len() && escape_end < i + 7);

        if incomplete {
            if !input.is_last() {
                c.url_part = url_part_after(c.url_part, &decode_css(&input[..i]));

                return Step::blocked(c, i);
            }

            if i + 1 == bytes.len() {
                return Step::fail(
                    ErrorKind::PartialEscape,
                    format!("unfinished escape sequence in CSS string: {:?}", input.text()),
                    input,
                );
            }
        }

        k = i + 2;
    }

    c.url_part = url_part_after(c.url_part, &decode_css(input));

    Step::to(c, input.len())
}

/// Decodes CSS3 escapes.
///
/// `\\` decodes to `\`, `\"` to `"`, and a hex escape with up to six digits to its code point.
/// A single whitespace after a hex escape is a part of it: `\A B` decodes to `"\nB"`.
pub(crate) fn decode_css(text: &str) -> Cow<'_, str> {
    if !text.contains('\\') {
        return Cow::Borrowed(text);
    }

    let mut decoded = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(i) = rest.find('\\') {
        decoded.push_str(&rest[..i]);
        rest = &rest[i + 1..];

        let hex_len = rest
            .bytes()
            .take(6)
            .take_while(u8::is_ascii_hexdigit)
            .count();

        if hex_len > 0 {
            let mut hex = &rest[..hex_len];
            let mut code_point = u32::from_str_radix(hex, 16).unwrap_or(u32::MAX);

            if code_point > 0x10_FFFF {
                hex = &hex[..hex_len - 1];
                code_point /= 16;
            }

            decoded.push(char::from_u32(code_point).unwrap_or('\u{FFFD}'));
            rest = &rest[hex.len()..];

            // NOTE: `\r\n` is a single whitespace.
            rest = rest
                .strip_prefix("\r\n")
                .or_else(|| rest.strip_prefix(CSS_WHITESPACE))
                .unwrap_or(rest);
        } else if let Some(ch) = rest.chars().next() {
            decoded.push(ch);
            rest = &rest[ch.len_utf8()..];
        }
    }

    decoded.push_str(rest);

    Cow::Owned(decoded)
}
