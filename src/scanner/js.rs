use crate::base::Chunk;
use crate::context::{Context, JsCtx, State};
use crate::errors::ErrorKind;

use super::Step;

const JS_WHITESPACE: [char; 7] = ['\t', '\n', '\x0c', '\r', ' ', '\u{2028}', '\u{2029}'];

// NOTE: keywords that can precede a regexp literal.
const REGEXP_PRECEDER_KEYWORDS: [&str; 14] = [
    "break",
    "case",
    "continue",
    "delete",
    "do",
    "else",
    "finally",
    "in",
    "instanceof",
    "return",
    "throw",
    "try",
    "typeof",
    "void",
];

#[inline]
pub(crate) fn is_js_ident_part(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'$' || b == b'_'
}

/// Guesses whether a `/` following `text` starts a regexp or is a division operator.
///
/// This is a heuristic: telling the two apart in general needs a full JS parser. It errs on the
/// side of regexps, where the escaping of a following value is stricter.
pub(crate) fn next_js_ctx(text: &str, preceding: JsCtx) -> JsCtx {
    let s = text.trim_end_matches(JS_WHITESPACE).as_bytes();

    let Some(&last) = s.last() else {
        return preceding;
    };

    match last {
        b'+' | b'-' => {
            let run = s.iter().rev().take_while(|&&b| b == last).count();

            // NOTE: `++` and `--` are not regexp preceders, but `+` and `-` are, both as infix
            // and prefix operators. `---` is the same as `-- -`.
            if run % 2 == 1 {
                JsCtx::Regexp
            } else {
                JsCtx::DivOp
            }
        }
        b'.' => {
            // NOTE: handle `42.`.
            if s.len() > 1 && s[s.len() - 2].is_ascii_digit() {
                JsCtx::DivOp
            } else {
                JsCtx::Regexp
            }
        }
        // NOTE: `}` may precede a division of an object literal, but that's rare compared to
        // `function () { ... } /foo/.test(x)`. `)` and `]` precede divisions.
        b',' | b'<' | b'>' | b'=' | b'*' | b'%' | b'&' | b'|' | b'^' | b'?' | b'!' | b'~'
        | b'(' | b'[' | b':' | b';' | b'{' | b'}' => JsCtx::Regexp,
        _ => {
            let ident_len = s.iter().rev().take_while(|&&b| is_js_ident_part(b)).count();
            let ident = &s[s.len() - ident_len..];

            if REGEXP_PRECEDER_KEYWORDS
                .iter()
                .any(|kw| kw.as_bytes() == ident)
            {
                JsCtx::Regexp
            } else {
                JsCtx::DivOp
            }
        }
    }
}

// The length of the trailing token that more text could extend in a way that changes
// `next_js_ctx`: an identifier (`ret` + `urn`) or a run of `+` or `-`.
fn unstable_suffix_len(s: &[u8]) -> usize {
    match s.last() {
        Some(&b @ (b'+' | b'-')) => s.iter().rev().take_while(|&&c| c == b).count(),
        Some(&b) if is_js_ident_part(b) => {
            s.iter().rev().take_while(|&&c| is_js_ident_part(c)).count()
        }
        _ => 0,
    }
}

pub(super) fn t_js(mut c: Context, input: &Chunk<'_>) -> Step {
    let bytes = input.as_bytes();

    let Some(i) = bytes
        .iter()
        .position(|b| matches!(b, b'"' | b'\'' | b'`' | b'/'))
    else {
        let keep = if input.is_last() {
            0
        } else {
            unstable_suffix_len(bytes)
        };
        let end = bytes.len() - keep;

        c.js_ctx = next_js_ctx(&input[..end], c.js_ctx);

        return if keep > 0 {
            Step::blocked(c, end)
        } else {
            Step::to(c, end)
        };
    };

    c.js_ctx = next_js_ctx(&input[..i], c.js_ctx);

    match bytes[i] {
        b'"' => {
            c.state = State::JsDqStr;
            c.js_ctx = JsCtx::Regexp;
        }
        b'\'' => {
            c.state = State::JsSqStr;
            c.js_ctx = JsCtx::Regexp;
        }
        b'`' => {
            c.state = State::JsTmplLit;
            c.js_ctx = JsCtx::Regexp;
        }
        _ => match bytes.get(i + 1) {
            None if !input.is_last() => return Step::blocked(c, i),
            Some(b'/') => {
                c.state = State::JsLineComment;
                return Step::to(c, i + 2);
            }
            Some(b'*') => {
                c.state = State::JsBlockComment;
                return Step::to(c, i + 2);
            }
            _ => match c.js_ctx {
                JsCtx::Regexp => c.state = State::JsRegexp,
                JsCtx::DivOp => c.js_ctx = JsCtx::Regexp,
                JsCtx::Unknown => {
                    return Step::fail(
                        ErrorKind::SlashAmbiguity,
                        format!("'/' could start a division or regexp: {:?}", &input[i..]),
                        input,
                    )
                }
            },
        },
    }

    Step::to(c, i + 1)
}

pub(super) fn t_js_delimited(mut c: Context, input: &Chunk<'_>) -> Step {
    let specials: &[u8] = match c.state {
        State::JsSqStr => b"\\'",
        State::JsRegexp => b"\\/[]",
        State::JsTmplLit => b"\\`",
        _ => b"\\\"",
    };

    let bytes = input.as_bytes();
    let mut k = 0;
    let mut charset_start = None;

    while let Some(i) = bytes[k..]
        .iter()
        .position(|b| specials.contains(b))
        .map(|i| i + k)
    {
        match bytes[i] {
            b'\\' => {
                if i + 1 == bytes.len() {
                    if !input.is_last() {
                        return Step::blocked(c, charset_start.unwrap_or(i));
                    }

                    return Step::fail(
                        ErrorKind::PartialEscape,
                        format!("unfinished escape sequence in JS string: {:?}", input.text()),
                        input,
                    );
                }

                k = i + 2;
                continue;
            }
            b'[' => charset_start = charset_start.or(Some(i)),
            b']' => charset_start = None,
            _ => {
                if charset_start.is_none() {
                    c.state = State::Js;
                    c.js_ctx = JsCtx::DivOp;

                    return Step::to(c, i + 1);
                }
            }
        }

        k = i + 1;
    }

    if let Some(start) = charset_start {
        if !input.is_last() {
            return Step::blocked(c, start);
        }

        // NOTE: a richer context could allow values inside charsets.
        return Step::fail(
            ErrorKind::PartialCharset,
            format!("unfinished JS regexp charset: {:?}", input.text()),
            input,
        );
    }

    Step::to(c, input.len())
}
