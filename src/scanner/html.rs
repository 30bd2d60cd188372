use crate::base::Chunk;
use crate::context::{AttrKind, Context, Delim, Element, State};
use crate::errors::ErrorKind;
use crate::html::{attr_kind, is_html_space};
use memchr::{memchr, memmem};

use super::{advance, Step};

#[inline]
fn eat_whitespace(bytes: &[u8], start: usize) -> usize {
    bytes[start..]
        .iter()
        .position(|&b| !is_html_space(b))
        .map_or(bytes.len(), |i| i + start)
}

// NOTE: allows `x-y` and `x:y`, but not `x-`, `-y` or `x--y`.
fn eat_tag_name(bytes: &[u8], start: usize) -> usize {
    if !bytes.get(start).is_some_and(u8::is_ascii_alphabetic) {
        return start;
    }

    let mut j = start + 1;

    while j < bytes.len() {
        let b = bytes[j];

        if b.is_ascii_alphanumeric() {
            j += 1;
        } else if matches!(b, b':' | b'-') && bytes.get(j + 1).is_some_and(u8::is_ascii_alphanumeric)
        {
            j += 2;
        } else {
            break;
        }
    }

    j
}

fn eat_attr_name(input: &str, start: usize) -> Result<usize, Step> {
    for (j, &b) in input.as_bytes().iter().enumerate().skip(start) {
        match b {
            b' ' | b'\t' | b'\n' | b'\x0c' | b'\r' | b'=' | b'>' => return Ok(j),
            b'\'' | b'"' | b'<' => {
                return Err(Step::fail(
                    ErrorKind::BadHtml,
                    format!("{:?} in attribute name: {:?}", char::from(b), input),
                    input,
                ))
            }
            _ => (),
        }
    }

    Ok(input.len())
}

// NOTE: `<`, `</`, `<!`, `<!-` or a tag name at the end of literal text followed by a value
// would let the value decide what the markup is.
fn incomplete_markup(c: Context, input: &Chunk<'_>, start: usize) -> Step {
    if input.is_last() {
        Step::fail(
            ErrorKind::BadHtml,
            format!(
                "{:?} at the end of literal text: a value could complete the tag",
                &input[start..]
            ),
            input,
        )
    } else {
        Step::blocked(c, start)
    }
}

pub(super) fn t_text(c: Context, input: &Chunk<'_>) -> Step {
    let bytes = input.as_bytes();
    let mut k = 0;

    loop {
        let Some(i) = memchr(b'<', &bytes[k..]).map(|i| i + k) else {
            return Step::to(c, bytes.len());
        };

        let rest = &bytes[i..];

        if rest.starts_with(b"<!--") {
            return Step::to(Context::with_state(State::HtmlComment), i + 4);
        }

        if b"<!--".starts_with(rest) || rest == b"</" {
            return incomplete_markup(c, input, i);
        }

        let is_end_tag = rest[1] == b'/';
        let name_start = if is_end_tag { i + 2 } else { i + 1 };
        let name_end = eat_tag_name(bytes, name_start);

        if name_end != name_start {
            let may_continue = name_end == bytes.len()
                || (name_end + 1 == bytes.len() && matches!(bytes[name_end], b'-' | b':'));

            if may_continue {
                return incomplete_markup(c, input, i);
            }

            let element = if is_end_tag {
                Element::None
            } else {
                Element::from_tag_name(&input[name_start..name_end])
            };

            return Step::to(Context::in_tag(element), name_end);
        }

        k = name_start;
    }
}

pub(super) fn t_tag(c: Context, input: &Chunk<'_>) -> Step {
    let i = eat_whitespace(input.as_bytes(), 0);

    if i == input.len() {
        return Step::to(c, input.len());
    }

    if input.as_bytes()[i] == b'>' {
        return Step::to(
            Context {
                state: c.element.content_state(),
                element: c.element,
                ..Context::default()
            },
            i + 1,
        );
    }

    let j = match eat_attr_name(input, i) {
        Ok(j) => j,
        Err(step) => return step,
    };

    if i == j {
        return Step::fail(
            ErrorKind::BadHtml,
            format!(
                "expected space, attr name, or end of tag, but got {:?}",
                &input[i..]
            ),
            input,
        );
    }

    if j == input.len() && !input.is_last() {
        // NOTE: classify the attribute by its full name.
        return Step::blocked(c, i);
    }

    let state = if j == input.len() {
        State::AttrName
    } else {
        State::AfterName
    };

    Step::to(
        Context {
            state,
            element: c.element,
            attr: attr_kind(&input[i..j].to_ascii_lowercase()),
            ..Context::default()
        },
        j,
    )
}

pub(super) fn t_attr_name(mut c: Context, input: &Chunk<'_>) -> Step {
    let i = match eat_attr_name(input, 0) {
        Ok(i) => i,
        Err(step) => return step,
    };

    if i > 0 {
        // NOTE: the name continues one that was started before a value boundary.
        c.attr = AttrKind::Composite;
    }

    if i != input.len() {
        c.state = State::AfterName;
    }

    Step::to(c, i)
}

pub(super) fn t_after_name(mut c: Context, input: &Chunk<'_>) -> Step {
    let i = eat_whitespace(input.as_bytes(), 0);

    if i == input.len() {
        return Step::to(c, input.len());
    }

    if input.as_bytes()[i] != b'=' {
        // NOTE: a valueless attribute, or the end of the tag.
        c.state = State::Tag;

        return Step::to(c, i);
    }

    c.state = State::BeforeValue;

    Step::to(c, i + 1)
}

pub(super) fn t_before_value(mut c: Context, input: &Chunk<'_>) -> Step {
    let mut i = eat_whitespace(input.as_bytes(), 0);

    if i == input.len() {
        return Step::to(c, input.len());
    }

    let delim = match input.as_bytes()[i] {
        b'"' => {
            i += 1;
            Delim::DoubleQuote
        }
        b'\'' => {
            i += 1;
            Delim::SingleQuote
        }
        _ => Delim::SpaceOrTagEnd,
    };

    c.state = c.attr.value_state();
    c.delim = delim;

    Step::to(c, i)
}

pub(super) fn t_html_comment(c: Context, input: &Chunk<'_>) -> Step {
    if let Some(i) = memmem::find(input.as_bytes(), b"-->") {
        return Step::to(Context::new(), i + 3);
    }

    if !input.is_last() {
        if input.ends_with("--") {
            return Step::blocked(c, input.len() - 2);
        }

        if input.ends_with('-') {
            return Step::blocked(c, input.len() - 1);
        }
    }

    Step::to(c, input.len())
}

/// Removes tags and comments from HTML, keeping its text content.
pub(crate) fn strip_tags(html: &str) -> String {
    let mut stripped = String::with_capacity(html.len());
    let mut c = Context::new();
    let mut i = 0;
    let mut all_text = true;

    while i < html.len() {
        if c.delim == Delim::None {
            let is_text = matches!(c.state, State::Text | State::RcData);
            let mut scan_ctx = c.clone();

            // NOTE: element content is not lexed as JS or CSS here.
            if c.element != Element::None && !c.state.is_in_tag() {
                scan_ctx.state = State::RcData;
            }

            let step = advance(&scan_ctx, &Chunk::last(&html[i..]));
            let next = i + step.consumed();
            let d = step.into_context();

            if d.is_error() {
                if is_text {
                    stripped.push_str(&html[i..]);
                }

                return stripped;
            }

            if is_text {
                let mut j = next;

                // NOTE: emit text up to the start of the tag or comment.
                if d.state != c.state {
                    if let Some(lt) = html[i..j].rfind('<') {
                        j = i + lt;
                    }
                }

                stripped.push_str(&html[i..j]);
            } else {
                all_text = false;
            }

            c = d;
            i = next;

            continue;
        }

        let end_bytes = c.delim.end_bytes();
        let Some(end) = html.as_bytes()[i..]
            .iter()
            .position(|b| end_bytes.contains(b))
        else {
            break;
        };

        i += end;

        if c.delim != Delim::SpaceOrTagEnd {
            i += 1;
        }

        c = Context::in_tag(c.element);
    }

    if all_text {
        return html.to_owned();
    }

    if matches!(c.state, State::Text | State::RcData) {
        stripped.push_str(&html[i..]);
    }

    stripped
}
