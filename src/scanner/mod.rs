//! The transition engine: advances a [`Context`] over literal text.
//!
//! Every transition consumes a prefix of its input and returns the context after it. Input that
//! is not the [`last`](Chunk::is_last) chunk may be continued by the next write, so transitions
//! never decide on a token that reaches the end of such input: they stop in front of it and
//! report the step as blocked. The [`Scanner`] keeps those blocked bytes and prepends them to
//! the next chunk, which makes the resulting context independent of how literal text is split.

mod css;
mod html;
mod js;
mod url;

use crate::base::Chunk;
use crate::context::{AttrKind, Context, Delim, Element, State, UrlPart};
use crate::errors::{ContextError, ErrorKind};
use crate::html::{decode_char_refs, is_tag_name_end};
use crate::MemorySettings;
use memchr::memmem;
use std::mem;

pub(crate) use self::css::{decode_css, is_css_nmchar};
pub(crate) use self::html::strip_tags;
pub(crate) use self::js::is_js_ident_part;


/// The outcome of a single transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    context: Context,
    consumed: usize,
    blocked: bool,
}

impl Step {
    #[inline]
    pub(crate) fn to(context: Context, consumed: usize) -> Self {
        Step {
            context,
            consumed,
            blocked: false,
        }
    }

    #[inline]
    pub(crate) fn blocked(context: Context, consumed: usize) -> Self {
        Step {
            context,
            consumed,
            blocked: true,
        }
    }

    #[cold]
    pub(crate) fn fail(kind: ErrorKind, description: impl Into<String>, input: &str) -> Self {
        Step::to(Context::error(kind, description), input.len())
    }

    /// The context after the consumed bytes.
    #[inline]
    #[must_use]
    pub fn context(&self) -> &Context {
        &self.context
    }

    #[inline]
    #[must_use]
    pub fn into_context(self) -> Context {
        self.context
    }

    /// Number of bytes consumed from the front of the input.
    #[inline]
    #[must_use]
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Returns `true` if the rest of the input can't be consumed before more text is available.
    #[inline]
    #[must_use]
    pub fn is_blocked(&self) -> bool {
        self.blocked
    }
}

/// Consumes one group of tokens from the front of `input`.
///
/// Callers repeat the call on the remaining suffix until the input is exhausted or the step is
/// blocked; the result of a blocked step must be retried with the unconsumed bytes followed by
/// more text. A `last` chunk is always consumed completely.
#[must_use]
pub fn advance(context: &Context, input: &Chunk<'_>) -> Step {
    let step = after_text(context.clone(), input);

    trace!(@step input.text(), step);

    step
}

fn after_text(c: Context, input: &Chunk<'_>) -> Step {
    if c.delim != Delim::None {
        return after_text_in_attr_value(c, input);
    }

    if c.element == Element::None || c.state.is_in_tag() {
        return transition(c, input);
    }

    match find_special_tag_end(input, c.element) {
        SpecialTagEnd::Found(0) => Step::to(Context::new(), 0),
        SpecialTagEnd::Found(i) => transition(c, &input.prefix(i, true)),
        SpecialTagEnd::Partial(i) if input.is_last() => Step::fail(
            ErrorKind::BadHtml,
            format!(
                "{:?} at the end of literal text: a value could complete the end tag of <{}>",
                &input[i..],
                c.element.name()
            ),
            input,
        ),
        SpecialTagEnd::Partial(0) => Step::blocked(c, 0),
        SpecialTagEnd::Partial(i) => {
            let step = transition(c, &input.prefix(i, false));

            if step.blocked || step.consumed < i {
                step
            } else {
                Step::blocked(step.context, i)
            }
        }
        SpecialTagEnd::None => transition(c, input),
    }
}

fn after_text_in_attr_value(mut c: Context, input: &Chunk<'_>) -> Step {
    let bytes = input.as_bytes();
    let end_bytes = c.delim.end_bytes();
    let end = bytes.iter().position(|b| end_bytes.contains(b));
    let value_end = end.unwrap_or(bytes.len());

    if c.delim == Delim::SpaceOrTagEnd {
        // NOTE: HTML parsers disagree on where an unquoted value containing these ends:
        // `<a id= onclick=f(` may end inside `id` or `onclick`, IE treats '`' as a quote.
        if let Some(j) = bytes[..value_end]
            .iter()
            .position(|b| b"\"'<=`".contains(b))
        {
            return Step::fail(
                ErrorKind::BadHtml,
                format!(
                    "{:?} in unquoted attr: {:?}",
                    char::from(bytes[j]),
                    &input[..value_end]
                ),
                input,
            );
        }
    }

    if let Some(i) = end {
        let consumed = if c.delim == Delim::SpaceOrTagEnd { i } else { i + 1 };

        // NOTE: leaving an attribute discards everything but the element.
        return Step::to(Context::in_tag(c.element), consumed);
    }

    // NOTE: the value is lexed in its decoded form so that the sub-grammars see
    // `alert(&quot;Hi!&quot;)` as `alert("Hi!")`.
    let decoded = decode_char_refs(input, input.is_last());
    let text = decoded.text();
    let mut pos = 0;

    while pos < text.len() {
        let step = transition(c, &Chunk::new(&text[pos..], input.is_last()));

        c = step.context;
        pos += step.consumed;

        if step.blocked {
            return Step::blocked(c, decoded.raw_offset(pos));
        }

        if c.is_error() {
            return Step::to(c, input.len());
        }
    }

    if input.is_last() && decoded.ends_with_ref() {
        c = after_trailing_char_ref(c, input);
    }

    let consumed = decoded.raw_len();

    if consumed < input.len() {
        Step::blocked(c, consumed)
    } else {
        Step::to(c, consumed)
    }
}

// A value written after `&`, `&#3` or `&quo` can complete the character reference, which is
// then decoded by the browser in front of the value's sub-grammar.
fn after_trailing_char_ref(mut c: Context, input: &str) -> Context {
    match c.state {
        State::Error => c,
        State::Attr if c.attr == AttrKind::Ordinary => c,
        State::Url | State::Srcset if c.url_part == UrlPart::QueryOrFrag => c,
        State::Url | State::Srcset => {
            c.url_part = UrlPart::Unknown;
            c
        }
        _ => Context::error(
            ErrorKind::AmbiguousContext,
            format!(
                "{:?} ends with a partial character reference that a value could complete",
                input
            ),
        ),
    }
}

fn transition(c: Context, input: &Chunk<'_>) -> Step {
    match c.state {
        State::Text => html::t_text(c, input),
        State::Tag => html::t_tag(c, input),
        State::AttrName => html::t_attr_name(c, input),
        State::AfterName => html::t_after_name(c, input),
        State::BeforeValue => html::t_before_value(c, input),
        State::HtmlComment => html::t_html_comment(c, input),
        State::RcData | State::Attr | State::Error => Step::to(c, input.len()),
        State::Url | State::Srcset => url::t_url(c, input),
        State::Js => js::t_js(c, input),
        State::JsDqStr | State::JsSqStr | State::JsRegexp | State::JsTmplLit => {
            js::t_js_delimited(c, input)
        }
        State::JsBlockComment | State::CssBlockComment => t_block_comment(c, input),
        State::JsLineComment | State::CssLineComment => t_line_comment(c, input),
        State::Css => css::t_css(c, input),
        State::CssDqStr
        | State::CssSqStr
        | State::CssDqUrl
        | State::CssSqUrl
        | State::CssUrl => css::t_css_str(c, input),
    }
}

fn t_block_comment(mut c: Context, input: &Chunk<'_>) -> Step {
    let Some(i) = memmem::find(input.as_bytes(), b"*/") else {
        if !input.is_last() && input.ends_with('*') {
            return Step::blocked(c, input.len() - 1);
        }

        return Step::to(c, input.len());
    };

    c.state = match c.state {
        State::JsBlockComment => State::Js,
        _ => State::Css,
    };

    Step::to(c, i + 2)
}

fn t_line_comment(mut c: Context, input: &Chunk<'_>) -> Step {
    let (end, end_state) = match c.state {
        State::JsLineComment => (
            input.find(['\n', '\r', '\u{2028}', '\u{2029}']),
            State::Js,
        ),
        // NOTE: line comments are not standard CSS, but are supported by browsers.
        _ => (input.find(['\n', '\x0c', '\r']), State::Css),
    };

    match end {
        Some(i) => {
            c.state = end_state;

            // NOTE: the line terminator is not a part of the comment.
            Step::to(c, i)
        }
        None => Step::to(c, input.len()),
    }
}

#[derive(Debug, PartialEq, Eq)]
enum SpecialTagEnd {
    /// The end tag starts at the given offset.
    Found(usize),
    /// The text ends with what may be the start of the end tag.
    Partial(usize),
    None,
}

// NOTE: `Partial` is reported for a trailing `<` only if more text may follow: a value can't
// start with `/` in any of the raw text sub-grammars without escaping it.
fn find_special_tag_end(input: &Chunk<'_>, element: Element) -> SpecialTagEnd {
    let bytes = input.as_bytes();
    let name = element.name().as_bytes();

    for i in memmem::find_iter(bytes, b"</") {
        let rest = &bytes[i + 2..];

        if rest.len() <= name.len() {
            if rest.eq_ignore_ascii_case(&name[..rest.len()]) {
                return SpecialTagEnd::Partial(i);
            }
        } else if rest[..name.len()].eq_ignore_ascii_case(name)
            && is_tag_name_end(rest[name.len()])
        {
            return SpecialTagEnd::Found(i);
        }
    }

    if !input.is_last() && bytes.last() == Some(&b'<') {
        return SpecialTagEnd::Partial(bytes.len() - 1);
    }

    SpecialTagEnd::None
}

/// Tracks the context of a stream of literal text written in arbitrary chunks.
///
/// Bytes whose meaning depends on text that hasn't been written yet are kept in a buffer and
/// prepended to the next chunk. [`Scanner::flush`] resolves them when a value is about to be
/// written.
#[derive(Debug)]
pub struct Scanner {
    context: Context,
    blocked_bytes: String,
    max_blocked_bytes: usize,
}

impl Scanner {
    #[must_use]
    pub fn new(settings: &MemorySettings) -> Self {
        Scanner {
            context: Context::new(),
            blocked_bytes: String::with_capacity(settings.preallocated_buffer_size),
            max_blocked_bytes: settings.max_blocked_bytes,
        }
    }

    /// The context after all text fed so far, excluding the blocked bytes.
    #[inline]
    #[must_use]
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Bytes that have been fed but not yet accounted for in the context.
    #[inline]
    #[must_use]
    pub fn blocked_bytes(&self) -> &str {
        &self.blocked_bytes
    }

    #[inline]
    pub(crate) fn set_context(&mut self, context: Context) {
        debug_assert!(self.blocked_bytes.is_empty());

        self.context = context;
    }

    /// Advances the context over a chunk of literal text.
    pub fn feed(&mut self, text: &str) -> Result<(), ContextError> {
        self.scan(text, false)
    }

    /// Resolves the blocked bytes, as if a value boundary followed them.
    pub fn flush(&mut self) -> Result<(), ContextError> {
        self.scan("", true)
    }

    fn scan(&mut self, text: &str, last: bool) -> Result<(), ContextError> {
        if let Some(err) = self.context.err() {
            return Err(err.clone());
        }

        if self.blocked_bytes.is_empty() {
            let consumed = self.advance_over(text, last);

            self.blocked_bytes.push_str(&text[consumed..]);
        } else {
            self.blocked_bytes.push_str(text);

            let mut buffer = mem::take(&mut self.blocked_bytes);
            let consumed = self.advance_over(&buffer, last);

            buffer.drain(..consumed);
            self.blocked_bytes = buffer;
        }

        if self.blocked_bytes.len() > self.max_blocked_bytes {
            self.context = Context::error(
                ErrorKind::BufferCapacityExceeded,
                format!(
                    "{} bytes of literal text can't be resolved without more input, the limit \
                     is {} bytes",
                    self.blocked_bytes.len(),
                    self.max_blocked_bytes
                ),
            );
        }

        match self.context.err() {
            Some(err) => {
                log::warn!("escaping context poisoned: {err}");
                self.blocked_bytes.clear();

                Err(err.clone())
            }
            None => {
                if !self.blocked_bytes.is_empty() {
                    trace!(@blocked self.blocked_bytes);
                }

                Ok(())
            }
        }
    }

    fn advance_over(&mut self, text: &str, last: bool) -> usize {
        let mut pos = 0;

        while pos < text.len() {
            let step = advance(&self.context, &Chunk::new(&text[pos..], last));

            if step.consumed == 0 && !step.blocked && step.context == self.context {
                self.context = Context::error(
                    ErrorKind::AmbiguousContext,
                    format!("no transition consumes {:?}", &text[pos..]),
                );

                return text.len();
            }

            pos += step.consumed;
            self.context = step.context;

            if step.blocked || self.context.is_error() {
                break;
            }
        }

        if self.context.is_error() {
            text.len()
        } else {
            pos
        }
    }
}
