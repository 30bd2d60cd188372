//! The context model: where in the HTML grammar the output cursor currently is.

use crate::errors::{ContextError, ErrorKind};


/// A grammar position.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum State {
    /// Parsed character data.
    #[default]
    Text,
    /// Inside a tag, before an attribute name or the end of the tag.
    Tag,
    /// Inside an attribute name.
    AttrName,
    /// After an attribute name, before `=` (if any).
    AfterName,
    /// After `=`, before the attribute value.
    BeforeValue,
    /// Inside an HTML comment.
    HtmlComment,
    /// Inside RCDATA element content (`<textarea>`, `<title>`).
    RcData,
    /// Inside an attribute value of an ordinary kind.
    Attr,
    /// Inside a URL-valued attribute value.
    Url,
    /// Inside a `srcset` attribute value.
    Srcset,
    /// Inside a JS expression.
    Js,
    /// Inside a double-quoted JS string.
    JsDqStr,
    /// Inside a single-quoted JS string.
    JsSqStr,
    /// Inside a JS regexp literal.
    JsRegexp,
    /// Inside a JS template literal.
    JsTmplLit,
    /// Inside a `/* ... */` JS comment.
    JsBlockComment,
    /// Inside a `// ...` JS comment.
    JsLineComment,
    /// Inside CSS outside of strings, URLs and comments.
    Css,
    /// Inside a double-quoted CSS string.
    CssDqStr,
    /// Inside a single-quoted CSS string.
    CssSqStr,
    /// Inside a double-quoted `url("...")`.
    CssDqUrl,
    /// Inside a single-quoted `url('...')`.
    CssSqUrl,
    /// Inside an unquoted `url(...)`.
    CssUrl,
    /// Inside a `/* ... */` CSS comment.
    CssBlockComment,
    /// Inside a `// ...` CSS comment.
    CssLineComment,
    /// A terminal state: no escaping decision can be made any more.
    Error,
}

impl State {
    /// Returns `true` for HTML, JS and CSS comments.
    #[inline]
    #[must_use]
    pub fn is_comment(self) -> bool {
        matches!(
            self,
            State::HtmlComment
                | State::JsBlockComment
                | State::JsLineComment
                | State::CssBlockComment
                | State::CssLineComment
        )
    }

    /// Returns `true` for positions inside a start or end tag, excluding attribute value
    /// sub-grammars other than the ordinary one.
    #[inline]
    #[must_use]
    pub fn is_in_tag(self) -> bool {
        matches!(
            self,
            State::Tag | State::AttrName | State::AfterName | State::BeforeValue | State::Attr
        )
    }

    /// Returns `true` for positions where a value is interpreted as (a part of) a URL.
    #[inline]
    #[must_use]
    pub fn is_url(self) -> bool {
        matches!(
            self,
            State::Url
                | State::CssDqStr
                | State::CssSqStr
                | State::CssDqUrl
                | State::CssSqUrl
                | State::CssUrl
        )
    }

    #[inline]
    pub(crate) fn is_css_string(self) -> bool {
        matches!(self, State::CssDqStr | State::CssSqStr)
    }
}

/// How the current attribute value is bounded.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum Delim {
    /// Not inside an attribute value.
    #[default]
    None,
    DoubleQuote,
    SingleQuote,
    /// An unquoted value, ended by whitespace or `>`.
    SpaceOrTagEnd,
}

impl Delim {
    /// Bytes that end an attribute value with this delimiter.
    #[inline]
    pub(crate) fn end_bytes(self) -> &'static [u8] {
        match self {
            Delim::None => b"",
            Delim::DoubleQuote => b"\"",
            Delim::SingleQuote => b"'",
            Delim::SpaceOrTagEnd => b" \t\n\x0c\r>",
        }
    }
}

/// Position inside a URL.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum UrlPart {
    /// Nothing of the URL has been seen yet.
    #[default]
    None,
    /// Some URL text has been seen, but no `?` or `#`.
    PreQuery,
    /// A `?` or `#` has been seen.
    QueryOrFrag,
    /// It can't be proven on which side of a query boundary the cursor is.
    Unknown,
}

/// Whether a `/` in JS would start a regexp literal or be a division operator.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum JsCtx {
    /// A `/` starts a regexp literal.
    #[default]
    Regexp,
    /// A `/` is a division operator.
    DivOp,
    /// A `/` is ambiguous.
    Unknown,
}

/// The semantic class of the current attribute.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum AttrKind {
    #[default]
    Ordinary,
    /// The value is a URL (`href`, `src`, ...).
    Url,
    /// The value is a list of image candidates (`srcset`).
    Srcset,
    /// The value is JS (event handlers).
    Js,
    /// The value is CSS (`style`).
    Css,
    /// The value is an HTML document (`srcdoc`).
    Html,
    /// The value changes how other content is loaded or interpreted (`charset`, `rel`, ...).
    Unsafe,
    /// The attribute name was assembled from a value and literal name characters, so its kind
    /// can't be determined.
    Composite,
}

impl AttrKind {
    /// The state an attribute value of this kind starts in.
    #[inline]
    #[must_use]
    pub fn value_state(self) -> State {
        match self {
            AttrKind::Url => State::Url,
            AttrKind::Srcset => State::Srcset,
            AttrKind::Js => State::Js,
            AttrKind::Css => State::Css,
            AttrKind::Ordinary | AttrKind::Html | AttrKind::Unsafe | AttrKind::Composite => {
                State::Attr
            }
        }
    }
}

/// An element whose content is lexed differently from ordinary elements.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum Element {
    #[default]
    None,
    Script,
    Style,
    Textarea,
    Title,
}

impl Element {
    /// Recognizes a tag name. The comparison is ASCII case-insensitive.
    #[must_use]
    pub fn from_tag_name(name: &str) -> Self {
        [
            Element::Script,
            Element::Style,
            Element::Textarea,
            Element::Title,
        ]
        .into_iter()
        .find(|e| e.name().eq_ignore_ascii_case(name))
        .unwrap_or(Element::None)
    }

    #[inline]
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Element::None => "",
            Element::Script => "script",
            Element::Style => "style",
            Element::Textarea => "textarea",
            Element::Title => "title",
        }
    }

    /// Returns `true` for elements whose content is raw text (`<script>`, `<style>`).
    #[inline]
    #[must_use]
    pub fn is_raw_text(self) -> bool {
        matches!(self, Element::Script | Element::Style)
    }

    /// Returns `true` for elements whose content is RCDATA (`<textarea>`, `<title>`).
    #[inline]
    #[must_use]
    pub fn is_rcdata(self) -> bool {
        matches!(self, Element::Textarea | Element::Title)
    }

    /// The state the element's content starts in.
    #[inline]
    #[must_use]
    pub fn content_state(self) -> State {
        match self {
            Element::None => State::Text,
            Element::Script => State::Js,
            Element::Style => State::Css,
            Element::Textarea | Element::Title => State::RcData,
        }
    }
}

/// The lexical position of the output cursor.
///
/// A `Context` is a plain value: scanning literal text produces a new one, and two contexts are
/// equal when every field is equal. A context in the [`State::Error`] state carries the error that
/// produced it and never leaves that state.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Context {
    pub(crate) state: State,
    pub(crate) delim: Delim,
    pub(crate) url_part: UrlPart,
    pub(crate) js_ctx: JsCtx,
    pub(crate) attr: AttrKind,
    pub(crate) element: Element,
    pub(crate) err: Option<ContextError>,
}

impl Context {
    /// The context at the start of a document.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Context::default()
    }

    #[inline]
    pub(crate) fn with_state(state: State) -> Self {
        Context {
            state,
            ..Context::default()
        }
    }

    /// Inside a tag, before the next attribute.
    #[inline]
    pub(crate) fn in_tag(element: Element) -> Self {
        Context {
            state: State::Tag,
            element,
            ..Context::default()
        }
    }

    #[cold]
    pub(crate) fn error(kind: ErrorKind, description: impl Into<String>) -> Self {
        Context {
            state: State::Error,
            err: Some(ContextError::new(kind, description)),
            ..Context::default()
        }
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> State {
        self.state
    }

    #[inline]
    #[must_use]
    pub fn delim(&self) -> Delim {
        self.delim
    }

    #[inline]
    #[must_use]
    pub fn url_part(&self) -> UrlPart {
        self.url_part
    }

    #[inline]
    #[must_use]
    pub fn js_ctx(&self) -> JsCtx {
        self.js_ctx
    }

    #[inline]
    #[must_use]
    pub fn attr(&self) -> AttrKind {
        self.attr
    }

    #[inline]
    #[must_use]
    pub fn element(&self) -> Element {
        self.element
    }

    /// The error that put the context into the error state.
    #[inline]
    #[must_use]
    pub fn err(&self) -> Option<&ContextError> {
        self.err.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.state == State::Error
    }

    #[inline]
    #[must_use]
    pub fn is_comment(&self) -> bool {
        self.state.is_comment()
    }

    #[inline]
    #[must_use]
    pub fn is_in_tag(&self) -> bool {
        self.state.is_in_tag()
    }

    /// Resolves a position where the next byte decides what follows into the position a value
    /// emitted right now would occupy.
    ///
    /// * before an attribute value: the start of the value for the attribute's kind, unquoted;
    /// * after an attribute name: inside the name of a new attribute;
    /// * inside a tag: inside an attribute name.
    #[must_use]
    pub fn nudge(&self) -> Context {
        let mut c = self.clone();

        match c.state {
            State::Tag | State::AfterName => {
                c.state = State::AttrName;
                c.attr = AttrKind::Ordinary;
            }
            State::BeforeValue => {
                c.state = c.attr.value_state();
                c.delim = Delim::SpaceOrTagEnd;
            }
            _ => (),
        }

        c
    }
}
