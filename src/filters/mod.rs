//! Escaping filters and the selection of a pipeline of them for a context.

mod css;
mod html;
mod js;
mod url;

use crate::content::{stringify, ContentType, Value};
use crate::context::{AttrKind, Context, Delim, JsCtx, State, UrlPart};
use crate::errors::{ContextError, ErrorKind};

/// An innocuous word emitted in place of unsafe values.
///
/// It is not a keyword in any programming language, contains no special characters, is not
/// empty, and is distinct enough to be found with a search when it shows up in output.
pub const FAILSAFE: &str = "ZgotmplZ";

/// A single escaping function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Filter {
    /// Replaces URLs with schemes other than `http`, `https` and `mailto` with `#ZgotmplZ`.
    UrlFilter,
    /// Percent-encodes bytes that are unsafe in an attribute or `url(...)`, keeping existing
    /// escapes and the URL delimiters.
    UrlNormalizer,
    /// Like [`Filter::UrlNormalizer`], but also encodes `?`, `#` and `&`, so that the value
    /// stays in the path it was written into.
    UrlPathNormalizer,
    /// Percent-encodes everything but the unreserved bytes.
    UrlEscaper,
    /// Filters and normalizes every URL of a `srcset` list.
    SrcsetFilter,
    /// Escapes text for a CSS string.
    CssEscaper,
    /// Like [`Filter::CssEscaper`], but percent-encodes `?`, `#` and `&` first.
    CssPathEscaper,
    /// Replaces CSS values that could break out of a declaration with `ZgotmplZ`.
    CssValueFilter,
    /// Writes a value as a JS expression.
    JsValEscaper,
    /// Escapes text for a JS string.
    JsStrEscaper,
    /// Escapes text for a JS regexp literal.
    JsRegexpEscaper,
    HtmlEscaper,
    RcdataEscaper,
    /// Escapes text for a quoted attribute value.
    AttrEscaper,
    /// Escapes text for an unquoted attribute value.
    HtmlNospaceEscaper,
    /// Replaces anything but a harmless ASCII alphanumeric attribute name with `ZgotmplZ`.
    HtmlNameFilter,
    /// Drops the value.
    CommentEscaper,
}

impl Filter {
    /// Applies the filter to text with the given trust tag.
    #[must_use]
    pub fn apply(self, text: &str, content_type: ContentType) -> String {
        match self {
            Filter::UrlFilter => url::filter_url(text, content_type),
            Filter::UrlNormalizer => url::normalize_url(text),
            Filter::UrlPathNormalizer => url::normalize_url_path(text),
            Filter::UrlEscaper => url::escape_url(text),
            Filter::SrcsetFilter => url::filter_srcset(text, content_type),
            Filter::CssEscaper => css::escape_css(text),
            Filter::CssPathEscaper => css::escape_css(&url::encode_separators(text)),
            Filter::CssValueFilter => css::filter_css_value(text, content_type),
            Filter::JsValEscaper => js::escape_js_text(text, content_type),
            Filter::JsStrEscaper => js::escape_js_str(text, content_type),
            Filter::JsRegexpEscaper => js::escape_js_regexp(text),
            Filter::HtmlEscaper => html::escape_html(text, content_type),
            Filter::RcdataEscaper => html::escape_rcdata(text, content_type),
            Filter::AttrEscaper => html::escape_attr(text, content_type),
            Filter::HtmlNospaceEscaper => html::escape_html_nospace(text, content_type),
            Filter::HtmlNameFilter => html::filter_html_name(text, content_type),
            Filter::CommentEscaper => String::new(),
        }
    }

    fn apply_to_values(self, values: &[&dyn Value]) -> String {
        match (self, values) {
            // NOTE: numbers, booleans and JSON are written as JS literals, not as strings.
            (Filter::JsValEscaper, [value]) => js::escape_js_value(*value),
            _ => {
                let (text, content_type) = stringify(values);

                self.apply(&text, content_type)
            }
        }
    }
}

/// An ordered list of filters a value goes through.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pipeline {
    filters: Vec<Filter>,
}

impl Pipeline {
    #[inline]
    fn push(&mut self, filter: Filter) {
        self.filters.push(filter);
    }

    #[inline]
    #[must_use]
    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// Runs the values through the filters.
    ///
    /// The first filter sees the values with their trust tags, the ones after it see the
    /// untrusted output of their predecessor. An empty pipeline writes the text of the values
    /// as is.
    #[must_use]
    pub fn apply(&self, values: &[&dyn Value]) -> String {
        let Some((first, rest)) = self.filters.split_first() else {
            return stringify(values).0.into_owned();
        };

        rest.iter().fold(first.apply_to_values(values), |text, filter| {
            filter.apply(&text, ContentType::Plain)
        })
    }
}

impl<const N: usize> From<[Filter; N]> for Pipeline {
    #[inline]
    fn from(filters: [Filter; N]) -> Self {
        Pipeline {
            filters: filters.into(),
        }
    }
}

#[cold]
fn refuse(context: &Context, description: &str) -> ContextError {
    ContextError::new(
        ErrorKind::AmbiguousContext,
        format!("{description}: {:?}", context.state()),
    )
}

/// Selects the filters for a value written in the `context`.
///
/// The `context` must have been [nudged](Context::nudge). Returns the context the value is
/// written in, which differs from the `context` where writing the value decides on something:
/// a `/` after a JS value is a division, a value in a tag is an attribute name.
pub fn select_filters(
    context: &Context,
    content_type: ContentType,
) -> Result<(Context, Pipeline), ContextError> {
    let mut c = context.clone();
    let mut pipeline = Pipeline::default();
    let trusted_url = content_type == ContentType::Url;

    match c.state {
        State::Error => {
            return Err(c
                .err()
                .cloned()
                .unwrap_or_else(|| refuse(context, "no error in the error context")))
        }
        State::Url
        | State::CssDqStr
        | State::CssSqStr
        | State::CssDqUrl
        | State::CssSqUrl
        | State::CssUrl => {
            let in_css_string = c.state.is_css_string();

            match c.url_part {
                UrlPart::None => {
                    pipeline.push(Filter::UrlFilter);
                    pipeline.push(if in_css_string {
                        Filter::CssEscaper
                    } else {
                        Filter::UrlNormalizer
                    });
                }
                UrlPart::PreQuery => pipeline.push(match (in_css_string, trusted_url) {
                    (true, true) => Filter::CssEscaper,
                    (true, false) => Filter::CssPathEscaper,
                    (false, true) => Filter::UrlNormalizer,
                    (false, false) => Filter::UrlPathNormalizer,
                }),
                UrlPart::QueryOrFrag => pipeline.push(Filter::UrlEscaper),
                UrlPart::Unknown => {
                    return Err(refuse(
                        context,
                        "a value can't be written where it may be on either side of the query \
                         of a URL",
                    ))
                }
            }
        }
        State::Srcset => {
            if c.url_part == UrlPart::Unknown {
                return Err(refuse(
                    context,
                    "a value can't be written where it may be on either side of the query of \
                     a URL",
                ));
            }

            pipeline.push(Filter::SrcsetFilter);
        }
        State::Js => {
            pipeline.push(Filter::JsValEscaper);

            // NOTE: a `/` after a value is a division.
            c.js_ctx = JsCtx::DivOp;
        }
        State::JsDqStr | State::JsSqStr => pipeline.push(Filter::JsStrEscaper),
        State::JsRegexp => pipeline.push(Filter::JsRegexpEscaper),
        State::JsTmplLit => {
            return Err(refuse(
                context,
                "a value can't be written into a JS template literal",
            ))
        }
        State::Css => pipeline.push(Filter::CssValueFilter),
        State::Text => pipeline.push(Filter::HtmlEscaper),
        State::RcData => pipeline.push(Filter::RcdataEscaper),
        State::Attr => match c.attr {
            AttrKind::Html => pipeline.push(Filter::HtmlEscaper),
            AttrKind::Composite => {
                return Err(refuse(
                    context,
                    "a value can't be written into the value of an attribute with a name built \
                     from a value",
                ))
            }
            // NOTE: handled with the delimiter.
            _ => (),
        },
        State::AttrName | State::Tag => {
            c.state = State::AttrName;
            pipeline.push(Filter::HtmlNameFilter);
        }
        State::HtmlComment
        | State::JsBlockComment
        | State::JsLineComment
        | State::CssBlockComment
        | State::CssLineComment => pipeline.push(Filter::CommentEscaper),
        State::AfterName | State::BeforeValue => {
            return Err(refuse(context, "a value can't be written in a context that isn't nudged"))
        }
    }

    match c.delim {
        Delim::None => (),
        Delim::SpaceOrTagEnd => pipeline.push(Filter::HtmlNospaceEscaper),
        Delim::DoubleQuote | Delim::SingleQuote => pipeline.push(Filter::AttrEscaper),
    }

    trace!(@pipeline c, pipeline);

    Ok((c, pipeline))
}
