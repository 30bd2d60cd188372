mod settings;

use crate::content::{content_type, Value};
use crate::context::{AttrKind, Context, State};
use crate::errors::EscapeError;
use crate::filters::select_filters;
use crate::html::attr_kind;
use crate::scanner::Scanner;
use std::fmt::{self, Debug};
use std::io::{self, Write};

pub use self::settings::*;

/// An argument of [`Escaper::print`].
#[derive(Clone, Copy)]
pub enum Item<'a> {
    /// Literal HTML or a value, depending on its position among the other strings.
    Str(&'a str),
    /// A value, wherever it is.
    Value(&'a dyn Value),
    /// A nested argument list, with its own alternation of literals and values.
    List(&'a [Item<'a>]),
}

impl Debug for Item<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Item::Str(s) => f.debug_tuple("Str").field(s).finish(),
            Item::Value(_) => f.write_str("Value(..)"),
            Item::List(items) => f.debug_tuple("List").field(items).finish(),
        }
    }
}

impl<'a> From<&'a str> for Item<'a> {
    #[inline]
    fn from(s: &'a str) -> Self {
        Item::Str(s)
    }
}

impl<'a> From<&'a String> for Item<'a> {
    #[inline]
    fn from(s: &'a String) -> Self {
        Item::Str(s)
    }
}

impl<'a> From<&'a [Item<'a>]> for Item<'a> {
    #[inline]
    fn from(items: &'a [Item<'a>]) -> Self {
        Item::List(items)
    }
}

impl<'a, const N: usize> From<&'a [Item<'a>; N]> for Item<'a> {
    #[inline]
    fn from(items: &'a [Item<'a>; N]) -> Self {
        Item::List(items)
    }
}

/// Writes HTML to an output sink, escaping every value for the context it lands in.
///
/// Literal HTML is written as is and advances the context; values are escaped for the
/// context they are written in. Once a write puts the stream into the error state, every
/// later write fails with the same error and writes nothing.
///
/// # Example
///
/// ```
/// use html_autoescape::Escaper;
///
/// let mut escaper = Escaper::new(Vec::new());
///
/// escaper.write_literal("<a href=").unwrap();
/// escaper.write_value("javascript:alert(1)").unwrap();
/// escaper.write_literal(">").unwrap();
/// escaper.write_value("<b>hi</b>").unwrap();
/// escaper.write_literal("</a>").unwrap();
///
/// assert_eq!(
///     String::from_utf8(escaper.into_inner()).unwrap(),
///     r##"<a href="#ZgotmplZ">&lt;b&gt;hi&lt;/b&gt;</a>"##
/// );
/// ```
pub struct Escaper<W: Write> {
    scanner: Scanner,
    output: W,
}

impl<W: Write> Escaper<W> {
    #[inline]
    pub fn new(output: W) -> Self {
        Self::with_settings(output, &Settings::default())
    }

    pub fn with_settings(output: W, settings: &Settings) -> Self {
        Escaper {
            scanner: Scanner::new(&settings.memory_settings),
            output,
        }
    }

    /// The context after everything written so far.
    ///
    /// Literal text that ends in the middle of something whose meaning depends on the
    /// following text isn't accounted for yet, see [`Scanner::context`].
    #[inline]
    pub fn context(&self) -> &Context {
        self.scanner.context()
    }

    /// Writes literal HTML.
    ///
    /// Nothing is written if the text puts the stream into the error state.
    pub fn write_literal(&mut self, text: &str) -> Result<(), EscapeError> {
        self.scanner.feed(text)?;

        trace!(@write "literal", text);

        self.output.write_all(text.as_bytes())?;

        Ok(())
    }

    /// Escapes a value for the current context and writes it.
    ///
    /// A value that starts an attribute value is put into double quotes.
    #[inline]
    pub fn write_value(&mut self, value: impl Value) -> Result<(), EscapeError> {
        self.write_values(&[&value])
    }

    /// Writes several values as a single one: their textual representations are concatenated
    /// and escaped together. The result is untrusted, whatever the trust tags of the values.
    pub fn write_values(&mut self, values: &[&dyn Value]) -> Result<(), EscapeError> {
        self.scanner.flush()?;

        let quoted = self.scanner.context().state() == State::BeforeValue;

        if quoted {
            self.write_literal("\"")?;
            self.scanner.flush()?;
        }

        let starts_attr_name = matches!(
            self.scanner.context().state(),
            State::Tag | State::AfterName
        );

        let context = self.scanner.context().nudge();

        let (c, pipeline) = match select_filters(&context, content_type(values)) {
            Ok(selected) => selected,
            Err(err) => {
                log::warn!("escaping context poisoned: {err}");

                self.scanner
                    .set_context(Context::error(err.kind(), err.description()));

                return Err(err.into());
            }
        };

        let text = pipeline.apply(values);

        self.scanner.set_context(c);
        self.write_literal(&text)?;

        if starts_attr_name {
            self.classify_attr_name(&text)?;
        }

        if quoted {
            self.write_literal("\"")?;
        }

        Ok(())
    }

    // NOTE: an attribute name that is entirely a value is the value's name, not a composite.
    fn classify_attr_name(&mut self, name: &str) -> Result<(), EscapeError> {
        self.scanner.flush()?;

        let context = self.scanner.context();

        if context.state() == State::AttrName && context.attr() == AttrKind::Composite {
            let mut c = context.clone();

            c.attr = attr_kind(&name.to_ascii_lowercase());
            self.scanner.set_context(c);
        }

        Ok(())
    }

    /// Writes a list of literals and values.
    ///
    /// Strings alternate between literal HTML and values, starting with literal HTML. Other
    /// values are written as values and are not counted in the alternation. A nested list
    /// alternates on its own, starting with literal HTML, and doesn't affect the alternation
    /// of the list it is in.
    ///
    /// ```
    /// use html_autoescape::Escaper;
    ///
    /// let mut escaper = Escaper::new(Vec::new());
    ///
    /// escaper
    ///     .print(&["<p>".into(), "a<b".into(), "</p>".into()])
    ///     .unwrap();
    ///
    /// assert_eq!(escaper.into_inner(), b"<p>a&lt;b</p>");
    /// ```
    pub fn print(&mut self, items: &[Item<'_>]) -> Result<(), EscapeError> {
        let mut is_value = false;

        for item in items {
            match *item {
                Item::Str(s) => {
                    if is_value {
                        self.write_value(s)?;
                    } else {
                        self.write_literal(s)?;
                    }

                    is_value = !is_value;
                }
                Item::Value(value) => self.write_values(&[value])?,
                Item::List(items) => self.print(items)?,
            }
        }

        Ok(())
    }

    /// Writes bytes to the output sink, bypassing the escaper.
    ///
    /// The context isn't advanced over the bytes, so they must leave the document in the
    /// context they were written in, e.g. be text that has been escaped for that context by
    /// other means. It's the caller's responsibility not to write anything into a stream in
    /// the error state.
    pub fn write_raw(&mut self, bytes: &[u8]) -> Result<(), EscapeError> {
        trace!(@write "raw", String::from_utf8_lossy(bytes));

        self.output.write_all(bytes)?;

        Ok(())
    }

    #[inline]
    pub fn get_ref(&self) -> &W {
        &self.output
    }

    #[inline]
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.output
    }

    #[inline]
    pub fn into_inner(self) -> W {
        self.output
    }
}

/// Bypasses the escaper like [`Escaper::write_raw`], for libraries that render into a
/// [`Write`].
impl<W: Write> Write for Escaper<W> {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.output.write(buf)
    }

    #[inline]
    fn flush(&mut self) -> io::Result<()> {
        self.output.flush()
    }
}

impl<W: Write> Debug for Escaper<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Escaper")
            .field("context", self.scanner.context())
            .field("blocked_bytes", &self.scanner.blocked_bytes())
            .finish()
    }
}
