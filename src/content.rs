//! Values and their trust tags.
//!
//! Anything written with [`Escaper::write_value`] implements [`Value`]. Plain strings, numbers
//! and the like are untrusted and are escaped for the context they land in. Text wrapped in one
//! of the marker types ([`Html`], [`Css`], [`HtmlAttr`], [`Js`], [`JsStr`], [`Url`]) is trusted
//! to be safe in the matching context and passes through the escaper there. The marker is the
//! only source of trust: the content of a value is never inspected to infer it.
//!
//! [`Escaper::write_value`]: crate::Escaper::write_value

use std::borrow::Cow;
use std::error::Error;
use std::fmt::{self, Display};
use std::rc::Rc;
use std::sync::Arc;

/// The trust tag of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ContentType {
    /// Untrusted text.
    #[default]
    Plain,
    /// A CSS stylesheet, rule, declaration or property value.
    Css,
    /// A document fragment: markup with balanced tags and no unsafe scripts.
    Html,
    /// Attribute-name/value pairs, e.g. `dir="ltr"`.
    HtmlAttr,
    /// A JS expression.
    Js,
    /// A sequence of characters that can be embedded between JS string quotes.
    JsStr,
    /// A URL or a part of one.
    Url,
}

/// What a value turns out to be, once asked.
///
/// Reference-like values answer with [`ValueKind::Ref`] and are followed until something else
/// comes up. Values with their own textual representation stop the reduction with
/// [`ValueKind::Display`] or [`ValueKind::Error`].
#[derive(Clone)]
pub enum ValueKind<'v> {
    Ref(&'v dyn Value),
    Str(&'v str),
    Trusted(ContentType, &'v str),
    Number(serde_json::Number),
    Bool(bool),
    Null,
    Json(&'v serde_json::Value),
    Display(&'v dyn Display),
    Error(&'v dyn Error),
}

impl fmt::Debug for ValueKind<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Ref(_) => f.write_str("Ref(..)"),
            ValueKind::Str(s) => f.debug_tuple("Str").field(s).finish(),
            ValueKind::Trusted(ty, s) => f.debug_tuple("Trusted").field(ty).field(s).finish(),
            ValueKind::Number(n) => f.debug_tuple("Number").field(n).finish(),
            ValueKind::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            ValueKind::Null => f.write_str("Null"),
            ValueKind::Json(v) => f.debug_tuple("Json").field(v).finish(),
            ValueKind::Display(d) => f.debug_tuple("Display").field(&d.to_string()).finish(),
            ValueKind::Error(e) => f.debug_tuple("Error").field(&e.to_string()).finish(),
        }
    }
}

/// A value that can be written into an HTML stream.
///
/// Implement it for your own types by returning [`ValueKind::Display`] (or
/// [`ValueKind::Error`]) to have the value formatted, or [`ValueKind::Ref`] to have another
/// value stand in for it.
pub trait Value {
    fn kind(&self) -> ValueKind<'_>;
}

/// Follows [`ValueKind::Ref`] indirections down to the value they point at.
pub fn resolve(mut value: &dyn Value) -> ValueKind<'_> {
    loop {
        match value.kind() {
            ValueKind::Ref(inner) => value = inner,
            kind => return kind,
        }
    }
}

/// The trust tag of the text [`stringify`] produces for the values.
#[must_use]
pub fn content_type(values: &[&dyn Value]) -> ContentType {
    match values {
        [value] => match resolve(*value) {
            ValueKind::Trusted(ty, _) => ty,
            _ => ContentType::Plain,
        },
        _ => ContentType::Plain,
    }
}

fn push_text(text: &mut String, kind: &ValueKind<'_>) {
    use std::fmt::Write;

    // NOTE: writing into a `String` can't fail.
    let _ = match kind {
        ValueKind::Str(s) | ValueKind::Trusted(_, s) => {
            text.push_str(s);
            Ok(())
        }
        ValueKind::Json(serde_json::Value::String(s)) => {
            text.push_str(s);
            Ok(())
        }
        ValueKind::Json(serde_json::Value::Null) | ValueKind::Null | ValueKind::Ref(_) => Ok(()),
        ValueKind::Json(v) => write!(text, "{v}"),
        ValueKind::Number(n) => write!(text, "{n}"),
        ValueKind::Bool(b) => write!(text, "{b}"),
        ValueKind::Display(d) => write!(text, "{d}"),
        ValueKind::Error(e) => write!(text, "{e}"),
    };
}

/// Converts values to text and determines its trust tag.
///
/// A single value keeps its trust tag. Several values are untrusted: their textual
/// representations are concatenated without a separator.
pub fn stringify<'v>(values: &[&'v dyn Value]) -> (Cow<'v, str>, ContentType) {
    if let [value] = values {
        match resolve(*value) {
            ValueKind::Str(s) => return (Cow::Borrowed(s), ContentType::Plain),
            ValueKind::Trusted(ty, s) => return (Cow::Borrowed(s), ty),
            kind => {
                let mut text = String::new();

                push_text(&mut text, &kind);

                return (Cow::Owned(text), ContentType::Plain);
            }
        }
    }

    let mut text = String::new();

    for value in values {
        push_text(&mut text, &resolve(*value));
    }

    (Cow::Owned(text), ContentType::Plain)
}

macro_rules! declare_markers {
    ($($(#[$meta:meta])* $name:ident,)+) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
            pub struct $name<S = String>(pub S);

            impl<S: AsRef<str>> $name<S> {
                #[inline]
                pub fn as_str(&self) -> &str {
                    self.0.as_ref()
                }
            }

            impl<S: AsRef<str>> Value for $name<S> {
                #[inline]
                fn kind(&self) -> ValueKind<'_> {
                    ValueKind::Trusted(ContentType::$name, self.0.as_ref())
                }
            }

            impl<S: AsRef<str>> Display for $name<S> {
                #[inline]
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }
        )+
    };
}

declare_markers! {
    /// Trusted CSS: a stylesheet, a rule, a declaration or a property value.
    ///
    /// It must not contain unbalanced quotes or comments, or end inside an escape.
    Css,
    /// Trusted HTML: a document fragment from a trusted source.
    ///
    /// In attribute values its tags are stripped and the remaining text is escaped.
    Html,
    /// Trusted attributes, e.g. `dir="ltr"`, written in attribute name position.
    HtmlAttr,
    /// A trusted JS expression, e.g. `(x + y * z())`.
    Js,
    /// A trusted sequence of characters that can appear between quotes in a JS string.
    JsStr,
    /// A trusted URL, e.g. `javascript:checkThatFormNotEditedBeforeLeavingPage()`.
    ///
    /// The URL filter doesn't reject its scheme, but it is still normalized.
    Url,
}

/// Wraps a [`Display`] value so it can be written with its formatted representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Text<T>(pub T);

impl<T: Display> Value for Text<T> {
    #[inline]
    fn kind(&self) -> ValueKind<'_> {
        ValueKind::Display(&self.0)
    }
}

impl Value for str {
    #[inline]
    fn kind(&self) -> ValueKind<'_> {
        ValueKind::Str(self)
    }
}

impl Value for String {
    #[inline]
    fn kind(&self) -> ValueKind<'_> {
        ValueKind::Str(self)
    }
}

impl Value for Cow<'_, str> {
    #[inline]
    fn kind(&self) -> ValueKind<'_> {
        ValueKind::Str(self)
    }
}

impl Value for char {
    #[inline]
    fn kind(&self) -> ValueKind<'_> {
        ValueKind::Display(self)
    }
}

impl Value for bool {
    #[inline]
    fn kind(&self) -> ValueKind<'_> {
        ValueKind::Bool(*self)
    }
}

impl Value for serde_json::Value {
    #[inline]
    fn kind(&self) -> ValueKind<'_> {
        ValueKind::Json(self)
    }
}

impl<T: Value> Value for Option<T> {
    #[inline]
    fn kind(&self) -> ValueKind<'_> {
        match self {
            Some(value) => ValueKind::Ref(value),
            None => ValueKind::Null,
        }
    }
}

impl<'e> Value for dyn Error + 'e {
    #[inline]
    fn kind(&self) -> ValueKind<'_> {
        ValueKind::Error(self)
    }
}

impl<'e> Value for dyn Error + Send + Sync + 'e {
    #[inline]
    fn kind(&self) -> ValueKind<'_> {
        ValueKind::Error(self)
    }
}

impl Value for std::io::Error {
    #[inline]
    fn kind(&self) -> ValueKind<'_> {
        ValueKind::Error(self)
    }
}

macro_rules! impl_value_for_pointers {
    ($($ptr:ty),+) => {
        $(
            impl<T: Value + ?Sized> Value for $ptr {
                #[inline]
                fn kind(&self) -> ValueKind<'_> {
                    (**self).kind()
                }
            }
        )+
    };
}

impl_value_for_pointers!(&T, &mut T, Box<T>, Rc<T>, Arc<T>);

macro_rules! impl_value_for_integers {
    ($($ty:ty),+) => {
        $(
            impl Value for $ty {
                #[inline]
                fn kind(&self) -> ValueKind<'_> {
                    ValueKind::Number((*self).into())
                }
            }
        )+
    };
}

impl_value_for_integers!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

macro_rules! impl_value_for_floats {
    ($($ty:ty),+) => {
        $(
            impl Value for $ty {
                #[inline]
                fn kind(&self) -> ValueKind<'_> {
                    // NOTE: NaN and infinities have no JSON representation.
                    // NOTE: widened through the shortest decimal form, so `0.1f32` stays `0.1`.
                    let shortest = self.to_string().parse::<f64>().unwrap_or(f64::NAN);

                    match serde_json::Number::from_f64(shortest) {
                        Some(n) => ValueKind::Number(n),
                        None => ValueKind::Display(self),
                    }
                }
            }
        )+
    };
}

impl_value_for_floats!(f32, f64);
