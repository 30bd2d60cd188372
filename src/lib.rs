//! ***html_autoescape*** writes HTML with contextual auto-escaping.
//!
//! Literal HTML and values are written to an [`Escaper`] in any order and in chunks of any
//! size. The escaper tracks where in the document the output is (in text, in a URL attribute,
//! in a JS string inside an event handler...) and escapes each value for that position.
//! Markup that can't be tracked unambiguously puts the stream into a permanent error state
//! instead of guessing.
//!
//! ```
//! use html_autoescape::content::Url;
//! use html_autoescape::Escaper;
//!
//! let mut escaper = Escaper::new(Vec::new());
//!
//! escaper.write_literal(r#"<a href=""#).unwrap();
//! escaper.write_value(Url("/search")).unwrap();
//! escaper.write_literal("?q=").unwrap();
//! escaper.write_value("fish & chips").unwrap();
//! escaper.write_literal(r#"" onclick="alert("#).unwrap();
//! escaper.write_value("it's").unwrap();
//! escaper.write_literal(r#")">"#).unwrap();
//!
//! assert_eq!(
//!     String::from_utf8(escaper.into_inner()).unwrap(),
//!     r#"<a href="/search?q=fish%20%26%20chips" onclick="alert(&#34;it&#39;s&#34;)">"#
//! );
//! ```

#[macro_use]
mod debug_trace;

mod base;
mod context;
mod errors;
mod escaper;
mod filters;
mod html;
mod scanner;

pub mod content;

use cfg_if::cfg_if;

pub use self::base::Chunk;
pub use self::content::{ContentType, Value, ValueKind};
pub use self::context::{AttrKind, Context, Delim, Element, JsCtx, State, UrlPart};
pub use self::errors::{ContextError, ErrorKind, EscapeError};
pub use self::escaper::{Escaper, Item, MemorySettings, Settings};
pub use self::filters::{select_filters, Filter, Pipeline, FAILSAFE};
pub use self::scanner::{advance, Scanner, Step};

cfg_if! {
    if #[cfg(feature = "http")] {
        pub mod http;

        pub use self::http::{for_http, CompressionSettings, ContentEncoding};
    }
}
