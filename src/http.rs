//! HTML responses compressed as the client accepts.
//!
//! [`for_http`] sets the `Content-Type` of a response to HTML, negotiates a `Content-Encoding`
//! from the `Accept-Encoding` header of the request and returns an [`Escaper`] that writes
//! the compressed body. The escaper must be [finished](Escaper::finish) on every path that
//! completes the response, otherwise the compressed stream is truncated.

use crate::escaper::{Escaper, Settings};
use brotli::CompressorWriter;
use flate2::write::{GzEncoder, ZlibEncoder};
use flate2::Compression;
use http::header::{HeaderMap, HeaderValue, ACCEPT_ENCODING, CONTENT_ENCODING, CONTENT_TYPE};
use std::io::{self, Write};

/// A content coding of a response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentEncoding {
    Brotli,
    Gzip,
    /// The zlib format, as `deflate` is defined for HTTP.
    Deflate,
    Identity,
}

impl ContentEncoding {
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ContentEncoding::Brotli => "br",
            ContentEncoding::Gzip => "gzip",
            ContentEncoding::Deflate => "deflate",
            ContentEncoding::Identity => "identity",
        }
    }
}

/// The encodings [`for_http`] offers, most preferred first.
pub const OFFERED_ENCODINGS: [ContentEncoding; 3] = [
    ContentEncoding::Brotli,
    ContentEncoding::Gzip,
    ContentEncoding::Deflate,
];

const BROTLI_BUFFER_SIZE: usize = 4096;
const BROTLI_WINDOW_BITS: u32 = 22;

/// Specifies how response bodies are compressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionSettings {
    /// Brotli quality, from `0` (fastest) to `11` (best).
    ///
    /// ### Default
    ///
    /// `5`.
    pub brotli_quality: u32,

    /// Gzip and deflate compression level, from `0` (none) to `9` (best).
    ///
    /// ### Default
    ///
    /// `5`.
    pub level: u32,
}

impl Default for CompressionSettings {
    #[inline]
    fn default() -> Self {
        CompressionSettings {
            brotli_quality: 5,
            level: 5,
        }
    }
}

fn accepted_encodings(headers: &HeaderMap) -> Vec<(&str, f32)> {
    let mut accepted = Vec::new();

    for value in headers.get_all(ACCEPT_ENCODING) {
        let Ok(value) = value.to_str() else {
            continue;
        };

        for coding in value.split(',') {
            let mut params = coding.split(';');
            let name = params.next().unwrap_or_default().trim();

            if name.is_empty() {
                continue;
            }

            let mut q = 1.0;

            for param in params {
                if let Some((key, value)) = param.split_once('=') {
                    if key.trim().eq_ignore_ascii_case("q") {
                        // NOTE: a malformed weight excludes the coding.
                        q = value.trim().parse().unwrap_or(0.0);
                    }
                }
            }

            accepted.push((name, q));
        }
    }

    accepted
}

/// Picks the offer with the highest weight in the `Accept-Encoding` headers.
///
/// Offers that are not listed get the weight of `*`, if it is listed. Offers with weight `0`
/// are never picked, ties go to the earlier offer. Returns [`ContentEncoding::Identity`] if
/// no offer is acceptable.
#[must_use]
pub fn negotiate_content_encoding(
    request_headers: &HeaderMap,
    offers: &[ContentEncoding],
) -> ContentEncoding {
    let accepted = accepted_encodings(request_headers);
    let mut best = (ContentEncoding::Identity, 0.0);

    for &offer in offers {
        let weight = accepted
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(offer.as_str()))
            .or_else(|| accepted.iter().find(|(name, _)| *name == "*"))
            .map_or(0.0, |&(_, q)| q);

        if weight > best.1 {
            best = (offer, weight);
        }
    }

    best.0
}

/// A response body sink that compresses everything written to it.
pub enum CompressedBody<W: Write> {
    Identity(W),
    Brotli(CompressorWriter<W>),
    Gzip(GzEncoder<W>),
    Deflate(ZlibEncoder<W>),
}

impl<W: Write> CompressedBody<W> {
    pub fn new(output: W, encoding: ContentEncoding, settings: &CompressionSettings) -> Self {
        let level = Compression::new(settings.level);

        match encoding {
            ContentEncoding::Brotli => CompressedBody::Brotli(CompressorWriter::new(
                output,
                BROTLI_BUFFER_SIZE,
                settings.brotli_quality.min(11),
                BROTLI_WINDOW_BITS,
            )),
            ContentEncoding::Gzip => CompressedBody::Gzip(GzEncoder::new(output, level)),
            ContentEncoding::Deflate => CompressedBody::Deflate(ZlibEncoder::new(output, level)),
            ContentEncoding::Identity => CompressedBody::Identity(output),
        }
    }

    #[inline]
    pub fn encoding(&self) -> ContentEncoding {
        match self {
            CompressedBody::Identity(_) => ContentEncoding::Identity,
            CompressedBody::Brotli(_) => ContentEncoding::Brotli,
            CompressedBody::Gzip(_) => ContentEncoding::Gzip,
            CompressedBody::Deflate(_) => ContentEncoding::Deflate,
        }
    }

    /// Writes the end of the compressed stream and returns the underlying sink.
    pub fn finish(self) -> io::Result<W> {
        match self {
            CompressedBody::Identity(mut output) => {
                output.flush()?;

                Ok(output)
            }
            // NOTE: `into_inner` writes the end of the stream but drops its errors, the flush
            // before it surfaces those of the sink.
            CompressedBody::Brotli(mut encoder) => {
                encoder.flush()?;

                Ok(encoder.into_inner())
            }
            CompressedBody::Gzip(encoder) => encoder.finish(),
            CompressedBody::Deflate(encoder) => encoder.finish(),
        }
    }
}

impl<W: Write> Write for CompressedBody<W> {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            CompressedBody::Identity(output) => output.write(buf),
            CompressedBody::Brotli(encoder) => encoder.write(buf),
            CompressedBody::Gzip(encoder) => encoder.write(buf),
            CompressedBody::Deflate(encoder) => encoder.write(buf),
        }
    }

    #[inline]
    fn flush(&mut self) -> io::Result<()> {
        match self {
            CompressedBody::Identity(output) => output.flush(),
            CompressedBody::Brotli(encoder) => encoder.flush(),
            CompressedBody::Gzip(encoder) => encoder.flush(),
            CompressedBody::Deflate(encoder) => encoder.flush(),
        }
    }
}

fn html_content_type() -> HeaderValue {
    HeaderValue::from_str(mime::TEXT_HTML_UTF_8.as_ref())
        .unwrap_or_else(|_| HeaderValue::from_static("text/html; charset=utf-8"))
}

/// Returns an escaper for the body of an HTML response, with the default settings.
///
/// See [`for_http_with_settings`].
#[inline]
pub fn for_http<W: Write>(
    request_headers: &HeaderMap,
    response_headers: &mut HeaderMap,
    body: W,
) -> Escaper<CompressedBody<W>> {
    for_http_with_settings(
        request_headers,
        response_headers,
        body,
        &Settings::default(),
        &CompressionSettings::default(),
    )
}

/// Returns an escaper for the body of an HTML response.
///
/// Sets `Content-Type: text/html; charset=utf-8` in the `response_headers`. Unless they
/// already have a `Content-Encoding`, negotiates one of the [`OFFERED_ENCODINGS`] from the
/// `request_headers` and sets it as the `Content-Encoding`.
pub fn for_http_with_settings<W: Write>(
    request_headers: &HeaderMap,
    response_headers: &mut HeaderMap,
    body: W,
    settings: &Settings,
    compression_settings: &CompressionSettings,
) -> Escaper<CompressedBody<W>> {
    response_headers.insert(CONTENT_TYPE, html_content_type());

    let encoding = if response_headers.contains_key(CONTENT_ENCODING) {
        ContentEncoding::Identity
    } else {
        negotiate_content_encoding(request_headers, &OFFERED_ENCODINGS)
    };

    if encoding != ContentEncoding::Identity {
        response_headers.insert(
            CONTENT_ENCODING,
            HeaderValue::from_static(encoding.as_str()),
        );
    }

    log::debug!(
        "writing HTML response body with {} encoding",
        encoding.as_str()
    );

    Escaper::with_settings(
        CompressedBody::new(body, encoding, compression_settings),
        settings,
    )
}

impl<W: Write> Escaper<CompressedBody<W>> {
    /// Writes the end of the compressed body and returns the underlying sink.
    #[inline]
    pub fn finish(self) -> io::Result<W> {
        self.into_inner().finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brotli::Decompressor;
    use flate2::read::{GzDecoder, ZlibDecoder};
    use std::io::Read;

    fn request(accept_encoding: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();

        headers.insert(
            ACCEPT_ENCODING,
            HeaderValue::from_str(accept_encoding).unwrap(),
        );

        headers
    }

    #[test]
    fn negotiation() {
        use ContentEncoding::*;

        let cases = [
            ("gzip", Gzip),
            ("gzip, deflate", Gzip),
            ("deflate, gzip", Gzip),
            ("gzip, deflate, br", Brotli),
            ("br;q=0.8, gzip", Gzip),
            ("deflate", Deflate),
            ("GZIP", Gzip),
            ("deflate;q=1.0, gzip;q=0.5", Deflate),
            ("gzip;q=0.5,deflate;q=0.5", Gzip),
            ("*", Brotli),
            ("br;q=0, *", Gzip),
            ("br;q=0, gzip;q=0, *;q=0.1", Deflate),
            ("*;q=0", Identity),
            ("br", Brotli),
            ("zstd", Identity),
            ("gzip;q=x", Identity),
            ("", Identity),
            ("identity", Identity),
        ];

        for (accept_encoding, expected) in cases {
            assert_eq!(
                negotiate_content_encoding(&request(accept_encoding), &OFFERED_ENCODINGS),
                expected,
                "{accept_encoding:?}"
            );
        }

        assert_eq!(
            negotiate_content_encoding(&HeaderMap::new(), &OFFERED_ENCODINGS),
            Identity
        );
        assert_eq!(
            negotiate_content_encoding(&request("gzip, deflate"), &[Deflate, Gzip]),
            Deflate
        );
    }

    fn render(escaper: &mut Escaper<CompressedBody<Vec<u8>>>) {
        escaper.write_literal("<p>").unwrap();
        escaper.write_value("a<b").unwrap();
        escaper.write_literal("</p>").unwrap();
    }

    #[test]
    fn gzip_response() {
        let mut response_headers = HeaderMap::new();
        let mut escaper = for_http(&request("gzip"), &mut response_headers, Vec::new());

        render(&mut escaper);

        let body = escaper.finish().unwrap();
        let mut html = String::new();

        GzDecoder::new(body.as_slice())
            .read_to_string(&mut html)
            .unwrap();

        assert_eq!(html, "<p>a&lt;b</p>");
        assert_eq!(response_headers[CONTENT_ENCODING], "gzip");
        assert_eq!(response_headers[CONTENT_TYPE], "text/html; charset=utf-8");
    }

    #[test]
    fn brotli_response() {
        let mut response_headers = HeaderMap::new();
        let mut escaper = for_http(&request("gzip, br"), &mut response_headers, Vec::new());

        render(&mut escaper);

        assert_eq!(escaper.get_ref().encoding(), ContentEncoding::Brotli);

        let body = escaper.finish().unwrap();
        let mut html = String::new();

        Decompressor::new(body.as_slice(), 4096)
            .read_to_string(&mut html)
            .unwrap();

        assert_eq!(html, "<p>a&lt;b</p>");
        assert_eq!(response_headers[CONTENT_ENCODING], "br");
    }

    #[test]
    fn deflate_response() {
        let mut response_headers = HeaderMap::new();
        let mut escaper = for_http_with_settings(
            &request("deflate"),
            &mut response_headers,
            Vec::new(),
            &Settings::default(),
            &CompressionSettings {
                level: 9,
                ..CompressionSettings::default()
            },
        );

        render(&mut escaper);

        let body = escaper.finish().unwrap();
        let mut html = String::new();

        ZlibDecoder::new(body.as_slice())
            .read_to_string(&mut html)
            .unwrap();

        assert_eq!(html, "<p>a&lt;b</p>");
        assert_eq!(response_headers[CONTENT_ENCODING], "deflate");
    }

    #[test]
    fn identity_response() {
        let mut response_headers = HeaderMap::new();
        let mut escaper = for_http(&HeaderMap::new(), &mut response_headers, Vec::new());

        render(&mut escaper);

        assert_eq!(escaper.get_ref().encoding(), ContentEncoding::Identity);
        assert_eq!(escaper.finish().unwrap(), b"<p>a&lt;b</p>");
        assert!(!response_headers.contains_key(CONTENT_ENCODING));
        assert_eq!(response_headers[CONTENT_TYPE], "text/html; charset=utf-8");
    }

    #[test]
    fn preset_content_encoding_is_kept() {
        let mut response_headers = HeaderMap::new();

        response_headers.insert(CONTENT_ENCODING, HeaderValue::from_static("br"));

        let mut escaper = for_http(&request("gzip"), &mut response_headers, Vec::new());

        render(&mut escaper);

        assert_eq!(escaper.finish().unwrap(), b"<p>a&lt;b</p>");
        assert_eq!(response_headers[CONTENT_ENCODING], "br");
    }
}
