//! Charset detection and tolerant decoding.
//!
//! Plenty of sites serve windows-1252 or ISO-8859 bytes behind a UTF-8
//! label (or no label at all). The strategies that rescue such pages need
//! to know both what encoding was guessed and how confident the guess is.

use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};

/// Where the encoding guess came from, in decreasing order of trust.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingSource {
    /// Byte-order mark at the start of the body
    Bom,
    /// charset parameter in the Content-Type header
    ContentType,
    /// `<meta charset>` or http-equiv declaration in the document head
    MetaTag,
    /// Body validated as UTF-8
    Utf8Valid,
    /// Nothing matched; windows-1252 covers most legacy western pages
    Fallback,
}

/// An encoding guess with its provenance.
#[derive(Debug, Clone, Copy)]
pub struct DetectedEncoding {
    pub encoding: &'static Encoding,
    pub confidence: f32,
    pub source: EncodingSource,
}

/// Guess the encoding of a page body.
pub fn detect_encoding(bytes: &[u8], content_type: Option<&str>) -> DetectedEncoding {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return DetectedEncoding {
            encoding,
            confidence: 1.0,
            source: EncodingSource::Bom,
        };
    }

    if let Some(encoding) = content_type.and_then(charset_from_content_type) {
        return DetectedEncoding {
            encoding,
            confidence: 0.9,
            source: EncodingSource::ContentType,
        };
    }

    if let Some(encoding) = charset_from_meta(bytes) {
        return DetectedEncoding {
            encoding,
            confidence: 0.8,
            source: EncodingSource::MetaTag,
        };
    }

    if std::str::from_utf8(bytes).is_ok() {
        return DetectedEncoding {
            encoding: UTF_8,
            confidence: 0.7,
            source: EncodingSource::Utf8Valid,
        };
    }

    DetectedEncoding {
        encoding: WINDOWS_1252,
        confidence: 0.5,
        source: EncodingSource::Fallback,
    }
}

/// Decode a body, trying the detected encoding first and falling back to
/// whichever candidate produces the fewest replacement characters.
pub fn decode_with_fallbacks(bytes: &[u8], content_type: Option<&str>) -> (String, DetectedEncoding) {
    let detected = detect_encoding(bytes, content_type);

    let mut candidates = vec![detected.encoding];
    for fallback in [UTF_8, WINDOWS_1252] {
        if !candidates.contains(&fallback) {
            candidates.push(fallback);
        }
    }

    let mut best: Option<(String, usize)> = None;
    for encoding in candidates {
        let (text, _, had_errors) = encoding.decode(bytes);
        let replacements = if had_errors {
            text.matches('\u{FFFD}').count()
        } else {
            0
        };
        if replacements == 0 {
            return (text.into_owned(), detected);
        }
        if best.as_ref().map_or(true, |(_, n)| replacements < *n) {
            best = Some((text.into_owned(), replacements));
        }
    }

    // Unreachable in practice: windows-1252 maps every byte.
    let text = best.map(|(t, _)| t).unwrap_or_default();
    (text, detected)
}

fn charset_from_content_type(content_type: &str) -> Option<&'static Encoding> {
    let lower = content_type.to_ascii_lowercase();
    let idx = lower.find("charset=")?;
    let value = lower[idx + "charset=".len()..]
        .trim_start_matches(['"', '\''])
        .split([';', '"', '\'', ' '])
        .next()?;
    Encoding::for_label(value.trim().as_bytes())
}

fn charset_from_meta(bytes: &[u8]) -> Option<&'static Encoding> {
    // Charset declarations are required to appear early; 1KiB is plenty.
    let head = &bytes[..bytes.len().min(1024)];
    let text = String::from_utf8_lossy(head).to_ascii_lowercase();

    for marker in ["charset=\"", "charset='", "charset="] {
        if let Some(idx) = text.find(marker) {
            let rest = &text[idx + marker.len()..];
            let value: String = rest
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
                .collect();
            if let Some(encoding) = Encoding::for_label(value.as_bytes()) {
                return Some(encoding);
            }
        }
    }
    None
}
