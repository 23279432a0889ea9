use base64::{engine::general_purpose, Engine as _};
use encoding_rs::Encoding;
use nom::{
    bytes::complete::{tag, take_while, take_while1},
    character::complete::one_of,
    combinator::opt,
    sequence::{delimited, tuple},
    IResult,
};

use crate::mime::charset::EmailCharset;
use crate::text::whitespace::cfws;
use crate::text::words::is_token_char;

/// RFC 2047 encoded words: `=?charset?Q|B?payload?=`.
///
/// The charset label and the Q/B indicator are matched case-insensitively.
/// Decoding is lenient: a malformed payload decodes to as much as it can,
/// and an unknown charset falls back to windows-1252 like most readers do.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordEncoding {
    Q,
    B,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedWord {
    /// Charset label as it appeared on the wire.
    pub charset: String,
    pub encoding: WordEncoding,
    pub payload: String,
}

impl EncodedWord {
    pub fn decode(&self) -> String {
        let enc = Encoding::for_label(self.charset.as_bytes()).unwrap_or(encoding_rs::WINDOWS_1252);
        let bytes = match self.encoding {
            WordEncoding::Q => q_decode_bytes(&self.payload),
            WordEncoding::B => {
                let payload = self.payload.trim_end_matches('=');
                general_purpose::STANDARD_NO_PAD
                    .decode(payload)
                    .unwrap_or_default()
            }
        };
        enc.decode_without_bom_handling(&bytes).0.into_owned()
    }

    /// Reassemble the wire form of this word.
    pub fn to_wire(&self) -> String {
        let indicator = match self.encoding {
            WordEncoding::Q => 'Q',
            WordEncoding::B => 'B',
        };
        format!("=?{}?{}?{}?=", self.charset, indicator, self.payload)
    }
}

/// `[CFWS] encoded-word [CFWS]`
pub fn encoded_word(input: &str) -> IResult<&str, EncodedWord> {
    delimited(opt(cfws), encoded_word_plain, opt(cfws))(input)
}

/// A single encoded word, no surrounding CFWS.
///
/// An empty payload (`=?UTF-8?Q??=`) is accepted and decodes to the empty
/// string.
pub fn encoded_word_plain(input: &str) -> IResult<&str, EncodedWord> {
    let (rest, (_, charset, _, indicator, _, payload, _)) = tuple((
        tag("=?"),
        take_while1(|c: char| is_token_char(c) && c != '?'),
        tag("?"),
        one_of("QqBb"),
        tag("?"),
        take_while(|c: char| c != '?' && c != ' ' && c != '\t'),
        tag("?="),
    ))(input)?;

    let encoding = match indicator {
        'Q' | 'q' => WordEncoding::Q,
        _ => WordEncoding::B,
    };
    Ok((
        rest,
        EncodedWord {
            charset: charset.to_string(),
            encoding,
            payload: payload.to_string(),
        },
    ))
}

/// RFC 2047 section 4.2: `_` means space, `=XX` is a hex octet, everything
/// else stands for itself. Stray `=` without two hex digits is kept as-is.
fn q_decode_bytes(payload: &str) -> Vec<u8> {
    let bytes = payload.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'_' => {
                out.push(b' ');
                i += 1;
            }
            b'=' if i + 3 <= bytes.len() => {
                match hex_octet(bytes[i + 1], bytes[i + 2]) {
                    Some(b) => {
                        out.push(b);
                        i += 3;
                    }
                    None => {
                        out.push(b'=');
                        i += 1;
                    }
                }
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    out
}

fn hex_octet(hi: u8, lo: u8) -> Option<u8> {
    let hi = (hi as char).to_digit(16)?;
    let lo = (lo as char).to_digit(16)?;
    Some((hi * 16 + lo) as u8)
}

/// Decode every encoded word in `input`, passing plain text through.
///
/// Folding whitespace between two adjacent encoded words is removed
/// (RFC 2047 §2); whitespace between an encoded word and plain text is
/// kept.
pub fn decode_rfc2047(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    let mut pending_ws = "";
    let mut last_was_encoded = false;

    while !rest.is_empty() {
        if rest.starts_with("=?") {
            if let Ok((next, word)) = encoded_word_plain(rest) {
                if !last_was_encoded {
                    out.push_str(pending_ws);
                }
                pending_ws = "";
                out.push_str(&word.decode());
                rest = next;
                last_was_encoded = true;
                continue;
            }
        }

        if rest.starts_with([' ', '\t', '\r', '\n']) {
            let end = rest
                .find(|c| !matches!(c, ' ' | '\t' | '\r' | '\n'))
                .unwrap_or(rest.len());
            pending_ws = &rest[..end];
            rest = &rest[end..];
            continue;
        }

        let mut end = rest.len();
        if let Some(i) = rest.find(|c: char| c.is_ascii_whitespace()) {
            end = end.min(i);
        }
        match rest.find("=?") {
            // an unparseable "=?" marker: emit it literally and move on
            Some(0) => end = end.min(2),
            Some(i) => end = end.min(i),
            None => {}
        }
        out.push_str(pending_ws);
        pending_ws = "";
        out.push_str(&rest[..end]);
        rest = &rest[end..];
        last_was_encoded = false;
    }
    out.push_str(pending_ws);
    out
}

// --- encoding

/// Longest permitted encoded word, envelope included (RFC 2047 §2).
const MAX_ENCODED_WORD: usize = 76;

fn is_q_safe(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!*+-/".contains(&b)
}

/// Encode `s` as a single Q encoded word in the given charset.
pub fn q_encode(s: &str, charset: EmailCharset) -> String {
    let mut payload = String::new();
    for b in charset.encode(s) {
        match b {
            b' ' => payload.push('_'),
            b if is_q_safe(b) => payload.push(b as char),
            b => payload.push_str(&format!("={:02X}", b)),
        }
    }
    format!("=?{}?Q?{}?=", charset.as_str(), payload)
}

/// Encode `s` as one or more B encoded words in the given charset,
/// each fitting in 76 columns, joined by a fold (`CRLF SP`).
pub fn b_encode(s: &str, charset: EmailCharset) -> String {
    b_encode_words(s, charset).join("\r\n ")
}

/// The individual words of `b_encode`, for callers doing their own folding.
pub fn b_encode_words(s: &str, charset: EmailCharset) -> Vec<String> {
    // The input is chunked so that every word, envelope included, fits in
    // MAX_ENCODED_WORD columns: base64 grows 3 bytes into 4 characters.
    let envelope = charset.as_str().len() + "=??B??=".len();
    let max_bytes = (MAX_ENCODED_WORD - envelope) / 4 * 3;

    let mut chunks: Vec<String> = Vec::new();
    let mut chunk = String::new();
    for c in s.chars() {
        let mut candidate = chunk.clone();
        candidate.push(c);
        if charset.encode(&candidate).len() > max_bytes && !chunk.is_empty() {
            chunks.push(chunk);
            chunk = c.to_string();
        } else {
            chunk = candidate;
        }
    }
    if !chunk.is_empty() || chunks.is_empty() {
        chunks.push(chunk);
    }

    chunks
        .into_iter()
        .map(|c| {
            format!(
                "=?{}?B?{}?=",
                charset.as_str(),
                general_purpose::STANDARD.encode(charset.encode(&c)),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_word() {
        assert_eq!(
            encoded_word("=?iso8859-1?Q?Accus=E9_de_r=E9ception_(affich=E9)?=")
                .unwrap()
                .1
                .decode(),
            "Accusé de réception (affiché)".to_string(),
        );
    }

    #[test]
    fn test_decode_word_b64() {
        assert_eq!(
            encoded_word("=?ISO-8859-1?B?SWYgeW91IGNhbiByZWFkIHRoaXMgeW8=?=")
                .unwrap()
                .1
                .decode(),
            "If you can read this yo".to_string(),
        );
    }

    #[test]
    fn test_decode_empty_payload() {
        assert_eq!(encoded_word("=?UTF-8?Q??=").unwrap().1.decode(), "");
    }

    #[test]
    fn test_decode_rfc2047_adjacent() {
        // FWS between adjacent encoded words disappears
        assert_eq!(
            decode_rfc2047("=?UTF-8?Q?a?= \r\n =?UTF-8?Q?b?="),
            "ab".to_string(),
        );
        // ...but is kept between an encoded word and plain text
        assert_eq!(
            decode_rfc2047("=?UTF-8?Q?a?= plain"),
            "a plain".to_string(),
        );
        assert_eq!(decode_rfc2047("no words here"), "no words here");
    }

    #[test]
    fn test_decode_rfc2047_idempotent() {
        let decoded = decode_rfc2047("=?UTF-8?Q?John_Sm=C3=AEth?=");
        assert_eq!(decoded, "John Smîth");
        assert_eq!(decode_rfc2047(&decoded), decoded);
    }

    #[test]
    fn test_b_encode_roundtrip() {
        let input = "This is あ string";
        let encoded = b_encode(input, EmailCharset::UTF_8);
        assert_eq!(encoded, "=?UTF-8?B?VGhpcyBpcyDjgYIgc3RyaW5n?=");
        assert_eq!(decode_rfc2047(&encoded), input);
    }

    #[test]
    fn test_b_encode_wraps() {
        let input = "x".repeat(200);
        let encoded = b_encode(&input, EmailCharset::UTF_8);
        for line in encoded.split("\r\n ") {
            assert!(line.len() <= MAX_ENCODED_WORD);
            assert!(line.starts_with("=?UTF-8?B?"));
        }
        assert_eq!(decode_rfc2047(&encoded), input);
    }

    #[test]
    fn test_q_encode() {
        assert_eq!(
            q_encode("né o", EmailCharset::UTF_8),
            "=?UTF-8?Q?n=C3=A9_o?=",
        );
        assert_eq!(decode_rfc2047(&q_encode("né o", EmailCharset::UTF_8)), "né o");
    }
}
