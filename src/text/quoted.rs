use nom::{
    branch::alt,
    bytes::complete::{tag, take, take_while1},
    combinator::opt,
    multi::many0,
    sequence::{delimited, pair, preceded},
    IResult,
};
use std::borrow::Cow;

use crate::text::whitespace::{cfws, fws};

/// Quoted pair
///
/// ```abnf
///    quoted-pair     =   ("\" (VCHAR / WSP)) / obs-qp
///    obs-qp          =   "\" (%d0 / obs-NO-WS-CTL / LF / CR)
/// ```
pub fn quoted_pair(input: &str) -> IResult<&str, &str> {
    preceded(tag("\\"), take(1usize))(input)
}

/// Allowed characters in quotes
///
/// ```abnf
///   qtext           =   %d33 /             ; Printable US-ASCII
///                       %d35-91 /          ;  characters not including
///                       %d93-126 /         ;  "\" or the quote character
///                       obs-qtext
/// ```
///
/// Non-ASCII characters are accepted leniently.
fn is_qtext(c: char) -> bool {
    matches!(c, '!' | '#'..='[' | ']'..='~') || !c.is_ascii()
}

/// Quoted string content, with quoted pairs resolved and interior folding
/// collapsed to a single space.
///
/// ```abnf
///   qcontent        =   qtext / quoted-pair
/// ```
fn quoted_content(input: &str) -> IResult<&str, String> {
    let (input, pieces) = many0(pair(
        opt(fws),
        alt((take_while1(is_qtext), quoted_pair)),
    ))(input)?;
    let mut out = String::new();
    for (wsp, piece) in pieces {
        if wsp.is_some() {
            out.push(' ');
        }
        out.push_str(piece);
    }
    let (input, trailing) = opt(fws)(input)?;
    if trailing.is_some() {
        out.push(' ');
    }
    Ok((input, out))
}

/// Quoted string
///
/// ```abnf
/// quoted-string   =   [CFWS]
///                     DQUOTE *([FWS] qcontent) [FWS] DQUOTE
///                     [CFWS]
/// ```
///
/// The returned value is the interior text with escapes resolved; callers
/// re-quote on output when the content is not atom/token safe.
pub fn quoted_string(input: &str) -> IResult<&str, String> {
    delimited(opt(cfws), quoted_string_plain, opt(cfws))(input)
}

/// `DQUOTE *qcontent DQUOTE`, without surrounding CFWS.
pub fn quoted_string_plain(input: &str) -> IResult<&str, String> {
    delimited(tag("\""), quoted_content, tag("\""))(input)
}

// --- quoting and escaping helpers used on the encode side

/// Strip one layer of surrounding `"..."` if present, resolving the
/// quoted pairs inside; otherwise return the input unchanged.
pub fn unquote(s: &str) -> Cow<'_, str> {
    let stripped = s
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'));
    match stripped {
        Some(inner) => Cow::Owned(unescape(inner)),
        None => Cow::Borrowed(s),
    }
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some(n) => out.push(n),
                None => out.push(c),
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn quote_unsafe<'a>(s: &'a str, is_safe: fn(&str) -> bool) -> Cow<'a, str> {
    if is_safe(s) {
        Cow::Borrowed(s)
    } else {
        Cow::Owned(requote(s))
    }
}

/// Wrap `s` in double quotes, escaping embedded quotes and backslashes.
pub fn requote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// Quote `s` unless it is a bare atom.
pub fn quote_atom(s: &str) -> Cow<'_, str> {
    quote_unsafe(s, super::words::is_atom_safe)
}

/// Quote `s` unless it is a bare dot-atom (used for address local parts).
pub fn quote_local_part(s: &str) -> Cow<'_, str> {
    quote_unsafe(s, super::words::is_dot_atom_safe)
}

/// Quote `s` unless it is a bare MIME token (used for parameter values).
pub fn quote_token(s: &str) -> Cow<'_, str> {
    quote_unsafe(s, super::words::is_token_safe)
}

/// Quote `s` unless it is safe inside a phrase (display names).
pub fn quote_phrase(s: &str) -> Cow<'_, str> {
    quote_unsafe(s, super::words::is_phrase_safe)
}

/// Backslash-escape every unescaped `(` and `)` in `s`.
pub fn escape_parens(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;
    for c in s.chars() {
        if !escaped && (c == '(' || c == ')') {
            out.push('\\');
        }
        escaped = c == '\\' && !escaped;
        out.push(c);
    }
    out
}

/// Undo `escape_parens`: remove the backslash before escaped parens.
pub fn unescape_parens(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' && matches!(chars.peek(), Some('(') | Some(')')) {
            continue;
        }
        out.push(c);
    }
    out
}

/// Wrap `s` in a comment, escaping interior parens.
pub fn paren(s: &str) -> String {
    format!("({})", escape_parens(s))
}

/// Strip one layer of surrounding parens if present and unescape the
/// interior; otherwise return the input unchanged.
pub fn unparen(s: &str) -> Cow<'_, str> {
    let stripped = s
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'));
    match stripped {
        Some(inner) => Cow::Owned(unescape_parens(inner)),
        None => Cow::Borrowed(s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoted_string_parser() {
        assert_eq!(
            quoted_string(" \"hello\\\"world\" "),
            Ok(("", "hello\"world".to_string()))
        );
        assert_eq!(
            quoted_string("\"hello\r\n world\""),
            Ok(("", "hello world".to_string()))
        );
        assert_eq!(quoted_string("\"\""), Ok(("", String::new())));
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("\"a b\""), "a b");
        assert_eq!(unquote("\"a \\\"b\\\"\""), "a \"b\"");
        assert_eq!(unquote("plain"), "plain");
        // only one layer is stripped
        assert_eq!(unquote("\"\"nested\"\""), "\"nested\"");
    }

    #[test]
    fn test_quote_helpers() {
        assert_eq!(quote_atom("simple"), "simple");
        assert_eq!(quote_atom("two words"), "\"two words\"");
        assert_eq!(quote_phrase("Giant; \"Big\" Box"), "\"Giant; \\\"Big\\\" Box\"");
        assert_eq!(quote_local_part("john.q.public"), "john.q.public");
        assert_eq!(quote_token("us-ascii"), "us-ascii");
        assert_eq!(quote_token("a b"), "\"a b\"");
    }

    #[test]
    fn test_parens() {
        assert_eq!(escape_parens("a (b)"), "a \\(b\\)");
        assert_eq!(escape_parens("a \\(b"), "a \\(b");
        assert_eq!(unescape_parens("a \\(b\\)"), "a (b)");
        assert_eq!(paren("note"), "(note)");
        assert_eq!(unparen("(note)"), "note");
        assert_eq!(unparen("note"), "note");
    }
}
