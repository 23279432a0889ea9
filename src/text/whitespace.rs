use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{space0, space1},
    combinator::{map, opt, recognize},
    multi::{many0, many1},
    sequence::{pair, tuple},
    IResult,
};

use crate::text::quoted::quoted_pair;

/// Whitespace (space, new line, tab) content and parenthesized comments.

/// Obsolete/Compatible CRLF
///
/// Theoretically, all lines must end with \r\n
/// but some mail servers like Dovecot support malformated emails,
/// for example with only \n eol. It works because
/// \r or \n is allowed nowhere else, so we also add this support.
pub fn obs_crlf(input: &str) -> IResult<&str, &str> {
    alt((tag("\r\n"), tag("\r"), tag("\n")))(input)
}

/// Permissive foldable white space
///
/// Folding white space is used for long headers split on multiple lines.
/// The obsolete syntax allows multiple folds without content between them;
/// accepted for compatibility reasons.
pub fn fws(input: &str) -> IResult<&str, ()> {
    map(alt((recognize(many1(fold_marker)), space1)), |_| ())(input)
}

fn fold_marker(input: &str) -> IResult<&str, &str> {
    let (input, _) = space0(input)?;
    let (input, _) = obs_crlf(input)?;
    space1(input)
}

/// Folding White Space with Comment
///
/// ```abnf
///   ctext           =   %d33-39 /          ; Printable US-ASCII
///                       %d42-91 /          ;  characters not including
///                       %d93-126 /         ;  "(", ")", or "\"
///                       obs-ctext
///
///   ccontent        =   ctext / quoted-pair / comment
///
///   comment         =   "(" *([FWS] ccontent) [FWS] ")"
///
///   CFWS            =   (1*([FWS] comment) [FWS]) / FWS
/// ```
pub fn cfws(input: &str) -> IResult<&str, ()> {
    alt((comments, fws))(input)
}

pub fn comments(input: &str) -> IResult<&str, ()> {
    let (input, _) = many1(tuple((opt(fws), comment)))(input)?;
    let (input, _) = opt(fws)(input)?;
    Ok((input, ()))
}

/// A single parenthesized comment, with arbitrary nesting and
/// quoted-pair escapes inside. The content is discarded.
pub fn comment(input: &str) -> IResult<&str, ()> {
    let (input, _) = tag("(")(input)?;
    let (input, _) = many0(pair(opt(fws), ccontent))(input)?;
    let (input, _) = opt(fws)(input)?;
    let (input, _) = tag(")")(input)?;
    Ok((input, ()))
}

fn ccontent(input: &str) -> IResult<&str, ()> {
    alt((
        map(take_while1(is_ctext), |_| ()),
        map(quoted_pair, |_| ()),
        comment,
    ))(input)
}

/// A comment whose interior text is kept verbatim (nested parens and
/// escapes included), for the grammars that retain comment content.
pub fn captured_comment(input: &str) -> IResult<&str, String> {
    map(recognize(comment), |s: &str| {
        s[1..s.len() - 1].to_string()
    })(input)
}

/// Comment text characters: printable US-ASCII except "(", ")" and "\",
/// plus anything non-ASCII (RFC 6532 leniency).
pub fn is_ctext(c: char) -> bool {
    matches!(c, '!'..='\'' | '*'..='[' | ']'..='~') || !c.is_ascii()
}

/// Remove header folding from a raw header block.
///
/// Line endings are normalized (`\r\n`, `\r`, `\n` all accepted), then every
/// line break immediately followed by WSP is deleted. Only the break itself
/// disappears; the leading whitespace of the continuation line stays part of
/// the value.
pub fn unfold(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;
    while i < bytes.len() {
        match memchr::memchr2(b'\r', b'\n', &bytes[i..]) {
            None => {
                out.push_str(&input[i..]);
                break;
            }
            Some(off) => {
                out.push_str(&input[i..i + off]);
                let mut j = i + off;
                if bytes[j] == b'\r' {
                    j += 1;
                    if j < bytes.len() && bytes[j] == b'\n' {
                        j += 1;
                    }
                } else {
                    j += 1;
                }
                if !(j < bytes.len() && (bytes[j] == b' ' || bytes[j] == b'\t')) {
                    out.push('\n');
                }
                i = j;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_obs_crlf() {
        assert_eq!(obs_crlf("\rworld"), Ok(("world", "\r")));
        assert_eq!(obs_crlf("\r\nworld"), Ok(("world", "\r\n")));
        assert_eq!(obs_crlf("\nworld"), Ok(("world", "\n")));
    }

    #[test]
    fn test_fws() {
        assert_eq!(fws("\r\n world"), Ok(("world", ())));
        assert_eq!(fws(" \r\n \r\n world"), Ok(("world", ())));
        assert_eq!(fws(" world"), Ok(("world", ())));
        assert!(fws("\r\nFrom: test").is_err());
    }

    #[test]
    fn test_cfws() {
        assert_eq!(
            cfws("(A nice \\) chap) <pete@silly.test>"),
            Ok(("<pete@silly.test>", ()))
        );
        assert_eq!(
            cfws("(double (comment) is fun) wouch"),
            Ok(("wouch", ()))
        );
    }

    #[test]
    fn test_captured_comment() {
        assert_eq!(
            captured_comment("(his (very own) account) rest"),
            Ok((" rest", "his (very own) account".to_string()))
        );
    }

    #[test]
    fn test_unfold() {
        assert_eq!(
            unfold("Subject: hello\r\n world\r\nTo: a@b\r\n"),
            "Subject: hello world\nTo: a@b\n"
        );
        assert_eq!(unfold("A: b\n\tc\nD: e"), "A: b\tc\nD: e");
        assert_eq!(unfold("A: b\rc"), "A: b\nc");
    }
}
