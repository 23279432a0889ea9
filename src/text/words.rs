use nom::{
    bytes::complete::take_while1,
    character::complete::char,
    combinator::recognize,
    multi::many0,
    sequence::{delimited, pair},
    IResult,
};

use crate::text::whitespace::cfws;

/// Atom and token lexemes, with the character-class predicates the
/// quoting helpers are built on.

/// ASCII printable characters
pub fn is_vchar(c: char) -> bool {
    matches!(c, '!'..='~')
}

/// Atom allowed characters
///
/// ```abnf
///   atext = ALPHA / DIGIT / "!" / "#" / "$" / "%" / "&" / "'" / "*" /
///           "+" / "-" / "/" / "=" / "?" / "^" / "_" / "`" / "{" / "|" /
///           "}" / "~"
/// ```
///
/// Non-ASCII characters are accepted as atext (RFC 6532).
pub fn is_atext(c: char) -> bool {
    c.is_ascii_alphanumeric() || "!#$%&'*+-/=?^_`{|}~".contains(c) || !c.is_ascii()
}

/// MIME token allowed characters (RFC 2045)
///
/// forbidden: SPACE, CTLs and tspecials `()<>@,;:\"/[]?=`
pub fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "!#$%&'*+-.^_`{|}~".contains(c) || !c.is_ascii()
}

/// True iff `s` can be rendered as a bare atom, without quoting.
pub fn is_atom_safe(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_atext)
}

/// True iff `s` can be rendered as a bare dot-atom (atoms joined by dots).
pub fn is_dot_atom_safe(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| is_atext(c) || c == '.')
}

/// True iff `s` can be rendered as a bare MIME token.
pub fn is_token_safe(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_token_char)
}

/// True iff `s` can appear in a phrase without quoting. Phrase words are
/// atoms, so this is atom safety under another name.
pub fn is_phrase_safe(s: &str) -> bool {
    is_atom_safe(s)
}

/// Atom
///
/// `[CFWS] 1*atext [CFWS]`
pub fn atom(input: &str) -> IResult<&str, &str> {
    delimited(opt_cfws, atom_plain, opt_cfws)(input)
}

/// `1*atext`
pub fn atom_plain(input: &str) -> IResult<&str, &str> {
    take_while1(is_atext)(input)
}

/// dot-atom-text
///
/// `1*atext *("." 1*atext)`
pub fn dot_atom_text(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        take_while1(is_atext),
        many0(pair(char('.'), take_while1(is_atext))),
    ))(input)
}

/// MIME token
///
/// `[CFWS] 1*token_char [CFWS]`
pub fn token(input: &str) -> IResult<&str, &str> {
    delimited(opt_cfws, token_plain, opt_cfws)(input)
}

/// `1*token_char`
pub fn token_plain(input: &str) -> IResult<&str, &str> {
    take_while1(is_token_char)(input)
}

fn opt_cfws(input: &str) -> IResult<&str, ()> {
    let (input, _) = nom::combinator::opt(cfws)(input)?;
    Ok((input, ()))
}
