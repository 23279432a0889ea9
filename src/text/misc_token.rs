use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    combinator::{map, opt, recognize},
    multi::{many0, many1, separated_list0},
    sequence::{delimited, preceded},
    IResult,
};
use std::fmt;

use crate::print::{print_seq, Folder, Print};
use crate::text::{
    encoding::{encoded_word, encoded_word_plain, EncodedWord},
    quoted::{quote_atom, quoted_string, quoted_string_plain, requote},
    whitespace::{captured_comment, cfws, fws},
    words::atom_plain,
};

/// Word
///
/// ```abnf
///    word            =   atom / quoted-string
/// ```
#[derive(Clone, PartialEq, Eq)]
pub enum Word {
    Atom(String),
    /// Interior of a quoted string, escapes resolved. Always re-quoted on
    /// output.
    Quoted(String),
}

impl Word {
    pub fn as_str(&self) -> &str {
        match self {
            Word::Atom(s) | Word::Quoted(s) => s,
        }
    }
}

impl fmt::Debug for Word {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_tuple("Word")
            .field(&format_args!("\"{}\"", self.as_str()))
            .finish()
    }
}

impl Print for Word {
    fn print(&self, fmt: &mut Folder) {
        match self {
            // an atom built programmatically may still need quoting
            Word::Atom(s) => fmt.write_str(&quote_atom(s)),
            Word::Quoted(s) => fmt.write_str(&requote(s)),
        }
    }
}

pub fn word(input: &str) -> IResult<&str, Word> {
    alt((
        map(quoted_string, Word::Quoted),
        map(
            delimited(opt(cfws), atom_plain, opt(cfws)),
            |s: &str| Word::Atom(s.to_string()),
        ),
    ))(input)
}

/// `word` without surrounding CFWS, for grammars that keep comments.
pub fn word_plain(input: &str) -> IResult<&str, Word> {
    alt((
        map(quoted_string_plain, Word::Quoted),
        map(atom_plain, |s: &str| Word::Atom(s.to_string())),
    ))(input)
}

#[derive(Clone, PartialEq, Eq)]
pub enum PhraseToken {
    Word(Word),
    Encoded(EncodedWord),
    /// Comment text, retained only by the grammars that document it
    /// (phrase lists); discarded everywhere else.
    Comment(String),
}

impl PhraseToken {
    fn decoded(&self) -> String {
        match self {
            PhraseToken::Word(w) => w.as_str().to_string(),
            PhraseToken::Encoded(e) => e.decode(),
            PhraseToken::Comment(c) => format!("({})", c),
        }
    }
}

impl fmt::Debug for PhraseToken {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_tuple("PhraseToken")
            .field(&format_args!("\"{}\"", self.decoded()))
            .finish()
    }
}

impl Print for PhraseToken {
    fn print(&self, fmt: &mut Folder) {
        match self {
            PhraseToken::Word(w) => w.print(fmt),
            PhraseToken::Encoded(e) => fmt.write_str(&e.to_wire()),
            PhraseToken::Comment(c) => {
                fmt.write_str("(");
                fmt.write_str(c);
                fmt.write_str(")");
            }
        }
    }
}

/// Phrase (including obsolete syntax)
///
/// ```abnf
///    phrase          =   1*(encoded-word / word) / obs-phrase
///    obs-phrase      =   word *(word / "." / CFWS)
/// ```
///
/// Naked dots (obs-phrase) are parsed as quoted `"."` words so that the
/// result can be printed without the obsolete syntax.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Phrase(pub Vec<PhraseToken>);

impl Phrase {
    /// The decoded phrase text: words joined by a single space, encoded
    /// words resolved, retained comments kept in parens.
    pub fn to_string(&self) -> String {
        self.0
            .iter()
            .map(|t| t.decoded())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Debug for Phrase {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_tuple("Phrase")
            .field(&format_args!("\"{}\"", self.to_string()))
            .finish()
    }
}

impl Print for Phrase {
    fn print(&self, fmt: &mut Folder) {
        print_seq(fmt, &self.0, Folder::write_fws)
    }
}

fn phrase_token(input: &str) -> IResult<&str, PhraseToken> {
    alt((
        // encoded words are also valid atoms, so they must be tried first
        map(encoded_word, PhraseToken::Encoded),
        map(word, PhraseToken::Word),
        map(delimited(opt(cfws), tag("."), opt(cfws)), |_| {
            PhraseToken::Word(Word::Quoted(".".to_string()))
        }),
    ))(input)
}

pub fn phrase(input: &str) -> IResult<&str, Phrase> {
    map(many1(phrase_token), Phrase)(input)
}

/// A phrase for keyword lists: comments are captured as tokens instead of
/// being discarded, so `mail (electronic)` keeps its parenthetical aside.
pub fn keyword_phrase(input: &str) -> IResult<&str, Phrase> {
    map(
        many1(preceded(
            opt(fws),
            alt((
                map(captured_comment, PhraseToken::Comment),
                map(encoded_word_plain, PhraseToken::Encoded),
                map(word_plain, PhraseToken::Word),
                map(tag("."), |_| PhraseToken::Word(Word::Quoted(".".to_string()))),
            )),
        )),
        Phrase,
    )(input)
}

/// A comma-separated list of phrases. Handles the obsolete syntax:
///
/// ```abnf
/// obs-phrase-list =   [phrase / CFWS] *("," [phrase / CFWS])
/// ```
///
/// Empty list items are dropped silently.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PhraseList(pub Vec<Phrase>);

pub fn phrase_list(input: &str) -> IResult<&str, PhraseList> {
    let (input, phrases) = separated_list0(
        preceded(opt(fws), tag(",")),
        alt((map(keyword_phrase, Some), map(opt(fws), |_| None))),
    )(input)?;
    let (input, _) = opt(fws)(input)?;
    Ok((input, PhraseList(phrases.into_iter().flatten().collect())))
}

impl Print for PhraseList {
    fn print(&self, fmt: &mut Folder) {
        print_seq(fmt, &self.0, |fmt| {
            fmt.write_str(",");
            fmt.write_fws();
        })
    }
}

/// Unstructured header field body
///
/// ```abnf
/// unstructured    =   (*([FWS] VCHAR) *WSP) / obs-unstruct
/// ```
/// + RFC 2047 (MIME pt3) encoded words.
///
/// Tokens record the whitespace runs separately so that folding white
/// space between adjacent encoded words can be removed on decode.
#[derive(Clone, PartialEq, Eq)]
pub enum UnstrToken {
    Plain(String),
    Fws(String),
    Encoded(EncodedWord),
}

impl fmt::Debug for UnstrToken {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnstrToken::Plain(s) => fmt.debug_tuple("Plain").field(s).finish(),
            UnstrToken::Fws(s) => fmt.debug_tuple("Fws").field(s).finish(),
            UnstrToken::Encoded(e) => fmt.debug_tuple("Encoded").field(&e.decode()).finish(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Unstructured(pub Vec<UnstrToken>);

impl Unstructured {
    /// Decoded text: encoded words resolved, folding whitespace between
    /// adjacent encoded words removed (RFC 2047 §2).
    pub fn to_string(&self) -> String {
        let mut out = String::new();
        for (i, token) in self.0.iter().enumerate() {
            match token {
                UnstrToken::Plain(s) => out.push_str(s),
                UnstrToken::Encoded(e) => out.push_str(&e.decode()),
                UnstrToken::Fws(s) => {
                    let between_encoded = i > 0
                        && matches!(self.0.get(i - 1), Some(UnstrToken::Encoded(_)))
                        && matches!(self.0.get(i + 1), Some(UnstrToken::Encoded(_)));
                    if !between_encoded {
                        out.push_str(s);
                    }
                }
            }
        }
        out
    }
}

impl Print for Unstructured {
    fn print(&self, fmt: &mut Folder) {
        for token in &self.0 {
            match token {
                UnstrToken::Plain(s) => fmt.write_str(s),
                UnstrToken::Fws(s) => fmt.write_fws_str(s),
                UnstrToken::Encoded(e) => fmt.write_str(&e.to_wire()),
            }
        }
    }
}

pub fn unstructured(input: &str) -> IResult<&str, Unstructured> {
    map(
        many0(alt((
            map(recognize(fws), |s: &str| UnstrToken::Fws(normalize_fws(s))),
            map(encoded_word_plain, UnstrToken::Encoded),
            map(take_while1(|c: char| !c.is_whitespace()), |s: &str| {
                UnstrToken::Plain(s.to_string())
            }),
        ))),
        Unstructured,
    )(input)
}

// keep only the WSP characters of a folding run; a run that was a pure
// line break still reads back as one space
fn normalize_fws(s: &str) -> String {
    let wsp: String = s.chars().filter(|c| *c == ' ' || *c == '\t').collect();
    if wsp.is_empty() {
        " ".to_string()
    } else {
        wsp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::print::folded;

    #[test]
    fn test_phrase() {
        assert_eq!(
            phrase("hello world").unwrap().1.to_string(),
            "hello world".to_string(),
        );
        assert_eq!(
            phrase("salut \"le\" monde").unwrap().1.to_string(),
            "salut le monde".to_string(),
        );

        let (rest, parsed) = phrase("foo.bar").unwrap();
        assert_eq!(rest, "");
        assert_eq!(folded(|f| parsed.print(f)), "foo \".\" bar");
    }

    #[test]
    fn test_phrase_encoded_word() {
        assert_eq!(
            phrase("=?UTF-8?Q?John_Sm=C3=AEth?=").unwrap().1.to_string(),
            "John Smîth".to_string(),
        );
    }

    #[test]
    fn test_keyword_phrase_keeps_comments() {
        let (rest, parsed) = keyword_phrase("mail (electronic)").unwrap();
        assert_eq!(rest, "");
        assert_eq!(parsed.to_string(), "mail (electronic)");
        assert_eq!(folded(|f| parsed.print(f)), "mail (electronic)");
    }

    #[test]
    fn test_phrase_list() {
        let (rest, parsed) = phrase_list("hello, world").unwrap();
        assert_eq!(rest, "");
        assert_eq!(parsed.0.len(), 2);

        // empty items are dropped
        let (rest, parsed) = phrase_list(",abc def,,   ,ghi").unwrap();
        assert_eq!(rest, "");
        assert_eq!(folded(|f| parsed.print(f)), "abc def, ghi");
    }

    #[test]
    fn test_unstructured() {
        let (rest, parsed) = unstructured("An RFC 822 formatted message").unwrap();
        assert_eq!(rest, "");
        assert_eq!(parsed.to_string(), "An RFC 822 formatted message");
    }

    #[test]
    fn test_unstructured_adjacent_encoded_words() {
        let (_, parsed) = unstructured("=?UTF-8?Q?a?= =?UTF-8?Q?b?=").unwrap();
        assert_eq!(parsed.to_string(), "ab");

        let (_, parsed) = unstructured("=?UTF-8?Q?a?= plain").unwrap();
        assert_eq!(parsed.to_string(), "a plain");
    }
}
