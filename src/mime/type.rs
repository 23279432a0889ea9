use nom::{
    branch::alt,
    character::complete::char,
    combinator::map,
    sequence::separated_pair,
    IResult,
};

use crate::error::ParseError;
use crate::print::{Folder, Print};
use crate::text::quoted::{quote_token, quoted_string_plain};
use crate::text::whitespace::cfws;
use crate::text::words::token_plain;

/// One `attribute=value` pair. Parameters are kept in encounter order and
/// duplicates are preserved; merging or first-wins is the caller's choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub value: String,
}

impl Print for Parameter {
    fn print(&self, fmt: &mut Folder) {
        fmt.write_str(&self.name);
        fmt.write_str("=");
        fmt.write_str(&quote_token(&self.value));
    }
}

/// Content-Type field value.
///
/// ```abnf
///   content := "Content-Type" ":" type "/" subtype *(";" parameter)
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentType {
    pub main: String,
    pub sub: String,
    pub params: Vec<Parameter>,
}

impl Default for ContentType {
    fn default() -> Self {
        ContentType {
            main: "text".to_string(),
            sub: "plain".to_string(),
            params: vec![],
        }
    }
}

impl ContentType {
    /// `main/sub`, lowercased.
    pub fn mime_type(&self) -> String {
        format!("{}/{}", self.main, self.sub)
    }

    /// First parameter with this name, compared case-insensitively.
    pub fn parameter(&self, name: &str) -> Option<&str> {
        parameter_lookup(&self.params, name)
    }

    pub fn charset(&self) -> Option<&str> {
        self.parameter("charset")
    }
}

impl Print for ContentType {
    fn print(&self, fmt: &mut Folder) {
        fmt.write_str(&self.main);
        fmt.write_str("/");
        fmt.write_str(&self.sub);
        print_parameters(fmt, &self.params);
    }
}

pub(crate) fn parameter_lookup<'a>(params: &'a [Parameter], name: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(name))
        .map(|p| p.value.as_str())
}

pub(crate) fn print_parameters(fmt: &mut Folder, params: &[Parameter]) {
    for param in params {
        fmt.write_str(";");
        fmt.write_fws();
        param.print(fmt);
    }
}

/// Parse a complete Content-Type value.
///
/// The parameter list is hand-rolled rather than a pure combinator so that
/// a value with no attribute name (`; =foo`) can be reported as its own
/// error kind instead of a generic grammar failure.
pub fn content_type(input: &str) -> Result<ContentType, ParseError> {
    let (rest, (main, sub)) = match type_tokens(input) {
        Ok(v) => v,
        Err(_) => {
            return Err(grammar_error("content-type", input, input));
        }
    };
    let params = parameter_list("content-type", input, rest)?;
    Ok(ContentType {
        main: main.to_lowercase(),
        sub: sub.to_lowercase(),
        params,
    })
}

fn type_tokens(input: &str) -> IResult<&str, (&str, &str)> {
    let (input, _) = eat_cfws_nom(input)?;
    let (input, pair) = separated_pair(token_plain, char('/'), token_plain)(input)?;
    let (input, _) = eat_cfws_nom(input)?;
    Ok((input, pair))
}

fn eat_cfws_nom(input: &str) -> IResult<&str, ()> {
    let (input, _) = nom::combinator::opt(cfws)(input)?;
    Ok((input, ()))
}

pub(crate) fn eat_cfws(input: &str) -> &str {
    match cfws(input) {
        Ok((rest, _)) => rest,
        Err(_) => input,
    }
}

pub(crate) fn grammar_error(
    element: &'static str,
    original: &str,
    rest: &str,
) -> ParseError {
    ParseError::Grammar {
        element,
        input: original.to_string(),
        consumed: original.len() - rest.len(),
    }
}

/// Parse `*(";" attribute "=" value)` to the end of the input.
///
/// A trailing naked `;` is tolerated. A value with no `attribute=` is a
/// [`ParseError::MissingAttribute`]; anything else unrecognized is a
/// grammar error.
pub(crate) fn parameter_list(
    element: &'static str,
    original: &str,
    mut rest: &str,
) -> Result<Vec<Parameter>, ParseError> {
    let mut params = Vec::new();
    loop {
        rest = eat_cfws(rest);
        if rest.is_empty() {
            return Ok(params);
        }
        rest = match rest.strip_prefix(';') {
            Some(r) => eat_cfws(r),
            None => return Err(grammar_error(element, original, rest)),
        };
        if rest.is_empty() {
            // trailing semicolon, common in the wild
            return Ok(params);
        }
        if let Some(r) = rest.strip_prefix('=') {
            return Err(ParseError::MissingAttribute {
                value: r.trim().to_string(),
            });
        }
        let (r, name) = match token_plain(rest) {
            Ok(v) => v,
            Err(_) => return Err(grammar_error(element, original, rest)),
        };
        rest = eat_cfws(r);
        rest = match rest.strip_prefix('=') {
            Some(r) => eat_cfws(r),
            None => return Err(grammar_error(element, original, rest)),
        };
        let (r, value) = match parameter_value(rest) {
            Ok(v) => v,
            Err(_) => return Err(grammar_error(element, original, rest)),
        };
        rest = r;
        params.push(Parameter {
            name: name.to_string(),
            value,
        });
    }
}

// value = quoted-string / token; the quoted form wins when both could match
fn parameter_value(input: &str) -> IResult<&str, String> {
    alt((
        quoted_string_plain,
        map(token_plain, |s: &str| s.to_string()),
    ))(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::print::folded;

    #[test]
    fn test_content_type_with_parameters() {
        let parsed = content_type("text/plain; charset=US-ASCII; format=flowed").unwrap();
        assert_eq!(parsed.main, "text");
        assert_eq!(parsed.sub, "plain");
        assert_eq!(
            parsed.params,
            vec![
                Parameter {
                    name: "charset".to_string(),
                    value: "US-ASCII".to_string(),
                },
                Parameter {
                    name: "format".to_string(),
                    value: "flowed".to_string(),
                },
            ],
        );
    }

    #[test]
    fn test_content_type_quoted_parameter() {
        let parsed =
            content_type("multipart/mixed; boundary=\"--==_mimepart_4d8b-8cf0\"").unwrap();
        assert_eq!(
            parsed.parameter("boundary"),
            Some("--==_mimepart_4d8b-8cf0"),
        );
        // re-quoted on output because of the "=" inside
        assert_eq!(
            folded(|f| parsed.print(f)),
            "multipart/mixed; boundary=\"--==_mimepart_4d8b-8cf0\"",
        );
    }

    #[test]
    fn test_content_type_duplicate_parameters_preserved() {
        let parsed = content_type("text/html; charset=a; charset=b").unwrap();
        assert_eq!(parsed.params.len(), 2);
        assert_eq!(parsed.parameter("CHARSET"), Some("a"));
    }

    #[test]
    fn test_content_type_case_folds() {
        let parsed = content_type("TEXT/Plain").unwrap();
        assert_eq!(parsed.mime_type(), "text/plain");
    }

    #[test]
    fn test_missing_attribute() {
        assert_eq!(
            content_type("text/plain; =foo"),
            Err(ParseError::MissingAttribute {
                value: "foo".to_string(),
            }),
        );
    }

    #[test]
    fn test_trailing_semicolon() {
        let parsed = content_type("text/plain;").unwrap();
        assert_eq!(parsed.params, vec![]);
    }

    #[test]
    fn test_garbage_is_grammar_error() {
        assert!(matches!(
            content_type("banana"),
            Err(ParseError::Grammar { .. }),
        ));
    }
}
