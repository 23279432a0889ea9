use thiserror::Error;

/// Errors produced while parsing header field values.
///
/// Grammar errors are surfaced by every parser entry point; the field
/// dispatcher catches them and falls back to an unstructured field, so at
/// the header level they are diagnostics rather than failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A grammar did not reach an accepting state at end of input.
    #[error("{element}: invalid syntax at byte {consumed} of {input:?}")]
    Grammar {
        element: &'static str,
        input: String,
        consumed: usize,
    },

    /// A parameter list contained a value with no `attribute=` before it.
    #[error("no attribute for value {value:?}")]
    MissingAttribute { value: String },

    /// A Content-Transfer-Encoding token the codec layer does not know.
    #[error("unknown content transfer encoding {token:?}")]
    UnknownEncoding { token: String },

    /// A combined `Name: value` line could not be split.
    #[error("header line {line:?} has no name/value separator")]
    Split { line: String },
}

/// Run a nom grammar against a complete field value.
///
/// A parse only succeeds if the grammar accepts the whole input; a partial
/// match is reported as an error carrying the consumed prefix length.
pub(crate) fn run<'a, O>(
    element: &'static str,
    mut parser: impl FnMut(&'a str) -> nom::IResult<&'a str, O>,
    input: &'a str,
) -> Result<O, ParseError> {
    match parser(input) {
        Ok(("", v)) => Ok(v),
        Ok((rest, _)) => Err(ParseError::Grammar {
            element,
            input: input.to_string(),
            consumed: input.len() - rest.len(),
        }),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(ParseError::Grammar {
            element,
            input: input.to_string(),
            consumed: input.len() - e.input.len(),
        }),
        Err(nom::Err::Incomplete(_)) => Err(ParseError::Grammar {
            element,
            input: input.to_string(),
            consumed: input.len(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nom::bytes::complete::tag;

    #[test]
    fn test_run_requires_full_input() {
        assert_eq!(run("tag", tag::<_, _, nom::error::Error<&str>>("ab"), "ab"), Ok("ab"));
        assert_eq!(
            run("tag", tag::<_, _, nom::error::Error<&str>>("ab"), "abc"),
            Err(ParseError::Grammar {
                element: "tag",
                input: "abc".to_string(),
                consumed: 2,
            }),
        );
    }
}
