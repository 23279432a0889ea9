use crate::error::ParseError;
use crate::mime::r#type::{
    eat_cfws, grammar_error, parameter_list, parameter_lookup, print_parameters, Parameter,
};
use crate::print::{Folder, Print};
use crate::text::words::token_plain;

/// Content-Disposition field value (RFC 2183).
///
/// ```abnf
///   disposition := disposition-type *(";" parameter)
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentDisposition {
    pub disposition_type: String,
    pub params: Vec<Parameter>,
}

impl Default for ContentDisposition {
    fn default() -> Self {
        ContentDisposition {
            disposition_type: "inline".to_string(),
            params: vec![],
        }
    }
}

impl ContentDisposition {
    pub fn parameter(&self, name: &str) -> Option<&str> {
        parameter_lookup(&self.params, name)
    }

    pub fn filename(&self) -> Option<&str> {
        self.parameter("filename")
    }
}

impl Print for ContentDisposition {
    fn print(&self, fmt: &mut Folder) {
        fmt.write_str(&self.disposition_type);
        print_parameters(fmt, &self.params);
    }
}

/// Parse a complete Content-Disposition value. Shares the parameter
/// machinery (and its missing-attribute reporting) with Content-Type.
pub fn content_disposition(input: &str) -> Result<ContentDisposition, ParseError> {
    let rest = eat_cfws(input);
    let (rest, dtype) = match token_plain(rest) {
        Ok(v) => v,
        Err(_) => return Err(grammar_error("content-disposition", input, rest)),
    };
    let params = parameter_list("content-disposition", input, rest)?;
    Ok(ContentDisposition {
        disposition_type: dtype.to_lowercase(),
        params,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_disposition() {
        let parsed =
            content_disposition("attachment; filename=genome.jpeg; modification-date=\"Wed, 12 Feb 1997 16:29:51 -0500\"")
                .unwrap();
        assert_eq!(parsed.disposition_type, "attachment");
        assert_eq!(parsed.filename(), Some("genome.jpeg"));
        assert_eq!(
            parsed.parameter("modification-date"),
            Some("Wed, 12 Feb 1997 16:29:51 -0500"),
        );
    }

    #[test]
    fn test_missing_attribute_reported() {
        assert_eq!(
            content_disposition("attachment; =foo"),
            Err(ParseError::MissingAttribute {
                value: "foo".to_string(),
            }),
        );
    }

    #[test]
    fn test_case_folds() {
        let parsed = content_disposition("INLINE").unwrap();
        assert_eq!(parsed.disposition_type, "inline");
    }
}
