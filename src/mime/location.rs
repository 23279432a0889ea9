use nom::{
    branch::alt,
    bytes::complete::take_while1,
    combinator::{map, opt},
    sequence::delimited,
    IResult,
};

use crate::print::{Folder, Print};
use crate::text::quoted::quoted_string_plain;
use crate::text::whitespace::cfws;

/// Content-Location field value (RFC 2557): a URI, either bare or inside
/// a quoted string. No URI validation is attempted here; the value is an
/// opaque reference for the body layer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location(pub String);

impl Print for Location {
    fn print(&self, fmt: &mut Folder) {
        fmt.write_str(&self.0)
    }
}

pub fn location(input: &str) -> IResult<&str, Location> {
    delimited(
        opt(cfws),
        alt((
            map(quoted_string_plain, Location),
            map(take_while1(|c: char| !c.is_whitespace() && c != '"'), |s: &str| {
                Location(s.to_string())
            }),
        )),
        opt(cfws),
    )(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location() {
        assert_eq!(
            location("http://www.example.com/images/ietf.gif").unwrap().1,
            Location("http://www.example.com/images/ietf.gif".to_string()),
        );
        assert_eq!(
            location(" \"relative/path With Space\" ").unwrap().1,
            Location("relative/path With Space".to_string()),
        );
    }
}
