use nom::{
    character::complete::{char, digit1},
    combinator::{map_res, opt},
    sequence::tuple,
    IResult,
};

use crate::print::{Folder, Print};
use crate::text::whitespace::cfws;

/// MIME-Version field value: `1*DIGIT "." 1*DIGIT`, with comments
/// tolerated between the digits and around the dot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
}

impl Default for Version {
    fn default() -> Self {
        Version { major: 1, minor: 0 }
    }
}

impl Print for Version {
    fn print(&self, fmt: &mut Folder) {
        fmt.write_str(&self.major.to_string());
        fmt.write_str(".");
        fmt.write_str(&self.minor.to_string());
    }
}

pub fn version(input: &str) -> IResult<&str, Version> {
    let (rest, (_, major, _, _, _, minor, _)) = tuple((
        opt(cfws),
        map_res(digit1, str::parse::<u32>),
        opt(cfws),
        char('.'),
        opt(cfws),
        map_res(digit1, str::parse::<u32>),
        opt(cfws),
    ))(input)?;
    Ok((rest, Version { major, minor }))
}
