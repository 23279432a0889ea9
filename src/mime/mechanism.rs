use nom::{combinator::map, IResult};

use crate::error::ParseError;
use crate::print::{Folder, Print};
use crate::text::words::token;

/// A decoded Content-Transfer-Encoding mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferEncoding {
    SevenBit,
    EightBit,
    Binary,
    QuotedPrintable,
    Base64,
}

/// The raw transfer-encoding token, case-folded to lowercase on capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mechanism(pub String);

impl Default for Mechanism {
    fn default() -> Self {
        Mechanism("7bit".to_string())
    }
}

impl Mechanism {
    /// Resolve the token to a known mechanism. Unknown tokens are an
    /// error, surfaced when a caller actually tries to decode a body.
    pub fn decode(&self) -> Result<TransferEncoding, ParseError> {
        use TransferEncoding::*;
        match self.0.as_str() {
            "7bit" => Ok(SevenBit),
            "8bit" => Ok(EightBit),
            "binary" => Ok(Binary),
            "quoted-printable" => Ok(QuotedPrintable),
            "base64" => Ok(Base64),
            _ => Err(ParseError::UnknownEncoding {
                token: self.0.clone(),
            }),
        }
    }
}

impl Print for Mechanism {
    fn print(&self, fmt: &mut Folder) {
        fmt.write_str(&self.0)
    }
}

pub fn mechanism(input: &str) -> IResult<&str, Mechanism> {
    map(token, |t: &str| Mechanism(t.to_lowercase()))(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mechanism() {
        assert_eq!(
            mechanism("7bit").unwrap().1.decode(),
            Ok(TransferEncoding::SevenBit),
        );
        assert_eq!(
            mechanism("(youhou) 8bit").unwrap().1.decode(),
            Ok(TransferEncoding::EightBit),
        );
        assert_eq!(
            mechanism("(blip) bInArY (blip blip)").unwrap().1.decode(),
            Ok(TransferEncoding::Binary),
        );
        assert_eq!(
            mechanism(" Quoted-Printable ").unwrap().1.decode(),
            Ok(TransferEncoding::QuotedPrintable),
        );
    }

    #[test]
    fn test_unknown_mechanism() {
        assert_eq!(
            mechanism("x-unknown").unwrap().1.decode(),
            Err(ParseError::UnknownEncoding {
                token: "x-unknown".to_string(),
            }),
        );
    }
}
