use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, digit1},
    combinator::{map, opt, recognize},
    sequence::{pair, preceded, tuple},
    IResult,
};

use crate::imf::datetime::{date_time, day_name, month_name, DateTimeValue};
use crate::imf::mailbox::{addr_spec, angle_addr, AddrSpec};
use crate::print::{Folder, Print};
use crate::text::whitespace::{cfws, fws};

/// Received trace field.
///
/// The pre-`;` span is free text for this crate's purposes (a sequence of
/// `name value` clauses whose vocabulary keeps growing), so it is kept
/// verbatim, comments included, and only the date behind the `;` is
/// structured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedLog {
    pub info: String,
    pub date: Option<DateTimeValue>,
}

impl Print for ReceivedLog {
    fn print(&self, fmt: &mut Folder) {
        // re-emit the info one word at a time so overlong trace lines fold
        let words: Vec<&str> = self.info.split_whitespace().collect();
        for (i, word) in words.iter().enumerate() {
            if i > 0 {
                fmt.write_fws();
            }
            fmt.write_str(word);
        }
        if let Some(date) = &self.date {
            fmt.write_str(";");
            fmt.write_fws();
            date.print(fmt);
        }
    }
}

/// `*(name value) ";" date-time`, with the whole pre-`;` span retained.
///
/// This parser always succeeds: a line with no usable `; date-time` tail
/// is all info and no date.
pub fn received_log(input: &str) -> IResult<&str, ReceivedLog> {
    if let Some(pos) = input.rfind(';') {
        if let Ok((rest, date)) = date_time(&input[pos + 1..]) {
            if rest.trim().is_empty() {
                return Ok((
                    "",
                    ReceivedLog {
                        info: input[..pos].trim().to_string(),
                        date: Some(date),
                    },
                ));
            }
        }
    }
    Ok((
        "",
        ReceivedLog {
            info: input.trim().to_string(),
            date: None,
        },
    ))
}

/// Return-Path: an angle-bracketed address or the null path `<>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnPath(pub Option<AddrSpec>);

impl Print for ReturnPath {
    fn print(&self, fmt: &mut Folder) {
        match &self.0 {
            Some(spec) => {
                fmt.write_str("<");
                spec.print(fmt);
                fmt.write_str(">");
            }
            None => fmt.write_str("<>"),
        }
    }
}

pub fn return_path(input: &str) -> IResult<&str, ReturnPath> {
    alt((
        map(angle_addr, |a| ReturnPath(Some(a))),
        empty_path,
        // bare addr-spec, seen from sloppy MTAs
        map(addr_spec, |a| ReturnPath(Some(a))),
    ))(input)
}

fn empty_path(input: &str) -> IResult<&str, ReturnPath> {
    let (input, _) = tuple((
        opt(cfws),
        tag("<"),
        opt(cfws),
        tag(">"),
        opt(cfws),
    ))(input)?;
    Ok((input, ReturnPath(None)))
}

/// The mbox `From ` separator line body: `addr-spec ctime-date`, e.g.
/// `jamis@marshmallow.local Mon Aug 17 00:39:21 2009`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvelopeFrom {
    pub addrspec: AddrSpec,
    pub date: DateTimeValue,
}

pub fn envelope_from(input: &str) -> IResult<&str, EnvelopeFrom> {
    map(pair(addr_spec, ctime_date), |(addrspec, date)| {
        EnvelopeFrom { addrspec, date }
    })(input)
}

/// `day-name month day time year`, the asctime layout used by mbox.
fn ctime_date(input: &str) -> IResult<&str, DateTimeValue> {
    let (input, _) = opt(cfws)(input)?;
    let (input, _) = day_name(input)?;
    let (input, _) = fws(input)?;
    let (input, month) = month_name(input)?;
    let (input, _) = fws(input)?;
    let (input, day) = digit1(input)?;
    let (input, _) = fws(input)?;
    let (input, time) = recognize(tuple((
        digit1,
        char(':'),
        digit1,
        opt(preceded(char(':'), digit1)),
    )))(input)?;
    let (input, _) = fws(input)?;
    let (input, year) = digit1(input)?;
    let (input, _) = opt(cfws)(input)?;
    Ok((
        input,
        DateTimeValue {
            date: format!("{} {} {}", day, month, year),
            time: time.to_string(),
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};

    #[test]
    fn test_received_log() {
        let hdrs = "from smtp.example.com ([10.83.2.2])\n    by server with LMTP\n    id xxxxxxxxx\n    (envelope-from <gitlab@example.com>)\n    for <me@example.com>; Tue, 13 Jun 2023 19:01:08 +0000";

        let (rest, parsed) = received_log(hdrs).unwrap();
        assert_eq!(rest, "");
        assert!(parsed.info.starts_with("from smtp.example.com"));
        assert!(parsed.info.contains("(envelope-from <gitlab@example.com>)"));
        assert_eq!(
            parsed.date.unwrap().resolve(),
            Ok(FixedOffset::east_opt(0)
                .unwrap()
                .with_ymd_and_hms(2023, 6, 13, 19, 1, 8)
                .unwrap()),
        );
    }

    #[test]
    fn test_received_log_without_date() {
        let (_, parsed) = received_log("by mail.example.com with SMTP").unwrap();
        assert_eq!(parsed.info, "by mail.example.com with SMTP");
        assert_eq!(parsed.date, None);
    }

    #[test]
    fn test_return_path() {
        assert_eq!(
            return_path("<gitlab@example.com>").unwrap().1,
            ReturnPath(Some(AddrSpec {
                local_part: "gitlab".to_string(),
                domain: "example.com".to_string(),
            })),
        );
        assert_eq!(return_path("<>").unwrap().1, ReturnPath(None));
    }

    #[test]
    fn test_envelope_from() {
        let (rest, parsed) =
            envelope_from("jamis@marshmallow.local Mon Aug 17 00:39:21 2009").unwrap();
        assert_eq!(rest, "");
        assert_eq!(parsed.addrspec.to_string(), "jamis@marshmallow.local");
        assert_eq!(
            parsed.date.resolve(),
            Ok(FixedOffset::east_opt(0)
                .unwrap()
                .with_ymd_and_hms(2009, 8, 17, 0, 39, 21)
                .unwrap()),
        );
    }
}
