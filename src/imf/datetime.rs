use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Timelike};
use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case},
    character::complete::{alpha1, char, digit1, one_of},
    combinator::{map, opt, recognize},
    sequence::{pair, preceded, terminated, tuple},
    IResult,
};

use crate::error::ParseError;
use crate::print::{Folder, Print};
use crate::text::whitespace::{cfws, fws};

pub(crate) const DAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
pub(crate) const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// The raw `date` and `time` substrings of a date-time field.
///
/// The grammar only recognizes the shape; turning it into a calendar value
/// happens on demand through [`DateTimeValue::resolve`], so that a header
/// with a slightly broken date still parses and the failure is reported
/// where the caller actually asks for the timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateTimeValue {
    pub date: String,
    pub time: String,
}

impl DateTimeValue {
    pub fn from_timestamp(dt: &DateTime<FixedOffset>) -> Self {
        DateTimeValue {
            date: format!(
                "{} {} {}",
                dt.day(),
                MONTHS[dt.month0() as usize],
                dt.year()
            ),
            time: format!(
                "{:02}:{:02}:{:02} {}",
                dt.hour(),
                dt.minute(),
                dt.second(),
                zone_string(dt.offset().local_minus_utc()),
            ),
        }
    }

    /// Combine the raw substrings into a calendar timestamp.
    ///
    /// Accepts the RFC 5322 forms plus the usual legacy variants:
    /// two-digit years, dash separators, numeric months, named or missing
    /// time zones.
    pub fn resolve(&self) -> Result<DateTime<FixedOffset>, ParseError> {
        let err = || ParseError::Grammar {
            element: "date-time",
            input: format!("{} {}", self.date, self.time),
            consumed: 0,
        };

        let mut parts = self
            .date
            .split(|c: char| c == ' ' || c == '\t' || c == '-')
            .filter(|s| !s.is_empty());
        let day: u32 = parts.next().and_then(|s| s.parse().ok()).ok_or_else(err)?;
        let month = parts.next().and_then(month_number).ok_or_else(err)?;
        let year_raw: i32 = parts.next().and_then(|s| s.parse().ok()).ok_or_else(err)?;
        let year = adjust_year(year_raw);

        let hms_end = self
            .time
            .find(|c: char| !c.is_ascii_digit() && c != ':')
            .unwrap_or(self.time.len());
        let (hms, zone) = self.time.split_at(hms_end);
        let mut clock = hms.split(':');
        let hour: u32 = clock.next().and_then(|s| s.parse().ok()).ok_or_else(err)?;
        let minute: u32 = clock.next().and_then(|s| s.parse().ok()).ok_or_else(err)?;
        let second: u32 = clock.next().and_then(|s| s.parse().ok()).unwrap_or(0);

        let offset =
            FixedOffset::east_opt(zone_offset_seconds(zone.trim())).ok_or_else(err)?;
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_opt(hour, minute, second))
            .and_then(|ndt| ndt.and_local_timezone(offset).earliest())
            .ok_or_else(err)
    }
}

impl Print for DateTimeValue {
    fn print(&self, fmt: &mut Folder) {
        match self.resolve() {
            Ok(dt) => print_timestamp(&dt, fmt),
            // unresolvable dates are echoed back as captured
            Err(_) => {
                fmt.write_str(&self.date);
                fmt.write_fws();
                fmt.write_str(&self.time);
            }
        }
    }
}

pub(crate) fn print_timestamp(dt: &DateTime<FixedOffset>, fmt: &mut Folder) {
    fmt.write_str(DAYS[dt.weekday().num_days_from_monday() as usize]);
    fmt.write_str(",");
    fmt.write_fws();
    fmt.write_str(&dt.day().to_string());
    fmt.write_fws();
    fmt.write_str(MONTHS[dt.month0() as usize]);
    fmt.write_fws();
    fmt.write_str(&dt.year().to_string());
    fmt.write_fws();
    fmt.write_str(&format!(
        "{:02}:{:02}:{:02}",
        dt.hour(),
        dt.minute(),
        dt.second()
    ));
    fmt.write_fws();
    fmt.write_str(&zone_string(dt.offset().local_minus_utc()));
}

fn zone_string(offset_secs: i32) -> String {
    let sign = if offset_secs >= 0 { '+' } else { '-' };
    let hours = offset_secs.abs() / 3600;
    let minutes = offset_secs.abs() % 3600 / 60;
    format!("{}{:02}{:02}", sign, hours, minutes)
}

/// Read datetime
///
/// ```abnf
/// date-time       =   [ day-of-week "," ] date time [CFWS]
/// date            =   day month year
/// time            =   time-of-day zone
/// ```
///
/// The day-of-week, when present, is checked against the day names but
/// otherwise ignored; `-0000` is interpreted as UTC.
pub fn date_time(input: &str) -> IResult<&str, DateTimeValue> {
    let (input, _) = opt(cfws)(input)?;
    let (input, _) = opt(terminated(
        day_name,
        tuple((opt(fws), char(','), opt(fws))),
    ))(input)?;
    let (input, date_raw) = recognize(tuple((
        digit1,
        date_separator,
        alt((month_name, digit1)),
        date_separator,
        digit1,
    )))(input)?;
    let (input, _) = opt(fws)(input)?;
    let (input, time_raw) = recognize(tuple((
        digit1,
        char(':'),
        digit1,
        opt(preceded(char(':'), digit1)),
        opt(zone),
    )))(input)?;
    let (input, _) = opt(cfws)(input)?;
    Ok((
        input,
        DateTimeValue {
            date: date_raw.trim().to_string(),
            time: time_raw.trim().to_string(),
        },
    ))
}

fn date_separator(input: &str) -> IResult<&str, ()> {
    alt((fws, map(tag("-"), |_| ())))(input)
}

///   day-name        =   "Mon" / "Tue" / "Wed" / "Thu" /
///                       "Fri" / "Sat" / "Sun"
pub(crate) fn day_name(input: &str) -> IResult<&str, &str> {
    alt((
        tag_no_case("Mon"),
        tag_no_case("Tue"),
        tag_no_case("Wed"),
        tag_no_case("Thu"),
        tag_no_case("Fri"),
        tag_no_case("Sat"),
        tag_no_case("Sun"),
    ))(input)
}

///  month           =   "Jan" / "Feb" / "Mar" / "Apr" /
///                      "May" / "Jun" / "Jul" / "Aug" /
///                      "Sep" / "Oct" / "Nov" / "Dec"
pub(crate) fn month_name(input: &str) -> IResult<&str, &str> {
    alt((
        tag_no_case("Jan"),
        tag_no_case("Feb"),
        tag_no_case("Mar"),
        tag_no_case("Apr"),
        tag_no_case("May"),
        tag_no_case("Jun"),
        tag_no_case("Jul"),
        tag_no_case("Aug"),
        tag_no_case("Sep"),
        tag_no_case("Oct"),
        tag_no_case("Nov"),
        tag_no_case("Dec"),
    ))(input)
}

/// zone = (FWS ( "+" / "-" ) 4DIGIT) / obs-zone
fn zone(input: &str) -> IResult<&str, &str> {
    preceded(
        opt(fws),
        alt((recognize(pair(one_of("+-"), digit1)), alpha1)),
    )(input)
}

fn month_number(token: &str) -> Option<u32> {
    if let Ok(n @ 1..=12) = token.parse::<u32>() {
        return Some(n);
    }
    let lowered = token.to_ascii_lowercase();
    MONTHS
        .iter()
        .position(|m| m.to_ascii_lowercase() == lowered.get(..3).unwrap_or(""))
        .map(|i| i as u32 + 1)
}

/// RFC 5322 §4.3: two-digit years below 50 are in the 2000s, other
/// years below 1000 get 1900 added.
fn adjust_year(year: i32) -> i32 {
    if (0..50).contains(&year) {
        year + 2000
    } else if (50..1000).contains(&year) {
        year + 1900
    } else {
        year
    }
}

/// Named, military and numeric zones. Unknown names and the military
/// single letters count as UTC, as RFC 5322 recommends for zones whose
/// offset cannot be trusted.
fn zone_offset_seconds(zone: &str) -> i32 {
    match zone.to_ascii_uppercase().as_str() {
        "" | "UT" | "GMT" | "Z" => 0,
        "EST" => -5 * 3600,
        "EDT" => -4 * 3600,
        "CST" => -6 * 3600,
        "CDT" => -5 * 3600,
        "MST" => -7 * 3600,
        "MDT" => -6 * 3600,
        "PST" => -8 * 3600,
        "PDT" => -7 * 3600,
        z => {
            let (sign, digits) = match z.as_bytes().first() {
                Some(b'+') => (1, &z[1..]),
                Some(b'-') => (-1, &z[1..]),
                _ => return 0,
            };
            if digits.len() != 4 {
                return 0;
            }
            let hours: i32 = digits[..2].parse().unwrap_or(0);
            let minutes: i32 = digits[2..].parse().unwrap_or(0);
            sign * (hours * 3600 + minutes * 60)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(
        offset: i32,
        y: i32,
        mo: u32,
        d: u32,
        h: u32,
        mi: u32,
        s: u32,
    ) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(offset)
            .unwrap()
            .with_ymd_and_hms(y, mo, d, h, mi, s)
            .unwrap()
    }

    #[test]
    fn test_date_time_strict() {
        let (rest, dt) = date_time("Tue, 13 Jun 2023 19:01:08 +0000").unwrap();
        assert_eq!(rest, "");
        assert_eq!(dt.date, "13 Jun 2023");
        assert_eq!(dt.time, "19:01:08 +0000");
        assert_eq!(dt.resolve(), Ok(ts(0, 2023, 6, 13, 19, 1, 8)));
    }

    #[test]
    fn test_date_time_without_day_name() {
        let (_, dt) = date_time("7 Mar 2023 08:00:00 +0200").unwrap();
        assert_eq!(dt.resolve(), Ok(ts(2 * 3600, 2023, 3, 7, 8, 0, 0)));
    }

    #[test]
    fn test_date_time_legacy() {
        // two-digit year and named zone
        let (_, dt) = date_time("21 Nov 97 09:55:06 GMT").unwrap();
        assert_eq!(dt.resolve(), Ok(ts(0, 1997, 11, 21, 9, 55, 6)));

        // dash separators
        let (_, dt) = date_time("21-Nov-1997 09:55:06 -0600").unwrap();
        assert_eq!(dt.resolve(), Ok(ts(-6 * 3600, 1997, 11, 21, 9, 55, 6)));

        // missing seconds and missing zone
        let (_, dt) = date_time("1 Jan 2020 12:30").unwrap();
        assert_eq!(dt.resolve(), Ok(ts(0, 2020, 1, 1, 12, 30, 0)));
    }

    #[test]
    fn test_unresolvable_date_reported() {
        let (_, dt) = date_time("45 Foo 2023 19:01:08 +0000").unwrap_or((
            "",
            DateTimeValue {
                date: "45 Foo 2023".to_string(),
                time: "19:01:08 +0000".to_string(),
            },
        ));
        assert!(dt.resolve().is_err());
    }

    #[test]
    fn test_print_canonical() {
        let (_, dt) = date_time("13 Jun 2023 19:01:08 +0000").unwrap();
        assert_eq!(
            crate::print::folded(|f| dt.print(f)),
            "Tue, 13 Jun 2023 19:01:08 +0000",
        );
    }
}
