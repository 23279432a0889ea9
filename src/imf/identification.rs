use nom::{
    branch::alt,
    bytes::complete::{tag, take_while},
    character::complete::char,
    combinator::{map, opt},
    multi::{many0, many1},
    sequence::{delimited, pair, preceded, separated_pair, terminated},
    IResult,
};
use std::fmt;

use crate::imf::mailbox::is_dtext;
use crate::print::{Folder, Print};
use crate::text::whitespace::cfws;
use crate::text::words::dot_atom_text;

/// Message identifier
///
/// Stored normalized as `left@right` without the angle brackets; the
/// brackets are always re-added on output, whether or not the input had
/// them.
#[derive(Clone, PartialEq, Eq)]
pub struct MessageID {
    pub left: String,
    pub right: String,
}

impl MessageID {
    pub fn to_string(&self) -> String {
        format!("{}@{}", self.left, self.right)
    }
}

impl fmt::Debug for MessageID {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_tuple("MessageID")
            .field(&format_args!("\"{}\"", self.to_string()))
            .finish()
    }
}

impl Print for MessageID {
    fn print(&self, fmt: &mut Folder) {
        fmt.write_str("<");
        fmt.write_str(&self.left);
        fmt.write_str("@");
        fmt.write_str(&self.right);
        fmt.write_str(">");
    }
}

pub type MessageIDList = Vec<MessageID>;

/// Message identifier
///
/// ```abnf
///    msg-id          =   [CFWS] "<" id-left "@" id-right ">" [CFWS]
/// ```
///
/// Bare `local@domain` tokens without brackets are tolerated.
pub fn msg_id(input: &str) -> IResult<&str, MessageID> {
    alt((
        delimited(
            pair(opt(cfws), tag("<")),
            id_pair,
            pair(tag(">"), opt(cfws)),
        ),
        delimited(opt(cfws), id_pair, opt(cfws)),
    ))(input)
}

fn id_pair(input: &str) -> IResult<&str, MessageID> {
    map(
        separated_pair(id_left, char('@'), id_right),
        |(left, right)| MessageID {
            left: left.to_string(),
            right: right.to_string(),
        },
    )(input)
}

fn id_left(input: &str) -> IResult<&str, &str> {
    dot_atom_text(input)
}

fn id_right(input: &str) -> IResult<&str, &str> {
    alt((dot_atom_text, no_fold_literal))(input)
}

fn no_fold_literal(input: &str) -> IResult<&str, &str> {
    nom::combinator::recognize(delimited(tag("["), take_while(is_dtext), tag("]")))(input)
}

/// A whitespace- and comma-tolerant sequence of message identifiers,
/// as found in In-Reply-To and References.
pub fn msg_id_list(input: &str) -> IResult<&str, MessageIDList> {
    terminated(
        many1(preceded(id_junk, msg_id)),
        id_junk,
    )(input)
}

// separators seen in the wild between ids: commas, CFWS, or nothing
fn id_junk(input: &str) -> IResult<&str, ()> {
    map(many0(alt((map(char(','), |_| ()), cfws))), |_| ())(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::print::folded;

    #[test]
    fn test_msg_id() {
        assert_eq!(
            msg_id("<5678.21-Nov-1997@example.com>"),
            Ok((
                "",
                MessageID {
                    left: "5678.21-Nov-1997".to_string(),
                    right: "example.com".to_string(),
                }
            )),
        );
    }

    #[test]
    fn test_msg_id_without_brackets() {
        let (rest, id) = msg_id("1234@local.machine.example  ").unwrap();
        assert_eq!(rest, "");
        assert_eq!(id.to_string(), "1234@local.machine.example");
    }

    #[test]
    fn test_msg_id_brackets_restored() {
        let (_, id) = msg_id("1234@local.machine.example").unwrap();
        assert_eq!(folded(|f| id.print(f)), "<1234@local.machine.example>");
    }

    #[test]
    fn test_msg_id_list() {
        let (rest, ids) =
            msg_id_list("<1234@local.machine.example> (comment),<3456@example.net>").unwrap();
        assert_eq!(rest, "");
        assert_eq!(
            ids.iter().map(|i| i.to_string()).collect::<Vec<_>>(),
            vec!["1234@local.machine.example", "3456@example.net"],
        );
    }
}
