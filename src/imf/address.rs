use nom::{
    branch::alt,
    bytes::complete::tag,
    combinator::{map, opt},
    multi::separated_list1,
    sequence::tuple,
    IResult,
};

use crate::imf::mailbox::{mailbox, mailbox_list, MailboxRef};
use crate::print::{print_seq, Folder, Print};
use crate::text::misc_token::{phrase, Phrase};
use crate::text::whitespace::cfws;

/// A named collection of mailboxes, e.g. `team: a@x.com, b@x.com;`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRef {
    pub name: Phrase,
    pub participants: Vec<MailboxRef>,
}

impl GroupRef {
    pub fn to_string(&self) -> String {
        format!(
            "{}: {};",
            self.name.to_string(),
            self.participants
                .iter()
                .map(|m| m.to_string())
                .collect::<Vec<_>>()
                .join(", "),
        )
    }
}

impl Print for GroupRef {
    fn print(&self, fmt: &mut Folder) {
        self.name.print(fmt);
        fmt.write_str(":");
        fmt.write_fws();
        print_seq(fmt, &self.participants, |fmt| {
            fmt.write_str(",");
            fmt.write_fws();
        });
        fmt.write_str(";");
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressRef {
    Single(MailboxRef),
    Many(GroupRef),
}

impl AddressRef {
    pub fn to_string(&self) -> String {
        match self {
            AddressRef::Single(m) => m.to_string(),
            AddressRef::Many(g) => g.to_string(),
        }
    }

    /// The addr-specs carried by this address, groups flattened.
    pub fn addr_specs(&self) -> Vec<&crate::imf::mailbox::AddrSpec> {
        match self {
            AddressRef::Single(m) => vec![&m.addrspec],
            AddressRef::Many(g) => g.participants.iter().map(|m| &m.addrspec).collect(),
        }
    }
}

impl From<MailboxRef> for AddressRef {
    fn from(mbox: MailboxRef) -> Self {
        AddressRef::Single(mbox)
    }
}

impl From<GroupRef> for AddressRef {
    fn from(group: GroupRef) -> Self {
        AddressRef::Many(group)
    }
}

impl Print for AddressRef {
    fn print(&self, fmt: &mut Folder) {
        match self {
            AddressRef::Single(m) => m.print(fmt),
            AddressRef::Many(g) => g.print(fmt),
        }
    }
}

pub type AddressList = Vec<AddressRef>;

/// Address (section 3.4 of RFC5322)
///
/// ```abnf
///    address         =   mailbox / group
/// ```
pub fn address(input: &str) -> IResult<&str, AddressRef> {
    alt((
        map(group, AddressRef::Many),
        map(mailbox, AddressRef::Single),
    ))(input)
}

/// Group
///
/// ```abnf
///    group           =   display-name ":" [group-list] ";" [CFWS]
///    display-name    =   phrase
/// ```
///
/// Empty group bodies (nothing between `:` and `;`) are fine.
pub fn group(input: &str) -> IResult<&str, GroupRef> {
    let (input, (name, _, participants, _, _)) =
        tuple((phrase, tag(":"), opt(group_list), tag(";"), opt(cfws)))(input)?;

    Ok((
        input,
        GroupRef {
            name,
            participants: participants.unwrap_or_default(),
        },
    ))
}

/// Group list
///
/// ```abnf
///    group-list      =   mailbox-list / CFWS / obs-group-list
/// ```
fn group_list(input: &str) -> IResult<&str, Vec<MailboxRef>> {
    alt((mailbox_list, map(cfws, |_| vec![])))(input)
}

/// Address list
///
/// ```abnf
///   address-list    =   (address *("," address)) / obs-addr-list
/// ```
///
/// Empty list items are dropped silently instead of failing the whole
/// list, matching what real-world senders produce (consecutive commas,
/// trailing commas, stray comments).
pub fn address_list(input: &str) -> IResult<&str, AddressList> {
    map(
        separated_list1(
            tag(","),
            alt((map(address, Some), map(opt(cfws), |_| None))),
        ),
        |addrs| addrs.into_iter().flatten().collect(),
    )(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::print::folded;

    #[test]
    fn test_address_list_with_group() {
        let (rest, parsed) = address_list(
            "A Group:Ed Jones <c@a.test>,joe@where.test;, Mary Smith <mary@x.test>",
        )
        .unwrap();
        assert_eq!(rest, "");
        assert_eq!(parsed.len(), 2);
        assert_eq!(
            parsed[0].to_string(),
            "A Group: Ed Jones <c@a.test>, joe@where.test;",
        );
        assert_eq!(parsed[1].to_string(), "Mary Smith <mary@x.test>");
    }

    #[test]
    fn test_empty_group() {
        let (rest, parsed) = address_list("Undisclosed recipients:;").unwrap();
        assert_eq!(rest, "");
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].addr_specs().len(), 0);
    }

    #[test]
    fn test_address_list_drops_empty_items() {
        let (rest, parsed) = address_list("a@b.com,,c@d.com").unwrap();
        assert_eq!(rest, "");
        assert_eq!(
            parsed.iter().map(|a| a.to_string()).collect::<Vec<_>>(),
            vec!["a@b.com", "c@d.com"],
        );
    }

    #[test]
    fn test_print_group() {
        let (_, parsed) = address_list("friends:jane@example.com,john@example.com;").unwrap();
        assert_eq!(
            folded(|f| parsed[0].print(f)),
            "friends: jane@example.com, john@example.com;",
        );
    }
}
