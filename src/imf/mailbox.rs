use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    combinator::{map, opt},
    multi::{many0, separated_list1},
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult,
};
use std::fmt;

use crate::print::{Folder, Print};
use crate::text::misc_token::{phrase, word, Phrase, Word};
use crate::text::quoted::quote_local_part;
use crate::text::whitespace::{cfws, fws};
use crate::text::words::atom;

/// AddrSpec
///
/// The bare `local-part "@" domain` email address. Both halves are stored
/// decoded; the local part is re-quoted on output when it is not a
/// dot-atom.
#[derive(Clone, PartialEq, Eq)]
pub struct AddrSpec {
    pub local_part: String,
    pub domain: String,
}

impl AddrSpec {
    pub fn to_string(&self) -> String {
        format!("{}@{}", self.local_part, self.domain)
    }
}

impl fmt::Debug for AddrSpec {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_tuple("AddrSpec")
            .field(&format_args!("\"{}\"", self.to_string()))
            .finish()
    }
}

impl Print for AddrSpec {
    fn print(&self, fmt: &mut Folder) {
        fmt.write_str(&quote_local_part(&self.local_part));
        fmt.write_str("@");
        fmt.write_str(&self.domain);
    }
}

/// Mailbox: an address with an optional display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailboxRef {
    pub name: Option<Phrase>,
    pub addrspec: AddrSpec,
}

impl MailboxRef {
    /// Decoded form: `Display Name <local@domain>` or the bare addr-spec.
    pub fn to_string(&self) -> String {
        match &self.name {
            Some(n) => format!("{} <{}>", n.to_string(), self.addrspec.to_string()),
            None => self.addrspec.to_string(),
        }
    }
}

impl From<AddrSpec> for MailboxRef {
    fn from(addrspec: AddrSpec) -> Self {
        MailboxRef {
            name: None,
            addrspec,
        }
    }
}

impl Print for MailboxRef {
    fn print(&self, fmt: &mut Folder) {
        match &self.name {
            Some(name) => {
                name.print(fmt);
                fmt.write_fws();
                fmt.write_str("<");
                self.addrspec.print(fmt);
                fmt.write_str(">");
            }
            None => self.addrspec.print(fmt),
        }
    }
}

pub type MailboxList = Vec<MailboxRef>;

/// Mailbox
///
/// ```abnf
///    mailbox         =   name-addr / addr-spec
/// ```
pub fn mailbox(input: &str) -> IResult<&str, MailboxRef> {
    alt((name_addr, map(addr_spec, MailboxRef::from)))(input)
}

/// Mailbox list
///
/// ```abnf
///    mailbox-list    =   (mailbox *("," mailbox)) / obs-mbox-list
/// ```
///
/// Empty list items (consecutive commas, stray CFWS) are dropped.
pub fn mailbox_list(input: &str) -> IResult<&str, MailboxList> {
    map(
        separated_list1(
            tag(","),
            alt((map(mailbox, Some), map(opt(cfws), |_| None))),
        ),
        |mboxes| mboxes.into_iter().flatten().collect(),
    )(input)
}

/// Name of the email address
///
/// ```abnf
///    name-addr       =   [display-name] angle-addr
/// ```
fn name_addr(input: &str) -> IResult<&str, MailboxRef> {
    let (input, name) = opt(phrase)(input)?;
    let (input, addrspec) = angle_addr(input)?;
    Ok((input, MailboxRef { name, addrspec }))
}

/// Enclosed addr-spec with < and >
///
/// ```abnf
/// angle-addr      =   [CFWS] "<" addr-spec ">" [CFWS] /
///                     obs-angle-addr
/// ```
pub fn angle_addr(input: &str) -> IResult<&str, AddrSpec> {
    delimited(
        tuple((opt(cfws), tag("<"), opt(obs_route))),
        addr_spec,
        pair(tag(">"), opt(cfws)),
    )(input)
}

///    obs-route       =   obs-domain-list ":"
fn obs_route(input: &str) -> IResult<&str, Vec<Option<String>>> {
    terminated(obs_domain_list, tag(":"))(input)
}

/// ```abnf
///    obs-domain-list =   *(CFWS / ",") "@" domain
///                        *("," [CFWS] ["@" domain])
/// ```
fn obs_domain_list(input: &str) -> IResult<&str, Vec<Option<String>>> {
    preceded(
        many0(cfws),
        separated_list1(
            tag(","),
            preceded(many0(cfws), opt(preceded(tag("@"), obs_domain))),
        ),
    )(input)
}

/// AddrSpec
///
/// ```abnf
///    addr-spec       =   local-part "@" domain
/// ```
///
/// The obsolete syntax is used throughout since it is a superset of the
/// strict one; extra `@domain` tails are tolerated for compatibility with
/// addresses found in the wild (Enron corpus).
pub fn addr_spec(input: &str) -> IResult<&str, AddrSpec> {
    map(
        tuple((
            obs_local_part,
            tag("@"),
            obs_domain,
            many0(pair(tag("@"), obs_domain)),
        )),
        |(local_part, _, domain, _)| AddrSpec { local_part, domain },
    )(input)
}

/// Obsolete local part
///
/// Compared to the RFC, multiple and leading/trailing dots are allowed;
/// such addresses exist in the wild and are accepted by large providers.
///
/// ```abnf
/// obs-local-part  =  *("." / word)
/// ```
fn obs_local_part(input: &str) -> IResult<&str, String> {
    map(
        many0(alt((
            map(tag("."), |_| Word::Atom(".".to_string())),
            word,
        ))),
        |tokens| {
            tokens.iter().fold(String::new(), |mut acc, t| {
                acc.push_str(t.as_str());
                acc
            })
        },
    )(input)
}

/// Obsolete domain
///
/// ```abnf
///  obs-domain      =   atom *("." atom) / domain-literal
/// ```
pub fn obs_domain(input: &str) -> IResult<&str, String> {
    alt((
        map(separated_list1(tag("."), atom), |atoms| atoms.join(".")),
        domain_literal,
    ))(input)
}

/// Domain literal
///
/// ```abnf
///    domain-literal  =   [CFWS] "[" *([FWS] dtext) [FWS] "]" [CFWS]
/// ```
fn domain_literal(input: &str) -> IResult<&str, String> {
    map(
        delimited(
            pair(opt(cfws), tag("[")),
            terminated(many0(preceded(opt(fws), take_while1(is_dtext))), opt(fws)),
            pair(tag("]"), opt(cfws)),
        ),
        |parts: Vec<&str>| format!("[{}]", parts.join(" ")),
    )(input)
}

/// Is domain text
///
/// ```abnf
///   dtext           =   %d33-90 /          ; Printable US-ASCII
///                       %d94-126 /         ;  characters not including
///                       obs-dtext          ;  "[", "]", or "\"
/// ```
pub fn is_dtext(c: char) -> bool {
    matches!(c, '!'..='Z' | '^'..='~') || !c.is_ascii()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::print::folded;

    #[test]
    fn test_addr_spec() {
        assert_eq!(
            addr_spec("alice@example.com"),
            Ok((
                "",
                AddrSpec {
                    local_part: "alice".to_string(),
                    domain: "example.com".to_string(),
                }
            ))
        );

        assert_eq!(
            addr_spec("jsmith@[192.168.2.1]").unwrap().1.to_string(),
            "jsmith@[192.168.2.1]".to_string(),
        );
        assert_eq!(
            addr_spec("user+mailbox/department=shipping@example.com")
                .unwrap()
                .1
                .to_string(),
            "user+mailbox/department=shipping@example.com".to_string(),
        );
        assert_eq!(
            addr_spec(r#""Abc@def"@example.com"#),
            Ok((
                "",
                AddrSpec {
                    local_part: "Abc@def".to_string(),
                    domain: "example.com".to_string(),
                }
            ))
        );
    }

    #[test]
    fn test_addr_spec_requote() {
        let (_, spec) = addr_spec(r#""Abc@def"@example.com"#).unwrap();
        assert_eq!(folded(|f| spec.print(f)), r#""Abc@def"@example.com"#);
    }

    #[test]
    fn test_mailbox() {
        assert_eq!(
            mailbox(r#""Joe Q. Public" <john.q.public@example.com>"#)
                .unwrap()
                .1
                .to_string(),
            "Joe Q. Public <john.q.public@example.com>".to_string(),
        );
        assert_eq!(
            mailbox("Mary Smith <mary@x.test>").unwrap().1,
            MailboxRef {
                name: Some(Phrase(vec![
                    crate::text::misc_token::PhraseToken::Word(Word::Atom("Mary".to_string())),
                    crate::text::misc_token::PhraseToken::Word(Word::Atom("Smith".to_string())),
                ])),
                addrspec: AddrSpec {
                    local_part: "mary".to_string(),
                    domain: "x.test".to_string(),
                }
            },
        );
        assert_eq!(
            mailbox("<boss@nil.test>").unwrap().1.to_string(),
            "boss@nil.test".to_string(),
        );
        assert_eq!(
            mailbox("Pete(A nice \\) chap) <pete(his account)@silly.test(his host)>")
                .unwrap()
                .1
                .to_string(),
            "Pete <pete@silly.test>".to_string(),
        );
    }

    #[test]
    fn test_enron_local_parts() {
        assert_eq!(
            addr_spec("a..howard@enron.com").unwrap().1.local_part,
            "a..howard",
        );
        assert_eq!(
            addr_spec(".nelson@enron.com").unwrap().1.local_part,
            ".nelson",
        );
        assert_eq!(
            addr_spec("ecn2760.conf.@enron.com").unwrap().1.local_part,
            "ecn2760.conf.",
        );
    }

    #[test]
    fn test_mailbox_list_drops_empty_items() {
        let (rest, list) = mailbox_list("mary@x.test,, jdoe@example.org,").unwrap();
        assert_eq!(rest, "");
        assert_eq!(
            list.iter().map(|m| m.to_string()).collect::<Vec<_>>(),
            vec!["mary@x.test", "jdoe@example.org"],
        );
    }
}
