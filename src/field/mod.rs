/// Typed header fields: one body variant per grammar, a dispatcher that
/// picks the variant from the field name, and the canonical name/order
/// tables.
pub mod dispatch;
mod generate;
pub mod name;

use chrono::{DateTime, FixedOffset};
use std::cmp::Ordering;

use crate::error::ParseError;
use crate::imf::address::{AddressList, AddressRef};
use crate::imf::datetime::DateTimeValue;
use crate::imf::identification::{MessageID, MessageIDList};
use crate::imf::mailbox::{MailboxList, MailboxRef};
use crate::imf::trace::{ReceivedLog, ReturnPath};
use crate::mime::charset::EmailCharset;
use crate::mime::disposition::ContentDisposition;
use crate::mime::location::Location;
use crate::mime::mechanism::{Mechanism, TransferEncoding};
use crate::mime::r#type::{ContentType, Parameter};
use crate::mime::version::Version;
use crate::print::{print_seq, Folder, Print};
use crate::text::encoding::b_encode_words;
use crate::text::misc_token::{PhraseList, Unstructured};
use self::name::{FieldName, StandardField};

/// The parsed element a field wraps, one variant per grammar.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldBody {
    AddressList(AddressList),
    MailboxList(MailboxList),
    Mailbox(MailboxRef),
    DateTime(DateTimeValue),
    MessageId(MessageID),
    MessageIdList(MessageIDList),
    ContentType(ContentType),
    ContentDisposition(ContentDisposition),
    Mechanism(Mechanism),
    Version(Version),
    Location(Location),
    PhraseList(PhraseList),
    Received(ReceivedLog),
    ReturnPath(ReturnPath),
    /// Unknown fields, genuinely unstructured fields (Subject, Comments,
    /// Content-Description) and the fallback for values a structured
    /// grammar rejected.
    Unstructured(Unstructured),
}

/// A single header field: a name, the raw value text, and the parsed body.
///
/// Fields are parsed on construction and re-parsed on mutation; there is
/// no lazy cache to invalidate. Assigning a new value replaces the body
/// wholesale.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub(crate) name: FieldName,
    pub(crate) raw: String,
    pub(crate) body: FieldBody,
    pub(crate) charset: EmailCharset,
}

impl Field {
    /// Canonical-cased field name, e.g. `Message-ID` for `message-id`.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn field_name(&self) -> &FieldName {
        &self.name
    }

    /// The raw value text this field was built from (or generated).
    pub fn value(&self) -> &str {
        &self.raw
    }

    pub fn body(&self) -> &FieldBody {
        &self.body
    }

    /// Replace the value; the grammar runs again and the parsed body is
    /// rebuilt. The charset survives the mutation.
    pub fn set_value(&mut self, value: &str) {
        let charset = self.charset;
        *self = Field::build(self.name.clone(), value);
        self.charset = charset;
    }

    /// Charset used when the value needs RFC 2047 encoding on output.
    pub fn set_charset(&mut self, charset: EmailCharset) {
        self.charset = charset;
    }

    /// True when a structured field's value failed its grammar and the
    /// dispatcher degraded it to an unstructured body.
    pub fn is_degraded(&self) -> bool {
        use StandardField::*;
        match self.name.standard() {
            Some(Subject) | Some(Comments) | Some(ContentDescription) | None => false,
            Some(_) => matches!(self.body, FieldBody::Unstructured(_)),
        }
    }

    /// Two fields are "the same" when their names match case-insensitively.
    pub fn same_name(&self, other: &Field) -> bool {
        self.name.matches(other.name.as_str())
    }

    pub fn is_singular(&self) -> bool {
        self.name
            .standard()
            .map(|s| s.is_singular())
            .unwrap_or(false)
    }

    pub(crate) fn rank(&self) -> usize {
        self.name.rank()
    }

    /// Sort key for canonical header layout; compares names only.
    pub fn cmp_order(&self, other: &Field) -> Ordering {
        self.rank().cmp(&other.rank())
    }

    // --- semantic accessors

    /// All addr-specs carried by this field, groups flattened.
    /// Empty for fields without addresses (including degraded ones).
    pub fn addresses(&self) -> Vec<String> {
        match &self.body {
            FieldBody::AddressList(list) => list
                .iter()
                .flat_map(|a| a.addr_specs())
                .map(|s| s.to_string())
                .collect(),
            FieldBody::MailboxList(list) => {
                list.iter().map(|m| m.addrspec.to_string()).collect()
            }
            FieldBody::Mailbox(m) => vec![m.addrspec.to_string()],
            FieldBody::ReturnPath(ReturnPath(Some(spec))) => vec![spec.to_string()],
            _ => vec![],
        }
    }

    /// Like [`Field::addresses`], but re-runs the address grammar on a
    /// degraded field and surfaces its parse error. This is the strict
    /// path for callers that explicitly asked for structured data.
    pub fn try_addresses(&self) -> Result<Vec<String>, ParseError> {
        let address_named = self
            .name
            .standard()
            .map(|s| s.takes_addresses())
            .unwrap_or(false);
        if address_named && matches!(self.body, FieldBody::Unstructured(_)) {
            crate::error::run(
                "address-list",
                crate::imf::address::address_list,
                self.raw.trim(),
            )
            .map(|list| {
                list.iter()
                    .flat_map(|a| a.addr_specs())
                    .map(|s| s.to_string())
                    .collect()
            })
        } else {
            Ok(self.addresses())
        }
    }

    /// The individual mailboxes, groups flattened.
    pub fn mailboxes(&self) -> Vec<&MailboxRef> {
        match &self.body {
            FieldBody::AddressList(list) => list
                .iter()
                .flat_map(|a| match a {
                    AddressRef::Single(m) => vec![m],
                    AddressRef::Many(g) => g.participants.iter().collect(),
                })
                .collect(),
            FieldBody::MailboxList(list) => list.iter().collect(),
            FieldBody::Mailbox(m) => vec![m],
            _ => vec![],
        }
    }

    /// Names of the groups in an address list field.
    pub fn group_names(&self) -> Vec<String> {
        match &self.body {
            FieldBody::AddressList(list) => list
                .iter()
                .filter_map(|a| match a {
                    AddressRef::Many(g) => Some(g.name.to_string()),
                    AddressRef::Single(_) => None,
                })
                .collect(),
            _ => vec![],
        }
    }

    /// The identifier of a Message-ID/Content-ID shaped field, without
    /// angle brackets.
    pub fn message_id(&self) -> Option<String> {
        match &self.body {
            FieldBody::MessageId(id) => Some(id.to_string()),
            _ => None,
        }
    }

    /// All identifiers (In-Reply-To, References), without angle brackets.
    pub fn message_ids(&self) -> Vec<String> {
        match &self.body {
            FieldBody::MessageId(id) => vec![id.to_string()],
            FieldBody::MessageIdList(ids) => ids.iter().map(|i| i.to_string()).collect(),
            _ => vec![],
        }
    }

    /// The field's calendar timestamp, if it has one and it resolves.
    pub fn date_time(&self) -> Option<DateTime<FixedOffset>> {
        self.try_date_time().ok()
    }

    /// Strict variant: reports why the timestamp cannot be produced.
    pub fn try_date_time(&self) -> Result<DateTime<FixedOffset>, ParseError> {
        match &self.body {
            FieldBody::DateTime(d) => d.resolve(),
            FieldBody::Received(r) => match &r.date {
                Some(d) => d.resolve(),
                None => Err(ParseError::Grammar {
                    element: "date-time",
                    input: self.raw.clone(),
                    consumed: 0,
                }),
            },
            _ => Err(ParseError::Grammar {
                element: "date-time",
                input: self.raw.clone(),
                consumed: 0,
            }),
        }
    }

    /// `main/sub` of a Content-Type field.
    pub fn content_type(&self) -> Option<String> {
        match &self.body {
            FieldBody::ContentType(ct) => Some(ct.mime_type()),
            _ => None,
        }
    }

    pub fn main_type(&self) -> Option<&str> {
        match &self.body {
            FieldBody::ContentType(ct) => Some(ct.main.as_str()),
            _ => None,
        }
    }

    pub fn sub_type(&self) -> Option<&str> {
        match &self.body {
            FieldBody::ContentType(ct) => Some(ct.sub.as_str()),
            _ => None,
        }
    }

    /// Parameters of a Content-Type/Content-Disposition field, in
    /// encounter order, duplicates preserved.
    pub fn parameters(&self) -> &[Parameter] {
        match &self.body {
            FieldBody::ContentType(ct) => &ct.params,
            FieldBody::ContentDisposition(cd) => &cd.params,
            _ => &[],
        }
    }

    /// First parameter with this name, case-insensitive.
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters()
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .map(|p| p.value.as_str())
    }

    pub fn disposition_type(&self) -> Option<&str> {
        match &self.body {
            FieldBody::ContentDisposition(cd) => Some(cd.disposition_type.as_str()),
            _ => None,
        }
    }

    /// Decode the transfer-encoding token. Unknown tokens error here,
    /// when a caller is about to rely on them.
    pub fn transfer_encoding(&self) -> Result<TransferEncoding, ParseError> {
        match &self.body {
            FieldBody::Mechanism(m) => m.decode(),
            _ => Err(ParseError::UnknownEncoding {
                token: self.raw.clone(),
            }),
        }
    }

    pub fn version(&self) -> Option<(u32, u32)> {
        match &self.body {
            FieldBody::Version(v) => Some((v.major, v.minor)),
            _ => None,
        }
    }

    /// Decoded phrases of a Keywords field.
    pub fn phrases(&self) -> Vec<String> {
        match &self.body {
            FieldBody::PhraseList(list) => list.0.iter().map(|p| p.to_string()).collect(),
            _ => vec![],
        }
    }

    pub fn location(&self) -> Option<&str> {
        match &self.body {
            FieldBody::Location(l) => Some(l.0.as_str()),
            _ => None,
        }
    }

    /// The verbatim pre-`;` trace text of a Received field.
    pub fn received_info(&self) -> Option<&str> {
        match &self.body {
            FieldBody::Received(r) => Some(r.info.as_str()),
            _ => None,
        }
    }

    // --- serialization

    /// The full `Name: value\r\n` line, folded at 78 columns.
    ///
    /// Blank fields keep their historical per-type behavior: blank
    /// unstructured fields produce an empty string, blank structured
    /// fields produce nothing at all. Downstream callers distinguish the
    /// two, so they are deliberately not unified.
    pub fn encoded(&self) -> Option<String> {
        use StandardField::*;
        if self.is_blank() {
            let unstructured_name = matches!(
                self.name.standard(),
                None | Some(Subject) | Some(Comments) | Some(ContentDescription)
            );
            return if unstructured_name {
                Some(String::new())
            } else {
                None
            };
        }
        let mut fmt = Folder::new();
        fmt.write_str(self.name.as_str());
        fmt.write_str(":");
        fmt.write_fws();
        self.print_body(&mut fmt);
        let mut out = fmt.finish();
        out.push_str("\r\n");
        Some(out)
    }

    /// The semantic value with encoded words resolved; no trailing CRLF.
    pub fn decoded(&self) -> String {
        match &self.body {
            FieldBody::Unstructured(u) => u.to_string(),
            FieldBody::AddressList(list) => list
                .iter()
                .map(|a| a.to_string())
                .collect::<Vec<_>>()
                .join(", "),
            FieldBody::MailboxList(list) => list
                .iter()
                .map(|m| m.to_string())
                .collect::<Vec<_>>()
                .join(", "),
            FieldBody::Mailbox(m) => m.to_string(),
            FieldBody::MessageId(id) => format!("<{}>", id.to_string()),
            FieldBody::MessageIdList(ids) => ids
                .iter()
                .map(|i| format!("<{}>", i.to_string()))
                .collect::<Vec<_>>()
                .join(", "),
            FieldBody::PhraseList(list) => list
                .0
                .iter()
                .map(|p| p.to_string())
                .collect::<Vec<_>>()
                .join(", "),
            FieldBody::Received(r) => match &r.date {
                Some(date) => format!("{}; {}", r.info, unfolded_print(date)),
                None => r.info.clone(),
            },
            FieldBody::ReturnPath(ReturnPath(Some(spec))) => {
                format!("<{}>", spec.to_string())
            }
            FieldBody::ReturnPath(ReturnPath(None)) => "<>".to_string(),
            FieldBody::Location(l) => l.0.clone(),
            FieldBody::Mechanism(m) => m.0.clone(),
            // the remaining bodies carry no encoded words; their decoded
            // form is their canonical printed form
            FieldBody::DateTime(d) => unfolded_print(d),
            FieldBody::ContentType(ct) => unfolded_print(ct),
            FieldBody::ContentDisposition(cd) => unfolded_print(cd),
            FieldBody::Version(v) => unfolded_print(v),
        }
    }

    fn is_blank(&self) -> bool {
        if self.raw.trim().is_empty() {
            return true;
        }
        match &self.body {
            FieldBody::Unstructured(u) => u.0.is_empty(),
            FieldBody::AddressList(l) => l.is_empty(),
            FieldBody::MailboxList(l) => l.is_empty(),
            FieldBody::MessageIdList(l) => l.is_empty(),
            FieldBody::PhraseList(p) => p.0.is_empty(),
            FieldBody::Location(l) => l.0.is_empty(),
            FieldBody::Received(r) => r.info.is_empty() && r.date.is_none(),
            _ => false,
        }
    }

    fn print_body(&self, fmt: &mut Folder) {
        match &self.body {
            FieldBody::Unstructured(u) => {
                let decoded = u.to_string();
                if decoded.is_ascii() {
                    u.print(fmt);
                } else {
                    // non-ASCII values go out as B encoded words in the
                    // field's charset, one foldable word per chunk
                    let words = b_encode_words(&decoded, self.charset);
                    for (i, word) in words.iter().enumerate() {
                        if i > 0 {
                            fmt.write_fws();
                        }
                        fmt.write_str(word);
                    }
                }
            }
            FieldBody::AddressList(list) => print_seq(fmt, list, comma_sep),
            FieldBody::MailboxList(list) => print_seq(fmt, list, comma_sep),
            FieldBody::Mailbox(m) => m.print(fmt),
            FieldBody::DateTime(d) => d.print(fmt),
            FieldBody::MessageId(id) => id.print(fmt),
            FieldBody::MessageIdList(ids) => print_seq(fmt, ids, Folder::write_fws),
            FieldBody::ContentType(ct) => ct.print(fmt),
            FieldBody::ContentDisposition(cd) => cd.print(fmt),
            FieldBody::Mechanism(m) => m.print(fmt),
            FieldBody::Version(v) => v.print(fmt),
            FieldBody::Location(l) => l.print(fmt),
            FieldBody::PhraseList(p) => p.print(fmt),
            FieldBody::Received(r) => r.print(fmt),
            FieldBody::ReturnPath(r) => r.print(fmt),
        }
    }
}

fn comma_sep(fmt: &mut Folder) {
    fmt.write_str(",");
    fmt.write_fws();
}

// print without folding: folds only ever move a whitespace character
// behind a CRLF, so stripping the CRLFs restores the single-line text
fn unfolded_print(p: &impl Print) -> String {
    crate::print::folded(|f| p.print(f)).replace("\r\n", "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_accessors() {
        let field = Field::new("To", "Mary Smith <mary@x.test>, jdoe@example.org");
        assert_eq!(field.name(), "To");
        assert_eq!(
            field.addresses(),
            vec!["mary@x.test".to_string(), "jdoe@example.org".to_string()],
        );
        assert_eq!(field.mailboxes().len(), 2);
        assert_eq!(field.content_type(), None);
    }

    #[test]
    fn test_set_value_reparses() {
        let mut field = Field::new("To", "a@b.test");
        assert_eq!(field.addresses(), vec!["a@b.test".to_string()]);
        field.set_value("c@d.test, e@f.test");
        assert_eq!(
            field.addresses(),
            vec!["c@d.test".to_string(), "e@f.test".to_string()],
        );
        assert_eq!(field.value(), "c@d.test, e@f.test");
    }

    #[test]
    fn test_degraded_field_accessors() {
        // '<' with no closing bracket: the address grammar rejects this
        let field = Field::new("To", "totally <<< broken");
        assert!(field.is_degraded());
        assert_eq!(field.addresses(), Vec::<String>::new());
        assert!(field.try_addresses().is_err());
        // but the field still round-trips as an opaque value
        assert_eq!(field.decoded(), "totally <<< broken");
    }

    #[test]
    fn test_encoded_folds_long_address_lists() {
        let value = (0..8)
            .map(|i| format!("recipient.number.{}@example.com", i))
            .collect::<Vec<_>>()
            .join(", ");
        let field = Field::new("To", &value);
        let encoded = field.encoded().unwrap();
        assert!(encoded.ends_with("\r\n"));
        for line in encoded.trim_end().split("\r\n") {
            assert!(line.len() <= 78, "overlong line: {:?}", line);
        }
        // unfolding restores one logical line
        let logical = crate::text::whitespace::unfold(&encoded);
        assert_eq!(logical.lines().count(), 1);
    }

    #[test]
    fn test_blank_field_policy() {
        // blank unstructured fields encode to an empty string...
        assert_eq!(Field::new("Subject", "").encoded(), Some(String::new()));
        assert_eq!(Field::new("X-Custom", " ").encoded(), Some(String::new()));
        // ...while blank structured fields encode to nothing at all
        assert_eq!(Field::new("To", "").encoded(), None);
        assert_eq!(Field::new("Received", "").encoded(), None);
    }

    #[test]
    fn test_ordering_key() {
        let from = Field::new("From", "a@b.test");
        let subject = Field::new("Subject", "hi");
        assert_eq!(from.cmp_order(&subject), Ordering::Less);
    }
}
