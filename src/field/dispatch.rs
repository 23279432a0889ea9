use tracing::{debug, warn};

use crate::error::{run, ParseError};
use crate::field::generate;
use crate::field::name::{FieldName, StandardField};
use crate::field::{Field, FieldBody};
use crate::imf::address::address_list;
use crate::imf::datetime::{date_time, DateTimeValue};
use crate::imf::identification::{msg_id, msg_id_list, MessageID};
use crate::imf::mailbox::{mailbox, mailbox_list};
use crate::imf::trace::{received_log, return_path};
use crate::mime::charset::EmailCharset;
use crate::mime::disposition::content_disposition;
use crate::mime::location::location;
use crate::mime::mechanism::{mechanism, Mechanism};
use crate::mime::r#type::content_type;
use crate::mime::version::{version, Version};
use crate::text::misc_token::{phrase_list, unstructured, PhraseList, Unstructured};

/// The field dispatcher: map a name (matched case-insensitively against
/// the standard fields) to the right grammar, and fall back to an
/// unstructured body when the name is unknown or the grammar rejects the
/// value. A header line always yields *something*; malformed real-world
/// mail must never abort parsing of the whole message.
impl Field {
    /// Build a field from separate name and value strings.
    pub fn new(name: &str, value: &str) -> Field {
        Field::build(FieldName::parse(name), value)
    }

    /// Build a field from a combined `Name: value` line. The split happens
    /// on the first `:` that is not inside a quoted string, and both
    /// halves are trimmed. Returns `None` (with a diagnostic) when the
    /// line cannot be split; this is never fatal.
    pub fn from_line(line: &str) -> Option<Field> {
        match split_line(line) {
            Ok((name, value)) if !name.is_empty() => Some(Field::new(name, value)),
            Ok(_) => {
                warn!(line, "skipping header line with an empty field name");
                None
            }
            Err(e) => {
                warn!(error = %e, "skipping header line that does not split");
                None
            }
        }
    }

    /// Build a field with no value. Self-generating fields (Message-ID,
    /// Content-ID, MIME-Version, Date, Resent-Date) synthesize a legal
    /// value right here, at construction time; everything else is blank.
    pub fn generated(name: &str) -> Field {
        Field::build(FieldName::parse(name), "")
    }

    pub(crate) fn build(name: FieldName, value: &str) -> Field {
        let trimmed = value.trim();
        let standard = name.standard();

        if trimmed.is_empty() {
            if let Some(std) = standard {
                if std.is_self_generating() {
                    return Field::generate_standard(name, std);
                }
            }
            return Field {
                raw: String::new(),
                body: blank_body(standard),
                charset: EmailCharset::default(),
                name,
            };
        }

        let body = match standard {
            Some(std) => match parse_body(std, trimmed) {
                Ok(body) => body,
                Err(error) => {
                    debug!(field = %name, %error, "structured parse failed, degrading to unstructured");
                    FieldBody::Unstructured(parse_unstructured(trimmed))
                }
            },
            None => FieldBody::Unstructured(parse_unstructured(trimmed)),
        };

        Field {
            name,
            raw: trimmed.to_string(),
            body,
            charset: EmailCharset::default(),
        }
    }

    fn generate_standard(name: FieldName, std: StandardField) -> Field {
        use StandardField::*;
        let (raw, body) = match std {
            MessageId | ContentId | ResentMessageId => {
                let id = generated_message_id();
                (format!("<{}>", id.to_string()), FieldBody::MessageId(id))
            }
            MimeVersion => ("1.0".to_string(), FieldBody::Version(Version::default())),
            // Date and Resent-Date default to the current wall clock
            _ => {
                let value = DateTimeValue::from_timestamp(&generate::now());
                (
                    format!("{} {}", value.date, value.time),
                    FieldBody::DateTime(value),
                )
            }
        };
        Field {
            name,
            raw,
            body,
            charset: EmailCharset::default(),
        }
    }
}

fn generated_message_id() -> MessageID {
    let id = generate::message_id();
    match id.split_once('@') {
        Some((left, right)) => MessageID {
            left: left.to_string(),
            right: right.to_string(),
        },
        None => MessageID {
            left: id,
            right: "localhost.localdomain".to_string(),
        },
    }
}

fn parse_body(std: StandardField, value: &str) -> Result<FieldBody, ParseError> {
    use StandardField::*;
    Ok(match std {
        To | Cc | Bcc | ReplyTo | ResentTo | ResentCc | ResentBcc => {
            FieldBody::AddressList(run("address-list", address_list, value)?)
        }
        From | ResentFrom => FieldBody::MailboxList(run("mailbox-list", mailbox_list, value)?),
        Sender | ResentSender => FieldBody::Mailbox(run("mailbox", mailbox, value)?),
        Date | ResentDate => FieldBody::DateTime(run("date-time", date_time, value)?),
        MessageId | ResentMessageId | ContentId => {
            FieldBody::MessageId(run("message-id", msg_id, value)?)
        }
        InReplyTo | References => {
            FieldBody::MessageIdList(run("message-ids", msg_id_list, value)?)
        }
        Subject | Comments | ContentDescription => {
            FieldBody::Unstructured(run("unstructured", unstructured, value)?)
        }
        Keywords => FieldBody::PhraseList(run("phrase-list", phrase_list, value)?),
        MimeVersion => FieldBody::Version(run("mime-version", version, value)?),
        ContentType => FieldBody::ContentType(content_type(value)?),
        ContentDisposition => FieldBody::ContentDisposition(content_disposition(value)?),
        ContentTransferEncoding => {
            FieldBody::Mechanism(run("content-transfer-encoding", mechanism, value)?)
        }
        ContentLocation => FieldBody::Location(run("content-location", location, value)?),
        Received => FieldBody::Received(run("received", received_log, value)?),
        ReturnPath => FieldBody::ReturnPath(run("return-path", return_path, value)?),
    })
}

/// Grammar defaults for blank input, per field family. Blank content-type
/// reads as `text/plain`, blank transfer encoding as `7bit`, and so on;
/// list-shaped grammars default to their empty element.
fn blank_body(standard: Option<StandardField>) -> FieldBody {
    use StandardField::*;
    match standard {
        Some(To) | Some(Cc) | Some(Bcc) | Some(ReplyTo) | Some(ResentTo) | Some(ResentCc)
        | Some(ResentBcc) => FieldBody::AddressList(vec![]),
        Some(From) | Some(ResentFrom) => FieldBody::MailboxList(vec![]),
        Some(InReplyTo) | Some(References) => FieldBody::MessageIdList(vec![]),
        Some(Keywords) => FieldBody::PhraseList(PhraseList::default()),
        Some(ContentType) => FieldBody::ContentType(crate::mime::r#type::ContentType::default()),
        Some(ContentDisposition) => FieldBody::ContentDisposition(
            crate::mime::disposition::ContentDisposition::default(),
        ),
        Some(ContentTransferEncoding) => FieldBody::Mechanism(Mechanism::default()),
        Some(Received) => FieldBody::Received(crate::imf::trace::ReceivedLog {
            info: String::new(),
            date: None,
        }),
        Some(ReturnPath) => FieldBody::ReturnPath(crate::imf::trace::ReturnPath(None)),
        _ => FieldBody::Unstructured(Unstructured::default()),
    }
}

fn parse_unstructured(value: &str) -> Unstructured {
    match unstructured(value) {
        Ok((_, parsed)) => parsed,
        Err(_) => Unstructured(vec![crate::text::misc_token::UnstrToken::Plain(
            value.to_string(),
        )]),
    }
}

/// Split a combined `Name: value` line on the first `:` outside quotes.
pub(crate) fn split_line(line: &str) -> Result<(&str, &str), ParseError> {
    let mut in_quotes = false;
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '"' => in_quotes = !in_quotes,
            ':' if !in_quotes => {
                return Ok((line[..i].trim(), line[i + 1..].trim()));
            }
            _ => {}
        }
    }
    Err(ParseError::Split {
        line: line.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_dispatch() {
        let lower = Field::new("to", "a@b.com");
        let upper = Field::new("TO", "a@b.com");
        let mixed = Field::new("To", "a@b.com");
        assert_eq!(lower, upper);
        assert_eq!(upper, mixed);
        assert_eq!(mixed.name(), "To");
        assert!(matches!(mixed.body(), FieldBody::AddressList(_)));
    }

    #[test]
    fn test_unknown_name_is_unstructured() {
        let field = Field::new("X-Mailer", "mail-header 0.1");
        assert_eq!(field.name(), "X-Mailer");
        assert!(matches!(field.body(), FieldBody::Unstructured(_)));
        assert_eq!(field.decoded(), "mail-header 0.1");
    }

    #[test]
    fn test_from_line() {
        let field = Field::from_line("Subject: Re: Saying Hello").unwrap();
        assert_eq!(field.name(), "Subject");
        assert_eq!(field.decoded(), "Re: Saying Hello");

        // the first colon inside quotes does not split
        let field = Field::from_line("To: \"Smith: Personal\" <smith@home.example>").unwrap();
        assert_eq!(field.addresses(), vec!["smith@home.example".to_string()]);

        assert!(Field::from_line("no separator here").is_none());
        assert!(Field::from_line(": empty name").is_none());
    }

    #[test]
    fn test_malformed_structured_value_degrades() {
        let field = Field::new("Date", "not a date at all");
        assert!(field.is_degraded());
        assert_eq!(field.date_time(), None);
        // the raw value is preserved for re-serialization
        assert_eq!(field.value(), "not a date at all");
    }

    #[test]
    fn test_generated_fields() {
        let msg_id = Field::generated("Message-ID");
        assert!(msg_id.message_id().is_some());
        assert!(msg_id.encoded().unwrap().starts_with("Message-ID: <"));

        let version = Field::generated("MIME-Version");
        assert_eq!(version.version(), Some((1, 0)));
        assert_eq!(version.encoded().unwrap(), "MIME-Version: 1.0\r\n");

        let date = Field::generated("Date");
        assert!(date.date_time().is_some());

        // non-generating names stay blank
        let subject = Field::generated("Subject");
        assert_eq!(subject.encoded(), Some(String::new()));
    }

    #[test]
    fn test_blank_content_type_defaults() {
        let field = Field::new("Content-Type", "");
        assert_eq!(field.content_type(), Some("text/plain".to_string()));
        // a blank structured field does not serialize
        assert_eq!(field.encoded(), None);
    }

    #[test]
    fn test_split_line() {
        assert_eq!(split_line("A: b"), Ok(("A", "b")));
        assert_eq!(split_line("A:b:c"), Ok(("A", "b:c")));
        assert!(split_line("no colon").is_err());
    }
}
