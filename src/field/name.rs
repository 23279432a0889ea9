use std::fmt;

/// The standard header fields this crate gives a grammar to. Matching is
/// case-insensitive; the canonical mixed-case spelling is used on output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardField {
    ReturnPath,
    Received,
    ResentDate,
    ResentFrom,
    ResentSender,
    ResentTo,
    ResentCc,
    ResentBcc,
    ResentMessageId,
    Date,
    From,
    Sender,
    ReplyTo,
    To,
    Cc,
    Bcc,
    MessageId,
    InReplyTo,
    References,
    Subject,
    Comments,
    Keywords,
    MimeVersion,
    ContentType,
    ContentTransferEncoding,
    ContentLocation,
    ContentDisposition,
    ContentDescription,
    ContentId,
}

/// The canonical serialization order suggested by RFC 5322: trace fields
/// first, then resent blocks, originator and destination fields, and the
/// MIME fields last. Content-ID is deliberately absent; it sorts with the
/// unknown fields, after everything listed here.
pub const FIELD_ORDER: [StandardField; 28] = [
    StandardField::ReturnPath,
    StandardField::Received,
    StandardField::ResentDate,
    StandardField::ResentFrom,
    StandardField::ResentSender,
    StandardField::ResentTo,
    StandardField::ResentCc,
    StandardField::ResentBcc,
    StandardField::ResentMessageId,
    StandardField::Date,
    StandardField::From,
    StandardField::Sender,
    StandardField::ReplyTo,
    StandardField::To,
    StandardField::Cc,
    StandardField::Bcc,
    StandardField::MessageId,
    StandardField::InReplyTo,
    StandardField::References,
    StandardField::Subject,
    StandardField::Comments,
    StandardField::Keywords,
    StandardField::MimeVersion,
    StandardField::ContentType,
    StandardField::ContentTransferEncoding,
    StandardField::ContentLocation,
    StandardField::ContentDisposition,
    StandardField::ContentDescription,
];

/// Rank shared by every name outside the order table. They all tie, so a
/// stable insertion keeps them in the order the caller produced them.
pub(crate) const UNKNOWN_RANK: usize = usize::MAX;

impl StandardField {
    pub fn from_name(name: &str) -> Option<StandardField> {
        use StandardField::*;
        match name.to_ascii_lowercase().as_str() {
            "return-path" => Some(ReturnPath),
            "received" => Some(Received),
            "resent-date" => Some(ResentDate),
            "resent-from" => Some(ResentFrom),
            "resent-sender" => Some(ResentSender),
            "resent-to" => Some(ResentTo),
            "resent-cc" => Some(ResentCc),
            "resent-bcc" => Some(ResentBcc),
            "resent-message-id" => Some(ResentMessageId),
            "date" => Some(Date),
            "from" => Some(From),
            "sender" => Some(Sender),
            "reply-to" => Some(ReplyTo),
            "to" => Some(To),
            "cc" => Some(Cc),
            "bcc" => Some(Bcc),
            "message-id" => Some(MessageId),
            "in-reply-to" => Some(InReplyTo),
            "references" => Some(References),
            "subject" => Some(Subject),
            "comments" => Some(Comments),
            "keywords" => Some(Keywords),
            "mime-version" => Some(MimeVersion),
            "content-type" => Some(ContentType),
            "content-transfer-encoding" => Some(ContentTransferEncoding),
            "content-location" => Some(ContentLocation),
            "content-disposition" => Some(ContentDisposition),
            "content-description" => Some(ContentDescription),
            "content-id" => Some(ContentId),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        use StandardField::*;
        match self {
            ReturnPath => "Return-Path",
            Received => "Received",
            ResentDate => "Resent-Date",
            ResentFrom => "Resent-From",
            ResentSender => "Resent-Sender",
            ResentTo => "Resent-To",
            ResentCc => "Resent-Cc",
            ResentBcc => "Resent-Bcc",
            ResentMessageId => "Resent-Message-ID",
            Date => "Date",
            From => "From",
            Sender => "Sender",
            ReplyTo => "Reply-To",
            To => "To",
            Cc => "Cc",
            Bcc => "Bcc",
            MessageId => "Message-ID",
            InReplyTo => "In-Reply-To",
            References => "References",
            Subject => "Subject",
            Comments => "Comments",
            Keywords => "Keywords",
            MimeVersion => "MIME-Version",
            ContentType => "Content-Type",
            ContentTransferEncoding => "Content-Transfer-Encoding",
            ContentLocation => "Content-Location",
            ContentDisposition => "Content-Disposition",
            ContentDescription => "Content-Description",
            ContentId => "Content-ID",
        }
    }

    pub(crate) fn rank(&self) -> usize {
        FIELD_ORDER
            .iter()
            .position(|f| f == self)
            .unwrap_or(UNKNOWN_RANK)
    }

    /// Fields that appear at most once; [`crate::Header::set`] replaces
    /// them instead of appending a second copy.
    pub fn is_singular(&self) -> bool {
        use StandardField::*;
        !matches!(
            self,
            Received | ReturnPath | Comments | Keywords | ResentDate | ResentFrom
                | ResentSender | ResentTo | ResentCc | ResentBcc | ResentMessageId
        )
    }

    /// Fields that synthesize a legal value when constructed without one.
    pub(crate) fn is_self_generating(&self) -> bool {
        use StandardField::*;
        matches!(self, MessageId | ContentId | MimeVersion | Date | ResentDate)
    }

    /// Fields whose body is address-shaped; the strict address accessor
    /// re-runs the grammar for these when the field is degraded.
    pub(crate) fn takes_addresses(&self) -> bool {
        use StandardField::*;
        matches!(
            self,
            To | Cc | Bcc | ReplyTo | From | Sender | ResentTo | ResentCc | ResentBcc
                | ResentFrom | ResentSender | ReturnPath
        )
    }
}

/// A field name: either one of the standard fields, or any other name kept
/// verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldName {
    Standard(StandardField),
    Other(String),
}

impl FieldName {
    pub fn parse(name: &str) -> FieldName {
        match StandardField::from_name(name) {
            Some(std) => FieldName::Standard(std),
            None => FieldName::Other(name.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            FieldName::Standard(std) => std.as_str(),
            FieldName::Other(name) => name,
        }
    }

    pub fn standard(&self) -> Option<StandardField> {
        match self {
            FieldName::Standard(std) => Some(*std),
            FieldName::Other(_) => None,
        }
    }

    /// Case-insensitive name comparison; this is the "same field" test
    /// used for lookup and replacement.
    pub fn matches(&self, name: &str) -> bool {
        self.as_str().eq_ignore_ascii_case(name)
    }

    pub(crate) fn rank(&self) -> usize {
        match self {
            FieldName::Standard(std) => std.rank(),
            FieldName::Other(_) => UNKNOWN_RANK,
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for FieldName {
    fn from(name: &str) -> Self {
        FieldName::parse(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_lookup() {
        assert_eq!(StandardField::from_name("TO"), Some(StandardField::To));
        assert_eq!(StandardField::from_name("to"), Some(StandardField::To));
        assert_eq!(StandardField::from_name("To"), Some(StandardField::To));
        assert_eq!(
            StandardField::from_name("mIme-veRsion"),
            Some(StandardField::MimeVersion),
        );
        assert_eq!(StandardField::from_name("x-custom"), None);
    }

    #[test]
    fn test_canonical_names() {
        assert_eq!(FieldName::parse("message-id").as_str(), "Message-ID");
        assert_eq!(FieldName::parse("X-Custom").as_str(), "X-Custom");
    }

    #[test]
    fn test_rank() {
        assert!(StandardField::ReturnPath.rank() < StandardField::From.rank());
        assert!(StandardField::From.rank() < StandardField::To.rank());
        assert!(StandardField::To.rank() < StandardField::Subject.rank());
        assert_eq!(FieldName::parse("X-Custom").rank(), UNKNOWN_RANK);
        assert_eq!(StandardField::ContentId.rank(), UNKNOWN_RANK);
    }
}
