/// Internet Message Format header grammars (RFC 822, RFC 5322).
pub mod address;
pub mod datetime;
pub mod identification;
pub mod mailbox;
pub mod trace;
