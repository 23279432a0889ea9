/// MIME header grammars (RFC 2045) and the charset facade.
pub mod charset;
pub mod disposition;
pub mod location;
pub mod mechanism;
pub mod r#type;
pub mod version;
