/// Lexical primitives shared by every field grammar: folding white space,
/// comments, quoted strings, atoms/tokens and RFC 2047 encoded words.
pub mod encoding;
pub mod misc_token;
pub mod quoted;
pub mod whitespace;
pub mod words;
