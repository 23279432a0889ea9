use std::fmt;

use crate::field::Field;
use crate::text::whitespace::unfold;

/// An ordered list of header fields.
///
/// The list is kept perpetually sorted in the canonical field order:
/// every insertion finds its position by rank (O(n) per append, fine for
/// the few dozen fields a header carries). Unknown fields all share one
/// rank after the known ones and keep their insertion order among
/// themselves.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Header {
    fields: Vec<Field>,
}

impl Header {
    pub fn new() -> Header {
        Header::default()
    }

    /// Build a header from a raw header block.
    ///
    /// Line endings are normalized and folding is removed first, then each
    /// line goes through the field dispatcher. Lines that cannot be split
    /// into a name and a value are skipped with a diagnostic; nothing here
    /// is fatal.
    pub fn from_raw(text: &str) -> Header {
        let unfolded = unfold(text);
        let mut header = Header::new();
        for line in unfolded.split('\n') {
            if line.trim().is_empty() {
                continue;
            }
            if let Some(field) = Field::from_line(line) {
                header.append(field);
            }
        }
        header
    }

    /// Insert a field at its canonical position. Fields of equal rank are
    /// kept in insertion order.
    pub fn append(&mut self, field: Field) {
        let rank = field.rank();
        let pos = self
            .fields
            .iter()
            .rposition(|f| f.rank() <= rank)
            .map(|i| i + 1)
            .unwrap_or(0);
        self.fields.insert(pos, field);
    }

    /// Insert a field, replacing an existing one of the same name when the
    /// field is singular (Subject, Date, ... appear at most once).
    pub fn set(&mut self, field: Field) {
        if field.is_singular() {
            if let Some(pos) = self
                .fields
                .iter()
                .position(|f| f.same_name(&field))
            {
                self.fields[pos] = field;
                return;
            }
        }
        self.append(field);
    }

    /// First field with this name, matched case-insensitively.
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.field_name().matches(name))
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.fields
            .iter_mut()
            .find(|f| f.field_name().matches(name))
    }

    /// Every field with this name, for the repeatable ones (Received,
    /// Comments, ...).
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Field> {
        self.fields
            .iter()
            .filter(move |f| f.field_name().matches(name))
    }

    /// Delete all fields with this name.
    pub fn remove(&mut self, name: &str) {
        self.fields.retain(|f| !f.field_name().matches(name));
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Field> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The canonical CRLF-terminated header block, fields in list order
    /// (which is always the canonical order).
    pub fn encoded(&self) -> String {
        self.fields
            .iter()
            .filter_map(|f| f.encoded())
            .collect()
    }

    /// Decoded `Name: value` lines, LF-joined, for display.
    pub fn decoded(&self) -> String {
        self.fields
            .iter()
            .map(|f| format!("{}: {}", f.name(), f.decoded()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encoded())
    }
}

impl Extend<Field> for Header {
    fn extend<T: IntoIterator<Item = Field>>(&mut self, iter: T) {
        for field in iter {
            self.append(field);
        }
    }
}

impl<'a> IntoIterator for &'a Header {
    type Item = &'a Field;
    type IntoIter = std::slice::Iter<'a, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}
