//! Wire vocabulary and the encoding trait.

/// Keys and separators that make up the text wire format.
pub mod keys {
    pub const AGENCY: &str = "AGENCY";
    pub const FIRST_NAME: &str = "FIRST_NAME";
    pub const LAST_NAME: &str = "LAST_NAME";
    pub const DOCUMENT: &str = "DOCUMENT";
    pub const BIRTHDATE: &str = "BIRTHDATE";
    pub const NUMBER: &str = "NUMBER";
    pub const BETS: &str = "BETS";
    pub const END: &str = "END";
    pub const WINNERS: &str = "WINNERS";
    pub const RESULT: &str = "RESULT";
    pub const MESSAGE: &str = "MESSAGE";

    /// Separates `KEY=value` pairs within one record.
    pub const FIELD_SEPARATOR: char = ',';
    /// Separates records within a batch.
    pub const RECORD_SEPARATOR: char = ';';
    /// Separates a key from its value.
    pub const KEY_VALUE_SEPARATOR: char = '=';
}

/// Characters a field value must never contain.
pub const FORBIDDEN_CHARACTERS: [char; 3] = [keys::FIELD_SEPARATOR, keys::RECORD_SEPARATOR, '\n'];

/// A message that can be written as a frame payload.
///
/// Implementations never emit the frame delimiter.
pub trait Encode {
    /// Appends the encoded payload to `out`.
    fn encode_into(&self, out: &mut String);

    /// Returns the encoded payload.
    fn encode(&self) -> String {
        let mut out = String::new();
        self.encode_into(&mut out);
        out
    }
}

pub(crate) fn push_pair(out: &mut String, key: &str, value: &str) {
    out.push_str(key);
    out.push(keys::KEY_VALUE_SEPARATOR);
    out.push_str(value);
}
