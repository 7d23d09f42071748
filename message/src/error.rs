//! Error types for message construction.

/// Result type for message operations.
pub type MessageResult<T> = Result<T, MessageError>;

/// Errors raised when building messages from caller-supplied values.
///
/// Encoding itself never fails and decoding is lenient; these only guard
/// constructors and the optional wire-safety check.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum MessageError {
    /// Control messages require a non-empty agency id.
    #[error("agency id must not be empty")]
    EmptyAgency,

    /// A field value contains one of the wire separators.
    #[error("field {field} contains forbidden character {found:?}")]
    ForbiddenCharacter {
        /// Wire key of the offending field.
        field: &'static str,
        /// The separator found in the value.
        found: char,
    },
}
