//! Server response decoding.

use std::fmt;

use crate::encode::keys;

/// Result code the server uses for a successful operation.
pub const SUCCESS_RESULT: &str = "success";

/// Decoded reply to any request frame.
///
/// Missing or malformed parts decode to empty strings; there is no error path.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ServerResponse {
    /// Outcome code, `success` or `fail` from a well-behaved server.
    pub result: String,
    /// Free text; the winners count on a successful winners query.
    pub message: String,
}

impl ServerResponse {
    /// Decodes a `RESULT=<code>,MESSAGE=<text>` payload.
    ///
    /// Only the first two comma-separated segments are inspected. A segment
    /// without the expected prefix leaves its field empty.
    pub fn decode(payload: &str) -> Self {
        let mut segments = payload.trim().split(keys::FIELD_SEPARATOR);
        let result = segments
            .next()
            .and_then(|segment| strip_key(segment, keys::RESULT))
            .unwrap_or_default();
        let message = segments
            .next()
            .and_then(|segment| strip_key(segment, keys::MESSAGE))
            .unwrap_or_default();
        Self {
            result: result.to_owned(),
            message: message.to_owned(),
        }
    }

    /// Returns `true` if the result code is [`SUCCESS_RESULT`].
    pub fn is_success(&self) -> bool {
        self.result == SUCCESS_RESULT
    }

    /// Parses the message as a winners count, if it is one.
    pub fn winners_count(&self) -> Option<usize> {
        self.message.trim().parse().ok()
    }
}

fn strip_key<'a>(segment: &'a str, key: &str) -> Option<&'a str> {
    segment
        .strip_prefix(key)?
        .strip_prefix(keys::KEY_VALUE_SEPARATOR)
}

impl fmt::Display for ServerResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "result={} message={}", self.result, self.message)
    }
}
