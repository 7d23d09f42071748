//! Session-lifecycle control messages.

use crate::encode::{keys, push_pair, Encode};
use crate::error::{MessageError, MessageResult};

/// A non-bet message signalling a lifecycle event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlMessage {
    /// The agency has uploaded all its bets.
    NoMoreBets { agency: String },
    /// Query for the agency's winners.
    GetWinners { agency: String },
}

impl ControlMessage {
    /// Builds the completion notice for `agency`.
    pub fn no_more_bets(agency: impl Into<String>) -> MessageResult<Self> {
        let agency = non_empty(agency.into())?;
        Ok(Self::NoMoreBets { agency })
    }

    /// Builds the winners query for `agency`.
    pub fn get_winners(agency: impl Into<String>) -> MessageResult<Self> {
        let agency = non_empty(agency.into())?;
        Ok(Self::GetWinners { agency })
    }

    /// Returns the agency id carried by the message.
    pub fn agency(&self) -> &str {
        match self {
            Self::NoMoreBets { agency } | Self::GetWinners { agency } => agency,
        }
    }

    const fn tag(&self) -> &'static str {
        match self {
            Self::NoMoreBets { .. } => keys::END,
            Self::GetWinners { .. } => keys::WINNERS,
        }
    }
}

fn non_empty(agency: String) -> MessageResult<String> {
    if agency.is_empty() {
        return Err(MessageError::EmptyAgency);
    }
    Ok(agency)
}

impl Encode for ControlMessage {
    fn encode_into(&self, out: &mut String) {
        out.push_str(self.tag());
        out.push(keys::FIELD_SEPARATOR);
        push_pair(out, keys::AGENCY, self.agency());
    }
}
