//! Bet records and batches.

use crate::encode::{keys, push_pair, Encode, FORBIDDEN_CHARACTERS};
use crate::error::{MessageError, MessageResult};

/// One wagering entry.
///
/// Field values are sent verbatim. They must not contain any of
/// [`FORBIDDEN_CHARACTERS`]; the encoder does not escape them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BetRecord {
    /// Id of the agency that took the bet.
    pub agency: String,
    /// Bettor's given name(s).
    pub first_name: String,
    /// Bettor's surname.
    pub last_name: String,
    /// Bettor's identity document number.
    pub document: String,
    /// Bettor's birth date, `YYYY-MM-DD`.
    pub birthdate: String,
    /// The number wagered on.
    pub number: String,
}

impl BetRecord {
    /// Creates a bet record from its six fields.
    pub fn new(
        agency: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        document: impl Into<String>,
        birthdate: impl Into<String>,
        number: impl Into<String>,
    ) -> Self {
        Self {
            agency: agency.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            document: document.into(),
            birthdate: birthdate.into(),
            number: number.into(),
        }
    }

    /// Returns the fields paired with their wire keys, in wire order.
    pub fn fields(&self) -> [(&'static str, &str); 6] {
        [
            (keys::AGENCY, self.agency.as_str()),
            (keys::FIRST_NAME, self.first_name.as_str()),
            (keys::LAST_NAME, self.last_name.as_str()),
            (keys::DOCUMENT, self.document.as_str()),
            (keys::BIRTHDATE, self.birthdate.as_str()),
            (keys::NUMBER, self.number.as_str()),
        ]
    }

    /// Reports the first field holding a wire separator, if any.
    pub fn check_wire_safe(&self) -> MessageResult<()> {
        for (field, value) in self.fields() {
            if let Some(found) = value.chars().find(|c| FORBIDDEN_CHARACTERS.contains(c)) {
                return Err(MessageError::ForbiddenCharacter { field, found });
            }
        }
        Ok(())
    }
}

impl Encode for BetRecord {
    fn encode_into(&self, out: &mut String) {
        for (idx, (key, value)) in self.fields().into_iter().enumerate() {
            if idx > 0 {
                out.push(keys::FIELD_SEPARATOR);
            }
            push_pair(out, key, value);
        }
    }
}

/// A group of bets sent in one frame.
///
/// The declared count on the wire is always the number of records held.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BetBatch {
    bets: Vec<BetRecord>,
}

impl BetBatch {
    /// Creates an empty batch.
    #[must_use]
    pub const fn new() -> Self {
        Self { bets: Vec::new() }
    }

    /// Creates an empty batch with room for `capacity` records.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bets: Vec::with_capacity(capacity),
        }
    }

    /// Appends a record.
    pub fn push(&mut self, bet: BetRecord) {
        self.bets.push(bet);
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.bets.len()
    }

    /// Returns `true` if the batch holds no records.
    pub fn is_empty(&self) -> bool {
        self.bets.is_empty()
    }

    /// Returns the records in send order.
    pub fn bets(&self) -> &[BetRecord] {
        &self.bets
    }

    /// Consumes the batch, returning its records.
    pub fn into_bets(self) -> Vec<BetRecord> {
        self.bets
    }
}

impl From<Vec<BetRecord>> for BetBatch {
    fn from(bets: Vec<BetRecord>) -> Self {
        Self { bets }
    }
}

impl FromIterator<BetRecord> for BetBatch {
    fn from_iter<I: IntoIterator<Item = BetRecord>>(iter: I) -> Self {
        Self {
            bets: iter.into_iter().collect(),
        }
    }
}

impl Encode for BetBatch {
    fn encode_into(&self, out: &mut String) {
        push_pair(out, keys::BETS, &self.bets.len().to_string());
        for bet in &self.bets {
            out.push(keys::RECORD_SEPARATOR);
            bet.encode_into(out);
        }
    }
}
