//! Where bet records come from.
//!
//! A [`BetSource`] hands out records in chunks of at most `max`. An empty
//! chunk means the source is exhausted.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use message::{keys, BetRecord};
use tracing::warn;

use crate::error::SourceResult;

/// Number of comma-separated fields in one row of an agency bets file.
pub const CSV_FIELDS_PER_ROW: usize = 5;

/// Yields bet records in bounded chunks.
pub trait BetSource {
    /// Returns up to `max` records. An empty vector signals exhaustion.
    ///
    /// A session fails with [`SessionError::ChunkTooLarge`] if more come back.
    ///
    /// [`SessionError::ChunkTooLarge`]: crate::SessionError::ChunkTooLarge
    fn next_chunk(&mut self, max: usize) -> SourceResult<Vec<BetRecord>>;
}

impl<S: BetSource + ?Sized> BetSource for &mut S {
    fn next_chunk(&mut self, max: usize) -> SourceResult<Vec<BetRecord>> {
        (**self).next_chunk(max)
    }
}

impl<S: BetSource + ?Sized> BetSource for Box<S> {
    fn next_chunk(&mut self, max: usize) -> SourceResult<Vec<BetRecord>> {
        (**self).next_chunk(max)
    }
}

/// Drains an in-memory list of records in order.
#[derive(Debug, Clone)]
pub struct MemorySource {
    bets: std::vec::IntoIter<BetRecord>,
}

impl MemorySource {
    /// Creates a source that yields `bets` in order.
    pub fn new(bets: Vec<BetRecord>) -> Self {
        Self {
            bets: bets.into_iter(),
        }
    }

    /// Records not yet handed out.
    pub fn remaining(&self) -> usize {
        self.bets.len()
    }
}

impl From<Vec<BetRecord>> for MemorySource {
    fn from(bets: Vec<BetRecord>) -> Self {
        Self::new(bets)
    }
}

impl BetSource for MemorySource {
    fn next_chunk(&mut self, max: usize) -> SourceResult<Vec<BetRecord>> {
        Ok(self.bets.by_ref().take(max).collect())
    }
}

/// Yields the same record a fixed number of times.
#[derive(Debug, Clone)]
pub struct RepeatSource {
    bet: BetRecord,
    remaining: usize,
}

impl RepeatSource {
    /// Creates a source that yields `bet` exactly `times` times.
    pub fn new(bet: BetRecord, times: usize) -> Self {
        Self {
            bet,
            remaining: times,
        }
    }
}

impl BetSource for RepeatSource {
    fn next_chunk(&mut self, max: usize) -> SourceResult<Vec<BetRecord>> {
        let count = max.min(self.remaining);
        self.remaining -= count;
        Ok(vec![self.bet.clone(); count])
    }
}

/// Reads an agency bets file one chunk at a time.
///
/// Each line holds first name, last name, document, birthdate and number
/// separated by commas. A field may be wrapped in double quotes, with `""`
/// standing for a literal quote inside it; quoted fields cannot span lines.
/// The agency id is injected from configuration. Rows with the wrong number
/// of fields, broken quoting, or values that would break the wire format are
/// skipped with a warning.
#[derive(Debug)]
pub struct CsvSource<R> {
    reader: R,
    agency: String,
    line: String,
    line_number: usize,
    skipped: usize,
    exhausted: bool,
}

impl CsvSource<BufReader<File>> {
    /// Opens the bets file at `path`.
    pub fn open(path: impl AsRef<Path>, agency: impl Into<String>) -> SourceResult<Self> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file), agency))
    }
}

impl<R: BufRead> CsvSource<R> {
    /// Reads rows from `reader`, tagging each record with `agency`.
    pub fn new(reader: R, agency: impl Into<String>) -> Self {
        Self {
            reader,
            agency: agency.into(),
            line: String::new(),
            line_number: 0,
            skipped: 0,
            exhausted: false,
        }
    }

    /// Rows dropped so far because they were malformed.
    pub const fn skipped(&self) -> usize {
        self.skipped
    }

    /// Reads the next usable record, or `None` at end of input.
    fn next_record(&mut self) -> SourceResult<Option<BetRecord>> {
        loop {
            self.line.clear();
            if self.reader.read_line(&mut self.line)? == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            let row = self.line.trim_end_matches(['\n', '\r']);
            if row.is_empty() {
                continue;
            }

            let Some(fields) = split_row(row) else {
                warn!(
                    action = "read_bets",
                    result = "skip",
                    line = self.line_number,
                    "unbalanced quotes"
                );
                self.skipped += 1;
                continue;
            };
            if fields.len() != CSV_FIELDS_PER_ROW {
                warn!(
                    action = "read_bets",
                    result = "skip",
                    line = self.line_number,
                    fields = fields.len(),
                    "unexpected field count"
                );
                self.skipped += 1;
                continue;
            }

            let bet = BetRecord::new(
                self.agency.as_str(),
                fields[0].as_str(),
                fields[1].as_str(),
                fields[2].as_str(),
                fields[3].as_str(),
                fields[4].as_str(),
            );
            if let Err(err) = bet.check_wire_safe() {
                warn!(
                    action = "read_bets",
                    result = "skip",
                    line = self.line_number,
                    error = %err
                );
                self.skipped += 1;
                continue;
            }
            return Ok(Some(bet));
        }
    }
}

impl<R: BufRead> BetSource for CsvSource<R> {
    fn next_chunk(&mut self, max: usize) -> SourceResult<Vec<BetRecord>> {
        let mut chunk = Vec::with_capacity(max.min(message::PROTOCOL_MAX_BATCH_SIZE));
        while !self.exhausted && chunk.len() < max {
            match self.next_record()? {
                Some(bet) => chunk.push(bet),
                None => self.exhausted = true,
            }
        }
        Ok(chunk)
    }
}

/// Splits one row on commas, removing the quotes around quoted fields.
///
/// Returns `None` when a quote is left open or a closing quote is followed by
/// anything but a separator.
fn split_row(row: &str) -> Option<Vec<String>> {
    let mut fields = Vec::with_capacity(CSV_FIELDS_PER_ROW);
    let mut chars = row.chars().peekable();
    loop {
        let mut field = String::new();
        if chars.peek() == Some(&'"') {
            chars.next();
            loop {
                match chars.next()? {
                    '"' if chars.peek() == Some(&'"') => {
                        chars.next();
                        field.push('"');
                    }
                    '"' => break,
                    c => field.push(c),
                }
            }
            match chars.next() {
                None => {
                    fields.push(field);
                    return Some(fields);
                }
                Some(keys::FIELD_SEPARATOR) => fields.push(field),
                Some(_) => return None,
            }
        } else {
            loop {
                match chars.next() {
                    None => {
                        fields.push(field);
                        return Some(fields);
                    }
                    Some(keys::FIELD_SEPARATOR) => break,
                    Some(c) => field.push(c),
                }
            }
            fields.push(field);
        }
    }
}
