//! Loader for normalized transaction exports.
//!
//! Consumes the record store's own CSV snapshot format (id, tenancy id,
//! date, amount, purpose). Bank-statement parsing and sender matching
//! happen upstream; by the time data reaches this loader every row is a
//! well-formed historical fact, and anything else is a hard import error.

mod parser;

use std::fmt;
use std::io::Read;
use std::path::Path;

use crate::ledger::domain::{PropertyDataBounds, Transaction};
use crate::ledger::period::Period;

#[derive(Debug)]
pub enum SnapshotImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    InvalidDate { line: usize, value: String },
    InvalidAmount { line: usize, value: String },
}

impl fmt::Display for SnapshotImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotImportError::Io(err) => {
                write!(f, "failed to read transaction snapshot: {}", err)
            }
            SnapshotImportError::Csv(err) => write!(f, "invalid snapshot CSV data: {}", err),
            SnapshotImportError::InvalidDate { line, value } => {
                write!(f, "line {line}: '{value}' is not a YYYY-MM-DD date")
            }
            SnapshotImportError::InvalidAmount { line, value } => {
                write!(f, "line {line}: '{value}' is not a decimal amount")
            }
        }
    }
}

impl std::error::Error for SnapshotImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SnapshotImportError::Io(err) => Some(err),
            SnapshotImportError::Csv(err) => Some(err),
            SnapshotImportError::InvalidDate { .. } | SnapshotImportError::InvalidAmount { .. } => {
                None
            }
        }
    }
}

impl From<std::io::Error> for SnapshotImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for SnapshotImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// A property's transaction snapshot plus the aggregates the ledger
/// engine needs from the persistence collaborator.
#[derive(Debug, Clone)]
pub struct TransactionSnapshot {
    transactions: Vec<Transaction>,
}

impl TransactionSnapshot {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, SnapshotImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, SnapshotImportError> {
        let transactions = parser::parse_records(reader)?;
        Ok(Self { transactions })
    }

    pub fn from_transactions(transactions: Vec<Transaction>) -> Self {
        Self { transactions }
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn into_transactions(self) -> Vec<Transaction> {
        self.transactions
    }

    /// Earliest/latest raw calendar months across the classified rows.
    pub fn data_bounds(&self) -> PropertyDataBounds {
        let observed = self.observed_periods();
        PropertyDataBounds {
            earliest_observed: observed.first().copied(),
            latest_observed: observed.last().copied(),
        }
    }

    /// Distinct raw calendar months with classified data, ascending.
    pub fn observed_periods(&self) -> Vec<Period> {
        let mut periods: Vec<Period> = self
            .transactions
            .iter()
            .filter(|tx| tx.counts_toward_rent())
            .map(|tx| Period::from_date(tx.date))
            .collect();
        periods.sort();
        periods.dedup();
        periods
    }
}
