use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use std::io::Read;

use crate::ledger::domain::{TenancyId, Transaction, TransactionId};

use super::SnapshotImportError;

pub(crate) fn parse_records<R: Read>(reader: R) -> Result<Vec<Transaction>, SnapshotImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = Vec::new();

    for (index, record) in csv_reader.deserialize::<SnapshotRow>().enumerate() {
        let row = record?;
        // header row is line 1, first data row line 2
        records.push(row.into_transaction(index + 2)?);
    }

    Ok(records)
}

/// One row of a normalized transaction export: already classified (or
/// deliberately unmatched), never a raw bank statement.
#[derive(Debug, Deserialize)]
struct SnapshotRow {
    id: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    tenancy_id: Option<String>,
    date: String,
    amount: String,
    #[serde(default)]
    purpose: String,
}

impl SnapshotRow {
    fn into_transaction(self, line: usize) -> Result<Transaction, SnapshotImportError> {
        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").map_err(|_| {
            SnapshotImportError::InvalidDate {
                line,
                value: self.date.clone(),
            }
        })?;

        let amount: Decimal =
            self.amount
                .trim()
                .parse()
                .map_err(|_| SnapshotImportError::InvalidAmount {
                    line,
                    value: self.amount.clone(),
                })?;

        Ok(Transaction {
            id: TransactionId(self.id),
            tenancy_id: self.tenancy_id.map(TenancyId),
            date,
            amount,
            purpose: self.purpose,
        })
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
