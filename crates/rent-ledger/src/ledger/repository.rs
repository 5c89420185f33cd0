use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use super::domain::{PropertyDataBounds, RentReduction, Tenancy, TenancyId, Transaction};
use super::escalation::{EscalationLevel, EscalationRecord, OpenPeriod};
use super::period::Period;

/// Storage abstraction supplying record snapshots. The engine recomputes
/// from scratch on every invocation and writes nothing through this trait
/// except the append of an issued notice record.
pub trait LedgerStore: Send + Sync {
    fn tenancy(&self, id: &TenancyId) -> Result<Option<Tenancy>, StoreError>;
    fn reductions(&self, id: &TenancyId) -> Result<Vec<RentReduction>, StoreError>;
    /// Classified transactions belonging to any of the given tenancies.
    fn transactions(&self, ids: &[TenancyId]) -> Result<Vec<Transaction>, StoreError>;
    /// Earliest/latest billing periods across the property's classified
    /// transaction data.
    fn data_bounds(&self) -> Result<PropertyDataBounds, StoreError>;
    /// Distinct raw calendar months with classified transaction data,
    /// ascending.
    fn observed_periods(&self) -> Result<Vec<Period>, StoreError>;
    fn escalation_history(&self, id: &TenancyId) -> Result<Vec<EscalationRecord>, StoreError>;
    fn append_escalation(&self, record: EscalationRecord) -> Result<(), StoreError>;
}

/// Error enumeration for record store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record store unavailable: {0}")]
    Unavailable(String),
}

/// Payload handed to the notice-document collaborator when a dunning
/// notice is issued.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoticeDispatch {
    pub tenancy_id: TenancyId,
    pub tenant_name: String,
    pub unit_label: String,
    pub level: EscalationLevel,
    pub level_label: &'static str,
    pub open_periods: Vec<OpenPeriod>,
    pub total_debt: Decimal,
    pub issued_on: NaiveDate,
    pub payment_deadline: NaiveDate,
}

/// Trait describing the outbound notice hook (letter generator, e-mail
/// adapter, audit log).
pub trait NoticePublisher: Send + Sync {
    fn publish(&self, notice: NoticeDispatch) -> Result<(), NoticeError>;
}

/// Notice dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum NoticeError {
    #[error("notice transport unavailable: {0}")]
    Transport(String),
}
