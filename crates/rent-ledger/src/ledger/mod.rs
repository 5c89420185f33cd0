//! Rent ledger core: period sequencing, obligation calculation,
//! oldest-debt-first allocation, obligor group pooling, and the arrears
//! escalation ladder, plus the service facade and HTTP router that expose
//! them.

pub mod domain;
pub mod escalation;
pub(crate) mod group;
pub mod period;
pub mod repository;
pub mod router;
pub mod saldo;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    AggregateStatus, ObligorKind, PaymentStatus, PropertyDataBounds, RentReduction, Tenancy,
    TenancyId, Transaction, TransactionId,
};
pub use escalation::{
    eligible_for_notice, EscalationDecision, EscalationLevel, EscalationRecord, OpenPeriod,
};
pub use period::{effective_period, Period};
pub use repository::{
    LedgerStore, NoticeDispatch, NoticeError, NoticePublisher, StoreError,
};
pub use router::ledger_router;
pub use saldo::{LedgerEngine, LedgerFacts, PeriodEntry, Saldo};
pub use service::{LedgerService, LedgerServiceError};
