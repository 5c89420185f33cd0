use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::period::Period;

/// Identifier wrapper for tenancy records.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TenancyId(pub String);

impl fmt::Display for TenancyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for classified bank transactions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionId(pub String);

/// How a tenancy participates in discharging rent. Resolved once when
/// tenancy facts are loaded; the engine never re-derives this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObligorKind {
    /// Pays its own rent alone.
    Solo,
    /// Shared-apartment payer whose payments discharge the group's
    /// obligation, carried by the representative tenancy.
    GroupMember { representative: TenancyId },
    /// Carries the combined obligation of a shared-apartment group.
    GroupRepresentative { members: Vec<TenancyId> },
}

impl ObligorKind {
    pub fn is_group_member(&self) -> bool {
        matches!(self, ObligorKind::GroupMember { .. })
    }
}

/// Tenancy facts as entered through the record-editing UI. Read-only from
/// the engine's point of view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tenancy {
    pub id: TenancyId,
    pub name: String,
    pub unit_label: String,
    pub contractual_rent: Decimal,
    pub move_in: Option<NaiveDate>,
    pub active: bool,
    pub obligor: ObligorKind,
}

/// A classified bank payment. Immutable historical fact once persisted;
/// `tenancy_id` stays `None` until the external matching step assigns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub tenancy_id: Option<TenancyId>,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub purpose: String,
}

impl Transaction {
    /// Only classified, incoming amounts take part in any computation.
    pub fn counts_toward_rent(&self) -> bool {
        self.tenancy_id.is_some() && self.amount > Decimal::ZERO
    }
}

/// Landlord-approved reduction of a single period's rent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentReduction {
    pub tenancy_id: TenancyId,
    pub period: Period,
    pub amount: Decimal,
}

/// Earliest/latest billing periods observed in the property's classified
/// transaction data, supplied by the persistence collaborator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDataBounds {
    pub earliest_observed: Option<Period>,
    pub latest_observed: Option<Period>,
}

/// Payment status of a single billing period row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Paid,
    Partial,
    Open,
}

impl PaymentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Paid => "paid",
            Self::Partial => "partial",
            Self::Open => "open",
        }
    }
}

/// Status reported for a reference period that may have no ledger row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateStatus {
    Paid,
    Partial,
    Open,
    NoData,
}

impl AggregateStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Paid => "paid",
            Self::Partial => "partial",
            Self::Open => "open",
            Self::NoData => "no_data",
        }
    }
}

impl From<PaymentStatus> for AggregateStatus {
    fn from(status: PaymentStatus) -> Self {
        match status {
            PaymentStatus::Paid => Self::Paid,
            PaymentStatus::Partial => Self::Partial,
            PaymentStatus::Open => Self::Open,
        }
    }
}
