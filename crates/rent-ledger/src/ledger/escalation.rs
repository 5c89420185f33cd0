//! Arrears escalation: a three-level notice ladder with saturating
//! progression.
//!
//! Open amounts here come from a direct month-by-month comparison of
//! obligation against payments booked in that raw calendar month, with no
//! carried-forward credit. A tenant can hold a non-negative ledger
//! balance and still show notice-relevant arrears; reconciliation and
//! formal notices deliberately use different yardsticks.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::domain::{Tenancy, TenancyId};
use super::period::Period;
use super::saldo::{obligation_for, reduction_map, LedgerFacts};

/// Notice severity, issued in order and never beyond the final level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationLevel {
    Reminder,
    FirstNotice,
    FinalNotice,
}

impl EscalationLevel {
    pub const fn rank(self) -> u8 {
        match self {
            Self::Reminder => 1,
            Self::FirstNotice => 2,
            Self::FinalNotice => 3,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Reminder => "payment reminder",
            Self::FirstNotice => "first dunning notice",
            Self::FinalNotice => "final dunning notice",
        }
    }

    /// The ladder saturates: a final notice is followed by another final
    /// notice, never a fourth level.
    pub const fn next(self) -> Self {
        match self {
            Self::Reminder => Self::FirstNotice,
            Self::FirstNotice | Self::FinalNotice => Self::FinalNotice,
        }
    }
}

/// Append-only record of an issued notice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscalationRecord {
    pub tenancy_id: TenancyId,
    pub level: EscalationLevel,
    pub amount: Decimal,
    pub periods: Vec<Period>,
    pub issued_on: NaiveDate,
}

/// A period still short by the notice yardstick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenPeriod {
    pub period: Period,
    pub obligation: Decimal,
    pub received: Decimal,
    pub diff: Decimal,
}

/// What the next notice for a tenancy would look like.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscalationDecision {
    pub next_level: EscalationLevel,
    pub open_periods: Vec<OpenPeriod>,
    pub total_debt: Decimal,
}

impl EscalationDecision {
    pub fn in_arrears(&self) -> bool {
        self.total_debt > Decimal::ZERO
    }
}

/// Next permissible level given the issued history: one past the highest
/// level already issued, starting at the reminder.
pub fn next_level(history: &[EscalationRecord]) -> EscalationLevel {
    history
        .iter()
        .map(|record| record.level)
        .max()
        .map(EscalationLevel::next)
        .unwrap_or(EscalationLevel::Reminder)
}

/// Notices are only generated for tenancies that are active, actually owe
/// rent, and are not group members (the representative carries the pooled
/// debt).
pub fn eligible_for_notice(tenancy: &Tenancy) -> bool {
    tenancy.active
        && tenancy.contractual_rent > Decimal::ZERO
        && !tenancy.obligor.is_group_member()
}

pub(crate) fn decide(
    facts: &LedgerFacts,
    history: &[EscalationRecord],
    observed_periods: &[Period],
) -> EscalationDecision {
    let open_periods = open_periods(facts, observed_periods);
    let total_debt = open_periods.iter().map(|period| period.diff).sum();

    EscalationDecision {
        next_level: next_level(history),
        open_periods,
        total_debt,
    }
}

/// Compare each observed calendar month's obligation against the payments
/// whose raw date falls in exactly that month, keeping the ones still
/// short. No credit carries over between months.
fn open_periods(facts: &LedgerFacts, observed_periods: &[Period]) -> Vec<OpenPeriod> {
    let reductions = reduction_map(&facts.tenancy, &facts.reductions);

    observed_periods
        .iter()
        .map(|&period| {
            let received: Decimal = facts
                .transactions
                .iter()
                .filter(|tx| tx.counts_toward_rent() && Period::from_date(tx.date) == period)
                .map(|tx| tx.amount)
                .sum();
            let obligation = obligation_for(facts.tenancy.contractual_rent, &reductions, period);

            OpenPeriod {
                period,
                obligation,
                received,
                diff: obligation - received,
            }
        })
        .filter(|period| period.diff > Decimal::ZERO)
        .collect()
}
