//! Saldo computation: oldest-debt-first rent allocation.
//!
//! Payments are not pinned to the month they arrived in. They feed one
//! running credit pool that settles the oldest outstanding obligation
//! first, the statutory allocation rule for recurring debts. A late
//! payment therefore still retroactively covers the oldest open month
//! whenever the cumulative sum supports it.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::LedgerConfig;

use super::domain::{
    AggregateStatus, PaymentStatus, PropertyDataBounds, RentReduction, Tenancy, Transaction,
};
use super::escalation::{self, EscalationDecision, EscalationRecord};
use super::period::{effective_period, Period};

/// One saldo computation's inputs, assembled by the caller from the
/// current record snapshot. For pooled obligor groups `transactions`
/// already contains every member's payments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerFacts {
    pub tenancy: Tenancy,
    #[serde(default)]
    pub reductions: Vec<RentReduction>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub bounds: PropertyDataBounds,
}

/// One row of the reconstructed ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodEntry {
    pub period: Period,
    pub obligation: Decimal,
    pub covered: Decimal,
    pub status: PaymentStatus,
    /// Payments displayed under this period per the cutoff rule. Purely
    /// informational; `covered` ignores it.
    pub payments: Vec<Transaction>,
}

/// Per-tenancy ledger result: chronological period rows plus aggregates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Saldo {
    pub entries: Vec<PeriodEntry>,
    pub total_obligation: Decimal,
    pub total_paid: Decimal,
    /// Positive = credit, negative = arrears.
    pub balance: Decimal,
    /// Balance over closed months only, so the still-accruing reference
    /// month does not distort arrears figures.
    pub balance_excluding_current: Decimal,
    pub current_period_status: AggregateStatus,
    pub last_closed_period_status: AggregateStatus,
}

impl Saldo {
    fn no_data(total_paid: Decimal) -> Self {
        Self {
            entries: Vec::new(),
            total_obligation: Decimal::ZERO,
            total_paid,
            balance: total_paid,
            balance_excluding_current: total_paid,
            current_period_status: AggregateStatus::NoData,
            last_closed_period_status: AggregateStatus::NoData,
        }
    }
}

/// Net amount owed for one period: contractual rent minus the approved
/// reduction for exactly that period, floored at zero.
pub(crate) fn obligation_for(
    rent: Decimal,
    reductions: &BTreeMap<Period, Decimal>,
    period: Period,
) -> Decimal {
    let reduction = reductions.get(&period).copied().unwrap_or(Decimal::ZERO);
    (rent - reduction).max(Decimal::ZERO)
}

pub(crate) fn reduction_map(tenancy: &Tenancy, reductions: &[RentReduction]) -> BTreeMap<Period, Decimal> {
    reductions
        .iter()
        .filter(|reduction| reduction.tenancy_id == tenancy.id)
        .map(|reduction| (reduction.period, reduction.amount))
        .collect()
}

/// Stateless calculator applying the ledger configuration to tenancy
/// facts. Pure: same inputs, same saldo, no clock reads.
#[derive(Debug, Clone, Default)]
pub struct LedgerEngine {
    config: LedgerConfig,
}

impl LedgerEngine {
    pub fn new(config: LedgerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Reconstruct the tenancy's ledger as of `today`.
    pub fn saldo(&self, facts: &LedgerFacts, today: NaiveDate) -> Saldo {
        let current = Period::from_date(today);

        // Obligations run through the current period, but when the
        // property's data ends earlier, stop one period past the latest
        // import so cutoff-shifted payments still land in a generated row
        // without inventing unobserved future months.
        let mut end = current;
        if let Some(latest) = facts.bounds.latest_observed {
            if latest < current {
                end = latest.next().min(current);
            }
        }

        let mut payments: Vec<Transaction> = facts
            .transactions
            .iter()
            .filter(|tx| tx.counts_toward_rent())
            .cloned()
            .collect();
        payments.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.0.cmp(&b.id.0)));

        let total_paid: Decimal = payments.iter().map(|tx| tx.amount).sum();

        // Start with the earliest observed property period; a later
        // move-in pushes the start forward. Anything before the data
        // window counts as settled.
        let mut start = facts.bounds.earliest_observed;
        if let Some(move_in) = facts.tenancy.move_in {
            let move_in_period = Period::from_date(move_in);
            if start.map_or(true, |earliest| move_in_period > earliest) {
                start = Some(move_in_period);
            }
        }
        if start.is_none() {
            start = payments.first().map(|tx| Period::from_date(tx.date));
        }

        let Some(start) = start else {
            return Saldo::no_data(total_paid);
        };
        if start > current {
            // Tenancy not yet due; everything received so far is credit.
            return Saldo::no_data(total_paid);
        }

        let reductions = reduction_map(&facts.tenancy, &facts.reductions);

        let mut by_effective: BTreeMap<Period, Vec<Transaction>> = BTreeMap::new();
        for tx in &payments {
            by_effective
                .entry(effective_period(tx.date, self.config.cutoff_day))
                .or_default()
                .push(tx.clone());
        }

        let mut remaining = total_paid;
        let mut entries = Vec::new();
        for period in start.through(end) {
            let obligation = obligation_for(facts.tenancy.contractual_rent, &reductions, period);
            let covered = remaining.min(obligation);
            remaining -= covered;

            let status = if covered >= obligation {
                PaymentStatus::Paid
            } else if covered > Decimal::ZERO {
                PaymentStatus::Partial
            } else {
                PaymentStatus::Open
            };

            entries.push(PeriodEntry {
                period,
                obligation,
                covered,
                status,
                payments: by_effective.remove(&period).unwrap_or_default(),
            });
        }

        let total_obligation: Decimal = entries.iter().map(|entry| entry.obligation).sum();
        let closed_obligation: Decimal = entries
            .iter()
            .filter(|entry| entry.period < current)
            .map(|entry| entry.obligation)
            .sum();

        let status_at = |period: Period| {
            entries
                .iter()
                .find(|entry| entry.period == period)
                .map(|entry| AggregateStatus::from(entry.status))
                .unwrap_or(AggregateStatus::NoData)
        };
        let current_period_status = status_at(current);
        let last_closed_period_status = status_at(current.previous());

        Saldo {
            total_obligation,
            total_paid,
            balance: total_paid - total_obligation,
            balance_excluding_current: total_paid - closed_obligation,
            current_period_status,
            last_closed_period_status,
            entries,
        }
    }

    /// Next permissible notice level plus the periods still short by the
    /// per-calendar-month yardstick (see [`escalation`]).
    pub fn escalation(
        &self,
        facts: &LedgerFacts,
        history: &[EscalationRecord],
        observed_periods: &[Period],
    ) -> EscalationDecision {
        escalation::decide(facts, history, observed_periods)
    }
}
