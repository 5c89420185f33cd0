//! Obligor group pooling for shared-apartment tenancies: several
//! individual payers jointly discharge one combined obligation.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use super::domain::{ObligorKind, Tenancy, TenancyId, Transaction};
use super::period::{effective_period, Period};

/// The tenancies whose payments feed this tenancy's credit pool. A group
/// representative pools every member; everyone else pays for themselves.
pub(crate) fn pooled_tenancy_ids(tenancy: &Tenancy) -> Vec<TenancyId> {
    let mut ids = vec![tenancy.id.clone()];
    if let ObligorKind::GroupRepresentative { members } = &tenancy.obligor {
        for member in members {
            if !ids.contains(member) {
                ids.push(member.clone());
            }
        }
    }
    ids
}

/// Informational per-member breakdown: what one payer contributed per
/// display period. A plain sum by effective period, unrelated to the
/// oldest-debt-first allocation.
pub(crate) fn member_payments_by_period(
    member: &TenancyId,
    transactions: &[Transaction],
    cutoff_day: u32,
) -> BTreeMap<Period, Decimal> {
    let mut totals = BTreeMap::new();
    for tx in transactions {
        if !tx.counts_toward_rent() || tx.tenancy_id.as_ref() != Some(member) {
            continue;
        }
        let period = effective_period(tx.date, cutoff_day);
        *totals.entry(period).or_insert(Decimal::ZERO) += tx.amount;
    }
    totals
}
