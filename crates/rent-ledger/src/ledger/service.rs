use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use tracing::info;

use crate::config::LedgerConfig;

use super::domain::TenancyId;
use super::escalation::{self, EscalationDecision, EscalationRecord};
use super::group;
use super::period::Period;
use super::repository::{LedgerStore, NoticeDispatch, NoticeError, NoticePublisher, StoreError};
use super::saldo::{LedgerEngine, LedgerFacts, Saldo};

/// Service composing the record store, the ledger engine, and the notice
/// publisher. Every call re-reads the latest persisted facts and
/// recomputes from scratch; nothing is cached.
pub struct LedgerService<S, N> {
    store: Arc<S>,
    notices: Arc<N>,
    engine: LedgerEngine,
}

impl<S, N> LedgerService<S, N>
where
    S: LedgerStore + 'static,
    N: NoticePublisher + 'static,
{
    pub fn new(store: Arc<S>, notices: Arc<N>, config: LedgerConfig) -> Self {
        Self {
            store,
            notices,
            engine: LedgerEngine::new(config),
        }
    }

    /// Reconstruct the tenancy's ledger as of `today`. For a group
    /// representative the credit pool spans every member's payments.
    pub fn saldo(&self, tenancy_id: &TenancyId, today: NaiveDate) -> Result<Saldo, LedgerServiceError> {
        let facts = self.facts(tenancy_id)?;
        Ok(self.engine.saldo(&facts, today))
    }

    /// Informational per-period sums of one payer's own transactions,
    /// independent of the pooled allocation.
    pub fn member_payments(
        &self,
        tenancy_id: &TenancyId,
    ) -> Result<BTreeMap<Period, Decimal>, LedgerServiceError> {
        let transactions = self.store.transactions(std::slice::from_ref(tenancy_id))?;
        Ok(group::member_payments_by_period(
            tenancy_id,
            &transactions,
            self.engine.config().cutoff_day,
        ))
    }

    /// What the next notice would look like, without issuing it.
    pub fn escalation(
        &self,
        tenancy_id: &TenancyId,
    ) -> Result<EscalationDecision, LedgerServiceError> {
        let facts = self.facts(tenancy_id)?;
        let history = self.store.escalation_history(tenancy_id)?;
        let observed = self.store.observed_periods()?;
        Ok(self.engine.escalation(&facts, &history, &observed))
    }

    /// Issue the next notice: refuse when the tenancy is ineligible or
    /// owes nothing, otherwise append the escalation record and hand the
    /// dispatch to the document collaborator.
    pub fn issue_notice(
        &self,
        tenancy_id: &TenancyId,
        today: NaiveDate,
    ) -> Result<EscalationRecord, LedgerServiceError> {
        let facts = self.facts(tenancy_id)?;
        if !escalation::eligible_for_notice(&facts.tenancy) {
            return Err(LedgerServiceError::NotEligible(tenancy_id.clone()));
        }

        let history = self.store.escalation_history(tenancy_id)?;
        let observed = self.store.observed_periods()?;
        let decision = self.engine.escalation(&facts, &history, &observed);
        if !decision.in_arrears() {
            return Err(LedgerServiceError::NothingOutstanding(tenancy_id.clone()));
        }

        let record = EscalationRecord {
            tenancy_id: tenancy_id.clone(),
            level: decision.next_level,
            amount: decision.total_debt,
            periods: decision
                .open_periods
                .iter()
                .map(|period| period.period)
                .collect(),
            issued_on: today,
        };
        self.store.append_escalation(record.clone())?;

        let deadline = today + Duration::days(self.engine.config().notice_deadline_days);
        self.notices.publish(NoticeDispatch {
            tenancy_id: tenancy_id.clone(),
            tenant_name: facts.tenancy.name.clone(),
            unit_label: facts.tenancy.unit_label.clone(),
            level: decision.next_level,
            level_label: decision.next_level.label(),
            open_periods: decision.open_periods,
            total_debt: decision.total_debt,
            issued_on: today,
            payment_deadline: deadline,
        })?;

        info!(
            tenancy = %tenancy_id,
            level = record.level.rank(),
            amount = %record.amount,
            "dunning notice issued"
        );

        Ok(record)
    }

    fn facts(&self, tenancy_id: &TenancyId) -> Result<LedgerFacts, LedgerServiceError> {
        let tenancy = self
            .store
            .tenancy(tenancy_id)?
            .ok_or_else(|| LedgerServiceError::UnknownTenancy(tenancy_id.clone()))?;

        let pool = group::pooled_tenancy_ids(&tenancy);
        let transactions = self.store.transactions(&pool)?;
        let reductions = self.store.reductions(tenancy_id)?;
        let bounds = self.store.data_bounds()?;

        Ok(LedgerFacts {
            tenancy,
            reductions,
            transactions,
            bounds,
        })
    }
}

/// Error raised by the ledger service.
#[derive(Debug, thiserror::Error)]
pub enum LedgerServiceError {
    #[error("unknown tenancy {0}")]
    UnknownTenancy(TenancyId),
    #[error("tenancy {0} is not eligible for dunning notices")]
    NotEligible(TenancyId),
    #[error("tenancy {0} has no open arrears")]
    NothingOutstanding(TenancyId),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Notice(#[from] NoticeError),
}
