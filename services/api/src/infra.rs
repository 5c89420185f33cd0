use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use rent_ledger::ledger::{
    EscalationRecord, LedgerStore, NoticeDispatch, NoticeError, NoticePublisher, Period,
    PropertyDataBounds, RentReduction, StoreError, Tenancy, TenancyId, Transaction,
};
use rent_ledger::snapshot::TransactionSnapshot;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Record store backed by process memory. Stands in for the persistence
/// collaborator in the demo CLI, tests, and the default server setup.
#[derive(Default)]
pub(crate) struct InMemoryLedgerStore {
    tenancies: Mutex<HashMap<TenancyId, Tenancy>>,
    reductions: Mutex<Vec<RentReduction>>,
    transactions: Mutex<Vec<Transaction>>,
    escalations: Mutex<Vec<EscalationRecord>>,
}

impl InMemoryLedgerStore {
    pub(crate) fn insert_tenancy(&self, tenancy: Tenancy) {
        self.tenancies
            .lock()
            .expect("store mutex poisoned")
            .insert(tenancy.id.clone(), tenancy);
    }

    pub(crate) fn insert_reduction(&self, reduction: RentReduction) {
        self.reductions
            .lock()
            .expect("store mutex poisoned")
            .push(reduction);
    }

    pub(crate) fn load_snapshot(&self, snapshot: TransactionSnapshot) {
        self.transactions
            .lock()
            .expect("store mutex poisoned")
            .extend(snapshot.into_transactions());
    }

    fn snapshot(&self) -> TransactionSnapshot {
        TransactionSnapshot::from_transactions(
            self.transactions
                .lock()
                .expect("store mutex poisoned")
                .clone(),
        )
    }
}

impl LedgerStore for InMemoryLedgerStore {
    fn tenancy(&self, id: &TenancyId) -> Result<Option<Tenancy>, StoreError> {
        Ok(self
            .tenancies
            .lock()
            .expect("store mutex poisoned")
            .get(id)
            .cloned())
    }

    fn reductions(&self, id: &TenancyId) -> Result<Vec<RentReduction>, StoreError> {
        Ok(self
            .reductions
            .lock()
            .expect("store mutex poisoned")
            .iter()
            .filter(|reduction| &reduction.tenancy_id == id)
            .cloned()
            .collect())
    }

    fn transactions(&self, ids: &[TenancyId]) -> Result<Vec<Transaction>, StoreError> {
        Ok(self
            .transactions
            .lock()
            .expect("store mutex poisoned")
            .iter()
            .filter(|tx| tx.tenancy_id.as_ref().is_some_and(|id| ids.contains(id)))
            .cloned()
            .collect())
    }

    fn data_bounds(&self) -> Result<PropertyDataBounds, StoreError> {
        Ok(self.snapshot().data_bounds())
    }

    fn observed_periods(&self) -> Result<Vec<Period>, StoreError> {
        Ok(self.snapshot().observed_periods())
    }

    fn escalation_history(&self, id: &TenancyId) -> Result<Vec<EscalationRecord>, StoreError> {
        Ok(self
            .escalations
            .lock()
            .expect("store mutex poisoned")
            .iter()
            .filter(|record| &record.tenancy_id == id)
            .cloned()
            .collect())
    }

    fn append_escalation(&self, record: EscalationRecord) -> Result<(), StoreError> {
        self.escalations
            .lock()
            .expect("store mutex poisoned")
            .push(record);
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct InMemoryNoticePublisher {
    events: Mutex<Vec<NoticeDispatch>>,
}

impl NoticePublisher for InMemoryNoticePublisher {
    fn publish(&self, notice: NoticeDispatch) -> Result<(), NoticeError> {
        let mut guard = self.events.lock().expect("notice mutex poisoned");
        guard.push(notice);
        Ok(())
    }
}

impl InMemoryNoticePublisher {
    pub(crate) fn events(&self) -> Vec<NoticeDispatch> {
        self.events.lock().expect("notice mutex poisoned").clone()
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn parse_amount(raw: &str) -> Result<Decimal, String> {
    raw.trim()
        .parse::<Decimal>()
        .map_err(|err| format!("failed to parse '{raw}' as a decimal amount ({err})"))
}

pub(crate) fn deserialize_optional_date<'de, D>(
    deserializer: D,
) -> Result<Option<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;

    let opt = Option::<String>::deserialize(deserializer)?;
    opt.map(|value| parse_date(&value).map_err(serde::de::Error::custom))
        .transpose()
}
