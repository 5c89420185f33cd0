use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::config::LedgerConfig;
use crate::ledger::domain::{
    ObligorKind, PropertyDataBounds, RentReduction, Tenancy, TenancyId, Transaction, TransactionId,
};
use crate::ledger::escalation::EscalationRecord;
use crate::ledger::period::Period;
use crate::ledger::repository::{
    LedgerStore, NoticeDispatch, NoticeError, NoticePublisher, StoreError,
};
use crate::ledger::saldo::{LedgerEngine, LedgerFacts};
use crate::ledger::service::LedgerService;
use crate::snapshot::TransactionSnapshot;

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn period(raw: &str) -> Period {
    raw.parse().expect("valid period")
}

pub(super) fn engine() -> LedgerEngine {
    LedgerEngine::new(LedgerConfig::default())
}

pub(super) fn solo_tenancy(id: &str, rent: Decimal, move_in: Option<NaiveDate>) -> Tenancy {
    Tenancy {
        id: TenancyId(id.to_string()),
        name: format!("Tenant {id}"),
        unit_label: "Unit 1".to_string(),
        contractual_rent: rent,
        move_in,
        active: true,
        obligor: ObligorKind::Solo,
    }
}

pub(super) fn payment(id: &str, tenancy: &str, date: NaiveDate, amount: Decimal) -> Transaction {
    Transaction {
        id: TransactionId(id.to_string()),
        tenancy_id: Some(TenancyId(tenancy.to_string())),
        date,
        amount,
        purpose: format!("rent {tenancy}"),
    }
}

pub(super) fn reduction(tenancy: &str, period_raw: &str, amount: Decimal) -> RentReduction {
    RentReduction {
        tenancy_id: TenancyId(tenancy.to_string()),
        period: period(period_raw),
        amount,
    }
}

pub(super) fn bounds(earliest: &str, latest: &str) -> PropertyDataBounds {
    PropertyDataBounds {
        earliest_observed: Some(period(earliest)),
        latest_observed: Some(period(latest)),
    }
}

pub(super) fn facts(
    tenancy: Tenancy,
    transactions: Vec<Transaction>,
    bounds: PropertyDataBounds,
) -> LedgerFacts {
    LedgerFacts {
        tenancy,
        reductions: Vec::new(),
        transactions,
        bounds,
    }
}

#[derive(Default)]
pub(super) struct MemoryStore {
    tenancies: Mutex<HashMap<TenancyId, Tenancy>>,
    reductions: Mutex<Vec<RentReduction>>,
    transactions: Mutex<Vec<Transaction>>,
    escalations: Mutex<Vec<EscalationRecord>>,
}

impl MemoryStore {
    pub(super) fn insert_tenancy(&self, tenancy: Tenancy) {
        self.tenancies
            .lock()
            .expect("store mutex poisoned")
            .insert(tenancy.id.clone(), tenancy);
    }

    pub(super) fn insert_reduction(&self, reduction: RentReduction) {
        self.reductions
            .lock()
            .expect("store mutex poisoned")
            .push(reduction);
    }

    pub(super) fn insert_transactions(&self, transactions: Vec<Transaction>) {
        self.transactions
            .lock()
            .expect("store mutex poisoned")
            .extend(transactions);
    }

    pub(super) fn escalations(&self) -> Vec<EscalationRecord> {
        self.escalations.lock().expect("store mutex poisoned").clone()
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

impl LedgerStore for MemoryStore {
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

pub(super) struct UnavailableStore;

impl LedgerStore for UnavailableStore {
    fn tenancy(&self, _id: &TenancyId) -> Result<Option<Tenancy>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn reductions(&self, _id: &TenancyId) -> Result<Vec<RentReduction>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn transactions(&self, _ids: &[TenancyId]) -> Result<Vec<Transaction>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn data_bounds(&self) -> Result<PropertyDataBounds, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn observed_periods(&self) -> Result<Vec<Period>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn escalation_history(&self, _id: &TenancyId) -> Result<Vec<EscalationRecord>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn append_escalation(&self, _record: EscalationRecord) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

#[derive(Default)]
pub(super) struct MemoryNotices {
    published: Mutex<Vec<NoticeDispatch>>,
}

impl MemoryNotices {
    pub(super) fn published(&self) -> Vec<NoticeDispatch> {
        self.published.lock().expect("notice mutex poisoned").clone()
    }
}

impl NoticePublisher for MemoryNotices {
    fn publish(&self, notice: NoticeDispatch) -> Result<(), NoticeError> {
        self.published
            .lock()
            .expect("notice mutex poisoned")
            .push(notice);
        Ok(())
    }
}

pub(super) fn build_service() -> (
    Arc<LedgerService<MemoryStore, MemoryNotices>>,
    Arc<MemoryStore>,
    Arc<MemoryNotices>,
) {
    let store = Arc::new(MemoryStore::default());
    let notices = Arc::new(MemoryNotices::default());
    let service = Arc::new(LedgerService::new(
        store.clone(),
        notices.clone(),
        LedgerConfig::default(),
    ));
    (service, store, notices)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
