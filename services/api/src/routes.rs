use crate::infra::{deserialize_optional_date, AppState};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use chrono::{Local, NaiveDate};
use rent_ledger::config::LedgerConfig;
use rent_ledger::error::AppError;
use rent_ledger::ledger::{
    ledger_router, LedgerEngine, LedgerFacts, LedgerService, LedgerStore, NoticePublisher,
    PropertyDataBounds, RentReduction, Saldo, Tenancy, Transaction,
};
use rent_ledger::snapshot::TransactionSnapshot;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io::Cursor;
use std::sync::Arc;

/// Stateless saldo preview: the caller supplies the record snapshot
/// inline (or as a normalized CSV export) and gets the reconstructed
/// ledger back, no store involved.
#[derive(Debug, Deserialize)]
pub(crate) struct SaldoPreviewRequest {
    pub(crate) tenancy: Tenancy,
    #[serde(default)]
    pub(crate) reductions: Vec<RentReduction>,
    #[serde(default)]
    pub(crate) transactions: Vec<Transaction>,
    #[serde(default)]
    pub(crate) transactions_csv: Option<String>,
    #[serde(default)]
    pub(crate) bounds: Option<PropertyDataBounds>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) as_of: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SaldoPreviewResponse {
    pub(crate) as_of: NaiveDate,
    pub(crate) data_source: LedgerDataSource,
    pub(crate) saldo: Saldo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum LedgerDataSource {
    Inline,
    SnapshotCsv,
}

pub(crate) fn with_ledger_routes<S, N>(service: Arc<LedgerService<S, N>>) -> axum::Router
where
    S: LedgerStore + 'static,
    N: NoticePublisher + 'static,
{
    ledger_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/ledger/preview",
            axum::routing::post(saldo_preview_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn saldo_preview_endpoint(
    Json(payload): Json<SaldoPreviewRequest>,
) -> Result<Json<SaldoPreviewResponse>, AppError> {
    let SaldoPreviewRequest {
        tenancy,
        reductions,
        mut transactions,
        transactions_csv,
        bounds,
        as_of,
    } = payload;

    let data_source = if let Some(csv) = transactions_csv {
        let snapshot = TransactionSnapshot::from_reader(Cursor::new(csv.into_bytes()))?;
        transactions.extend(snapshot.into_transactions());
        LedgerDataSource::SnapshotCsv
    } else {
        LedgerDataSource::Inline
    };

    let bounds = bounds.unwrap_or_else(|| {
        TransactionSnapshot::from_transactions(transactions.clone()).data_bounds()
    });

    let as_of = as_of.unwrap_or_else(|| Local::now().date_naive());
    let engine = LedgerEngine::new(LedgerConfig::default());
    let saldo = engine.saldo(
        &LedgerFacts {
            tenancy,
            reductions,
            transactions,
            bounds,
        },
        as_of,
    );

    Ok(Json(SaldoPreviewResponse {
        as_of,
        data_source,
        saldo,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Json;
    use rent_ledger::ledger::{ObligorKind, PaymentStatus, TenancyId};
    use rust_decimal_macros::dec;

    fn preview_tenancy() -> Tenancy {
        Tenancy {
            id: TenancyId("t-1".to_string()),
            name: "Tenant t-1".to_string(),
            unit_label: "Unit 1".to_string(),
            contractual_rent: dec!(650.00),
            move_in: NaiveDate::from_ymd_opt(2025, 1, 1),
            active: true,
            obligor: ObligorKind::Solo,
        }
    }

    #[tokio::test]
    async fn preview_endpoint_computes_a_saldo_from_csv() {
        let request = SaldoPreviewRequest {
            tenancy: preview_tenancy(),
            reductions: Vec::new(),
            transactions: Vec::new(),
            transactions_csv: Some(
                "id,tenancy_id,date,amount,purpose\ntx-1,t-1,2025-01-03,650.00,rent\n".to_string(),
            ),
            bounds: None,
            as_of: NaiveDate::from_ymd_opt(2025, 2, 15),
        };

        let Json(body) = saldo_preview_endpoint(Json(request))
            .await
            .expect("preview computes");

        assert_eq!(body.data_source, LedgerDataSource::SnapshotCsv);
        assert_eq!(body.saldo.entries.len(), 2);
        assert_eq!(body.saldo.entries[0].status, PaymentStatus::Paid);
        assert_eq!(body.saldo.balance_excluding_current, dec!(0.00));
    }

    #[tokio::test]
    async fn preview_endpoint_rejects_malformed_csv() {
        let request = SaldoPreviewRequest {
            tenancy: preview_tenancy(),
            reductions: Vec::new(),
            transactions: Vec::new(),
            transactions_csv: Some(
                "id,tenancy_id,date,amount,purpose\ntx-1,t-1,bad-date,650.00,rent\n".to_string(),
            ),
            bounds: None,
            as_of: NaiveDate::from_ymd_opt(2025, 2, 15),
        };

        let error = saldo_preview_endpoint(Json(request))
            .await
            .expect_err("malformed csv fails");
        assert!(matches!(error, AppError::Snapshot(_)));
    }

    #[tokio::test]
    async fn preview_endpoint_accepts_inline_transactions() {
        let request = SaldoPreviewRequest {
            tenancy: preview_tenancy(),
            reductions: Vec::new(),
            transactions: vec![Transaction {
                id: rent_ledger::ledger::TransactionId("tx-1".to_string()),
                tenancy_id: Some(TenancyId("t-1".to_string())),
                date: NaiveDate::from_ymd_opt(2025, 1, 3).unwrap(),
                amount: dec!(650.00),
                purpose: "rent".to_string(),
            }],
            transactions_csv: None,
            bounds: None,
            as_of: NaiveDate::from_ymd_opt(2025, 1, 20),
        };

        let Json(body) = saldo_preview_endpoint(Json(request))
            .await
            .expect("preview computes");

        assert_eq!(body.data_source, LedgerDataSource::Inline);
        assert_eq!(body.saldo.total_paid, dec!(650.00));
        assert_eq!(body.saldo.entries.len(), 1);
    }
}
