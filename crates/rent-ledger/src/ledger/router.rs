use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::json;

use super::domain::TenancyId;
use super::repository::{LedgerStore, NoticePublisher};
use super::service::{LedgerService, LedgerServiceError};

/// Router builder exposing the ledger engine over HTTP.
pub fn ledger_router<S, N>(service: Arc<LedgerService<S, N>>) -> Router
where
    S: LedgerStore + 'static,
    N: NoticePublisher + 'static,
{
    Router::new()
        .route(
            "/api/v1/tenancies/:tenancy_id/saldo",
            get(saldo_handler::<S, N>),
        )
        .route(
            "/api/v1/tenancies/:tenancy_id/escalation",
            get(escalation_handler::<S, N>),
        )
        .route(
            "/api/v1/tenancies/:tenancy_id/notices",
            post(issue_notice_handler::<S, N>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct AsOfQuery {
    /// Reference date for the computation; defaults to today.
    as_of: Option<NaiveDate>,
}

impl AsOfQuery {
    fn resolve(&self) -> NaiveDate {
        self.as_of.unwrap_or_else(|| Local::now().date_naive())
    }
}

pub(crate) async fn saldo_handler<S, N>(
    State(service): State<Arc<LedgerService<S, N>>>,
    Path(tenancy_id): Path<String>,
    Query(query): Query<AsOfQuery>,
) -> Response
where
    S: LedgerStore + 'static,
    N: NoticePublisher + 'static,
{
    let id = TenancyId(tenancy_id);
    match service.saldo(&id, query.resolve()) {
        Ok(saldo) => (StatusCode::OK, axum::Json(saldo)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn escalation_handler<S, N>(
    State(service): State<Arc<LedgerService<S, N>>>,
    Path(tenancy_id): Path<String>,
) -> Response
where
    S: LedgerStore + 'static,
    N: NoticePublisher + 'static,
{
    let id = TenancyId(tenancy_id);
    match service.escalation(&id) {
        Ok(decision) => (StatusCode::OK, axum::Json(decision)).into_response(),
        Err(error) => error_response(error),
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct IssueNoticeRequest {
    #[serde(default)]
    as_of: Option<NaiveDate>,
}

pub(crate) async fn issue_notice_handler<S, N>(
    State(service): State<Arc<LedgerService<S, N>>>,
    Path(tenancy_id): Path<String>,
    axum::Json(request): axum::Json<IssueNoticeRequest>,
) -> Response
where
    S: LedgerStore + 'static,
    N: NoticePublisher + 'static,
{
    let id = TenancyId(tenancy_id);
    let today = request.as_of.unwrap_or_else(|| Local::now().date_naive());
    match service.issue_notice(&id, today) {
        Ok(record) => (StatusCode::CREATED, axum::Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: LedgerServiceError) -> Response {
    let status = match &error {
        LedgerServiceError::UnknownTenancy(_) => StatusCode::NOT_FOUND,
        LedgerServiceError::NotEligible(_) | LedgerServiceError::NothingOutstanding(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        LedgerServiceError::Store(_) | LedgerServiceError::Notice(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}
