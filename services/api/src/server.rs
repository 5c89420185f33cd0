use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryLedgerStore, InMemoryNoticePublisher};
use crate::routes::with_ledger_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use rent_ledger::config::AppConfig;
use rent_ledger::error::AppError;
use rent_ledger::ledger::LedgerService;
use rent_ledger::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(InMemoryLedgerStore::default());
    let notices = Arc::new(InMemoryNoticePublisher::default());
    let ledger_service = Arc::new(LedgerService::new(store, notices, config.ledger));

    let app = with_ledger_routes(ledger_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "rent ledger service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
