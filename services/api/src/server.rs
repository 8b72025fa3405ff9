use crate::cli::ServeArgs;
use crate::infra::{AppState, ProcessRuntime};
use crate::routes::router;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use process_runtime::application::{ApplicationReadyEvent, WebApplicationType};
use process_runtime::config::AppConfig;
use process_runtime::error::AppError;
use process_runtime::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
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

    let runtime = ProcessRuntime::bootstrap(&config.deployment)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        repository: runtime.repository.clone(),
        publisher: runtime.publisher.clone(),
    };

    let app = router()
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    let application_type = config
        .web_application_type
        .unwrap_or(WebApplicationType::Servlet);
    runtime
        .producer
        .on_application_event(&ApplicationReadyEvent::new(application_type))?;

    info!(?config.environment, %addr, %application_type, "process runtime ready");

    axum::serve(listener, app).await?;
    Ok(())
}
