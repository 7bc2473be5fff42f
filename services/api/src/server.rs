use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use sri_toolkit::buildings::BuildingService;
use sri_toolkit::config::AppConfig;
use sri_toolkit::error::AppError;
use sri_toolkit::reference::ReferenceData;
use sri_toolkit::scoring::SriCalculator;
use sri_toolkit::telemetry;
use tracing::info;

use crate::cli::ServeArgs;
use crate::infra::{load_catalog, AppState, InMemoryBuildingRepository};
use crate::routes::with_sri_routes;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let reference: Arc<dyn ReferenceData> =
        Arc::new(load_catalog(config.reference.data_dir.as_deref())?);
    let calculator = SriCalculator::new(reference);

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        calculator: calculator.clone(),
    };

    let building_service = Arc::new(
        BuildingService::new(Arc::new(InMemoryBuildingRepository::default()), calculator)
            .with_max_depth(config.upgrade.max_depth),
    );

    let app = with_sri_routes(building_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        max_depth = config.upgrade.max_depth,
        "sri toolkit api ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
