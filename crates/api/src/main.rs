use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use drawdowns_core::domain::drawdown::Drawdown;
use drawdowns_core::domain::price::PricePoint;
use drawdowns_core::repository::{CsvDirectorySource, PriceRepository, PriceSource};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = drawdowns_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let source = CsvDirectorySource::new(settings.prices_dir.clone());
    let state = AppState {
        repo: Arc::new(PriceRepository::new(source)),
    };

    // Warm the cache so the first request doesn't pay for parsing. A failure here is not
    // fatal; the next request retries the load.
    match state.repo.series_names().await {
        Ok(names) => tracing::info!(series = ?names, "price series ready"),
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(
                error = %e,
                prices_dir = %settings.prices_dir.display(),
                "initial price load failed; will retry on request"
            );
        }
    }

    let app = router(state).layer(TraceLayer::new_for_http());

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], settings.port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn router<S: PriceSource + 'static>(state: AppState<S>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/series", get(get_series::<S>))
        .route("/api/drawdowns", get(get_drawdowns::<S>))
        .route("/api/prices/:name", get(get_prices::<S>))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

struct AppState<S> {
    repo: Arc<PriceRepository<S>>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
        }
    }
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: &'static str,
}

impl ApiError {
    fn bad_request(message: &'static str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message,
        }
    }

    fn not_found() -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: "Not found",
        }
    }

    fn internal(err: anyhow::Error) -> Self {
        sentry_anyhow::capture_anyhow(&err);
        tracing::error!(error = %err, "request failed");
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "Internal server error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "message": self.message })),
        )
            .into_response()
    }
}

#[derive(Debug, Deserialize)]
struct DrawdownsQuery {
    name: Option<String>,
}

#[derive(Debug, Serialize)]
struct DrawdownsResponse {
    drawdowns: Vec<Drawdown>,
}

#[derive(Debug, Serialize)]
struct PricesResponse {
    prices: Vec<PricePoint>,
}

#[derive(Debug, Serialize)]
struct SeriesResponse {
    series: Vec<String>,
}

async fn get_series<S: PriceSource + 'static>(
    State(state): State<AppState<S>>,
) -> Result<Json<SeriesResponse>, ApiError> {
    let series = state.repo.series_names().await.map_err(ApiError::internal)?;
    Ok(Json(SeriesResponse { series }))
}

async fn get_drawdowns<S: PriceSource + 'static>(
    State(state): State<AppState<S>>,
    Query(query): Query<DrawdownsQuery>,
) -> Result<Json<DrawdownsResponse>, ApiError> {
    let Some(name) = query.name.filter(|n| !n.trim().is_empty()) else {
        return Err(ApiError::bad_request("Must set name as string in query"));
    };

    let report = state
        .repo
        .drawdowns(&name)
        .await
        .map_err(ApiError::internal)?
        .ok_or_else(ApiError::not_found)?;

    Ok(Json(DrawdownsResponse {
        drawdowns: report.drawdowns.clone(),
    }))
}

async fn get_prices<S: PriceSource + 'static>(
    State(state): State<AppState<S>>,
    Path(name): Path<String>,
) -> Result<Json<PricesResponse>, ApiError> {
    let report = state
        .repo
        .drawdowns(&name)
        .await
        .map_err(ApiError::internal)?
        .ok_or_else(ApiError::not_found)?;

    Ok(Json(PricesResponse {
        prices: report.sorted_prices.clone(),
    }))
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &drawdowns_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
