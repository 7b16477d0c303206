//! HTTP server for the dashboard frontend.
//!
//! Chart drawing and navigation live in the frontend; this API only serves
//! the pipeline.
//!
//! # API Endpoints
//!
//! | Method | Path                          | Description                        |
//! |--------|-------------------------------|------------------------------------|
//! | GET    | `/health`                     | Health check                       |
//! | GET    | `/api/pages`                  | Enumerate report pages             |
//! | GET    | `/api/report/{page}`          | Render a report page               |
//! | GET    | `/api/datasets/{name}/export` | Raw table as a CSV download        |
//! | POST   | `/api/cache/clear`            | Drop the memoized datasets         |
//! | GET    | `/api/logs`                   | SSE stream for real-time logs      |

use axum::{
    extract::{Path, Query, State},
    http::{header, Method, StatusCode},
    response::{sse::Event, Json, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::Value;
use std::{convert::Infallible, net::SocketAddr, sync::Arc, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::LOG_STREAM;
use super::types::{error_response, CacheClearResponse, PagesResponse, ReportResponse};
use crate::cache::DatasetCache;
use crate::loader::export_csv;
use crate::models::Dataset;
use crate::reports::{self, ReportPage, ReportParams};

type ApiError = (StatusCode, Json<Value>);

/// Start the HTTP server, sharing one dataset cache across requests.
pub async fn start_server(
    port: u16,
    cache: Arc<DatasetCache>,
) -> Result<(), Box<dyn std::error::Error>> {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    let app = Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/pages", get(list_pages))
        .route("/api/report/{page}", get(get_report))
        .route("/api/datasets/{name}/export", get(export_dataset))
        .route("/api/cache/clear", post(clear_cache))
        .route("/api/logs", get(sse_logs))
        .layer(cors)
        .with_state(cache);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    println!("covidash server running on http://localhost:{}", port);
    println!("   GET  /api/pages                  - report page listing");
    println!("   GET  /api/report/{{page}}          - render a page");
    println!("   GET  /api/datasets/{{name}}/export - CSV download");
    println!("   POST /api/cache/clear            - reload on next request");
    println!("   GET  /api/logs                   - SSE log stream");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint.
async fn health() -> Json<Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "covidash",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Enumerate the report pages with their parameters and chart kinds.
async fn list_pages() -> Json<PagesResponse> {
    Json(PagesResponse::new())
}

/// Render one report page.
///
/// Loader failure is terminal for this request; unknown pages are 404.
/// Missing parameter values fall back to page defaults, never an error.
async fn get_report(
    State(cache): State<Arc<DatasetCache>>,
    Path(page): Path<String>,
    Query(params): Query<ReportParams>,
) -> Result<Json<ReportResponse>, ApiError> {
    let page = ReportPage::parse(&page).ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(error_response(&format!("Unknown report page: {}", page))),
        )
    })?;

    let datasets = cache.get().map_err(internal_error)?;
    let report = reports::render(page, &params, &datasets).map_err(internal_error)?;
    Ok(Json(report.into()))
}

/// Serve one raw table as a CSV attachment (the Overview downloads).
async fn export_dataset(
    State(cache): State<Arc<DatasetCache>>,
    Path(name): Path<String>,
) -> Result<([(header::HeaderName, String); 2], String), ApiError> {
    let dataset = Dataset::from_slug(&name).ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(error_response(&format!("Unknown dataset: {}", name))),
        )
    })?;

    let datasets = cache.get().map_err(internal_error)?;
    let body = export_csv(&datasets, dataset).map_err(internal_error)?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", dataset.export_file_name()),
            ),
        ],
        body,
    ))
}

/// Drop the memoized datasets; the next request reloads from disk.
async fn clear_cache(State(cache): State<Arc<DatasetCache>>) -> Json<CacheClearResponse> {
    let was_loaded = cache.is_loaded();
    cache.invalidate();
    Json(CacheClearResponse::new(was_loaded))
}

/// SSE endpoint for real-time log streaming.
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_STREAM.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(entry) => {
            let json = serde_json::to_string(&entry).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

fn internal_error<E: std::fmt::Display>(error: E) -> ApiError {
    let message = error.to_string();
    super::logs::log_error(format!("Request failed: {}", message));
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(error_response(&message)),
    )
}
