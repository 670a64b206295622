use std::net::TcpListener;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};

use crate::gemini::GeminiClient;
use crate::ingest;
use crate::logger::Logger;
use crate::models::{ImageMeta, ScanSnapshot};
use crate::scan::{self, ScanError, ScanState};

pub struct RouterState {
  pub started_at: Instant,
  pub scan: Arc<RwLock<ScanState>>,
  pub gemini: GeminiClient,
  pub logger: Arc<Logger>,
}

pub async fn run_router(listener: TcpListener, state: RouterState) -> anyhow::Result<()> {
  let app = Router::new()
    .route("/", get(index))
    .route("/health", get(health))
    .route("/v1/image", post(upload_image))
    .route("/v1/scan", get(scan_snapshot).post(start_scan))
    // Photos go up whole; no upload size cap.
    .layer(DefaultBodyLimit::disable())
    .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
    .with_state(Arc::new(state));

  let listener = tokio::net::TcpListener::from_std(listener)?;
  axum::serve(listener, app).await?;
  Ok(())
}

async fn index() -> Html<&'static str> {
  Html(include_str!("../ui/index.html"))
}

async fn health(State(state): State<Arc<RouterState>>) -> Json<serde_json::Value> {
  let uptime = state.started_at.elapsed().as_millis();
  Json(serde_json::json!({
    "status": "ok",
    "version": env!("CARGO_PKG_VERSION"),
    "uptime_ms": uptime
  }))
}

async fn scan_snapshot(State(state): State<Arc<RouterState>>) -> Json<ScanSnapshot> {
  Json(state.scan.read().await.snapshot())
}

async fn upload_image(
  State(state): State<Arc<RouterState>>,
  mut multipart: Multipart,
) -> Response {
  let mut upload = None;

  loop {
    let field = match multipart.next_field().await {
      Ok(Some(field)) => field,
      Ok(None) => break,
      Err(err) => {
        return error_response(StatusCode::BAD_REQUEST, "bad_upload", &err.to_string());
      }
    };

    let name = field.name().unwrap_or("").to_string();
    if name == "file" {
      let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();
      let data = match field.bytes().await {
        Ok(data) => data,
        Err(err) => {
          return error_response(StatusCode::BAD_REQUEST, "bad_upload", &err.to_string());
        }
      };
      upload = Some((content_type, data));
    }
  }

  let Some((content_type, data)) = upload else {
    return error_response(StatusCode::BAD_REQUEST, "file_missing", "No file provided.");
  };

  match ingest::encode_image(&content_type, &data) {
    Ok(image) => {
      let meta = ImageMeta {
        mime: image.mime.clone(),
        size_bytes: image.size_bytes(),
      };
      state.scan.write().await.select_image(image);
      state
        .logger
        .info(&format!("image selected: {} ({} bytes)", meta.mime, meta.size_bytes));
      (StatusCode::OK, Json(meta)).into_response()
    }
    Err(err) => {
      let message = err.to_string();
      state.scan.write().await.reject_image(message.clone());
      state
        .logger
        .warn(&format!("upload rejected: content type {content_type}"));
      error_response(StatusCode::BAD_REQUEST, "not_an_image", &message)
    }
  }
}

// Runs the whole two-call pipeline before answering; the page keeps its scan
// button disabled for as long as this request is pending.
async fn start_scan(State(state): State<Arc<RouterState>>) -> Response {
  match scan::run(&state.scan, &state.gemini).await {
    Ok(()) => {
      let snapshot = state.scan.read().await.snapshot();
      match snapshot.error {
        Some(_) => state.logger.warn("scan finished with an error"),
        None => state.logger.info("scan complete"),
      }
      (StatusCode::OK, Json(snapshot)).into_response()
    }
    Err(err) => {
      let (status, code) = scan_error_code(&err);
      state.logger.warn(&format!("scan refused: {code}"));
      error_response(status, code, &err.to_string())
    }
  }
}

fn scan_error_code(err: &ScanError) -> (StatusCode, &'static str) {
  match err {
    ScanError::NoImageSelected => (StatusCode::BAD_REQUEST, "no_image_selected"),
    ScanError::ScanInFlight => (StatusCode::CONFLICT, "scan_in_flight"),
  }
}

fn error_response(status: StatusCode, code: &str, message: &str) -> Response {
  let body = Json(serde_json::json!({ "error": message, "code": code }));
  (status, body).into_response()
}
