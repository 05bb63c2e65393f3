//! HTTP surface for the editor shell
//!
//! | Route | |
//! |---|---|
//! | `GET /api/settings` | last saved `{ sections, styles }` |
//! | `POST /api/settings` | overwrite saved settings |
//! | `POST /api/stylesheet` | regenerate the page stylesheet from global styles |
//! | `POST /api/media?filename=` | raw upload, MIME type from `Content-Type` |
//! | `GET /media/*` | uploaded files |

use crate::error::WorkspaceError;
use crate::media::{MediaLibrary, StoredMedia, MEDIA_ROUTE};
use crate::store::FileSettingsStore;
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use pagewright_document::GlobalStyles;
use pagewright_editor::{SavedSettings, SettingsStore};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

/// Upload cap for `/api/media`; short videos fit
pub const MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct AppState {
    store: Arc<FileSettingsStore>,
    media: Arc<MediaLibrary>,
}

impl AppState {
    pub fn new(store: FileSettingsStore, media: MediaLibrary) -> Self {
        Self {
            store: Arc::new(store),
            media: Arc::new(media),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let media_dir = state.media.dir().to_path_buf();

    Router::new()
        .route("/api/settings", get(load_settings).post(save_settings))
        .route("/api/stylesheet", post(regenerate_stylesheet))
        .route(
            "/api/media",
            post(upload_media).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .with_state(state)
        .nest_service(MEDIA_ROUTE, ServeDir::new(media_dir))
        .layer(CorsLayer::permissive())
}

/// Bind and serve until the task is cancelled
pub async fn serve(addr: SocketAddr, state: AppState) -> Result<(), WorkspaceError> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "workspace server listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SaveResponse {
    success: bool,
    sections: usize,
    saved_at: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StylesheetResponse {
    success: bool,
    stylesheet: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
}

#[derive(Debug, Deserialize)]
struct MediaQuery {
    filename: String,
}

async fn load_settings(
    State(state): State<AppState>,
) -> Result<Json<SavedSettings>, WorkspaceError> {
    Ok(Json(state.store.load()?))
}

async fn save_settings(
    State(state): State<AppState>,
    Json(settings): Json<SavedSettings>,
) -> Result<Json<SaveResponse>, WorkspaceError> {
    state.store.save(&settings)?;
    tracing::info!(sections = settings.sections.len(), "settings saved over http");

    Ok(Json(SaveResponse {
        success: true,
        sections: settings.sections.len(),
        saved_at: chrono::Utc::now().timestamp_millis(),
    }))
}

async fn regenerate_stylesheet(
    State(state): State<AppState>,
    Json(styles): Json<GlobalStyles>,
) -> Result<Json<StylesheetResponse>, WorkspaceError> {
    let stylesheet = state.store.regenerate_stylesheet(&styles)?;
    if stylesheet.is_none() {
        tracing::debug!("no stylesheet path configured");
    }

    Ok(Json(StylesheetResponse {
        success: true,
        stylesheet,
    }))
}

async fn upload_media(
    State(state): State<AppState>,
    Query(query): Query<MediaQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<StoredMedia>), WorkspaceError> {
    let mime_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let stored = state.media.store(&query.filename, mime_type, &body)?;
    Ok((StatusCode::CREATED, Json(stored)))
}

impl IntoResponse for WorkspaceError {
    fn into_response(self) -> Response {
        let status = match &self {
            WorkspaceError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            WorkspaceError::EmptyUpload | WorkspaceError::InvalidFileName(_) => {
                StatusCode::BAD_REQUEST
            }
            WorkspaceError::Store(_) | WorkspaceError::Io(_) => {
                tracing::error!(error = %self, "request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (
            status,
            Json(ErrorResponse {
                success: false,
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
