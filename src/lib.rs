pub mod api;
pub mod config;
pub mod infrastructure;
pub mod services;
pub mod utils;

use crate::config::ServerConfig;
use crate::services::compression::CompressionService;
use crate::services::storage::{COMPRESSED_URL_PREFIX, LocalStorage};
use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    middleware::from_fn,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::services::{ServeDir, ServeFile};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::compress::compress_file,
        api::handlers::health::health_check,
    ),
    components(
        schemas(
            api::handlers::compress::CompressResponse,
            api::handlers::compress::CompressUpload,
            api::handlers::health::HealthResponse,
        )
    ),
    tags(
        (name = "compress", description = "Image and PDF compression"),
        (name = "system", description = "Service status")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<LocalStorage>,
    pub compressor: Arc<CompressionService>,
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(config: ServerConfig, storage: Arc<LocalStorage>) -> Self {
        let compressor = Arc::new(CompressionService::new(
            storage.output_dir(),
            config.max_image_width,
        ));
        Self {
            storage,
            compressor,
            config,
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    let static_dir = state.config.static_dir.clone();

    Router::new()
        .route("/compress", post(api::handlers::compress::compress_file))
        .route("/health", get(api::handlers::health::health_check))
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .nest_service("/static", ServeDir::new(&static_dir))
        .nest_service(
            COMPRESSED_URL_PREFIX,
            ServeDir::new(state.storage.output_dir()),
        )
        // Unknown paths land on the upload page
        .fallback_service(ServeFile::new(static_dir.join("index.html")))
        .layer(from_fn(api::middleware::request_id::request_id_middleware))
        .layer(DefaultBodyLimit::max(state.config.max_upload_size))
        .with_state(state)
}
