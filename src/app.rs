use std::sync::Arc;

use axum::{
    http::HeaderValue,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::{AuthProvider, JwtAuthProvider};
use crate::bulk::{BulkIngestionService, BulkValidator};
use crate::config::AppConfig;
use crate::database::ProductStore;
use crate::filter::FilterOptions;
use crate::handlers::{products, system, upload};
use crate::middleware::jwt_auth_middleware;
use crate::services::ProductService;

/// Shared, cheaply cloned request state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn ProductStore>,
    pub auth: Arc<dyn AuthProvider>,
    pub products: ProductService,
    pub validator: BulkValidator,
    pub ingestion: BulkIngestionService,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn ProductStore>) -> Self {
        let auth = Arc::new(JwtAuthProvider::from_config(&config.security));
        Self::with_auth(config, store, auth)
    }

    pub fn with_auth(config: AppConfig, store: Arc<dyn ProductStore>, auth: Arc<dyn AuthProvider>) -> Self {
        Self {
            products: ProductService::new(store.clone(), FilterOptions::from(&config.filter)),
            validator: BulkValidator::from(&config.bulk),
            ingestion: BulkIngestionService::new(store.clone()),
            config: Arc::new(config),
            store,
            auth,
        }
    }
}

pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        // Public
        .route("/", get(system::root))
        .route("/health", get(system::health))
        // Protected
        .merge(product_routes(state.clone()))
        .merge(upload_routes(state.clone()))
        // Global middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn product_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/products", post(products::create))
        .route("/products/get-by-filter", post(products::get_by_filter))
        .route("/products/stats", get(products::stats))
        .route("/products/bulk", post(products::bulk_create))
        .route(
            "/products/:id",
            get(products::get_one).put(products::update).delete(products::delete),
        )
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}

fn upload_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/upload/products", post(upload::upload_products))
        .route("/upload/products/validate", post(upload::validate_upload))
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    if config.is_development() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}
