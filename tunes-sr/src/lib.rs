//! tunes-sr library - Search & Recommendation service
//!
//! Free-text search across songs, people and collections, anchored on one
//! principal result with related content, plus genre-seeded song
//! recommendations. Every song returned carries the requesting user's
//! bookmark flag.

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tunes_common::config::{RecommendConfig, TomlConfig};

pub mod api;
pub mod catalog;
pub mod error;
pub mod recommend;
pub mod rng;
pub mod search;
pub mod viewer;

pub use catalog::Catalog;
pub use error::{Error, Result};
pub use recommend::{RecommendationEngine, Recommendations};
pub use rng::RngFactory;
pub use search::{SearchEngine, SearchResponse};
pub use viewer::Viewer;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub catalog: Catalog,
    pub search: SearchEngine,
    pub recommend: RecommendationEngine,
    pub recommend_limits: RecommendConfig,
}

impl AppState {
    pub fn new(catalog: Catalog, config: &TomlConfig) -> Self {
        let rng = RngFactory::from_config(config.rng_seed);

        Self {
            search: SearchEngine::new(&catalog, &config.search, rng),
            recommend: RecommendationEngine::new(catalog.repository.clone(), rng),
            recommend_limits: config.recommend.clone(),
            catalog,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .route("/api/search", get(api::search))
        .route("/api/recommendations", get(api::get_recommendations))
        .route("/api/buildinfo", get(api::get_build_info))
        .merge(api::health_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
