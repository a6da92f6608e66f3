use axum::{
    middleware,
    routing::{delete, get},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers;
use super::AppState;
use crate::middleware::request_id::{make_span_with_request_id, request_id_middleware};

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/pool/stats", get(handlers::pool_stats))
        // Ratings
        .route(
            "/users/:user_id/ratings",
            get(handlers::get_ratings).put(handlers::put_rating),
        )
        .route(
            "/users/:user_id/ratings/:media_type/:item_id",
            delete(handlers::delete_rating),
        )
        // Watchlist
        .route(
            "/users/:user_id/watchlist",
            get(handlers::get_watchlist).put(handlers::put_watchlist_entry),
        )
        .route(
            "/users/:user_id/watchlist/:media_type/:item_id",
            delete(handlers::delete_watchlist_entry),
        )
        // Recommendations
        .route(
            "/users/:user_id/recommendations",
            get(handlers::get_recommendations),
        )
}
