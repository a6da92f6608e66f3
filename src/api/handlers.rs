use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::{MediaKind, Rating, RecommendationItem, WatchlistEntry},
    services::{recommendations::DEFAULT_RECOMMENDATION_COUNT, PoolStats, RecommendationRequest},
};

use super::AppState;

/// Upper bound on `count` for one recommendations call
pub const MAX_RECOMMENDATION_COUNT: usize = 50;

// Request types

/// Body of a rating upsert; the score is range-checked on conversion
#[derive(Debug, Deserialize)]
pub struct RatingRequest {
    pub media_type: MediaKind,
    pub item_id: u64,
    pub score: i64,
}

impl TryFrom<RatingRequest> for Rating {
    type Error = AppError;

    fn try_from(request: RatingRequest) -> Result<Self, Self::Error> {
        match u8::try_from(request.score) {
            Ok(score) if (Rating::MIN_SCORE..=Rating::MAX_SCORE).contains(&score) => Ok(Rating {
                media_type: request.media_type,
                item_id: request.item_id,
                score,
            }),
            _ => Err(AppError::InvalidInput(format!(
                "score must be between {} and {}",
                Rating::MIN_SCORE,
                Rating::MAX_SCORE
            ))),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    pub media_type: Option<String>,
    pub count: Option<String>,
}

impl RecommendationQuery {
    fn media_kind(&self) -> AppResult<MediaKind> {
        match self.media_type.as_deref() {
            None => Ok(MediaKind::Movie),
            Some(raw) => raw.parse().map_err(AppError::InvalidInput),
        }
    }

    fn count(&self) -> AppResult<usize> {
        let Some(raw) = self.count.as_deref() else {
            return Ok(DEFAULT_RECOMMENDATION_COUNT);
        };

        match raw.trim().parse::<usize>() {
            Ok(count) if (1..=MAX_RECOMMENDATION_COUNT).contains(&count) => Ok(count),
            _ => Err(AppError::InvalidInput(format!(
                "count must be an integer between 1 and {}",
                MAX_RECOMMENDATION_COUNT
            ))),
        }
    }
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Item pool size per media kind
pub async fn pool_stats(State(state): State<AppState>) -> Json<PoolStats> {
    Json(state.pool.stats().await)
}

/// Get a user's ratings
pub async fn get_ratings(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Json<Vec<Rating>> {
    Json(state.users.ratings(&user_id).await)
}

/// Rate an item, replacing any earlier score
pub async fn put_rating(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    payload: Result<Json<RatingRequest>, JsonRejection>,
) -> AppResult<StatusCode> {
    let Json(request) = payload?;
    let rating = Rating::try_from(request)?;

    state.users.upsert_rating(&user_id, rating).await;
    Ok(StatusCode::NO_CONTENT)
}

/// Remove a rating
pub async fn delete_rating(
    State(state): State<AppState>,
    path: Result<Path<(String, MediaKind, u64)>, PathRejection>,
) -> AppResult<StatusCode> {
    let Path((user_id, media_type, item_id)) = path?;
    state
        .users
        .remove_rating(&user_id, media_type, item_id)
        .await;
    Ok(StatusCode::NO_CONTENT)
}

/// Get a user's watchlist
pub async fn get_watchlist(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Json<Vec<WatchlistEntry>> {
    Json(state.users.watchlist(&user_id).await)
}

/// Save an item to the watchlist
pub async fn put_watchlist_entry(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    payload: Result<Json<WatchlistEntry>, JsonRejection>,
) -> AppResult<StatusCode> {
    let Json(entry) = payload?;
    state.users.add_to_watchlist(&user_id, entry).await;
    Ok(StatusCode::NO_CONTENT)
}

/// Remove an item from the watchlist
pub async fn delete_watchlist_entry(
    State(state): State<AppState>,
    path: Result<Path<(String, MediaKind, u64)>, PathRejection>,
) -> AppResult<StatusCode> {
    let Path((user_id, media_type, item_id)) = path?;
    let entry = WatchlistEntry {
        media_type,
        item_id,
    };
    state.users.remove_from_watchlist(&user_id, &entry).await;
    Ok(StatusCode::NO_CONTENT)
}

/// Personalized recommendations
///
/// Liked items are the user's ratings of 7 or more; those and the watchlist
/// are excluded from the results.
pub async fn get_recommendations(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(user_id): Path<String>,
    query: Result<Query<RecommendationQuery>, QueryRejection>,
) -> AppResult<Json<Vec<RecommendationItem>>> {
    let Query(query) = query?;
    let media_kind = query.media_kind()?;
    let count = query.count()?;

    let liked_ids = state.users.liked_ids(&user_id, media_kind).await;
    let mut exclude_ids = state.users.watchlist_ids(&user_id, media_kind).await;
    exclude_ids.extend(liked_ids.iter().copied());

    tracing::info!(
        request_id = %request_id,
        user_id = %user_id,
        media_kind = %media_kind,
        liked = liked_ids.len(),
        excluded = exclude_ids.len(),
        count = count,
        "Processing recommendation request"
    );

    let request = RecommendationRequest::new(media_kind)
        .liked(liked_ids)
        .excluding(exclude_ids)
        .count(count);

    let items = state.engine.recommend(&request).await.map_err(|e| {
        tracing::error!(
            request_id = %request_id,
            error = %e,
            "Recommendation fallback failed"
        );
        AppError::from(e)
    })?;

    Ok(Json(items))
}
