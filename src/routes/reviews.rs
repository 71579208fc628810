use axum::{extract::State, Extension, Json};
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::RequestId,
    models::{FeedItem, ReviewReceipt, SubmitReview, UserReview},
    routes::AppState,
    services::reviews,
    session::Session,
};

/// Handler for rating and commenting a film
pub async fn submit(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    session: Session,
    Json(request): Json<SubmitReview>,
) -> AppResult<Json<ReviewReceipt>> {
    tracing::info!(
        request_id = %request_id,
        user_id = session.user_id,
        film_id = ?request.film_id,
        external_id = ?request.external_id,
        "Submitting review"
    );

    let receipt = reviews::submit_review(
        state.films.as_ref(),
        state.reviews.as_ref(),
        state.provider.as_ref(),
        session.user_id,
        request,
    )
    .await?;

    Ok(Json(receipt))
}

/// Handler for the caller's own reviews
pub async fn mine(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    session: Session,
) -> AppResult<Json<Vec<UserReview>>> {
    tracing::info!(request_id = %request_id, user_id = session.user_id, "Listing own reviews");

    Ok(Json(
        reviews::user_reviews(state.reviews.as_ref(), session.user_id).await?,
    ))
}

/// Handler for the latest commented reviews
pub async fn recent(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
) -> AppResult<Json<Vec<FeedItem>>> {
    tracing::info!(request_id = %request_id, "Listing recent reviews");

    Ok(Json(reviews::recent_reviews(state.reviews.as_ref()).await?))
}
