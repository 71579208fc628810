use axum::{extract::State, Extension, Json};
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::RequestId,
    routes::AppState,
    services::feed::{self, FeedResponse},
    session::Session,
};

/// Handler for the public feed
pub async fn global(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
) -> AppResult<Json<FeedResponse>> {
    tracing::info!(request_id = %request_id, "Building global feed");

    let response = feed::global_feed(
        state.reviews.as_ref(),
        state.catalog.as_ref(),
        state.provider.as_ref(),
    )
    .await?;

    Ok(Json(response))
}

/// Handler for the caller's friend feed
pub async fn friends(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    session: Session,
) -> AppResult<Json<FeedResponse>> {
    tracing::info!(
        request_id = %request_id,
        user_id = session.user_id,
        "Building friend feed"
    );

    let response = feed::friend_feed(
        session.user_id,
        state.reviews.as_ref(),
        state.catalog.as_ref(),
        state.provider.as_ref(),
    )
    .await?;

    Ok(Json(response))
}
