use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::RequestId,
    models::{CreateGroupRequest, Group, GroupDetails, GroupRole, GroupSummary, UpdateGroupRequest},
    routes::AppState,
    services::groups,
    session::Session,
};

#[derive(Debug, Deserialize)]
pub struct AddFilmRequest {
    pub film_id: i64,
}

/// Handler for the groups visible to the caller
pub async fn list(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    session: Session,
) -> AppResult<Json<Vec<GroupSummary>>> {
    tracing::info!(request_id = %request_id, user_id = session.user_id, "Listing groups");

    Ok(Json(
        groups::list_groups(state.groups.as_ref(), session.user_id).await?,
    ))
}

/// Handler for creating a group
pub async fn create(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    session: Session,
    Json(request): Json<CreateGroupRequest>,
) -> AppResult<(StatusCode, Json<Group>)> {
    tracing::info!(
        request_id = %request_id,
        user_id = session.user_id,
        title = %request.title,
        "Creating group"
    );

    let group = groups::create_group(state.groups.as_ref(), session.user_id, request).await?;

    Ok((StatusCode::CREATED, Json(group)))
}

/// Handler for the group page
pub async fn details(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    session: Session,
    Path(group_id): Path<i64>,
) -> AppResult<Json<GroupDetails>> {
    tracing::info!(request_id = %request_id, user_id = session.user_id, group_id, "Loading group");

    let details = groups::group_details(state.groups.as_ref(), session.user_id, group_id).await?;

    Ok(Json(details))
}

/// Handler for editing a group
pub async fn update(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    session: Session,
    Path(group_id): Path<i64>,
    Json(changes): Json<UpdateGroupRequest>,
) -> AppResult<Json<Group>> {
    tracing::info!(request_id = %request_id, user_id = session.user_id, group_id, "Updating group");

    let group =
        groups::update_group(state.groups.as_ref(), session.user_id, group_id, changes).await?;

    Ok(Json(group))
}

/// Handler for deleting a group
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    session: Session,
    Path(group_id): Path<i64>,
) -> AppResult<Json<Value>> {
    tracing::info!(request_id = %request_id, user_id = session.user_id, group_id, "Deleting group");

    groups::delete_group(state.groups.as_ref(), session.user_id, group_id).await?;

    Ok(Json(json!({ "id": group_id, "deleted": true })))
}

/// Handler for joining a public group
pub async fn join(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    session: Session,
    Path(group_id): Path<i64>,
) -> AppResult<Json<Value>> {
    tracing::info!(request_id = %request_id, user_id = session.user_id, group_id, "Joining group");

    groups::join_group(state.groups.as_ref(), session.user_id, group_id).await?;

    Ok(Json(json!({ "group_id": group_id, "role": GroupRole::Member })))
}

/// Handler for leaving a group
pub async fn leave(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    session: Session,
    Path(group_id): Path<i64>,
) -> AppResult<Json<Value>> {
    tracing::info!(request_id = %request_id, user_id = session.user_id, group_id, "Leaving group");

    groups::leave_group(state.groups.as_ref(), session.user_id, group_id).await?;

    Ok(Json(json!({ "group_id": group_id, "left": true })))
}

/// Handler for sharing a film in a group
pub async fn add_film(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    session: Session,
    Path(group_id): Path<i64>,
    Json(request): Json<AddFilmRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
    tracing::info!(
        request_id = %request_id,
        user_id = session.user_id,
        group_id,
        film_id = request.film_id,
        "Adding film to group"
    );

    groups::add_film(
        state.groups.as_ref(),
        state.films.as_ref(),
        session.user_id,
        group_id,
        request.film_id,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "group_id": group_id, "film_id": request.film_id })),
    ))
}
