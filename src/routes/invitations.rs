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
    models::{Invitation, InvitationStatus, InvitationView},
    routes::AppState,
    services::invitations,
    session::Session,
};

#[derive(Debug, Deserialize)]
pub struct InviteRequest {
    pub user_id: i64,
}

/// Handler for inviting a friend into a group
pub async fn invite(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    session: Session,
    Path(group_id): Path<i64>,
    Json(request): Json<InviteRequest>,
) -> AppResult<(StatusCode, Json<Invitation>)> {
    tracing::info!(
        request_id = %request_id,
        group_id,
        inviter_id = session.user_id,
        invitee_id = request.user_id,
        "Inviting user to group"
    );

    let invitation = invitations::invite(
        state.groups.as_ref(),
        &state.notifications,
        session.user_id,
        group_id,
        request.user_id,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(invitation)))
}

/// Handler for the caller's pending invitations
pub async fn pending(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    session: Session,
) -> AppResult<Json<Vec<InvitationView>>> {
    tracing::info!(request_id = %request_id, user_id = session.user_id, "Listing pending invitations");

    Ok(Json(
        invitations::pending_invitations(state.groups.as_ref(), session.user_id).await?,
    ))
}

/// Handler for accepting an invitation
pub async fn accept(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    session: Session,
    Path(invitation_id): Path<i64>,
) -> AppResult<Json<Value>> {
    tracing::info!(
        request_id = %request_id,
        user_id = session.user_id,
        invitation_id,
        "Answering invitation"
    );

    invitations::accept(state.groups.as_ref(), session.user_id, invitation_id).await?;

    Ok(Json(json!({
        "id": invitation_id,
        "status": InvitationStatus::Accepted
    })))
}

/// Handler for declining an invitation
pub async fn reject(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    session: Session,
    Path(invitation_id): Path<i64>,
) -> AppResult<Json<Value>> {
    tracing::info!(
        request_id = %request_id,
        user_id = session.user_id,
        invitation_id,
        "Answering invitation"
    );

    invitations::reject(state.groups.as_ref(), session.user_id, invitation_id).await?;

    Ok(Json(json!({
        "id": invitation_id,
        "status": InvitationStatus::Rejected
    })))
}
