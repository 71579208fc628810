use axum::{
    extract::FromRef,
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    db::{CatalogReader, FilmStore, GroupStore, ReviewStore},
    middleware::{make_span_with_request_id, request_id_middleware},
    notifications::NotificationHub,
    services::providers::MovieProvider,
    session::SessionKeys,
};

pub mod feed;
pub mod groups;
pub mod invitations;
pub mod movies;
pub mod notifications;
pub mod reviews;

/// Shared handles passed to every handler
pub struct AppState {
    pub catalog: Arc<dyn CatalogReader>,
    pub films: Arc<dyn FilmStore>,
    pub reviews: Arc<dyn ReviewStore>,
    pub groups: Arc<dyn GroupStore>,
    pub provider: Arc<dyn MovieProvider>,
    pub notifications: NotificationHub,
    pub sessions: SessionKeys,
}

impl FromRef<Arc<AppState>> for SessionKeys {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.sessions.clone()
    }
}

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/feed/global", get(feed::global))
        .route("/feed", get(feed::friends))
        .route("/movies/search", get(movies::search))
        .route("/movies/latest", get(movies::latest))
        .route("/movies/:id", get(movies::details))
        .route("/movies", post(movies::create))
        .route("/reviews", post(reviews::submit))
        .route("/reviews/me", get(reviews::mine))
        .route("/reviews/recent", get(reviews::recent))
        .route("/groups", get(groups::list).post(groups::create))
        .route(
            "/groups/:id",
            get(groups::details)
                .patch(groups::update)
                .delete(groups::delete),
        )
        .route("/groups/:id/join", post(groups::join))
        .route("/groups/:id/leave", post(groups::leave))
        .route("/groups/:id/films", post(groups::add_film))
        .route("/groups/:id/invitations", post(invitations::invite))
        .route("/invitations", get(invitations::pending))
        .route("/invitations/:id/accept", post(invitations::accept))
        .route("/invitations/:id/reject", post(invitations::reject))
        .route("/notifications/stream", get(notifications::stream))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{MockCatalogReader, MockFilmStore, MockGroupStore, MockReviewStore},
        middleware::request_id::REQUEST_ID_HEADER,
        services::providers::MockMovieProvider,
    };
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    fn router() -> Router {
        create_router(Arc::new(AppState {
            catalog: Arc::new(MockCatalogReader::new()),
            films: Arc::new(MockFilmStore::new()),
            reviews: Arc::new(MockReviewStore::new()),
            groups: Arc::new(MockGroupStore::new()),
            provider: Arc::new(MockMovieProvider::new()),
            notifications: NotificationHub::new(),
            sessions: SessionKeys::new("secret", 1),
        }))
    }

    #[tokio::test]
    async fn test_health_echoes_request_id() {
        let id = "6f1c1f7e-3c1b-4a7e-9a8e-2f3d4c5b6a79";
        let response = router()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header(REQUEST_ID_HEADER, id)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[REQUEST_ID_HEADER], id);
    }

    #[tokio::test]
    async fn test_session_routes_reject_anonymous_callers() {
        for (method, uri) in [
            ("GET", "/api/v1/feed"),
            ("GET", "/api/v1/reviews/me"),
            ("GET", "/api/v1/invitations"),
            ("GET", "/api/v1/groups"),
            ("POST", "/api/v1/groups/1/join"),
            ("DELETE", "/api/v1/groups/1"),
            ("POST", "/api/v1/invitations/1/accept"),
            ("GET", "/api/v1/notifications/stream"),
        ] {
            let response = router()
                .oneshot(
                    Request::builder()
                        .method(method)
                        .uri(uri)
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{} {}", method, uri);
        }
    }
}
