use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::RequestId,
    models::{CreateFilmRequest, FilmDetails, FilmRecord, FilmView},
    routes::AppState,
    services::{catalog, search},
    session::Session,
};

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub films: Vec<FilmView>,
    pub total: usize,
}

/// Handler for title search
pub async fn search(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<SearchResponse>> {
    tracing::info!(request_id = %request_id, query = %params.q, "Searching films");

    let films =
        search::search_films(state.catalog.as_ref(), state.provider.as_ref(), &params.q).await?;

    Ok(Json(SearchResponse {
        query: params.q,
        total: films.len(),
        films,
    }))
}

/// Handler for the most recently released local films
pub async fn latest(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
) -> AppResult<Json<Vec<FilmView>>> {
    tracing::info!(request_id = %request_id, "Listing latest films");

    Ok(Json(catalog::latest_films(state.films.as_ref()).await?))
}

/// Handler for the film page; accepts a local or a provider id
pub async fn details(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> AppResult<Json<FilmDetails>> {
    tracing::info!(request_id = %request_id, film_id = id, "Loading film details");

    let details = catalog::film_details(
        state.films.as_ref(),
        state.reviews.as_ref(),
        state.provider.as_ref(),
        id,
    )
    .await?;

    Ok(Json(details))
}

/// Handler for adding a film unknown to the provider
pub async fn create(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    session: Session,
    Json(request): Json<CreateFilmRequest>,
) -> AppResult<(StatusCode, Json<FilmRecord>)> {
    tracing::info!(
        request_id = %request_id,
        user_id = session.user_id,
        title = %request.title,
        "Creating manual film"
    );

    let film = catalog::create_film(state.films.as_ref(), session.user_id, request).await?;

    Ok((StatusCode::CREATED, Json(film)))
}
