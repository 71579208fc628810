use serde::Serialize;

use crate::{
    db::{CatalogReader, ReviewStore},
    error::AppResult,
    models::{FeedEntry, FeedItem, FilmView},
    services::{
        merge::{merge_recent, merge_top_rated, FEED_CAP},
        providers::{or_empty, MovieProvider},
    },
};

/// Number of commented reviews listed in a feed
pub const FEED_COMMENT_LIMIT: i64 = 50;

const PROVIDER_PAGE: u32 = 1;

/// Home page payload: recent comments plus two merged film rankings
#[derive(Debug, Serialize)]
pub struct FeedResponse {
    pub feed: Vec<FeedItem>,
    pub top_rated_films: Vec<FilmView>,
    pub recent_films: Vec<FilmView>,
    pub total: usize,
}

/// Feed shown to everyone: comments from all users
pub async fn global_feed(
    reviews: &dyn ReviewStore,
    catalog: &dyn CatalogReader,
    provider: &dyn MovieProvider,
) -> AppResult<FeedResponse> {
    let (comments, (top_rated_films, recent_films)) = tokio::join!(
        reviews.recent_comments(FEED_COMMENT_LIMIT),
        film_rankings(catalog, provider),
    );

    let response = assemble(comments?, top_rated_films?, recent_films?);

    tracing::info!(
        comments = response.total,
        top_rated = response.top_rated_films.len(),
        recent = response.recent_films.len(),
        "Global feed assembled"
    );

    Ok(response)
}

/// Feed restricted to the comments of the user's friends
pub async fn friend_feed(
    user_id: i64,
    reviews: &dyn ReviewStore,
    catalog: &dyn CatalogReader,
    provider: &dyn MovieProvider,
) -> AppResult<FeedResponse> {
    let (comments, (top_rated_films, recent_films)) = tokio::join!(
        reviews.friend_comments(user_id, FEED_COMMENT_LIMIT),
        film_rankings(catalog, provider),
    );

    let response = assemble(comments?, top_rated_films?, recent_films?);

    tracing::info!(
        user_id,
        comments = response.total,
        top_rated = response.top_rated_films.len(),
        recent = response.recent_films.len(),
        "Friend feed assembled"
    );

    Ok(response)
}

/// Loads local and provider rankings concurrently and merges each pair
///
/// Provider failures leave the local side alone; store failures propagate.
async fn film_rankings(
    catalog: &dyn CatalogReader,
    provider: &dyn MovieProvider,
) -> (AppResult<Vec<FilmView>>, AppResult<Vec<FilmView>>) {
    let limit = FEED_CAP as i64;

    let (local_top, local_recent, external_top, external_latest) = tokio::join!(
        catalog.top_rated_local(limit),
        catalog.recent_local(limit),
        provider.top_rated(PROVIDER_PAGE),
        provider.latest(PROVIDER_PAGE),
    );

    let top_rated = local_top
        .map(|local| merge_top_rated(local, or_empty(external_top, "top_rated"), FEED_CAP));
    let recent = local_recent
        .map(|local| merge_recent(local, or_empty(external_latest, "latest"), FEED_CAP));

    (top_rated, recent)
}

fn assemble(
    comments: Vec<FeedEntry>,
    top_rated_films: Vec<FilmView>,
    recent_films: Vec<FilmView>,
) -> FeedResponse {
    let feed: Vec<FeedItem> = comments.into_iter().map(FeedItem::from).collect();

    FeedResponse {
        total: feed.len(),
        feed,
        top_rated_films,
        recent_films,
    }
}
