use crate::{
    db::{FilmStore, ReviewStore},
    error::{AppError, AppResult},
    models::{FeedItem, ReviewReceipt, SubmitReview, UserReview},
    services::{catalog::promote_external, providers::MovieProvider},
};

const MIN_RATING: i16 = 1;
const MAX_RATING: i16 = 5;

/// Number of reviews in the recent reviews listing
pub const RECENT_REVIEWS_LIMIT: i64 = 20;

/// Creates or updates the caller's review of a film
///
/// The film may be named by local id or by provider id; a provider film is
/// promoted into the local catalog before the review is stored.
pub async fn submit_review(
    films: &dyn FilmStore,
    reviews: &dyn ReviewStore,
    provider: &dyn MovieProvider,
    user_id: i64,
    request: SubmitReview,
) -> AppResult<ReviewReceipt> {
    if let Some(rating) = request.rating {
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(AppError::InvalidInput(format!(
                "Rating must be between {} and {}",
                MIN_RATING, MAX_RATING
            )));
        }
    }

    let comment = request
        .comment
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());

    if request.rating.is_none() && comment.is_none() {
        return Err(AppError::InvalidInput(
            "A rating or a comment is required".to_string(),
        ));
    }

    let film_id = resolve_film(films, provider, request.film_id, request.external_id).await?;

    let review_id = reviews
        .upsert_review(user_id, film_id, request.rating, comment)
        .await?;

    tracing::info!(review_id, film_id, user_id, rating = ?request.rating, "Review saved");

    Ok(ReviewReceipt { review_id, film_id })
}

/// Latest commented reviews from everyone, newest first
pub async fn recent_reviews(reviews: &dyn ReviewStore) -> AppResult<Vec<FeedItem>> {
    let entries = reviews.recent_comments(RECENT_REVIEWS_LIMIT).await?;

    Ok(entries.into_iter().map(FeedItem::from).collect())
}

/// The caller's reviews, newest first
pub async fn user_reviews(reviews: &dyn ReviewStore, user_id: i64) -> AppResult<Vec<UserReview>> {
    reviews.user_reviews(user_id).await
}

/// Finds the local id of the reviewed film
///
/// A `film_id` unknown locally is retried as a provider id unless an explicit
/// `external_id` was sent alongside it.
async fn resolve_film(
    films: &dyn FilmStore,
    provider: &dyn MovieProvider,
    film_id: Option<i64>,
    external_id: Option<i64>,
) -> AppResult<i64> {
    let external_id = match film_id {
        Some(id) => {
            if let Some(film) = films.find_film(id).await? {
                return Ok(film.id);
            }
            external_id.unwrap_or(id)
        }
        None => external_id.ok_or_else(|| {
            AppError::InvalidInput("Either film_id or external_id is required".to_string())
        })?,
    };

    Ok(promote_external(films, provider, external_id).await?.id)
}
