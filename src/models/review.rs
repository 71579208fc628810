use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A commented review joined with its author and film, as read for the feeds
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct FeedEntry {
    pub review_id: i64,
    pub rating: Option<i16>,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub user_id: i64,
    pub pseudo: String,
    pub user_photo: Option<String>,
    pub user_bio: Option<String>,
    pub film_id: i64,
    pub film_title: String,
    pub film_poster: Option<String>,
    pub film_release_date: Option<NaiveDate>,
}

/// Feed item sent to clients
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedItem {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub created_at: DateTime<Utc>,
    pub user: FeedUser,
    pub review: FeedReview,
    pub film: FeedFilm,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedUser {
    pub id: i64,
    pub pseudo: String,
    pub photo_url: Option<String>,
    pub bio: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedReview {
    pub rating: Option<i16>,
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedFilm {
    pub id: i64,
    pub title: String,
    pub poster_url: Option<String>,
    pub release_date: Option<NaiveDate>,
}

impl From<FeedEntry> for FeedItem {
    fn from(entry: FeedEntry) -> Self {
        Self {
            id: entry.review_id,
            kind: "review",
            created_at: entry.created_at,
            user: FeedUser {
                id: entry.user_id,
                pseudo: entry.pseudo,
                photo_url: entry.user_photo,
                bio: entry.user_bio,
            },
            review: FeedReview {
                rating: entry.rating,
                comment: entry.comment,
            },
            film: FeedFilm {
                id: entry.film_id,
                title: entry.film_title,
                poster_url: entry.film_poster,
                release_date: entry.film_release_date,
            },
        }
    }
}

/// A review shown on a film page
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct ReviewView {
    pub id: i64,
    pub rating: Option<i16>,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub user_id: i64,
    pub pseudo: String,
    pub photo_url: Option<String>,
}

/// A review listed on its author's page
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct UserReview {
    pub id: i64,
    pub rating: Option<i16>,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub film_id: i64,
    pub film_title: String,
    pub film_poster: Option<String>,
    pub film_release_date: Option<NaiveDate>,
}

/// Request body for rating and/or commenting a film
///
/// `film_id` names a local film. When the film is only known to the provider,
/// `external_id` is sent instead and the film is promoted into the catalog first.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitReview {
    pub film_id: Option<i64>,
    pub external_id: Option<i64>,
    pub rating: Option<i16>,
    pub comment: Option<String>,
}

/// Answer to a review submission
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewReceipt {
    pub review_id: i64,
    pub film_id: i64,
}
