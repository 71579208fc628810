use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub mod group;
pub mod review;

pub use group::{
    CreateGroupRequest, Group, GroupDetails, GroupFilm, GroupMember, GroupRole, GroupSummary,
    Invitation, InvitationStatus, InvitationView, NewGroup, Notification, UpdateGroupRequest,
};
pub use review::{FeedEntry, FeedItem, ReviewReceipt, ReviewView, SubmitReview, UserReview};

/// A film stored in the local catalog, with rating aggregates computed at query time
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct LocalFilm {
    pub id: i64,
    pub external_id: Option<i64>,
    pub title: String,
    pub original_title: Option<String>,
    pub synopsis: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub poster_url: Option<String>,
    /// Average of qualifying ratings, `None` when the film has none
    pub average_rating: Option<f64>,
    pub vote_count: Option<i64>,
}

/// A film as returned by the metadata provider, already normalized to the local shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderFilm {
    pub external_id: i64,
    pub title: String,
    pub original_title: Option<String>,
    pub synopsis: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub poster_url: Option<String>,
    /// Rating on the local 0–5 scale
    pub average_rating: f64,
    pub vote_count: i64,
}

/// Full provider record used when promoting a film into the local catalog
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderFilmDetails {
    pub film: ProviderFilm,
    pub runtime_minutes: Option<i32>,
    pub genres: Vec<String>,
    pub director: Option<String>,
    pub cast: Vec<String>,
}

/// Merged view of a film in feeds and search results
///
/// `id` is only present for films stored locally. External-only entries carry
/// just the provider's `external_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilmView {
    pub id: Option<i64>,
    pub external_id: Option<i64>,
    pub title: String,
    pub original_title: Option<String>,
    pub synopsis: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub poster_url: Option<String>,
    pub average_rating: f64,
    pub vote_count: i64,
}

impl From<LocalFilm> for FilmView {
    fn from(film: LocalFilm) -> Self {
        Self {
            id: Some(film.id),
            external_id: film.external_id,
            title: film.title,
            original_title: film.original_title,
            synopsis: film.synopsis,
            release_date: film.release_date,
            poster_url: film.poster_url,
            average_rating: film.average_rating.unwrap_or(0.0),
            vote_count: film.vote_count.unwrap_or(0),
        }
    }
}

impl From<ProviderFilm> for FilmView {
    fn from(film: ProviderFilm) -> Self {
        Self {
            id: None,
            external_id: Some(film.external_id),
            title: film.title,
            original_title: film.original_title,
            synopsis: film.synopsis,
            release_date: film.release_date,
            poster_url: film.poster_url,
            average_rating: film.average_rating,
            vote_count: film.vote_count,
        }
    }
}

/// A complete local film row, as shown on the film page
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct FilmRecord {
    pub id: i64,
    pub external_id: Option<i64>,
    pub title: String,
    pub original_title: Option<String>,
    pub synopsis: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub runtime_minutes: Option<i32>,
    pub poster_url: Option<String>,
    pub genres: Vec<String>,
    pub director: Option<String>,
    pub cast_members: Vec<String>,
    pub average_rating: f64,
    pub vote_count: i64,
}

/// Film page payload
#[derive(Debug, Serialize)]
pub struct FilmDetails {
    pub film: FilmRecord,
    pub reviews: Vec<ReviewView>,
}

/// Insert payload for the films table
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewFilm {
    pub external_id: Option<i64>,
    pub title: String,
    pub original_title: Option<String>,
    pub synopsis: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub runtime_minutes: Option<i32>,
    pub poster_url: Option<String>,
    pub genres: Vec<String>,
    pub director: Option<String>,
    pub cast_members: Vec<String>,
}

impl From<ProviderFilmDetails> for NewFilm {
    fn from(details: ProviderFilmDetails) -> Self {
        Self {
            external_id: Some(details.film.external_id),
            title: details.film.title,
            original_title: details.film.original_title,
            synopsis: details.film.synopsis,
            release_date: details.film.release_date,
            runtime_minutes: details.runtime_minutes,
            poster_url: details.film.poster_url,
            genres: details.genres,
            director: details.director,
            cast_members: details.cast,
        }
    }
}

/// Request body for creating a film by hand, without a provider counterpart
#[derive(Debug, Clone, Deserialize)]
pub struct CreateFilmRequest {
    pub title: String,
    pub original_title: Option<String>,
    pub synopsis: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub runtime_minutes: Option<i32>,
    pub poster_url: Option<String>,
    pub director: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
}

// ============================================================================
// TMDB API Types
// ============================================================================

/// One page of a TMDB list endpoint (`/movie/top_rated`, `/search/movie`, ...)
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbPage {
    #[serde(default)]
    pub results: Vec<TmdbMovie>,
}

/// Movie entry as returned by TMDB list and detail endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovie {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub original_title: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub vote_count: Option<i64>,
}

impl TmdbMovie {
    /// Converts the raw TMDB entry into the local film shape
    pub fn normalize(self, image_base_url: &str) -> ProviderFilm {
        let title = self
            .title
            .filter(|t| !t.trim().is_empty())
            .or_else(|| self.original_title.clone())
            .unwrap_or_default();

        ProviderFilm {
            external_id: self.id,
            title,
            original_title: self.original_title,
            synopsis: self.overview.filter(|o| !o.trim().is_empty()),
            release_date: self.release_date.as_deref().and_then(parse_release_date),
            poster_url: self
                .poster_path
                .filter(|p| !p.is_empty())
                .map(|path| format!("{}{}", image_base_url, path)),
            average_rating: self.vote_average.map(rescale_rating).unwrap_or(0.0),
            vote_count: self.vote_count.unwrap_or(0),
        }
    }
}

/// TMDB `/movie/{id}` response
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovieDetails {
    #[serde(flatten)]
    pub movie: TmdbMovie,
    #[serde(default)]
    pub runtime: Option<i32>,
    #[serde(default)]
    pub genres: Vec<TmdbGenre>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbGenre {
    pub name: String,
}

/// TMDB `/movie/{id}/credits` response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TmdbCredits {
    #[serde(default)]
    pub cast: Vec<TmdbCastMember>,
    #[serde(default)]
    pub crew: Vec<TmdbCrewMember>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbCastMember {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbCrewMember {
    pub name: String,
    #[serde(default)]
    pub job: Option<String>,
}

/// Rescales a TMDB 0–10 vote average to the local 0–5 scale, one decimal
pub fn rescale_rating(vote_average: f64) -> f64 {
    (vote_average / 2.0 * 10.0).round() / 10.0
}

/// Parses a provider `YYYY-MM-DD` date; empty or malformed values are treated as missing
pub fn parse_release_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}
