use std::collections::HashSet;

/// Movie metadata provider abstraction
///
/// The local catalog is backfilled from a third-party metadata service. Every
/// provider normalizes its records into [`ProviderFilm`] so the merge engine never
/// sees provider-specific shapes or rating scales.
use crate::{
    error::{ProviderError, ProviderResult},
    models::{ProviderFilm, ProviderFilmDetails},
};

pub mod tmdb;

pub use tmdb::TmdbProvider;

/// Trait for movie metadata providers
///
/// List queries answer an empty list when the provider has nothing; only transport
/// failures, rate limiting and malformed answers are errors.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MovieProvider: Send + Sync {
    /// Best rated films, one provider page
    async fn top_rated(&self, page: u32) -> ProviderResult<Vec<ProviderFilm>>;

    /// Upcoming and currently showing films, newest release first
    async fn latest(&self, page: u32) -> ProviderResult<Vec<ProviderFilm>>;

    /// Title search, in the provider's relevance order
    async fn search(&self, query: &str, page: u32) -> ProviderResult<Vec<ProviderFilm>>;

    /// Full record for one film, `None` when the provider does not know the id
    async fn fetch_by_id(&self, external_id: i64) -> ProviderResult<Option<ProviderFilmDetails>>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}

/// Replaces a failed provider list with an empty one
///
/// Feed and search responses must never fail because the provider did; the
/// failure is logged and the caller continues with local data only.
pub fn or_empty(result: ProviderResult<Vec<ProviderFilm>>, intent: &'static str) -> Vec<ProviderFilm> {
    match result {
        Ok(films) => films,
        Err(e) => {
            tracing::warn!(
                error = %e,
                intent,
                retryable = e.is_retryable(),
                "Provider call failed, continuing with local results"
            );
            Vec::new()
        }
    }
}

/// Unions two release lists, keeping the first occurrence of each external id,
/// then orders by release date descending with undated films last.
pub fn union_by_release_date(
    first: Vec<ProviderFilm>,
    second: Vec<ProviderFilm>,
) -> Vec<ProviderFilm> {
    let mut seen = HashSet::new();
    let mut films: Vec<ProviderFilm> = first
        .into_iter()
        .chain(second)
        .filter(|film| seen.insert(film.external_id))
        .collect();

    films.sort_by(|a, b| match (a.release_date, b.release_date) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    films
}

impl ProviderError {
    pub(crate) fn from_status(status: reqwest::StatusCode, body: String) -> Self {
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            ProviderError::RateLimited
        } else {
            ProviderError::Unavailable(format!("status {}: {}", status, body))
        }
    }
}
