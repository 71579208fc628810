/// TMDB (The Movie Database) provider
///
/// API Flow:
/// 1. Lists: /movie/top_rated, /movie/upcoming, /movie/now_playing, /search/movie
/// 2. Promotion: /movie/{id} then /movie/{id}/credits for director and cast
///
/// Ratings arrive on TMDB's 0–10 scale and leave this module on the local 0–5 scale.
use crate::{
    error::{ProviderError, ProviderResult},
    models::{
        ProviderFilm, ProviderFilmDetails, TmdbCredits, TmdbMovieDetails, TmdbPage,
    },
    services::providers::{union_by_release_date, MovieProvider},
};
use reqwest::{Client as HttpClient, StatusCode};
use serde::de::DeserializeOwned;

const CAST_LIMIT: usize = 10;

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    image_url: String,
    language: String,
}

impl TmdbProvider {
    pub fn new(api_key: String, api_url: String, image_url: String, language: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            image_url,
            language,
        }
    }

    /// Issues a GET against the TMDB API
    ///
    /// Returns `Ok(None)` on 404 so callers can treat absence as a valid answer.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> ProviderResult<Option<T>> {
        let url = format!("{}{}", self.api_url, path);

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("language", self.language.as_str()),
            ])
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            tracing::debug!(path = %path, "TMDB resource not found");
            return Ok(None);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                path = %path,
                status = %status,
                body = %body,
                "TMDB request failed"
            );
            return Err(ProviderError::from_status(status, body));
        }

        let body = response.text().await?;
        let value = serde_json::from_str(&body).map_err(|e| {
            tracing::error!(error = %e, path = %path, "Failed to deserialize TMDB response");
            ProviderError::Unavailable(format!("Failed to parse TMDB response: {}", e))
        })?;

        Ok(Some(value))
    }

    /// Fetches one page of a list endpoint and normalizes its entries
    async fn fetch_page(
        &self,
        path: &str,
        page: u32,
        extra: &[(&str, String)],
    ) -> ProviderResult<Vec<ProviderFilm>> {
        let mut params = vec![("page", page.to_string())];
        params.extend(extra.iter().cloned());

        let films: Vec<ProviderFilm> = self
            .get_json::<TmdbPage>(path, &params)
            .await?
            .map(|page| {
                page.results
                    .into_iter()
                    .map(|movie| movie.normalize(&self.image_url))
                    .collect()
            })
            .unwrap_or_default();

        tracing::debug!(path = %path, page, results = films.len(), "TMDB page fetched");

        Ok(films)
    }

    async fn fetch_credits(&self, external_id: i64) -> ProviderResult<TmdbCredits> {
        Ok(self
            .get_json::<TmdbCredits>(&format!("/movie/{}/credits", external_id), &[])
            .await?
            .unwrap_or_default())
    }
}

#[async_trait::async_trait]
impl MovieProvider for TmdbProvider {
    async fn top_rated(&self, page: u32) -> ProviderResult<Vec<ProviderFilm>> {
        self.fetch_page("/movie/top_rated", page, &[]).await
    }

    async fn latest(&self, page: u32) -> ProviderResult<Vec<ProviderFilm>> {
        let (upcoming, now_playing) = tokio::try_join!(
            self.fetch_page("/movie/upcoming", page, &[]),
            self.fetch_page("/movie/now_playing", page, &[]),
        )?;

        let films = union_by_release_date(upcoming, now_playing);

        tracing::info!(results = films.len(), provider = "tmdb", "Latest releases fetched");

        Ok(films)
    }

    async fn search(&self, query: &str, page: u32) -> ProviderResult<Vec<ProviderFilm>> {
        let films = self
            .fetch_page("/search/movie", page, &[("query", query.to_string())])
            .await?;

        tracing::info!(
            query = %query,
            results = films.len(),
            provider = "tmdb",
            "Title search completed"
        );

        Ok(films)
    }

    async fn fetch_by_id(&self, external_id: i64) -> ProviderResult<Option<ProviderFilmDetails>> {
        let Some(details) = self
            .get_json::<TmdbMovieDetails>(&format!("/movie/{}", external_id), &[])
            .await?
        else {
            return Ok(None);
        };

        // Credits only enrich the record; a failure here must not block promotion
        let credits = match self.fetch_credits(external_id).await {
            Ok(credits) => credits,
            Err(e) => {
                tracing::warn!(error = %e, external_id, "Failed to fetch TMDB credits");
                TmdbCredits::default()
            }
        };

        let director = credits
            .crew
            .into_iter()
            .find(|member| member.job.as_deref() == Some("Director"))
            .map(|member| member.name);

        let cast = credits
            .cast
            .into_iter()
            .take(CAST_LIMIT)
            .map(|member| member.name)
            .collect();

        Ok(Some(ProviderFilmDetails {
            film: details.movie.normalize(&self.image_url),
            runtime_minutes: details.runtime,
            genres: details.genres.into_iter().map(|g| g.name).collect(),
            director,
            cast,
        }))
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
