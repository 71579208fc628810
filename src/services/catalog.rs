use crate::{
    db::{FilmStore, ReviewStore},
    error::{AppError, AppResult},
    models::{CreateFilmRequest, FilmDetails, FilmRecord, FilmView, NewFilm},
    services::providers::MovieProvider,
};

/// Number of films listed by [`latest_films`]
pub const LATEST_FILMS_LIMIT: i64 = 20;

/// Ids above this value that are unknown locally are tried as provider ids
pub const EXTERNAL_ID_THRESHOLD: i64 = 1000;

/// Most recent local films by release date
pub async fn latest_films(films: &dyn FilmStore) -> AppResult<Vec<FilmView>> {
    let latest = films.latest_films(LATEST_FILMS_LIMIT).await?;
    Ok(latest.into_iter().map(FilmView::from).collect())
}

/// Film page lookup
///
/// `id` is tried as a local id, then as an external id. A large id unknown on both
/// counts is promoted from the provider.
pub async fn film_details(
    films: &dyn FilmStore,
    reviews: &dyn ReviewStore,
    provider: &dyn MovieProvider,
    id: i64,
) -> AppResult<FilmDetails> {
    let film = match films.find_film(id).await? {
        Some(film) => film,
        None => match films.find_film_by_external_id(id).await? {
            Some(film) => film,
            None if id > EXTERNAL_ID_THRESHOLD => promote_external(films, provider, id).await?,
            None => return Err(AppError::NotFound(format!("Film {} not found", id))),
        },
    };

    let reviews = reviews.film_reviews(film.id).await?;

    Ok(FilmDetails { film, reviews })
}

/// Returns the local copy of a provider film, creating it on first use
pub async fn promote_external(
    films: &dyn FilmStore,
    provider: &dyn MovieProvider,
    external_id: i64,
) -> AppResult<FilmRecord> {
    if let Some(film) = films.find_film_by_external_id(external_id).await? {
        return Ok(film);
    }

    let details = provider.fetch_by_id(external_id).await?.ok_or_else(|| {
        AppError::NotFound(format!(
            "Film {} not found at {}",
            external_id,
            provider.name()
        ))
    })?;

    let film = films.insert_film(&NewFilm::from(details)).await?;

    tracing::info!(
        film_id = film.id,
        external_id,
        provider = provider.name(),
        "Film promoted into local catalog"
    );

    Ok(film)
}

/// Adds a film that has no provider counterpart
pub async fn create_film(
    films: &dyn FilmStore,
    user_id: i64,
    request: CreateFilmRequest,
) -> AppResult<FilmRecord> {
    let title = request.title.trim();
    if title.is_empty() {
        return Err(AppError::InvalidInput("Title is required".to_string()));
    }

    if films.find_manual_film_by_title(title).await?.is_some() {
        return Err(AppError::Conflict(format!(
            "A film titled '{}' already exists",
            title
        )));
    }

    let new_film = NewFilm {
        external_id: None,
        title: title.to_string(),
        original_title: non_blank(request.original_title),
        synopsis: non_blank(request.synopsis),
        release_date: request.release_date,
        runtime_minutes: request.runtime_minutes,
        poster_url: non_blank(request.poster_url),
        genres: request.genres,
        director: non_blank(request.director),
        cast_members: Vec::new(),
    };

    let film = films.insert_film(&new_film).await?;

    tracing::info!(film_id = film.id, user_id, "Manual film created");

    Ok(film)
}

/// Trims a text field, dropping it when nothing is left
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{MockFilmStore, MockReviewStore},
        error::ProviderError,
        models::{ProviderFilm, ProviderFilmDetails},
        services::providers::MockMovieProvider,
    };
    use mockall::predicate::eq;

    fn record(id: i64, external_id: Option<i64>) -> FilmRecord {
        FilmRecord {
            id,
            external_id,
            title: "Fight Club".to_string(),
            original_title: None,
            synopsis: None,
            release_date: None,
            runtime_minutes: None,
            poster_url: None,
            genres: Vec::new(),
            director: None,
            cast_members: Vec::new(),
            average_rating: 0.0,
            vote_count: 0,
        }
    }

    fn details(external_id: i64) -> ProviderFilmDetails {
        ProviderFilmDetails {
            film: ProviderFilm {
                external_id,
                title: "Fight Club".to_string(),
                original_title: None,
                synopsis: None,
                release_date: None,
                poster_url: None,
                average_rating: 4.2,
                vote_count: 30000,
            },
            runtime_minutes: Some(139),
            genres: vec!["Drame".to_string()],
            director: Some("David Fincher".to_string()),
            cast: vec!["Brad Pitt".to_string()],
        }
    }

    fn provider_with(external_id: i64, found: bool) -> MockMovieProvider {
        let mut provider = MockMovieProvider::new();
        provider
            .expect_fetch_by_id()
            .with(eq(external_id))
            .returning(move |id| Ok(found.then(|| details(id))));
        provider.expect_name().return_const("tmdb");
        provider
    }

    fn no_reviews() -> MockReviewStore {
        let mut reviews = MockReviewStore::new();
        reviews.expect_film_reviews().returning(|_| Ok(Vec::new()));
        reviews
    }

    #[tokio::test]
    async fn test_details_by_local_id() {
        let mut films = MockFilmStore::new();
        films
            .expect_find_film()
            .with(eq(7))
            .returning(|id| Ok(Some(record(id, None))));

        let details = film_details(&films, &no_reviews(), &MockMovieProvider::new(), 7)
            .await
            .unwrap();

        assert_eq!(details.film.id, 7);
    }

    #[tokio::test]
    async fn test_details_by_stored_external_id() {
        let mut films = MockFilmStore::new();
        films.expect_find_film().returning(|_| Ok(None));
        films
            .expect_find_film_by_external_id()
            .with(eq(550))
            .returning(|ext| Ok(Some(record(3, Some(ext)))));

        let details = film_details(&films, &no_reviews(), &MockMovieProvider::new(), 550)
            .await
            .unwrap();

        assert_eq!(details.film.id, 3);
    }

    #[tokio::test]
    async fn test_details_promotes_unknown_large_id() {
        let mut films = MockFilmStore::new();
        films.expect_find_film().returning(|_| Ok(None));
        films.expect_find_film_by_external_id().returning(|_| Ok(None));
        films
            .expect_insert_film()
            .withf(|film| film.external_id == Some(1891) && film.director.is_some())
            .times(1)
            .returning(|film| Ok(record(42, film.external_id)));

        let details = film_details(&films, &no_reviews(), &provider_with(1891, true), 1891)
            .await
            .unwrap();

        assert_eq!(details.film.id, 42);
        assert_eq!(details.film.external_id, Some(1891));
    }

    #[tokio::test]
    async fn test_details_small_unknown_id_is_not_found() {
        let mut films = MockFilmStore::new();
        films.expect_find_film().returning(|_| Ok(None));
        films.expect_find_film_by_external_id().returning(|_| Ok(None));

        let result = film_details(&films, &no_reviews(), &MockMovieProvider::new(), 12).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_promotion_of_unknown_provider_id_is_not_found() {
        let mut films = MockFilmStore::new();
        films.expect_find_film_by_external_id().returning(|_| Ok(None));

        let result = promote_external(&films, &provider_with(9999, false), 9999).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_promotion_surfaces_provider_errors() {
        let mut films = MockFilmStore::new();
        films.expect_find_film_by_external_id().returning(|_| Ok(None));
        let mut provider = MockMovieProvider::new();
        provider
            .expect_fetch_by_id()
            .returning(|_| Err(ProviderError::RateLimited));

        let result = promote_external(&films, &provider, 1891).await;

        assert!(matches!(
            result,
            Err(AppError::Provider(ProviderError::RateLimited))
        ));
    }

    #[tokio::test]
    async fn test_create_film_validation() {
        let mut films = MockFilmStore::new();
        films
            .expect_find_manual_film_by_title()
            .withf(|title| title == "Mon Film")
            .returning(|_| Ok(Some(5)));

        let blank = CreateFilmRequest {
            title: "   ".to_string(),
            original_title: None,
            synopsis: None,
            release_date: None,
            runtime_minutes: None,
            poster_url: None,
            director: None,
            genres: Vec::new(),
        };
        let duplicate = CreateFilmRequest {
            title: " Mon Film ".to_string(),
            ..blank.clone()
        };

        assert!(matches!(
            create_film(&films, 1, blank).await,
            Err(AppError::InvalidInput(_))
        ));
        assert!(matches!(
            create_film(&films, 1, duplicate).await,
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_create_film_losing_a_race_conflicts() {
        // Another request stored the same title between lookup and insert
        let mut films = MockFilmStore::new();
        films.expect_find_manual_film_by_title().returning(|_| Ok(None));
        films.expect_insert_film().times(1).returning(|film| {
            Err(AppError::Conflict(format!(
                "A film titled '{}' already exists",
                film.title
            )))
        });

        let request = CreateFilmRequest {
            title: "Mon Film".to_string(),
            original_title: None,
            synopsis: None,
            release_date: None,
            runtime_minutes: None,
            poster_url: None,
            director: None,
            genres: Vec::new(),
        };

        assert!(matches!(
            create_film(&films, 1, request).await,
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_create_film_inserts_without_external_id() {
        let mut films = MockFilmStore::new();
        films.expect_find_manual_film_by_title().returning(|_| Ok(None));
        films
            .expect_insert_film()
            .withf(|film| film.external_id.is_none() && film.title == "Court métrage" && film.synopsis.is_none())
            .returning(|_| Ok(record(9, None)));

        let request = CreateFilmRequest {
            title: "Court métrage".to_string(),
            original_title: None,
            synopsis: Some("  ".to_string()),
            release_date: None,
            runtime_minutes: Some(12),
            poster_url: None,
            director: Some("Moi".to_string()),
            genres: vec!["Drame".to_string()],
        };

        let film = create_film(&films, 1, request).await.unwrap();
        assert_eq!(film.id, 9);
    }
}
