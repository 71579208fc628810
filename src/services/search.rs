use crate::{
    db::CatalogReader,
    error::AppResult,
    models::FilmView,
    services::{
        merge::{merge_search, SEARCH_CAP, SEARCH_LOCAL_CAP},
        providers::{or_empty, MovieProvider},
    },
};

/// Title search across the local catalog and the provider
///
/// Local matches come first in release order, then provider hits in relevance
/// order. A blank query matches nothing.
pub async fn search_films(
    catalog: &dyn CatalogReader,
    provider: &dyn MovieProvider,
    query: &str,
) -> AppResult<Vec<FilmView>> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(Vec::new());
    }

    let term = query.to_lowercase();
    let (local, external) = tokio::join!(
        catalog.search_local(&term, SEARCH_LOCAL_CAP as i64),
        provider.search(query, 1),
    );

    let local = local?;
    let local_count = local.len();
    let films = merge_search(local, or_empty(external, "search"), SEARCH_CAP);

    tracing::info!(
        query = %query,
        local = local_count,
        total = films.len(),
        "Film search completed"
    );

    Ok(films)
}
