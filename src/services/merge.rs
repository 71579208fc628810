use std::cmp::Ordering;
use std::collections::HashSet;

use crate::models::{FilmView, LocalFilm, ProviderFilm};

/// Number of films shown in each feed section
pub const FEED_CAP: usize = 5;

/// Local rows considered by a title search
pub const SEARCH_LOCAL_CAP: usize = 20;

/// Total rows returned by a title search
pub const SEARCH_CAP: usize = 50;

/// Merges local best-rated films with the provider's, best average first
///
/// Ties on the average are broken by vote count; remaining ties keep local rows
/// ahead of provider rows.
pub fn merge_top_rated(
    local: Vec<LocalFilm>,
    external: Vec<ProviderFilm>,
    cap: usize,
) -> Vec<FilmView> {
    let mut films = combine(local, external, |_| true);
    films.sort_by(by_rating);
    films.truncate(cap);
    films
}

/// Merges local recent films with the provider's latest releases, newest first
///
/// Provider films without a release date cannot be placed and are dropped.
pub fn merge_recent(local: Vec<LocalFilm>, external: Vec<ProviderFilm>, cap: usize) -> Vec<FilmView> {
    let mut films = combine(local, external, |film| film.release_date.is_some());
    films.sort_by(by_release_date);
    films.truncate(cap);
    films
}

/// Appends provider search hits to local ones without reordering either side
pub fn merge_search(local: Vec<LocalFilm>, external: Vec<ProviderFilm>, cap: usize) -> Vec<FilmView> {
    let mut films = combine(local, external, |_| true);
    films.truncate(cap);
    films
}

/// Concatenates local rows and the provider rows they do not already cover
///
/// A provider film whose external id is known locally is dropped, as is any
/// repeat of an external id within the provider list itself.
fn combine<F>(local: Vec<LocalFilm>, external: Vec<ProviderFilm>, keep: F) -> Vec<FilmView>
where
    F: Fn(&ProviderFilm) -> bool,
{
    let mut known: HashSet<i64> = local.iter().filter_map(|film| film.external_id).collect();

    let external = external
        .into_iter()
        .filter(|film| keep(film) && known.insert(film.external_id))
        .map(FilmView::from);

    local.into_iter().map(FilmView::from).chain(external).collect()
}

fn by_rating(a: &FilmView, b: &FilmView) -> Ordering {
    b.average_rating
        .total_cmp(&a.average_rating)
        .then_with(|| b.vote_count.cmp(&a.vote_count))
}

fn by_release_date(a: &FilmView, b: &FilmView) -> Ordering {
    match (a.release_date, b.release_date) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
