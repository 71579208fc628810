pub mod pg;
pub mod postgres;
pub mod store;

pub use pg::PgStore;
pub use postgres::create_pool;
pub use store::{CatalogReader, FilmStore, GroupStore, ReviewStore};

#[cfg(test)]
pub use store::{MockCatalogReader, MockFilmStore, MockGroupStore, MockReviewStore};
