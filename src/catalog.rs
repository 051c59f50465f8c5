use std::sync::Arc;

use rand::Rng;
use tracing::debug;

use crate::store::{MovieRow, RemoteStore, ShowRow, StoreResult, UserRow};

/// Size of the strip shown on detail pages and the home carousel.
const DISCOVER_WINDOW: u32 = 20;
/// Upper bound used when picking a random window into the Movies table.
const DISCOVER_SPAN: u32 = 100_000;

const SEARCH_LIMIT: u32 = 10;

#[derive(Debug, Default)]
pub struct SearchResults {
    pub movies: Vec<MovieRow>,
    pub shows: Vec<ShowRow>,
    pub users: Vec<UserRow>,
}

/// Catalog browsing: detail lookups, title/username search, and the
/// random discover strip.
pub struct CatalogService {
    store: Arc<dyn RemoteStore>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self { store }
    }

    pub async fn movie(&self, movie_id: i64) -> StoreResult<MovieRow> {
        self.store.get_movie(movie_id).await
    }

    pub async fn show(&self, show_id: i64) -> StoreResult<ShowRow> {
        self.store.get_show(show_id).await
    }

    pub async fn user(&self, username: &str) -> StoreResult<UserRow> {
        self.store.get_user(username).await
    }

    pub async fn user_by_id(&self, user_id: &str) -> StoreResult<UserRow> {
        self.store.get_user_by_id(user_id).await
    }

    /// Case-insensitive partial-match search across movies, shows and
    /// users, up to ten results each.
    pub async fn search(&self, query: &str) -> StoreResult<SearchResults> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(SearchResults::default());
        }
        let movies = self.store.search_movies(query, SEARCH_LIMIT).await?;
        let shows = self.store.search_shows(query, SEARCH_LIMIT).await?;
        let users = self.store.search_users(query, SEARCH_LIMIT).await?;
        debug!(
            query = %query,
            movies = movies.len(),
            shows = shows.len(),
            users = users.len(),
            "search completed"
        );
        Ok(SearchResults {
            movies,
            shows,
            users,
        })
    }

    /// A window of titles at a random offset, for the "similar movies"
    /// strip. The window may come back short near the end of the table.
    pub async fn discover(&self) -> StoreResult<Vec<MovieRow>> {
        let offset = rand::thread_rng().gen_range(0..DISCOVER_SPAN - DISCOVER_WINDOW);
        self.store.movie_window(offset, DISCOVER_WINDOW).await
    }
}
