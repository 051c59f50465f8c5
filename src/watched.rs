use std::sync::Arc;

use tracing::debug;

use crate::store::{MovieRow, RemoteStore, ShowRow, StoreResult};

/// Watched-list access for profile views: id lists per user, hydrated to
/// full catalog rows in one batched lookup.
pub struct WatchedService {
    store: Arc<dyn RemoteStore>,
}

impl WatchedService {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self { store }
    }

    pub async fn watched_movies(&self, user_id: &str) -> StoreResult<Vec<MovieRow>> {
        let ids = self.store.watched_movie_ids(user_id).await?;
        debug!(user = %user_id, count = ids.len(), "watched movies");
        self.store.movies_by_ids(&ids).await
    }

    pub async fn watched_shows(&self, user_id: &str) -> StoreResult<Vec<ShowRow>> {
        let ids = self.store.watched_show_ids(user_id).await?;
        debug!(user = %user_id, count = ids.len(), "watched shows");
        self.store.shows_by_ids(&ids).await
    }

    /// (movies, shows) watched counts for the profile header.
    pub async fn watched_counts(&self, user_id: &str) -> StoreResult<(usize, usize)> {
        let movies = self.store.watched_movie_ids(user_id).await?;
        let shows = self.store.watched_show_ids(user_id).await?;
        Ok((movies.len(), shows.len()))
    }

    pub async fn mark_movie_watched(&self, user_id: &str, movie_id: i64) -> StoreResult<()> {
        self.store.mark_movie_watched(user_id, movie_id).await
    }

    pub async fn mark_show_watched(&self, user_id: &str, show_id: i64) -> StoreResult<()> {
        self.store.mark_show_watched(user_id, show_id).await
    }
}
