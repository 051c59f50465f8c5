use async_trait::async_trait;

use super::model::*;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_user(&self, username: &str) -> StoreResult<UserRow>;
    async fn get_user_by_id(&self, user_id: &str) -> StoreResult<UserRow>;
    async fn search_users(&self, pattern: &str, limit: u32) -> StoreResult<Vec<UserRow>>;
    async fn set_theme(&self, user_id: &str, dark: bool) -> StoreResult<()>;
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn get_movie(&self, movie_id: i64) -> StoreResult<MovieRow>;
    async fn get_show(&self, show_id: i64) -> StoreResult<ShowRow>;
    async fn search_movies(&self, pattern: &str, limit: u32) -> StoreResult<Vec<MovieRow>>;
    async fn search_shows(&self, pattern: &str, limit: u32) -> StoreResult<Vec<ShowRow>>;
    async fn movies_by_ids(&self, movie_ids: &[i64]) -> StoreResult<Vec<MovieRow>>;
    async fn shows_by_ids(&self, show_ids: &[i64]) -> StoreResult<Vec<ShowRow>>;
    async fn movie_window(&self, offset: u32, limit: u32) -> StoreResult<Vec<MovieRow>>;
}

#[async_trait]
pub trait FriendStore: Send + Sync {
    /// All Friends rows linking the two users, in either direction.
    async fn rows_between(&self, user_a: &str, user_b: &str) -> StoreResult<Vec<FriendRow>>;
    async fn insert_request(&self, user_id: &str, friend_id: &str) -> StoreResult<()>;
    /// Update the status of the pending request from `user_id` to
    /// `friend_id`. Only a pending row is touched; `NotFound` if there is
    /// no pending request between the two.
    async fn resolve_request(&self, user_id: &str, friend_id: &str, status: &str)
        -> StoreResult<()>;
}

#[async_trait]
pub trait WatchedStore: Send + Sync {
    async fn watched_movie_ids(&self, user_id: &str) -> StoreResult<Vec<i64>>;
    async fn watched_show_ids(&self, user_id: &str) -> StoreResult<Vec<i64>>;
    async fn mark_movie_watched(&self, user_id: &str, movie_id: i64) -> StoreResult<()>;
    async fn mark_show_watched(&self, user_id: &str, show_id: i64) -> StoreResult<()>;
}

/// Persistence contract for the recently-visited tracker. The row is read
/// and written wholesale; there are no partial-field updates.
#[async_trait]
pub trait RecentStore: Send + Sync {
    async fn fetch_recent_set(&self, user_id: &str) -> StoreResult<RecentRow>;
    /// Upsert: creates the row if absent, otherwise overwrites all slots.
    async fn put_recent_set(&self, row: &RecentRow) -> StoreResult<()>;
}

pub trait RemoteStore:
    UserStore + CatalogStore + FriendStore + WatchedStore + RecentStore + Send + Sync
{
}
