use std::fmt::Write;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;
use tokio::sync::RwLock;
use tracing::debug;

use super::model::*;
use super::repo::*;

const USER_COLUMNS: &str = "user_id,username,profile_picture,bio,theme_settings,created_at";

/// HTTP backend for the hosted row store. Rows are addressed with the
/// PostgREST filter syntax (`eq.`, `ilike.`, `in.(...)`) and authenticated
/// with the project api key plus, once signed in, a per-user bearer token.
pub struct RestStore {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    bearer: RwLock<Option<String>>,
}

impl RestStore {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> StoreResult<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_http(http, base_url, api_key))
    }

    pub fn with_http(http: reqwest::Client, base_url: &str, api_key: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            bearer: RwLock::new(None),
        }
    }

    /// Install (or clear) the access token used for row-level auth.
    pub async fn set_bearer(&self, token: Option<String>) {
        let mut bearer = self.bearer.write().await;
        *bearer = token;
    }

    fn table_url(&self, table: &str, params: &[(&str, &str)]) -> String {
        let mut url = format!("{}/rest/v1/{}", self.base_url, table);
        let mut sep = '?';
        for (key, value) in params {
            let _ = write!(&mut url, "{}{}={}", sep, key, urlencoding::encode(value));
            sep = '&';
        }
        url
    }

    async fn request(&self, method: Method, url: String) -> RequestBuilder {
        let mut req = self
            .http
            .request(method, url)
            .header("apikey", &self.api_key);
        let bearer = self.bearer.read().await;
        let token = bearer.as_deref().unwrap_or(&self.api_key);
        req = req.header(header::AUTHORIZATION, format!("Bearer {}", token));
        req
    }

    async fn check(resp: Response, what: &str) -> StoreResult<Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        if status == StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound(format!("{}: {}", what, body)));
        }
        Err(StoreError::Unavailable(format!(
            "{} returned status {}: {}",
            what, status, body
        )))
    }

    async fn fetch_rows<T: DeserializeOwned>(
        &self,
        table: &str,
        params: &[(&str, &str)],
    ) -> StoreResult<Vec<T>> {
        let url = self.table_url(table, params);
        debug!(url = %url, "store fetch");
        let resp = self.request(Method::GET, url).await.send().await?;
        let resp = Self::check(resp, table).await?;
        let rows = resp.json::<Vec<T>>().await?;
        Ok(rows)
    }

    async fn fetch_one<T: DeserializeOwned>(
        &self,
        table: &str,
        params: &[(&str, &str)],
        what: &str,
    ) -> StoreResult<T> {
        let rows = self.fetch_rows::<T>(table, params).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::NotFound(what.to_string()))
    }

    async fn insert(&self, table: &str, body: serde_json::Value) -> StoreResult<()> {
        let url = self.table_url(table, &[]);
        let resp = self
            .request(Method::POST, url)
            .await
            .header("Prefer", "return=minimal")
            .json(&body)
            .send()
            .await?;
        Self::check(resp, table).await?;
        Ok(())
    }

    fn ilike(pattern: &str) -> String {
        format!("ilike.*{}*", pattern)
    }

    fn id_list(ids: &[i64]) -> String {
        let list = ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        format!("in.({})", list)
    }
}

#[async_trait]
impl UserStore for RestStore {
    async fn get_user(&self, username: &str) -> StoreResult<UserRow> {
        let filter = format!("eq.{}", username);
        self.fetch_one(
            "Users",
            &[("username", filter.as_str()), ("select", USER_COLUMNS)],
            &format!("User not found: {}", username),
        )
        .await
    }

    async fn get_user_by_id(&self, user_id: &str) -> StoreResult<UserRow> {
        let filter = format!("eq.{}", user_id);
        self.fetch_one(
            "Users",
            &[("user_id", filter.as_str()), ("select", USER_COLUMNS)],
            &format!("User not found: {}", user_id),
        )
        .await
    }

    async fn search_users(&self, pattern: &str, limit: u32) -> StoreResult<Vec<UserRow>> {
        let filter = Self::ilike(pattern);
        let limit = limit.to_string();
        self.fetch_rows(
            "Users",
            &[
                ("username", filter.as_str()),
                ("select", USER_COLUMNS),
                ("limit", limit.as_str()),
            ],
        )
        .await
    }

    async fn set_theme(&self, user_id: &str, dark: bool) -> StoreResult<()> {
        let filter = format!("eq.{}", user_id);
        let url = self.table_url("Users", &[("user_id", filter.as_str())]);
        let resp = self
            .request(Method::PATCH, url)
            .await
            .header("Prefer", "return=minimal")
            .json(&json!({ "theme_settings": dark }))
            .send()
            .await?;
        Self::check(resp, "Users").await?;
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for RestStore {
    async fn get_movie(&self, movie_id: i64) -> StoreResult<MovieRow> {
        let filter = format!("eq.{}", movie_id);
        self.fetch_one(
            "Movies",
            &[("movie_id", filter.as_str())],
            &format!("Movie not found: {}", movie_id),
        )
        .await
    }

    async fn get_show(&self, show_id: i64) -> StoreResult<ShowRow> {
        let filter = format!("eq.{}", show_id);
        self.fetch_one(
            "Shows",
            &[("show_id", filter.as_str())],
            &format!("Show not found: {}", show_id),
        )
        .await
    }

    async fn search_movies(&self, pattern: &str, limit: u32) -> StoreResult<Vec<MovieRow>> {
        let filter = Self::ilike(pattern);
        let limit = limit.to_string();
        self.fetch_rows(
            "Movies",
            &[("title", filter.as_str()), ("limit", limit.as_str())],
        )
        .await
    }

    async fn search_shows(&self, pattern: &str, limit: u32) -> StoreResult<Vec<ShowRow>> {
        let filter = Self::ilike(pattern);
        let limit = limit.to_string();
        self.fetch_rows(
            "Shows",
            &[("title", filter.as_str()), ("limit", limit.as_str())],
        )
        .await
    }

    async fn movies_by_ids(&self, movie_ids: &[i64]) -> StoreResult<Vec<MovieRow>> {
        if movie_ids.is_empty() {
            return Ok(Vec::new());
        }
        let filter = Self::id_list(movie_ids);
        self.fetch_rows("Movies", &[("movie_id", filter.as_str())])
            .await
    }

    async fn shows_by_ids(&self, show_ids: &[i64]) -> StoreResult<Vec<ShowRow>> {
        if show_ids.is_empty() {
            return Ok(Vec::new());
        }
        let filter = Self::id_list(show_ids);
        self.fetch_rows("Shows", &[("show_id", filter.as_str())])
            .await
    }

    async fn movie_window(&self, offset: u32, limit: u32) -> StoreResult<Vec<MovieRow>> {
        let offset = offset.to_string();
        let limit = limit.to_string();
        self.fetch_rows(
            "Movies",
            &[("offset", offset.as_str()), ("limit", limit.as_str())],
        )
        .await
    }
}

#[async_trait]
impl FriendStore for RestStore {
    async fn rows_between(&self, user_a: &str, user_b: &str) -> StoreResult<Vec<FriendRow>> {
        let filter = format!(
            "(and(user_id.eq.{a},friend_id.eq.{b}),and(user_id.eq.{b},friend_id.eq.{a}))",
            a = user_a,
            b = user_b
        );
        self.fetch_rows("Friends", &[("or", filter.as_str())])
            .await
    }

    async fn insert_request(&self, user_id: &str, friend_id: &str) -> StoreResult<()> {
        self.insert(
            "Friends",
            json!({
                "user_id": user_id,
                "friend_id": friend_id,
                "status": "pending",
            }),
        )
        .await
    }

    async fn resolve_request(
        &self,
        user_id: &str,
        friend_id: &str,
        status: &str,
    ) -> StoreResult<()> {
        let user_filter = format!("eq.{}", user_id);
        let friend_filter = format!("eq.{}", friend_id);
        let url = self.table_url(
            "Friends",
            &[
                ("user_id", user_filter.as_str()),
                ("friend_id", friend_filter.as_str()),
                ("status", "eq.pending"),
            ],
        );
        // return=representation so an update that matched no row (no
        // pending request) is distinguishable from a successful one.
        let resp = self
            .request(Method::PATCH, url)
            .await
            .header("Prefer", "return=representation")
            .json(&json!({ "status": status }))
            .send()
            .await?;
        let resp = Self::check(resp, "Friends").await?;
        let rows = resp.json::<Vec<serde_json::Value>>().await?;
        if rows.is_empty() {
            return Err(StoreError::NotFound(format!(
                "No pending request from {} to {}",
                user_id, friend_id
            )));
        }
        Ok(())
    }
}

#[derive(serde::Deserialize)]
struct MovieIdRow {
    movie_id: i64,
}

#[derive(serde::Deserialize)]
struct ShowIdRow {
    show_id: i64,
}

#[async_trait]
impl WatchedStore for RestStore {
    async fn watched_movie_ids(&self, user_id: &str) -> StoreResult<Vec<i64>> {
        let filter = format!("eq.{}", user_id);
        let rows: Vec<MovieIdRow> = self
            .fetch_rows(
                "Watched_Movies",
                &[("user_id", filter.as_str()), ("select", "movie_id")],
            )
            .await?;
        Ok(rows.into_iter().map(|r| r.movie_id).collect())
    }

    async fn watched_show_ids(&self, user_id: &str) -> StoreResult<Vec<i64>> {
        let filter = format!("eq.{}", user_id);
        let rows: Vec<ShowIdRow> = self
            .fetch_rows(
                "Watched_Shows",
                &[("user_id", filter.as_str()), ("select", "show_id")],
            )
            .await?;
        Ok(rows.into_iter().map(|r| r.show_id).collect())
    }

    async fn mark_movie_watched(&self, user_id: &str, movie_id: i64) -> StoreResult<()> {
        self.insert(
            "Watched_Movies",
            json!({ "user_id": user_id, "movie_id": movie_id }),
        )
        .await
    }

    async fn mark_show_watched(&self, user_id: &str, show_id: i64) -> StoreResult<()> {
        self.insert(
            "Watched_Shows",
            json!({ "user_id": user_id, "show_id": show_id }),
        )
        .await
    }
}

#[async_trait]
impl RecentStore for RestStore {
    async fn fetch_recent_set(&self, user_id: &str) -> StoreResult<RecentRow> {
        let filter = format!("eq.{}", user_id);
        self.fetch_one(
            "Recently_Visited",
            &[
                ("user_id", filter.as_str()),
                ("select", "user_id,visited_1,visited_2,visited_3"),
            ],
            &format!("Recently_Visited not found: {}", user_id),
        )
        .await
    }

    async fn put_recent_set(&self, row: &RecentRow) -> StoreResult<()> {
        let url = self.table_url("Recently_Visited", &[("on_conflict", "user_id")]);
        let resp = self
            .request(Method::POST, url)
            .await
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(row)
            .send()
            .await?;
        // A conflict here is the user_id foreign key failing, i.e. the
        // referenced user does not exist.
        if resp.status() == StatusCode::CONFLICT {
            return Err(StoreError::NotFound(format!(
                "User not found: {}",
                row.user_id
            )));
        }
        Self::check(resp, "Recently_Visited").await?;
        Ok(())
    }
}

impl RemoteStore for RestStore {}
