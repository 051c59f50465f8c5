use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRow {
    pub user_id: String,
    pub username: String,
    #[serde(default)]
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub theme_settings: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl UserRow {
    pub fn theme(&self) -> Theme {
        if self.theme_settings {
            Theme::Dark
        } else {
            Theme::Light
        }
    }
}

/// Per-user display preference, stored as a boolean flag on the user row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieRow {
    pub movie_id: i64,
    pub title: String,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub genres: Option<String>,
    #[serde(default)]
    pub runtime: Option<i32>,
    #[serde(default)]
    pub rating: Option<f32>,
    #[serde(default)]
    pub poster: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub banner: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShowRow {
    pub show_id: i64,
    pub title: String,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub genres: Option<String>,
    #[serde(default)]
    pub seasons: Option<i32>,
    #[serde(default)]
    pub rating: Option<f32>,
    #[serde(default)]
    pub poster: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub banner: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FriendRow {
    pub user_id: String,
    pub friend_id: String,
    pub status: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// One row of the Recently_Visited table. Each slot holds the raw stored
/// value; slot contents are decoded leniently by the recent module, so a
/// legacy or partially written slot never fails a fetch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecentRow {
    pub user_id: String,
    #[serde(default)]
    pub visited_1: Option<serde_json::Value>,
    #[serde(default)]
    pub visited_2: Option<serde_json::Value>,
    #[serde(default)]
    pub visited_3: Option<serde_json::Value>,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

// Transport failures are one taxonomy with unexpected-status responses:
// either way the store could not serve the call.
impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
