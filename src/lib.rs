pub mod catalog;
pub mod config;
pub mod friends;
pub mod recent;
pub mod recommend;
pub mod session;
pub mod store;
pub mod watched;

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use catalog::CatalogService;
use friends::FriendService;
use recent::RecentTracker;
use recommend::RecommendClient;
use session::{AuthClient, Session};
use store::RestStore;
use watched::WatchedService;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Store error: {0}")]
    Store(#[from] store::StoreError),
    #[error("Auth error: {0}")]
    Auth(#[from] session::AuthError),
    #[error("Recommendation error: {0}")]
    Recommend(#[from] recommend::RecommendError),
    #[error("Client error: {0}")]
    Client(String),
}

/// Everything the view layer talks to, wired against one hosted project.
pub struct Client {
    store: Arc<RestStore>,
    pub auth: AuthClient,
    pub catalog: CatalogService,
    pub friends: FriendService,
    pub watched: WatchedService,
    pub recent: RecentTracker,
    pub recommend: Option<RecommendClient>,
}

impl Client {
    pub fn new(config: &config::Config) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(store::StoreError::from)?;

        let store = Arc::new(RestStore::with_http(
            http.clone(),
            &config.store.url,
            &config.store.anon_key,
        ));
        let auth = AuthClient::new(http.clone(), &config.store.url, &config.store.anon_key);
        let recommend = config
            .recommend
            .as_ref()
            .map(|r| RecommendClient::new(http, &r.endpoint));

        info!(url = %config.store.url, "store client ready");

        Ok(Self {
            auth,
            catalog: CatalogService::new(store.clone()),
            friends: FriendService::new(store.clone()),
            watched: WatchedService::new(store.clone()),
            recent: RecentTracker::new(store.clone()),
            recommend,
            store,
        })
    }

    /// Sign in and install the session token on the store, so subsequent
    /// row access runs under the user's permissions.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, ClientError> {
        let session = self.auth.sign_in(email, password).await?;
        self.store
            .set_bearer(Some(session.access_token.clone()))
            .await;
        Ok(session)
    }

    pub async fn sign_out(&self) {
        self.store.set_bearer(None).await;
    }

    /// Persist the user's theme preference on their row.
    pub async fn set_theme(&self, user_id: &str, theme: store::Theme) -> Result<(), ClientError> {
        use store::UserStore;
        self.store
            .set_theme(user_id, theme == store::Theme::Dark)
            .await?;
        Ok(())
    }
}
