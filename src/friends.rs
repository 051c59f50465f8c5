use std::sync::Arc;

use tracing::info;

use crate::store::{FriendRow, FriendStore, StoreResult};

/// Relationship between the signed-in user and another user, as seen from
/// the signed-in user's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FriendStatus {
    NotConnected,
    Friends,
    /// We sent a request that is still pending.
    RequestSent,
    /// The other user sent us a request we have not answered.
    RequestReceived,
    /// Our request was rejected by the other user.
    RejectedByPeer,
    /// We rejected the other user's request.
    PeerRejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FriendResponse {
    Accept,
    Reject,
}

impl FriendResponse {
    fn as_status(&self) -> &'static str {
        match self {
            FriendResponse::Accept => "accepted",
            FriendResponse::Reject => "rejected",
        }
    }
}

/// Derive the relationship status from the Friends rows linking `me` and
/// `peer`. When multiple rows exist, accepted wins over pending, and
/// pending wins over rejected.
pub fn derive_status(rows: &[FriendRow], me: &str, peer: &str) -> FriendStatus {
    let linking = |row: &FriendRow| {
        (row.user_id == me && row.friend_id == peer) || (row.user_id == peer && row.friend_id == me)
    };

    let row_with = |status: &str| {
        rows.iter()
            .filter(|row| linking(row))
            .find(|row| row.status == status)
    };

    if row_with("accepted").is_some() {
        return FriendStatus::Friends;
    }
    if let Some(row) = row_with("pending") {
        return if row.user_id == me {
            FriendStatus::RequestSent
        } else {
            FriendStatus::RequestReceived
        };
    }
    if let Some(row) = row_with("rejected") {
        return if row.user_id == me {
            FriendStatus::RejectedByPeer
        } else {
            FriendStatus::PeerRejected
        };
    }
    FriendStatus::NotConnected
}

pub struct FriendService {
    store: Arc<dyn FriendStore>,
}

impl FriendService {
    pub fn new(store: Arc<dyn FriendStore>) -> Self {
        Self { store }
    }

    pub async fn status(&self, me: &str, peer: &str) -> StoreResult<FriendStatus> {
        let rows = self.store.rows_between(me, peer).await?;
        Ok(derive_status(&rows, me, peer))
    }

    pub async fn send_request(&self, me: &str, peer: &str) -> StoreResult<()> {
        self.store.insert_request(me, peer).await?;
        info!(from = %me, to = %peer, "friend request sent");
        Ok(())
    }

    /// Answer a pending request the peer sent us. Only the pending row is
    /// updated; answering when no request is pending is `NotFound`.
    pub async fn respond(
        &self,
        me: &str,
        peer: &str,
        response: FriendResponse,
    ) -> StoreResult<()> {
        self.store
            .resolve_request(peer, me, response.as_status())
            .await?;
        info!(from = %peer, to = %me, response = response.as_status(), "friend request answered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::store::StoreError;

    use super::*;

    fn row(user_id: &str, friend_id: &str, status: &str) -> FriendRow {
        FriendRow {
            user_id: user_id.to_string(),
            friend_id: friend_id.to_string(),
            status: status.to_string(),
            created_at: None,
        }
    }

    #[test]
    fn test_no_rows_means_not_connected() {
        assert_eq!(derive_status(&[], "a", "b"), FriendStatus::NotConnected);
    }

    #[test]
    fn test_accepted_in_either_direction() {
        let rows = [row("a", "b", "accepted")];
        assert_eq!(derive_status(&rows, "a", "b"), FriendStatus::Friends);
        assert_eq!(derive_status(&rows, "b", "a"), FriendStatus::Friends);
    }

    #[test]
    fn test_pending_direction() {
        let rows = [row("a", "b", "pending")];
        assert_eq!(derive_status(&rows, "a", "b"), FriendStatus::RequestSent);
        assert_eq!(
            derive_status(&rows, "b", "a"),
            FriendStatus::RequestReceived
        );
    }

    #[test]
    fn test_rejected_direction() {
        let rows = [row("a", "b", "rejected")];
        assert_eq!(
            derive_status(&rows, "a", "b"),
            FriendStatus::RejectedByPeer
        );
        assert_eq!(derive_status(&rows, "b", "a"), FriendStatus::PeerRejected);
    }

    #[test]
    fn test_accepted_takes_precedence_over_older_rows() {
        // A rejected first attempt followed by an accepted retry.
        let rows = [row("a", "b", "rejected"), row("b", "a", "accepted")];
        assert_eq!(derive_status(&rows, "a", "b"), FriendStatus::Friends);
    }

    #[test]
    fn test_pending_takes_precedence_over_rejected() {
        let rows = [row("a", "b", "rejected"), row("a", "b", "pending")];
        assert_eq!(derive_status(&rows, "a", "b"), FriendStatus::RequestSent);
    }

    #[test]
    fn test_rows_for_other_users_are_ignored() {
        let rows = [row("a", "c", "accepted"), row("c", "b", "pending")];
        assert_eq!(derive_status(&rows, "a", "b"), FriendStatus::NotConnected);
    }

    /// In-memory stand-in for the hosted Friends table. `resolve_request`
    /// honors the store contract: only a pending row is updated, and an
    /// update matching no row is `NotFound`.
    #[derive(Default)]
    struct MemoryFriendStore {
        rows: Mutex<Vec<FriendRow>>,
    }

    impl MemoryFriendStore {
        fn seed(&self, seeded: FriendRow) {
            self.rows.lock().unwrap().push(seeded);
        }
    }

    #[async_trait]
    impl FriendStore for MemoryFriendStore {
        async fn rows_between(&self, user_a: &str, user_b: &str) -> StoreResult<Vec<FriendRow>> {
            let rows = self.rows.lock().unwrap();
            Ok(rows
                .iter()
                .filter(|r| {
                    (r.user_id == user_a && r.friend_id == user_b)
                        || (r.user_id == user_b && r.friend_id == user_a)
                })
                .cloned()
                .collect())
        }

        async fn insert_request(&self, user_id: &str, friend_id: &str) -> StoreResult<()> {
            self.seed(row(user_id, friend_id, "pending"));
            Ok(())
        }

        async fn resolve_request(
            &self,
            user_id: &str,
            friend_id: &str,
            status: &str,
        ) -> StoreResult<()> {
            let mut rows = self.rows.lock().unwrap();
            let pending = rows.iter_mut().find(|r| {
                r.user_id == user_id && r.friend_id == friend_id && r.status == "pending"
            });
            match pending {
                Some(r) => {
                    r.status = status.to_string();
                    Ok(())
                }
                None => Err(StoreError::NotFound(format!(
                    "No pending request from {} to {}",
                    user_id, friend_id
                ))),
            }
        }
    }

    fn service() -> (Arc<MemoryFriendStore>, FriendService) {
        let store = Arc::new(MemoryFriendStore::default());
        let service = FriendService::new(store.clone());
        (store, service)
    }

    #[tokio::test]
    async fn test_send_request_creates_pending_row() {
        let (_, service) = service();
        service.send_request("a", "b").await.unwrap();
        assert_eq!(
            service.status("a", "b").await.unwrap(),
            FriendStatus::RequestSent
        );
        assert_eq!(
            service.status("b", "a").await.unwrap(),
            FriendStatus::RequestReceived
        );
    }

    #[tokio::test]
    async fn test_respond_accepts_pending_request() {
        let (store, service) = service();
        store.seed(row("peer", "me", "pending"));
        service
            .respond("me", "peer", FriendResponse::Accept)
            .await
            .unwrap();
        assert_eq!(
            service.status("me", "peer").await.unwrap(),
            FriendStatus::Friends
        );
    }

    #[tokio::test]
    async fn test_respond_rejects_pending_request() {
        let (store, service) = service();
        store.seed(row("peer", "me", "pending"));
        service
            .respond("me", "peer", FriendResponse::Reject)
            .await
            .unwrap();
        assert_eq!(
            service.status("me", "peer").await.unwrap(),
            FriendStatus::PeerRejected
        );
    }

    #[tokio::test]
    async fn test_respond_without_pending_request_is_not_found() {
        let (store, service) = service();
        // An established friendship must not be rewritten by a respond.
        store.seed(row("peer", "me", "accepted"));
        let err = service
            .respond("me", "peer", FriendResponse::Reject)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(
            service.status("me", "peer").await.unwrap(),
            FriendStatus::Friends
        );
    }
}
