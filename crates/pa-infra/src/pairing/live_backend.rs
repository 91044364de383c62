use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pa_core::ids::{LobbyId, PairId};
use pa_core::pairing::{NewUserPair, PairingEvent, Topic, UserPair, UserSession, PAIRED_EVENT};
use pa_core::ports::{
    BackendError, BackendMode, PairingBackendPort, PairingStorePort, PairingSubscription,
    RealtimeMessage, RealtimePort, Subscription,
};
use pa_core::UserCode;
use tokio::sync::mpsc;
use tracing::{debug, warn};

const EVENT_BUFFER: usize = 8;

/// Hosted backend: relational store for sessions/pairs, realtime broadcast
/// for notifications. Every call is one remote round trip.
pub struct LivePairingBackend {
    store: Arc<dyn PairingStorePort>,
    realtime: Arc<dyn RealtimePort>,
}

impl LivePairingBackend {
    pub fn new(store: Arc<dyn PairingStorePort>, realtime: Arc<dyn RealtimePort>) -> Self {
        Self { store, realtime }
    }
}

#[async_trait]
impl PairingBackendPort for LivePairingBackend {
    fn mode(&self) -> BackendMode {
        BackendMode::Live
    }

    fn is_configured(&self) -> bool {
        true
    }

    async fn register_session(&self, session: &UserSession) -> Result<(), BackendError> {
        Ok(self.store.upsert_session(session).await?)
    }

    async fn find_session(&self, code: &UserCode) -> Result<Option<UserSession>, BackendError> {
        Ok(self.store.find_session_by_code(code).await?)
    }

    async fn create_pair(&self, pair: NewUserPair) -> Result<UserPair, BackendError> {
        Ok(self.store.insert_pair(&pair).await?)
    }

    async fn mark_paired(&self, codes: &[UserCode], pair_id: &PairId) -> Result<(), BackendError> {
        Ok(self.store.mark_sessions_paired(codes, pair_id).await?)
    }

    async fn rollback_pair(&self, pair_id: &PairId) -> Result<(), BackendError> {
        Ok(self.store.delete_pair(pair_id).await?)
    }

    async fn notify_partner(
        &self,
        target: &UserCode,
        event: &PairingEvent,
    ) -> Result<(), BackendError> {
        let payload =
            serde_json::to_value(event).map_err(|e| BackendError::Serialization(e.to_string()))?;
        self.realtime
            .publish(RealtimeMessage::new(&Topic::pairing(target), PAIRED_EVENT, payload))
            .await?;
        Ok(())
    }

    async fn subscribe_pairing(
        &self,
        my_code: &UserCode,
    ) -> Result<PairingSubscription, BackendError> {
        let topic = Topic::pairing(my_code);
        let mut messages = self.realtime.subscribe(&topic).await?;
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);

        // Dropping `messages` with the task releases the realtime channel.
        let task = tokio::spawn(async move {
            while let Some(message) = messages.recv().await {
                if message.event != PAIRED_EVENT {
                    debug!(event = %message.event, "ignoring non-pairing event");
                    continue;
                }
                match serde_json::from_value::<PairingEvent>(message.payload) {
                    Ok(event) => {
                        if tx.send(event).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!(topic = %message.topic, error = %e, "malformed pairing event"),
                }
            }
        });

        Ok(Subscription::new(topic.as_str(), rx, move || task.abort()))
    }

    async fn find_pair_by_lobby(&self, lobby_id: &LobbyId) -> Result<Option<UserPair>, BackendError> {
        Ok(self.store.find_pair_by_lobby(lobby_id).await?)
    }

    async fn cleanup_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64, BackendError> {
        Ok(self.store.delete_sessions_expired_before(now).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::realtime::LocalRealtimeHub;
    use crate::store::InMemoryPairingStore;
    use chrono::Duration;
    use serde_json::json;

    fn code(s: &str) -> UserCode {
        UserCode::parse(s).unwrap()
    }

    fn backend() -> (LivePairingBackend, Arc<InMemoryPairingStore>, Arc<LocalRealtimeHub>) {
        let store = Arc::new(InMemoryPairingStore::new());
        let hub = Arc::new(LocalRealtimeHub::new());
        (
            LivePairingBackend::new(store.clone(), hub.clone()),
            store,
            hub,
        )
    }

    #[tokio::test]
    async fn sessions_and_pairs_go_through_the_store() {
        let (backend, store, _hub) = backend();
        let now = Utc::now();
        let a = code("AAA-222-AAA");
        let b = code("BBB-333-BBB");

        backend
            .register_session(&UserSession::new(a.clone(), now, Duration::hours(1)))
            .await
            .unwrap();
        backend
            .register_session(&UserSession::new(b.clone(), now, Duration::hours(1)))
            .await
            .unwrap();

        let pair = backend
            .create_pair(
                NewUserPair::active(
                    a.clone(),
                    b.clone(),
                    LobbyId::from("lobby-1-a"),
                    now,
                    now + Duration::hours(1),
                )
                .unwrap(),
            )
            .await
            .unwrap();
        backend
            .mark_paired(&[a.clone(), b.clone()], &pair.id)
            .await
            .unwrap();

        let session = backend.find_session(&b).await.unwrap().unwrap();
        assert!(session.is_paired);
        assert_eq!(session.pair_id.as_ref(), Some(&pair.id));

        let found = backend
            .find_pair_by_lobby(&LobbyId::from("lobby-1-a"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, pair.id);

        backend.rollback_pair(&pair.id).await.unwrap();
        assert!(store.pairs().await.is_empty());
    }

    #[tokio::test]
    async fn notification_reaches_target_subscription() {
        let (backend, _store, _hub) = backend();
        let target = code("BBB-333-BBB");
        let mut subscription = backend.subscribe_pairing(&target).await.unwrap();

        let event = PairingEvent {
            lobby_id: LobbyId::from("lobby-1-a"),
            partner_code: code("AAA-222-AAA"),
        };
        backend.notify_partner(&target, &event).await.unwrap();

        assert_eq!(subscription.recv().await, Some(event));
    }

    #[tokio::test]
    async fn foreign_events_and_bad_payloads_are_skipped() {
        let (backend, _store, hub) = backend();
        let target = code("BBB-333-BBB");
        let topic = Topic::pairing(&target);
        let mut subscription = backend.subscribe_pairing(&target).await.unwrap();

        hub.publish(RealtimeMessage::new(&topic, "typing", json!({})))
            .await
            .unwrap();
        hub.publish(RealtimeMessage::new(&topic, PAIRED_EVENT, json!({"lobbyId": 3})))
            .await
            .unwrap();
        hub.publish(RealtimeMessage::new(
            &topic,
            PAIRED_EVENT,
            json!({"lobbyId": "lobby-2-b", "partnerCode": "AAA-222-AAA"}),
        ))
        .await
        .unwrap();

        let event = subscription.recv().await.unwrap();
        assert_eq!(event.lobby_id, LobbyId::from("lobby-2-b"));
    }

    #[tokio::test]
    async fn paired_event_with_non_canonical_partner_code_is_skipped() {
        let (backend, _store, hub) = backend();
        let target = code("BBB-333-BBB");
        let topic = Topic::pairing(&target);
        let mut subscription = backend.subscribe_pairing(&target).await.unwrap();

        for partner in ["lol; not a code", "aaa-222-aaa", "AAA222AAA"] {
            hub.publish(RealtimeMessage::new(
                &topic,
                PAIRED_EVENT,
                json!({"lobbyId": "lobby-1-a", "partnerCode": partner}),
            ))
            .await
            .unwrap();
        }
        hub.publish(RealtimeMessage::new(
            &topic,
            PAIRED_EVENT,
            json!({"lobbyId": "lobby-3-c", "partnerCode": "CCC-444-CCC"}),
        ))
        .await
        .unwrap();

        let event = subscription.recv().await.unwrap();
        assert_eq!(event.lobby_id, LobbyId::from("lobby-3-c"));
        assert_eq!(event.partner_code, "CCC-444-CCC");
    }

    #[tokio::test]
    async fn cleanup_deletes_expired_sessions() {
        let (backend, _store, _hub) = backend();
        let now = Utc::now();
        backend
            .register_session(&UserSession::new(
                code("AAA-222-AAA"),
                now - Duration::hours(2),
                Duration::hours(1),
            ))
            .await
            .unwrap();
        backend
            .register_session(&UserSession::new(code("BBB-333-BBB"), now, Duration::hours(1)))
            .await
            .unwrap();

        assert_eq!(backend.cleanup_expired_sessions(now).await.unwrap(), 1);
        assert!(backend
            .find_session(&code("AAA-222-AAA"))
            .await
            .unwrap()
            .is_none());
    }
}
