use std::sync::Arc;

use pa_core::pairing::{ListenerDecision, ListenerEvent, ListenerMachine, ListenerState, PairingEvent};
use pa_core::ports::local_state::keys;
use pa_core::ports::{
    BackendError, LobbyNavigatorPort, LocalStatePort, PairingBackendPort, PairingSubscription,
};
use pa_core::UserCode;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Waits for "you have been paired" on behalf of one code and moves the
/// user into the lobby exactly once.
pub struct PairingListener {
    backend: Arc<dyn PairingBackendPort>,
    local_state: Arc<dyn LocalStatePort>,
    navigator: Arc<dyn LobbyNavigatorPort>,
}

impl PairingListener {
    pub fn new(
        backend: Arc<dyn PairingBackendPort>,
        local_state: Arc<dyn LocalStatePort>,
        navigator: Arc<dyn LobbyNavigatorPort>,
    ) -> Self {
        Self {
            backend,
            local_state,
            navigator,
        }
    }

    #[tracing::instrument(name = "usecase.pairing_listener.start", skip(self), fields(my_code = %my_code))]
    pub async fn start(&self, my_code: &UserCode) -> Result<PairingListenerHandle, BackendError> {
        let subscription = self.backend.subscribe_pairing(my_code).await?;

        let mut machine = ListenerMachine::new();
        machine.apply(ListenerEvent::Subscribed);
        let (state_tx, state_rx) = watch::channel(machine.state());
        let (stop_tx, stop_rx) = oneshot::channel();

        info!(topic = subscription.topic(), "pairing listener subscribed");

        let worker = ListenerWorker {
            machine,
            subscription,
            local_state: self.local_state.clone(),
            navigator: self.navigator.clone(),
            state_tx,
        };
        let task = tokio::spawn(worker.run(stop_rx));

        Ok(PairingListenerHandle {
            task: Some(task),
            stop: Some(stop_tx),
            state: state_rx,
        })
    }
}

struct ListenerWorker {
    machine: ListenerMachine,
    subscription: PairingSubscription,
    local_state: Arc<dyn LocalStatePort>,
    navigator: Arc<dyn LobbyNavigatorPort>,
    state_tx: watch::Sender<ListenerState>,
}

impl ListenerWorker {
    async fn run(mut self, mut stop: oneshot::Receiver<()>) -> Option<PairingEvent> {
        loop {
            let incoming = tokio::select! {
                _ = &mut stop => None,
                event = self.subscription.recv() => event,
            };

            let Some(event) = incoming else {
                self.transition(ListenerEvent::Unsubscribed);
                self.subscription.unsubscribe();
                return None;
            };

            match self.transition(ListenerEvent::EventReceived(event)) {
                ListenerDecision::Navigate(event) => {
                    self.enter_lobby(&event).await;
                    self.subscription.unsubscribe();
                    return Some(event);
                }
                ListenerDecision::Duplicate => debug!("duplicate pairing event ignored"),
                ListenerDecision::Ignore => {}
            }
        }
    }

    fn transition(&mut self, event: ListenerEvent) -> ListenerDecision {
        let decision = self.machine.apply(event);
        self.state_tx.send_replace(self.machine.state());
        decision
    }

    async fn enter_lobby(&self, event: &PairingEvent) {
        info!(lobby_id = %event.lobby_id, partner = %event.partner_code, "paired by partner");

        if let Err(e) = self
            .local_state
            .set(keys::CURRENT_LOBBY, event.lobby_id.as_str())
            .await
        {
            warn!(error = %e, "failed to persist current lobby");
        }
        if let Err(e) = self
            .local_state
            .set(keys::PARTNER_CODE, event.partner_code.as_str())
            .await
        {
            warn!(error = %e, "failed to persist partner code");
        }

        if let Err(e) = self
            .navigator
            .navigate_to_lobby(&event.lobby_id, &event.partner_code)
            .await
        {
            warn!(error = %e, "navigation to lobby failed");
        }
    }
}

/// Owns a running listener. Dropping it stops the listener.
pub struct PairingListenerHandle {
    task: Option<JoinHandle<Option<PairingEvent>>>,
    stop: Option<oneshot::Sender<()>>,
    state: watch::Receiver<ListenerState>,
}

impl PairingListenerHandle {
    pub fn state(&self) -> ListenerState {
        *self.state.borrow()
    }

    /// Wait until the listener is done: the pairing event when paired,
    /// `None` when it was stopped or the stream ended.
    pub async fn finished(mut self) -> Option<PairingEvent> {
        let task = self.task.take()?;
        task.await.ok().flatten()
    }

    /// Stop listening and wait for the teardown to complete.
    pub async fn stop(mut self) -> ListenerState {
        self.signal_stop();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
        self.state()
    }

    fn signal_stop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
    }
}

impl Drop for PairingListenerHandle {
    fn drop(&mut self) {
        self.signal_stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::test_support::{code, FixedClock, MockBackend};
    use async_trait::async_trait;
    use pa_core::config::PairingTuning;
    use pa_core::ids::LobbyId;
    use pa_core::ports::Subscription;
    use pa_infra::{InMemoryLocalStateStore, MockPairingBackend};
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::mpsc;

    #[derive(Default)]
    struct RecordingNavigator {
        visits: Mutex<Vec<(LobbyId, UserCode)>>,
    }

    impl RecordingNavigator {
        fn visits(&self) -> Vec<(LobbyId, UserCode)> {
            self.visits.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LobbyNavigatorPort for RecordingNavigator {
        async fn navigate_to_lobby(
            &self,
            lobby_id: &LobbyId,
            partner_code: &UserCode,
        ) -> anyhow::Result<()> {
            self.visits
                .lock()
                .unwrap()
                .push((lobby_id.clone(), partner_code.clone()));
            Ok(())
        }
    }

    fn event(lobby: &str) -> PairingEvent {
        PairingEvent {
            lobby_id: LobbyId::from(lobby),
            partner_code: code("AAA-222-AAA"),
        }
    }

    /// Backend whose subscription is fed by the returned sender.
    fn scripted_backend() -> (MockBackend, mpsc::Sender<PairingEvent>) {
        let (tx, rx) = mpsc::channel(8);
        let rx = Mutex::new(Some(rx));
        let mut backend = MockBackend::new();
        backend
            .expect_subscribe_pairing()
            .times(1)
            .returning(move |my_code| {
                let rx = rx.lock().unwrap().take().expect("subscribed once");
                Ok(Subscription::new(format!("pairing:{my_code}"), rx, || {}))
            });
        (backend, tx)
    }

    #[tokio::test]
    async fn first_event_navigates_once_and_tears_down() {
        let (backend, tx) = scripted_backend();
        let state = Arc::new(InMemoryLocalStateStore::new());
        let navigator = Arc::new(RecordingNavigator::default());
        let listener = PairingListener::new(Arc::new(backend), state.clone(), navigator.clone());

        let handle = listener.start(&code("BBB-333-BBB")).await.unwrap();
        assert_eq!(handle.state(), ListenerState::Subscribed);

        tx.send(event("lobby-1-a")).await.unwrap();
        let _ = tx.send(event("lobby-1-a")).await;

        let paired = handle.finished().await.expect("paired");
        assert_eq!(paired.lobby_id, LobbyId::from("lobby-1-a"));
        assert_eq!(navigator.visits().len(), 1);
        assert_eq!(
            state.get(keys::CURRENT_LOBBY).await.unwrap().as_deref(),
            Some("lobby-1-a")
        );
        assert_eq!(
            state.get(keys::PARTNER_CODE).await.unwrap().as_deref(),
            Some("AAA-222-AAA")
        );
        assert!(tx.is_closed());
    }

    #[tokio::test]
    async fn stop_before_any_event_unsubscribes() {
        let (backend, tx) = scripted_backend();
        let navigator = Arc::new(RecordingNavigator::default());
        let listener = PairingListener::new(
            Arc::new(backend),
            Arc::new(InMemoryLocalStateStore::new()),
            navigator.clone(),
        );

        let handle = listener.start(&code("BBB-333-BBB")).await.unwrap();
        assert_eq!(handle.stop().await, ListenerState::Unsubscribed);
        assert!(tx.is_closed());
        assert!(navigator.visits().is_empty());
    }

    #[tokio::test]
    async fn subscribe_failure_is_returned() {
        let mut backend = MockBackend::new();
        backend.expect_subscribe_pairing().returning(|_| {
            Err(BackendError::Realtime(
                pa_core::ports::RealtimeError::Connection("refused".to_string()),
            ))
        });
        let listener = PairingListener::new(
            Arc::new(backend),
            Arc::new(InMemoryLocalStateStore::new()),
            Arc::new(RecordingNavigator::default()),
        );
        assert!(listener.start(&code("BBB-333-BBB")).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn mock_mode_listener_picks_up_record_on_next_poll() {
        let state = Arc::new(InMemoryLocalStateStore::new());
        let backend = Arc::new(MockPairingBackend::new(
            state.clone(),
            Arc::new(FixedClock::at(0)),
            &PairingTuning::defaults(),
        ));
        let navigator = Arc::new(RecordingNavigator::default());
        let listener = PairingListener::new(backend.clone(), state.clone(), navigator.clone());
        let target = code("BBB-333-BBB");

        let handle = listener.start(&target).await.unwrap();
        tokio::time::sleep(Duration::from_millis(750)).await;
        assert!(navigator.visits().is_empty());

        backend
            .notify_partner(&target, &event("lobby-7-q"))
            .await
            .unwrap();

        let paired = handle.finished().await.expect("paired through the mock record");
        assert_eq!(paired.lobby_id, LobbyId::from("lobby-7-q"));
        assert_eq!(navigator.visits(), vec![(LobbyId::from("lobby-7-q"), code("AAA-222-AAA"))]);
        assert_eq!(state.get(keys::MOCK_PAIRING).await.unwrap(), None);
    }
}
