use crate::ids::LobbyId;
use crate::pairing::PairingEvent;

/// Lifecycle of a pairing listener.
///
/// ```text
///   Idle
///    │ Subscribed
///    ▼
///   Subscribed ── EventReceived ──► Paired
///    │
///    └── Unsubscribed ────────────► Unsubscribed
/// ```
///
/// `Paired` and `Unsubscribed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    Idle,
    Subscribed,
    Paired,
    Unsubscribed,
}

impl ListenerState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Paired | Self::Unsubscribed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenerEvent {
    Subscribed,
    EventReceived(PairingEvent),
    Unsubscribed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenerDecision {
    /// First event: persist the lobby and navigate to it.
    Navigate(PairingEvent),
    /// Same lobby delivered again.
    Duplicate,
    Ignore,
}

/// Pure state machine behind the pairing listener. Side effects are left to
/// the application layer.
#[derive(Debug)]
pub struct ListenerMachine {
    state: ListenerState,
    joined_lobby: Option<LobbyId>,
}

impl Default for ListenerMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl ListenerMachine {
    pub fn new() -> Self {
        Self {
            state: ListenerState::Idle,
            joined_lobby: None,
        }
    }

    pub fn state(&self) -> ListenerState {
        self.state
    }

    pub fn joined_lobby(&self) -> Option<&LobbyId> {
        self.joined_lobby.as_ref()
    }

    pub fn apply(&mut self, event: ListenerEvent) -> ListenerDecision {
        use ListenerState::*;

        match (self.state, event) {
            (Idle, ListenerEvent::Subscribed) => {
                self.state = Subscribed;
                ListenerDecision::Ignore
            }

            (Subscribed, ListenerEvent::EventReceived(event)) => {
                self.state = Paired;
                self.joined_lobby = Some(event.lobby_id.clone());
                ListenerDecision::Navigate(event)
            }

            (Paired, ListenerEvent::EventReceived(event))
                if self.joined_lobby.as_ref() == Some(&event.lobby_id) =>
            {
                ListenerDecision::Duplicate
            }

            (Idle | Subscribed, ListenerEvent::Unsubscribed) => {
                self.state = Unsubscribed;
                ListenerDecision::Ignore
            }

            // Late events after teardown, a second lobby after pairing,
            // repeated subscribe notifications.
            _ => ListenerDecision::Ignore,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::UserCode;

    fn event(lobby: &str) -> PairingEvent {
        PairingEvent {
            lobby_id: LobbyId::from(lobby),
            partner_code: UserCode::parse("AAA-222-AAA").unwrap(),
        }
    }

    #[test]
    fn first_event_navigates_once() {
        let mut machine = ListenerMachine::new();
        assert_eq!(machine.apply(ListenerEvent::Subscribed), ListenerDecision::Ignore);
        assert_eq!(machine.state(), ListenerState::Subscribed);

        let decision = machine.apply(ListenerEvent::EventReceived(event("lobby-1-a")));
        assert_eq!(decision, ListenerDecision::Navigate(event("lobby-1-a")));
        assert_eq!(machine.state(), ListenerState::Paired);

        let again = machine.apply(ListenerEvent::EventReceived(event("lobby-1-a")));
        assert_eq!(again, ListenerDecision::Duplicate);
        let other = machine.apply(ListenerEvent::EventReceived(event("lobby-2-b")));
        assert_eq!(other, ListenerDecision::Ignore);
        assert_eq!(machine.joined_lobby(), Some(&LobbyId::from("lobby-1-a")));
    }

    #[test]
    fn events_before_subscription_are_ignored() {
        let mut machine = ListenerMachine::new();
        let decision = machine.apply(ListenerEvent::EventReceived(event("lobby-1-a")));
        assert_eq!(decision, ListenerDecision::Ignore);
        assert_eq!(machine.state(), ListenerState::Idle);
    }

    #[test]
    fn unsubscribe_is_terminal_and_paired_survives_teardown() {
        let mut machine = ListenerMachine::new();
        machine.apply(ListenerEvent::Subscribed);
        machine.apply(ListenerEvent::Unsubscribed);
        assert_eq!(machine.state(), ListenerState::Unsubscribed);
        assert!(machine.state().is_terminal());
        let late = machine.apply(ListenerEvent::EventReceived(event("lobby-1-a")));
        assert_eq!(late, ListenerDecision::Ignore);

        let mut paired = ListenerMachine::new();
        paired.apply(ListenerEvent::Subscribed);
        paired.apply(ListenerEvent::EventReceived(event("lobby-1-a")));
        paired.apply(ListenerEvent::Unsubscribed);
        assert_eq!(paired.state(), ListenerState::Paired);
    }
}
