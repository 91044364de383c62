pub mod initiate_partner_pairing;
pub mod listener;

pub use initiate_partner_pairing::InitiatePartnerPairing;
pub use listener::{PairingListener, PairingListenerHandle};
