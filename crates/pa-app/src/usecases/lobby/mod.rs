pub mod current_lobby;
pub mod enter_lobby;

pub use current_lobby::CurrentLobby;
pub use enter_lobby::EnterLobby;
