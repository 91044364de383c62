pub mod join_game_room;

pub use join_game_room::{GameRoom, JoinGameRoom};
