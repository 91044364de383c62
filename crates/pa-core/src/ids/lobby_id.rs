use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

const SUFFIX_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SUFFIX_LEN: usize = 9;
const PREFIX: &str = "lobby";

/// Shared lobby identifier
/// Format: "lobby-{unix_ms}-{9 base36 chars}"
///
/// Advisory only: uniqueness is best-effort and never checked.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LobbyId(String);

impl LobbyId {
    pub fn new(id: String) -> Self {
        Self(id)
    }

    /// Mint a lobby id from the current time and a random suffix.
    pub fn mint(now_ms: i64) -> Self {
        Self::mint_with(now_ms, &mut rand::rng())
    }

    pub fn mint_with<R: Rng + ?Sized>(now_ms: i64, rng: &mut R) -> Self {
        let suffix: String = (0..SUFFIX_LEN)
            .map(|_| SUFFIX_ALPHABET[rng.random_range(0..SUFFIX_ALPHABET.len())] as char)
            .collect();
        Self(format!("{PREFIX}-{now_ms}-{suffix}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for LobbyId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for LobbyId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for LobbyId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
