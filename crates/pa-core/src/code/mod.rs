//! Pairing code codec.
//!
//! 配对码：9 个符号，按 3-3-3 分组，用 `-` 连接（例如 `ABC-D3F-GH5`）。
//!
//! Generation draws from an alphabet without the visually ambiguous symbols
//! `0`, `1`, `I`, `L` and `O`. Validation is looser than generation: it
//! accepts any upper-case letter, so `O`/`I`/`L` pass `validate_format`
//! even though `generate` never emits them.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Symbols a generated code is drawn from.
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";

/// Number of symbols in a code, separators excluded.
pub const CODE_SYMBOLS: usize = 9;

/// Symbols per hyphen-separated group.
pub const GROUP_LEN: usize = 3;

const SEPARATOR: char = '-';

static CANONICAL_FORMAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Z2-9]{3}-[A-Z2-9]{3}-[A-Z2-9]{3}$").expect("canonical code pattern compiles")
});

static BARE_FORMAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z2-9]{9}$").expect("bare code pattern compiles"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodeError {
    #[error("invalid pairing code format: {0:?}")]
    InvalidFormat(String),
}

/// A user's shareable pairing code in canonical `XXX-XXX-XXX` form.
///
/// Deserialization goes through [`UserCode::parse`], so codes read off the
/// wire or out of local state are canonical too.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct UserCode(String);

impl UserCode {
    /// Strict parse: the input must already be canonical.
    pub fn parse(value: &str) -> Result<Self, CodeError> {
        if validate_format(value) {
            Ok(Self(value.to_string()))
        } else {
            Err(CodeError::InvalidFormat(value.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for UserCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for UserCode {
    type Err = CodeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl TryFrom<String> for UserCode {
    type Error = CodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if validate_format(&value) {
            Ok(Self(value))
        } else {
            Err(CodeError::InvalidFormat(value))
        }
    }
}

impl From<UserCode> for String {
    fn from(code: UserCode) -> Self {
        code.0
    }
}

impl AsRef<str> for UserCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for UserCode {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for UserCode {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Generate a fresh code using the thread-local RNG.
pub fn generate() -> UserCode {
    generate_with(&mut rand::rng())
}

/// Generate a code from the given randomness source.
pub fn generate_with<R: Rng + ?Sized>(rng: &mut R) -> UserCode {
    let mut code = String::with_capacity(CODE_SYMBOLS + CODE_SYMBOLS / GROUP_LEN - 1);
    for idx in 0..CODE_SYMBOLS {
        if idx > 0 && idx % GROUP_LEN == 0 {
            code.push(SEPARATOR);
        }
        let symbol = CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())];
        code.push(symbol as char);
    }
    UserCode(code)
}

/// `true` when `code` is exactly `[A-Z2-9]{3}-[A-Z2-9]{3}-[A-Z2-9]{3}`.
pub fn validate_format(code: &str) -> bool {
    CANONICAL_FORMAT.is_match(code)
}

/// Normalize raw user input into a canonical code.
///
/// Whitespace is stripped and letters are upper-cased. Input that is already
/// hyphenated is returned as-is when valid; nine bare symbols get hyphens
/// inserted after the third and sixth. Anything else yields `None`.
pub fn normalize(input: &str) -> Option<UserCode> {
    let cleaned: String = input
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase();

    if validate_format(&cleaned) {
        return Some(UserCode(cleaned));
    }

    if BARE_FORMAT.is_match(&cleaned) {
        let formatted = format!(
            "{}{SEPARATOR}{}{SEPARATOR}{}",
            &cleaned[0..GROUP_LEN],
            &cleaned[GROUP_LEN..GROUP_LEN * 2],
            &cleaned[GROUP_LEN * 2..CODE_SYMBOLS]
        );
        return validate_format(&formatted).then_some(UserCode(formatted));
    }

    None
}
