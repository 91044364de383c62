pub mod cleanup_expired_sessions;

pub use cleanup_expired_sessions::CleanupExpiredSessions;
