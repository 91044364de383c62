pub mod ensure_user_code;

pub use ensure_user_code::EnsureUserCode;
