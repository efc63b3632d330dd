pub mod auth;
pub mod secret;

pub use auth::Auth;
pub use secret::SecretStr;
