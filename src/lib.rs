pub mod blocks;
pub mod client;
pub mod config;
pub mod error;
pub mod types;

pub use blocks::{Block, BlockRegistry, FireboltCredentials, FireboltDatabase};
pub use client::{Connect, ConnectParams, Connection, FireboltClient};
pub use error::FireboltError;
pub use types::{Auth, SecretStr};
