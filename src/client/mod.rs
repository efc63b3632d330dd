//! Database client boundary.
//!
//! `FireboltDatabase::get_connection` only assembles [`ConnectParams`] and
//! hands them to a [`Connect`] implementation. [`FireboltClient`] is the
//! bundled HTTP implementation.

pub mod connection;
pub mod endpoints;
pub mod http;

pub use connection::{Column, Connection, QueryResult};
pub use http::FireboltClient;

use crate::error::FireboltError;
use crate::types::Auth;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;

/// Arguments for opening one connection.
#[derive(Debug, Clone, Copy)]
pub struct ConnectParams<'a> {
    pub database: &'a str,
    pub auth: &'a Auth,
    pub engine_name: Option<&'a str>,
    pub engine_url: Option<&'a str>,
    pub api_endpoint: &'a str,
    pub additional_parameters: &'a HashMap<String, Value>,
}

/// Opens authenticated connections.
pub trait Connect: Send + Sync {
    type Connection: Send;

    fn connect(
        &self,
        params: ConnectParams<'_>,
    ) -> impl Future<Output = Result<Self::Connection, FireboltError>> + Send;
}
