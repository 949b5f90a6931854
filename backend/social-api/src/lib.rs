/// Social API Library
///
/// User registration and login plus owner-checked post and comment endpoints.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers
/// - `models`: Users, posts and comments
/// - `services`: Credential business logic (hashing, verification, token issuance)
/// - `db`: Credential and entity store traits with PostgreSQL and in-memory backends
/// - `middleware`: Bearer-token authentication
/// - `security`: Password hashing
/// - `routes`: HTTP route table
/// - `error`: Error types and HTTP mapping
/// - `config`: Configuration management
/// - `telemetry`: Tracing subscriber setup
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod security;
pub mod services;
pub mod telemetry;

pub use config::Config;
pub use error::{AppError, Result};

use crypto_core::JwtKeys;
use db::{CredentialStore, EntityStore};
use std::sync::Arc;

/// Shared state handed to every handler.
///
/// Built once at startup and cloned per worker; nothing in it is mutated after
/// construction.
#[derive(Clone)]
pub struct AppState {
    pub credentials: Arc<dyn CredentialStore>,
    pub entities: Arc<dyn EntityStore>,
    pub jwt: Arc<JwtKeys>,
}

impl AppState {
    /// Build state from a store implementing both persistence contracts.
    pub fn new<S>(store: Arc<S>, jwt: Arc<JwtKeys>) -> Self
    where
        S: CredentialStore + EntityStore + 'static,
    {
        Self {
            credentials: store.clone(),
            entities: store,
            jwt,
        }
    }
}
