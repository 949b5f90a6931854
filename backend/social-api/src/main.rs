use actix_web::{App, HttpServer};
use crypto_core::{secret_strength, JwtKeys, SecretStrength};
use social_api::db::{MemoryStore, PgStore};
use social_api::{routes, telemetry, AppState, Config};
use std::io;
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init_tracing();

    let config = Config::from_env().map_err(|e| {
        tracing::error!("Configuration error: {}", e);
        io::Error::new(io::ErrorKind::InvalidInput, e)
    })?;

    tracing::info!(env = %config.app.env, "Starting social-api");

    if !config.is_production() && secret_strength(&config.jwt.secret) == SecretStrength::Weak {
        tracing::warn!("JWT_SECRET_KEY is weak; set a strong secret before deploying");
    }

    let jwt = Arc::new(JwtKeys::new(
        &config.jwt.secret,
        config.jwt.access_token_ttl_secs,
    ));
    tracing::info!(
        access_token_ttl_secs = jwt.ttl().num_seconds(),
        "Token signing keys loaded"
    );

    let state = match config.database.url.as_deref() {
        Some(url) => {
            let store = PgStore::connect(url, config.database.max_connections)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to connect to database: {}", e);
                    io::Error::new(io::ErrorKind::Other, e.to_string())
                })?;
            store.migrate().await.map_err(|e| {
                tracing::error!("{}", e);
                io::Error::new(io::ErrorKind::Other, e.to_string())
            })?;
            tracing::info!(
                max_connections = config.database.max_connections,
                "Connected to PostgreSQL"
            );
            AppState::new(Arc::new(store), jwt)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory store, data is lost on restart");
            AppState::new(Arc::new(MemoryStore::new()), jwt)
        }
    };

    let bind_address = (config.app.host.clone(), config.app.port);
    tracing::info!("Listening on {}:{}", bind_address.0, bind_address.1);

    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .configure(|cfg| routes::configure(cfg, &state))
    })
    .bind(bind_address)?
    .run()
    .await
}
