/*
 * Responsibility
 * - tracing / panic hook の初期化
 * - Config読み込み → 依存生成 → Router 組み立て
 * - axum::serve() で起動
 */
use std::{panic, process, sync::Arc};

use anyhow::{Context, Result};
use axum::{Router, routing::get};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::api::v1::handlers::health::health;
use crate::config::{Config, DeploymentTier, EnvironmentConfig};
use crate::middleware;
use crate::services::auth::build_authenticator;
use crate::services::parameter_store::SsmParameterStore;
use crate::state::AppState;

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,feature_flag_auth=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // Local runs fail fast; deployed tiers keep serving.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env().context("loading configuration")?;

    init_panic_hook(config.tier == DeploymentTier::Local);

    tracing::info!("starting in {:?} tier on {}", config.tier, config.addr);

    // Re-resolved per request; logged here so a misconfigured tier is visible at boot.
    let env = EnvironmentConfig::resolve();
    tracing::info!(
        cookie_name = env.effective_cookie_name(),
        key_identifier = env.effective_key_identifier(),
        "session auth configuration"
    );

    let state = build_state(&config).await;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("binding {}", config.addr))?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn build_state(config: &Config) -> AppState {
    // The key itself is fetched lazily by the first authenticated request.
    let store = Arc::new(SsmParameterStore::new(config.region.clone()).await);
    let auth = build_authenticator(config, store);

    AppState::new(auth)
}

fn build_router(state: AppState) -> Router {
    let router = Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api::v1::routes(state.clone()))
        .with_state(state);

    middleware::http::apply(router)
}
