/*
 * Responsibility
 * - Config読み込み → 依存生成 → Router 組み立て
 * - Middleware の適用 (CORS/auth/http など)
 * - axum::serve() で起動
 */
use std::sync::Arc;
use std::{panic, process};

use anyhow::{Context, Result};
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::cookies::CookieConfig;
use crate::middleware;
use crate::middleware::auth::AccessMatrix;
use crate::services::auth::TokenProvider;
use crate::services::auth::sign::SignService;
use crate::services::auth::user_details::{
    AuthenticationResolver, CachingUserLookup, DbUserLookup,
};
use crate::services::cache::{ValkeyClient, client::ttl_seconds};
use crate::{config::Config, state::AppState};

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,kuke_meeting_api=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    // Keep the default hook as a fallback (prints to stderr with location/payload).
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // Always surface panics via tracing so they don't get "lost"
        // (stderr can be hidden depending on how the process is launched.)
        tracing::error!(?info, "panic");

        // In development, fail fast: crash the whole process so we notice immediately.
        // In production, prefer the default behavior (stderr) and let the server keep running.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;

    let abort_on_panic = !config.app_env.is_production();
    init_panic_hook(abort_on_panic);

    tracing::info!(
        "starting API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config).await?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn build_state(config: &Config) -> Result<AppState> {
    let db = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("connecting to postgres")?;

    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .context("running migrations")?;

    let cache = ValkeyClient::new(&config.cache_url)
        .await
        .context("connecting to valkey")?;

    // Signing secret is consumed here; nothing else sees it afterwards.
    let tokens = TokenProvider::new(&config.jwt_secret);

    let user_lookup = Arc::new(CachingUserLookup::new(
        Arc::new(DbUserLookup::new(db.clone())),
        Arc::new(cache),
        ttl_seconds(config.user_cache_ttl_seconds),
    ));

    let auth = AuthenticationResolver::new(tokens.clone(), user_lookup.clone());
    let sign = SignService::new(db.clone(), tokens.clone(), user_lookup.clone());

    Ok(AppState {
        db,
        tokens,
        auth,
        user_lookup,
        sign,
        matrix: Arc::new(AccessMatrix::kuke_defaults()),
        cookies: CookieConfig {
            domain: config.cookie_domain.clone(),
            secure: config.cookie_secure,
        },
        public_base_url: config.public_base_url.as_str().into(),
    })
}

fn build_router(state: AppState, config: &Config) -> Router {
    let router = crate::api::routes();
    let router = middleware::auth::access::apply(router, state.clone());
    let router = router.with_state(state);

    let router = middleware::cors::apply(router, config);
    middleware::http::apply(router)
}
