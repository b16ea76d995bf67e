//! # QuestHub Binary
//!
//! Assembles stores, clock and services from configuration and serves the
//! HTTP API.

use std::sync::Arc;

use anyhow::Context;
use api_adapters::web::router;
use api_adapters::{AppOptions, AppState};
use configs::{LogFormat, LogSettings, Settings};
use domains::Clock;
use services::{Ports, ProgressionRules, SystemClock};
use storage_adapters::memory::{
    InMemoryActivityStore, InMemoryProgressStore, InMemoryQuestCatalog, InMemoryRewardCatalog,
    InMemorySubmissionStore, InMemoryUserStore,
};
use storage_adapters::seed;
use tracing_subscriber::EnvFilter;

fn init_tracing(log: &LogSettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.filter));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match log.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

/// In-memory stores with the sample catalog loaded.
async fn memory_ports(clock: Arc<dyn Clock>) -> anyhow::Result<Ports> {
    let quests = Arc::new(InMemoryQuestCatalog::new());
    let rewards = Arc::new(InMemoryRewardCatalog::new());
    seed::load_catalog(quests.as_ref(), rewards.as_ref(), clock.now())
        .await
        .context("loading sample catalog")?;

    Ok(Ports {
        quests,
        progress: Arc::new(InMemoryProgressStore::new()),
        submissions: Arc::new(InMemorySubmissionStore::new()),
        users: Arc::new(InMemoryUserStore::new()),
        rewards,
        activity: Arc::new(InMemoryActivityStore::new()),
        clock,
    })
}

#[cfg(feature = "db-postgres")]
async fn postgres_ports(url: &str, max_connections: u32, clock: Arc<dyn Clock>) -> anyhow::Result<Ports> {
    let store = storage_adapters::PgStore::connect(url, max_connections)
        .await
        .context("connecting to postgres")?;
    store.migrate().await.context("applying schema")?;
    let store = Arc::new(store);

    Ok(Ports {
        quests: store.clone(),
        progress: store.clone(),
        submissions: store.clone(),
        users: store.clone(),
        rewards: store.clone(),
        activity: store,
        clock,
    })
}

async fn build_ports(settings: &Settings, clock: Arc<dyn Clock>) -> anyhow::Result<Ports> {
    match &settings.database.url {
        #[cfg(feature = "db-postgres")]
        Some(url) => {
            use secrecy::ExposeSecret;
            tracing::info!("using postgres storage");
            postgres_ports(url.expose_secret(), settings.database.max_connections, clock).await
        }
        #[cfg(not(feature = "db-postgres"))]
        Some(_) => {
            tracing::warn!("database url set but postgres support is not compiled in, using memory");
            memory_ports(clock).await
        }
        None => {
            tracing::info!("no database configured, using in-memory storage with sample catalog");
            memory_ports(clock).await
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("loading configuration")?;
    init_tracing(&settings.log);

    // 1. Clock: daily quests reset at midnight in the configured offset
    let clock: Arc<dyn Clock> = Arc::new(SystemClock::with_offset_minutes(
        settings.quests.reset_utc_offset_minutes,
    ));

    // 2. Storage
    let ports = build_ports(&settings, clock).await?;

    // 3. Services
    let options = AppOptions {
        progression: ProgressionRules {
            xp_reward_percent: settings.progression.xp_reward_percent,
        },
        xp_per_level: settings.progression.xp_per_level,
        claim_timeout: settings.rewards.claim_timeout(),
        leaderboard_limit: settings.leaderboard.default_limit,
    };
    let state = Arc::new(AppState::new(&ports, options));

    // 4. An admin to review submissions and manage the catalog
    let admin = state
        .profile
        .ensure_admin(&settings.admin.display_name)
        .await
        .context("preparing admin account")?;
    tracing::info!(admin_id = %admin.id, name = %admin.display_name, "admin account ready");

    // 5. HTTP
    let addr = settings.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, "questhub listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}
