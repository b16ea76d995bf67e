//! Loads the sample quest and reward catalog into the configured Postgres
//! database. Without a database URL it only validates the catalog.

use anyhow::{bail, Context};
use configs::Settings;
use domains::QuestCatalog;
use secrecy::ExposeSecret;
use storage_adapters::seed::{load_catalog, sample_quests, sample_rewards};
use storage_adapters::PgStore;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("loading configuration")?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log.filter)))
        .init();

    let now = chrono::Utc::now();
    let Some(url) = &settings.database.url else {
        let quests = sample_quests(now)?;
        let rewards = sample_rewards(now)?;
        tracing::warn!(quests = quests.len(), rewards = rewards.len(),
            "QUESTHUB__DATABASE__URL not set, catalog validated but not written");
        return Ok(());
    };

    let store = PgStore::connect(url.expose_secret(), settings.database.max_connections)
        .await
        .context("connecting to postgres")?;
    store.migrate().await.context("applying schema")?;

    let existing = store.list_quests().await?.len();
    if existing > 0 {
        bail!("catalog already holds {existing} quests, refusing to seed twice");
    }

    let (quests, rewards) = load_catalog(&store, &store, now).await?;
    tracing::info!(quests, rewards, "seed complete");
    Ok(())
}
