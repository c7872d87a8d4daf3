//! Migrate command - manages the PostgreSQL schema

use clap::Args;
use tracing::info;

use crate::config::StorageBackend;
use crate::infrastructure::logging::init_logging;
use crate::infrastructure::storage::{
    connect_pool, revert_last_migration, run_storage_migrations, StorageFactory,
};

#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Revert the most recent migration instead of applying pending ones
    #[arg(long)]
    pub revert: bool,
}

pub async fn run(args: MigrateArgs) -> anyhow::Result<()> {
    let config = super::load_config()?;
    init_logging(&config.logging);

    if config.storage.backend != StorageBackend::Postgres {
        anyhow::bail!("migrations require storage.backend = \"postgres\"");
    }

    let pool = connect_pool(&StorageFactory::postgres_config(&config.storage)?).await?;

    if args.revert {
        match revert_last_migration(&pool).await? {
            Some(version) => info!(version, "Reverted migration"),
            None => info!("No migrations to revert"),
        }
    } else {
        let applied = run_storage_migrations(&pool).await?;
        info!(applied, "Migrations up to date");
    }

    pool.close().await;
    Ok(())
}
