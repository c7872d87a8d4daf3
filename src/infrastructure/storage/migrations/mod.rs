//! Versioned PostgreSQL schema migrations

use sqlx::postgres::PgPool;

use crate::domain::DomainError;

pub const USERS_TABLE: &str = "users";
pub const PROFILES_TABLE: &str = "profiles";
pub const VERIFICATION_CODES_TABLE: &str = "verification_codes";

/// Applies and reverts migrations, tracked in `_migrations`
#[derive(Debug)]
pub struct PostgresMigrator {
    pool: PgPool,
}

impl PostgresMigrator {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn ensure_migrations_table(&self) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS _migrations (
                version BIGINT PRIMARY KEY,
                description TEXT NOT NULL,
                installed_on TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to create migrations table: {}", e)))?;

        Ok(())
    }

    async fn is_applied(&self, version: i64) -> Result<bool, DomainError> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM _migrations WHERE version = $1)")
            .bind(version)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to check migration status: {}", e)))
    }

    /// Apply one migration unless already recorded; returns whether it ran
    pub async fn run_migration(&self, migration: &Migration) -> Result<bool, DomainError> {
        self.ensure_migrations_table().await?;

        if self.is_applied(migration.version).await? {
            return Ok(false);
        }

        let fail = |e: sqlx::Error| {
            DomainError::storage(format!("Failed to run migration {}: {}", migration.version, e))
        };

        let mut tx = self.pool.begin().await.map_err(fail)?;

        sqlx::raw_sql(migration.up).execute(&mut *tx).await.map_err(fail)?;

        sqlx::query("INSERT INTO _migrations (version, description) VALUES ($1, $2)")
            .bind(migration.version)
            .bind(migration.description)
            .execute(&mut *tx)
            .await
            .map_err(fail)?;

        tx.commit().await.map_err(fail)?;

        tracing::info!(
            version = migration.version,
            description = migration.description,
            "Applied migration"
        );

        Ok(true)
    }

    /// Revert one migration if recorded; returns whether it ran
    pub async fn revert_migration(&self, migration: &Migration) -> Result<bool, DomainError> {
        self.ensure_migrations_table().await?;

        if !self.is_applied(migration.version).await? {
            return Ok(false);
        }

        let fail = |e: sqlx::Error| {
            DomainError::storage(format!(
                "Failed to revert migration {}: {}",
                migration.version, e
            ))
        };

        let mut tx = self.pool.begin().await.map_err(fail)?;

        sqlx::raw_sql(migration.down).execute(&mut *tx).await.map_err(fail)?;

        sqlx::query("DELETE FROM _migrations WHERE version = $1")
            .bind(migration.version)
            .execute(&mut *tx)
            .await
            .map_err(fail)?;

        tx.commit().await.map_err(fail)?;

        tracing::info!(version = migration.version, "Reverted migration");

        Ok(true)
    }

    pub async fn current_version(&self) -> Result<Option<i64>, DomainError> {
        self.ensure_migrations_table().await?;

        sqlx::query_scalar("SELECT MAX(version) FROM _migrations")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get migration version: {}", e)))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Migration {
    pub version: i64,
    pub description: &'static str,
    pub up: &'static str,
    pub down: &'static str,
}

impl Migration {
    pub const fn new(
        version: i64,
        description: &'static str,
        up: &'static str,
        down: &'static str,
    ) -> Self {
        Self {
            version,
            description,
            up,
            down,
        }
    }
}

/// All schema migrations, ascending by version
pub fn storage_migrations() -> Vec<Migration> {
    vec![
        Migration::new(
            1,
            "Create users table",
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id VARCHAR(36) PRIMARY KEY,
                email VARCHAR(254) NOT NULL UNIQUE,
                name VARCHAR(100) NOT NULL,
                password_hash TEXT NOT NULL,
                status VARCHAR(20) NOT NULL DEFAULT 'active',
                email_verified BOOLEAN NOT NULL DEFAULT FALSE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                last_login_at TIMESTAMPTZ
            );
            CREATE INDEX IF NOT EXISTS idx_users_status ON users(status);
            "#,
            "DROP TABLE IF EXISTS users;",
        ),
        Migration::new(
            2,
            "Create profiles table",
            r#"
            CREATE TABLE IF NOT EXISTS profiles (
                key VARCHAR(255) PRIMARY KEY,
                data JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            );
            CREATE INDEX IF NOT EXISTS idx_profiles_user_id ON profiles((data->>'user_id'));
            "#,
            "DROP TABLE IF EXISTS profiles;",
        ),
        Migration::new(
            3,
            "Create verification codes table",
            r#"
            CREATE TABLE IF NOT EXISTS verification_codes (
                key VARCHAR(255) PRIMARY KEY,
                data JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            );
            CREATE INDEX IF NOT EXISTS idx_verification_codes_user_id
                ON verification_codes((data->>'user_id'));
            "#,
            "DROP TABLE IF EXISTS verification_codes;",
        ),
    ]
}

/// Apply every pending migration; returns how many ran
pub async fn run_storage_migrations(pool: &PgPool) -> Result<usize, DomainError> {
    let migrator = PostgresMigrator::new(pool.clone());
    let mut applied = 0;

    for migration in storage_migrations() {
        if migrator.run_migration(&migration).await? {
            applied += 1;
        }
    }

    Ok(applied)
}

/// Revert the most recently applied migration, if any
pub async fn revert_last_migration(pool: &PgPool) -> Result<Option<i64>, DomainError> {
    let migrator = PostgresMigrator::new(pool.clone());

    let Some(version) = migrator.current_version().await? else {
        return Ok(None);
    };

    let migration = storage_migrations()
        .into_iter()
        .find(|m| m.version == version)
        .ok_or_else(|| DomainError::storage(format!("Unknown migration version {}", version)))?;

    migrator.revert_migration(&migration).await?;
    Ok(Some(version))
}
