use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Row, Sqlite,
};
use std::{fs, path::PathBuf, str::FromStr};
use tracing::debug;

use shared::domain::{RedemptionId, UserProfile};

pub const DEFAULT_DATABASE_URL: &str = "sqlite://./data/airguard.db";

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRedemption {
    pub redemption_id: RedemptionId,
    pub token: String,
    pub coins_spent: u64,
    pub balance_after: u64,
    pub created_at: DateTime<Utc>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        let target = DatabaseTarget::parse(database_url)?;
        target.prepare()?;
        let database_url = target.url();

        let connect_options =
            SqliteConnectOptions::from_str(&database_url)?.create_if_missing(true);
        // Every connection to an in-memory database sees its own empty schema,
        // so the single connection must never be recycled.
        let pool_options = if target == DatabaseTarget::Memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };
        let pool = pool_options
            .connect_with(connect_options)
            .await
            .with_context(|| format!("failed to open sqlite database '{database_url}'"))?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        debug!(%database_url, "storage ready");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    pub async fn load_coins(&self) -> Result<Option<u64>> {
        let row = sqlx::query("SELECT coins FROM wallet WHERE id = 1")
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.get::<i64, _>(0).max(0) as u64))
    }

    pub async fn save_coins(&self, coins: u64) -> Result<()> {
        sqlx::query(
            "INSERT INTO wallet (id, coins, updated_at) VALUES (1, ?1, CURRENT_TIMESTAMP)
             ON CONFLICT(id) DO UPDATE SET coins = excluded.coins, updated_at = CURRENT_TIMESTAMP",
        )
        .bind(coins_to_sql(coins)?)
        .execute(&self.pool)
        .await
        .context("failed to persist coin balance")?;
        Ok(())
    }

    pub async fn load_profile(&self) -> Result<Option<UserProfile>> {
        let row = sqlx::query("SELECT name, is_asthmatic FROM profile WHERE id = 1")
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| UserProfile {
            name: r.get::<String, _>(0),
            is_asthmatic: r.get::<i64, _>(1) != 0,
        }))
    }

    pub async fn save_profile(&self, profile: &UserProfile) -> Result<()> {
        sqlx::query(
            "INSERT INTO profile (id, name, is_asthmatic, updated_at) VALUES (1, ?1, ?2, CURRENT_TIMESTAMP)
             ON CONFLICT(id) DO UPDATE SET name = excluded.name,
                 is_asthmatic = excluded.is_asthmatic,
                 updated_at = CURRENT_TIMESTAMP",
        )
        .bind(&profile.name)
        .bind(i64::from(profile.is_asthmatic))
        .execute(&self.pool)
        .await
        .context("failed to persist user profile")?;
        Ok(())
    }

    /// Writes the post-redemption balance and the redemption log entry atomically.
    pub async fn record_redemption(
        &self,
        token: &str,
        coins_spent: u64,
        balance_after: u64,
        created_at: DateTime<Utc>,
    ) -> Result<RedemptionId> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "INSERT INTO wallet (id, coins, updated_at) VALUES (1, ?1, CURRENT_TIMESTAMP)
             ON CONFLICT(id) DO UPDATE SET coins = excluded.coins, updated_at = CURRENT_TIMESTAMP",
        )
        .bind(coins_to_sql(balance_after)?)
        .execute(&mut *tx)
        .await?;
        let rec = sqlx::query(
            "INSERT INTO redemptions (token, coins_spent, balance_after, created_at)
             VALUES (?1, ?2, ?3, ?4) RETURNING id",
        )
        .bind(token)
        .bind(coins_to_sql(coins_spent)?)
        .bind(coins_to_sql(balance_after)?)
        .bind(created_at.to_rfc3339())
        .fetch_one(&mut *tx)
        .await
        .context("failed to record redemption")?;
        tx.commit().await?;
        Ok(RedemptionId(rec.get::<i64, _>(0)))
    }

    pub async fn list_redemptions(&self, limit: u32) -> Result<Vec<StoredRedemption>> {
        let rows = sqlx::query(
            "SELECT id, token, coins_spent, balance_after, created_at
             FROM redemptions ORDER BY id DESC LIMIT ?1",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| -> Result<StoredRedemption> {
                let created_at: String = row.try_get(4)?;
                Ok(StoredRedemption {
                    redemption_id: RedemptionId(row.try_get(0)?),
                    token: row.try_get(1)?,
                    coins_spent: row.try_get::<i64, _>(2)?.max(0) as u64,
                    balance_after: row.try_get::<i64, _>(3)?.max(0) as u64,
                    created_at: DateTime::parse_from_rfc3339(&created_at)
                        .with_context(|| format!("invalid redemption timestamp '{created_at}'"))?
                        .with_timezone(&Utc),
                })
            })
            .collect()
    }
}

fn coins_to_sql(coins: u64) -> Result<i64> {
    i64::try_from(coins).context("coin amount does not fit in sqlite INTEGER")
}

/// Where the sqlite database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseTarget {
    Memory,
    File(PathBuf),
}

impl DatabaseTarget {
    /// Reads a bare path, a `sqlite:` or `sqlite://` url, or `sqlite::memory:`.
    /// Blank input selects [`DEFAULT_DATABASE_URL`].
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = match raw.trim() {
            "" => DEFAULT_DATABASE_URL,
            trimmed => trimmed,
        };
        if matches!(raw, "sqlite::memory:" | ":memory:") || raw.starts_with("sqlite::memory:?") {
            return Ok(Self::Memory);
        }

        let location = match raw.split_once("://") {
            Some(("sqlite", rest)) => rest,
            Some((scheme, _)) => bail!("unsupported database scheme '{scheme}' in '{raw}'"),
            None => raw.strip_prefix("sqlite:").unwrap_or(raw),
        };
        let path = location
            .split_once('?')
            .map_or(location, |(path, _)| path)
            .replace('\\', "/");
        if path.is_empty() {
            bail!("database url '{raw}' names no file");
        }
        Ok(Self::File(PathBuf::from(path)))
    }

    pub fn url(&self) -> String {
        match self {
            Self::Memory => "sqlite::memory:".to_string(),
            Self::File(path) => format!("sqlite://{}", path.display()),
        }
    }

    /// Creates the directory a database file will be written into.
    fn prepare(&self) -> Result<()> {
        let Self::File(path) = self else {
            return Ok(());
        };
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent)
                .with_context(|| {
                    format!("failed to create database directory '{}'", parent.display())
                }),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
