//! Versioned schema migrations
//!
//! Migrations form a chain: each names the revision it builds on. The applied
//! revision lives in the single-row `schema_version` table; an empty table
//! means the database is at base.

use std::fmt;
use std::str::FromStr;

use sqlx::{Sqlite, SqlitePool, Transaction};

/// One schema revision
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    pub revision: &'static str,
    pub down_revision: Option<&'static str>,
    pub description: &'static str,
    up: &'static [&'static str],
    down: &'static [&'static str],
}

/// All migrations, oldest first
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        revision: "6b4b3268d773",
        down_revision: None,
        description: "Create products table",
        up: &[r#"
            CREATE TABLE products (
                id INTEGER NOT NULL PRIMARY KEY,
                name VARCHAR NOT NULL,
                description VARCHAR NOT NULL,
                price INTEGER NOT NULL
            )
            "#],
        down: &["DROP TABLE products"],
    },
    Migration {
        revision: "a1f0c2d9e4b7",
        down_revision: Some("6b4b3268d773"),
        description: "Create users, profiles and posts tables",
        up: &[
            r#"
            CREATE TABLE users (
                id INTEGER NOT NULL PRIMARY KEY,
                username VARCHAR(32) NOT NULL UNIQUE
            )
            "#,
            r#"
            CREATE TABLE profiles (
                id INTEGER NOT NULL PRIMARY KEY,
                first_name VARCHAR(40),
                last_name VARCHAR(40),
                bio TEXT,
                user_id INTEGER NOT NULL UNIQUE REFERENCES users(id)
            )
            "#,
            r#"
            CREATE TABLE posts (
                id INTEGER NOT NULL PRIMARY KEY,
                title VARCHAR(100) NOT NULL,
                body TEXT NOT NULL DEFAULT '',
                user_id INTEGER NOT NULL REFERENCES users(id)
            )
            "#,
            "CREATE INDEX ix_posts_user_id ON posts(user_id)",
        ],
        down: &[
            "DROP INDEX ix_posts_user_id",
            "DROP TABLE posts",
            "DROP TABLE profiles",
            "DROP TABLE users",
        ],
    },
    Migration {
        revision: "c3e5b8a7d2f1",
        down_revision: Some("a1f0c2d9e4b7"),
        description: "Create orders and order_product_association tables",
        up: &[
            r#"
            CREATE TABLE orders (
                id INTEGER NOT NULL PRIMARY KEY,
                promocode VARCHAR,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
            r#"
            CREATE TABLE order_product_association (
                id INTEGER NOT NULL PRIMARY KEY,
                order_id INTEGER NOT NULL REFERENCES orders(id),
                product_id INTEGER NOT NULL REFERENCES products(id),
                CONSTRAINT idx_unique_order_product UNIQUE (order_id, product_id)
            )
            "#,
        ],
        down: &[
            "DROP TABLE order_product_association",
            "DROP TABLE orders",
        ],
    },
];

/// Where to migrate to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Latest revision
    Head,
    /// Empty schema
    Base,
    Revision(String),
}

impl FromStr for Target {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "head" => Self::Head,
            "base" => Self::Base,
            other => Self::Revision(other.to_owned()),
        })
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Head => f.write_str("head"),
            Self::Base => f.write_str("base"),
            Self::Revision(rev) => f.write_str(rev),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("unknown revision '{0}'")]
    UnknownRevision(String),

    #[error("cannot {direction} from {current} to {target}")]
    WrongDirection {
        direction: &'static str,
        current: String,
        target: String,
    },
}

/// The static migration chain
pub fn history() -> &'static [Migration] {
    MIGRATIONS
}

/// Revision of the newest migration
pub fn head() -> &'static str {
    MIGRATIONS[MIGRATIONS.len() - 1].revision
}

/// Currently applied revision, `None` at base.
///
/// Read-only: a database that was never migrated has no `schema_version`
/// table and reports base.
pub async fn current(pool: &SqlitePool) -> Result<Option<String>, MigrationError> {
    let (tracked,): (bool,) = sqlx::query_as(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'schema_version')",
    )
    .fetch_one(pool)
    .await?;
    if !tracked {
        return Ok(None);
    }

    let row: Option<(String,)> = sqlx::query_as("SELECT version_num FROM schema_version")
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|(rev,)| rev))
}

/// Apply migrations after the current revision up to `target`.
///
/// Returns the revisions applied, oldest first. Already at target is a no-op.
pub async fn upgrade(
    pool: &SqlitePool,
    target: Target,
) -> Result<Vec<&'static str>, MigrationError> {
    ensure_version_table(pool).await?;
    let current_rev = current(pool).await?;
    let from = position(current_rev.as_deref())?;
    let to = match &target {
        Target::Head => Some(MIGRATIONS.len() - 1),
        Target::Base => None,
        Target::Revision(rev) => position(Some(rev))?,
    };

    if to < from {
        return Err(MigrationError::WrongDirection {
            direction: "upgrade",
            current: current_rev.unwrap_or_else(|| "base".into()),
            target: target.to_string(),
        });
    }

    let start = from.map_or(0, |i| i + 1);
    let end = to.map_or(0, |i| i + 1);
    let mut applied = Vec::new();

    for migration in &MIGRATIONS[start..end] {
        tracing::info!(
            revision = migration.revision,
            "Running upgrade {} -> {}, {}",
            migration.down_revision.unwrap_or("<base>"),
            migration.revision,
            migration.description
        );
        let mut tx = pool.begin().await?;
        for statement in migration.up {
            sqlx::query(statement).execute(&mut *tx).await?;
        }
        set_version(&mut tx, Some(migration.revision)).await?;
        tx.commit().await?;
        applied.push(migration.revision);
    }

    if applied.is_empty() {
        tracing::debug!(%target, "Schema already up to date");
    }
    Ok(applied)
}

/// Revert migrations down to `target`, newest first.
///
/// Returns the revisions reverted. Already at target is a no-op.
pub async fn downgrade(
    pool: &SqlitePool,
    target: Target,
) -> Result<Vec<&'static str>, MigrationError> {
    ensure_version_table(pool).await?;
    let current_rev = current(pool).await?;
    let from = position(current_rev.as_deref())?;
    let to = match &target {
        Target::Head => Some(MIGRATIONS.len() - 1),
        Target::Base => None,
        Target::Revision(rev) => position(Some(rev))?,
    };

    if to > from {
        return Err(MigrationError::WrongDirection {
            direction: "downgrade",
            current: current_rev.unwrap_or_else(|| "base".into()),
            target: target.to_string(),
        });
    }

    let start = to.map_or(0, |i| i + 1);
    let end = from.map_or(0, |i| i + 1);
    let mut reverted = Vec::new();

    for migration in MIGRATIONS[start..end].iter().rev() {
        tracing::info!(
            revision = migration.revision,
            "Running downgrade {} -> {}, {}",
            migration.revision,
            migration.down_revision.unwrap_or("<base>"),
            migration.description
        );
        let mut tx = pool.begin().await?;
        for statement in migration.down {
            sqlx::query(statement).execute(&mut *tx).await?;
        }
        set_version(&mut tx, migration.down_revision).await?;
        tx.commit().await?;
        reverted.push(migration.revision);
    }

    Ok(reverted)
}

/// Index of `revision` in the chain; `None` for base.
fn position(revision: Option<&str>) -> Result<Option<usize>, MigrationError> {
    match revision {
        None => Ok(None),
        Some(rev) => MIGRATIONS
            .iter()
            .position(|m| m.revision == rev)
            .map(Some)
            .ok_or_else(|| MigrationError::UnknownRevision(rev.to_owned())),
    }
}

async fn ensure_version_table(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS schema_version (version_num VARCHAR(32) NOT NULL PRIMARY KEY)",
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn set_version(
    tx: &mut Transaction<'_, Sqlite>,
    revision: Option<&str>,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM schema_version")
        .execute(&mut **tx)
        .await?;
    if let Some(rev) = revision {
        sqlx::query("INSERT INTO schema_version (version_num) VALUES (?)")
            .bind(rev)
            .execute(&mut **tx)
            .await?;
    }
    Ok(())
}
