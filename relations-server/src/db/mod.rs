//! Database layer - connection pool, migrations and repositories
//!
//! # Design Principles
//!
//! - One pool per process, repositories borrow it
//! - Relationship loading is explicit: JOIN or a follow-up `IN (...)` query
//! - Rely on DB constraints, map violations to `DbError`
//! - Transactions for multi-row writes

pub mod migrations;
pub mod pool;
pub mod repos;

pub use migrations::{MigrationError, Target};
pub use pool::create_pool;
pub use repos::*;

#[cfg(test)]
pub(crate) async fn test_pool() -> sqlx::SqlitePool {
    use relations_core::DatabaseConfig;

    let pool = create_pool(&DatabaseConfig::in_memory())
        .await
        .expect("in-memory pool");
    migrations::upgrade(&pool, Target::Head)
        .await
        .expect("migrations");
    pool
}
