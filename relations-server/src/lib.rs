//! relations-server: relational modelling demo over SQLite
//!
//! - `db`: connection pool, schema migrations and repositories
//! - `demo`: scripted flows exercising joined and select-in loading
//! - `http`: axum API (`POST /users/`)

pub mod db;
pub mod demo;
pub mod http;

pub use db::{create_pool, DbError, LoadStrategy};
pub use http::{build_router, run_server, ServerConfig};
