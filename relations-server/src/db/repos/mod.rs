//! Repository implementations for database access
//!
//! Each repository follows these patterns:
//! - Borrows the pool, one method per operation
//! - Loads relationships either joined (single LEFT JOIN) or select-in
//!   (second query with `IN (...)` over the parent ids)
//! - Uses transactions for multi-row writes

pub mod orders;
pub mod posts;
pub mod products;
pub mod profiles;
pub mod users;

pub use orders::OrderRepo;
pub use posts::PostRepo;
pub use products::ProductRepo;
pub use profiles::ProfileRepo;
pub use users::UserRepo;

use sqlx::error::DatabaseError;

/// How a to-many relationship is fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadStrategy {
    /// One query; parent columns repeat per child row and are de-duplicated.
    Joined,
    /// Parents first, then children with `WHERE fk IN (parent ids)`.
    #[default]
    SelectIn,
}

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    #[error("conflict: {resource} {detail}")]
    Conflict {
        resource: &'static str,
        detail: String,
    },
}

impl DbError {
    pub(crate) fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    /// Turn a unique-constraint violation into `Conflict`.
    pub(crate) fn unique_as_conflict(
        self,
        resource: &'static str,
        detail: impl FnOnce() -> String,
    ) -> Self {
        if self.database_error_is(|db| db.is_unique_violation()) {
            Self::Conflict {
                resource,
                detail: detail(),
            }
        } else {
            self
        }
    }

    /// Turn a foreign-key violation into `NotFound` for the referenced row.
    pub(crate) fn foreign_key_as_not_found(self, resource: &'static str, id: impl ToString) -> Self {
        if self.database_error_is(|db| db.is_foreign_key_violation()) {
            Self::not_found(resource, id)
        } else {
            self
        }
    }

    fn database_error_is(&self, check: impl Fn(&dyn DatabaseError) -> bool) -> bool {
        match self {
            Self::Sqlx(e) => e.as_database_error().is_some_and(|db| check(db)),
            _ => false,
        }
    }
}
