//! relations-core: entities, validated inputs and configuration
//!
//! Shared by the server (repositories, HTTP layer) and the CLI.
//! Enable the `sqlx` feature to derive `sqlx::FromRow` on the entity rows.

pub mod config;
pub mod entities;
pub mod error;
pub mod models;

pub use config::{DatabaseConfig, RelationsConfig, ServerSettings};
pub use entities::{
    Order, OrderProductAssociation, OrderWithProducts, Post, PostWithAuthor, Product,
    ProductWithOrders, Profile, ProfileWithUserAndPosts, User, UserWithPosts, UserWithProfile,
    UserWithProfileAndPosts,
};
pub use error::{ConfigError, Result};
pub use models::{
    PersonName, PostTitle, Price, ProductName, Promocode, Username, ValidationError,
};
