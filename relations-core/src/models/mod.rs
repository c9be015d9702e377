//! Validated inputs
//!
//! Every value that reaches a repository is checked here first.
//! Invalid input returns ValidationError, not panic.

pub mod order;
pub mod post;
pub mod product;
pub mod profile;
pub mod user;
pub mod validation;

pub use order::Promocode;
pub use post::PostTitle;
pub use product::{Price, ProductName};
pub use profile::PersonName;
pub use user::Username;
pub use validation::ValidationError;
