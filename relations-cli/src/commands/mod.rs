//! Command implementations for the relations CLI

pub mod demo;
pub mod migrate;
pub mod serve;

pub use demo::run_demo;
pub use migrate::run_migrate;
pub use serve::run_serve;
