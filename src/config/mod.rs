//! Configuration for the scene
//!
//! Provides types and loading for the optional `seasonfall.toml` file.

pub mod loader;
pub mod schema;

pub use loader::*;
pub use schema::*;
