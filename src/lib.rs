//! Project and environment context for local web development workspaces.
//!
//! [`ProjectContext`] is the contract callers depend on; [`Rum`] is the
//! plain-value implementation built from `rum.yml` / `rum.toml` and `RUM_*`
//! environment variables.

pub mod config;
pub mod context;
pub mod error;
pub mod field;
pub mod logging;
pub mod render;

pub use context::{ProjectContext, Rum, RumBuilder};
pub use error::ContextError;
pub use field::Field;
