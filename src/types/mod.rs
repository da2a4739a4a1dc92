//! Core domain types for the docs relay.

pub mod ids;
pub mod runtime;

pub use ids::{DeliveryId, InvalidRepoId, RepoId};
pub use runtime::RuntimeEnv;
