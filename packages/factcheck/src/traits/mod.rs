//! Core trait abstractions.
//!
//! Applications implement these to plug in model providers; the crate ships
//! [`ProviderClients`](crate::providers::ProviderClients) for real calls and
//! [`MockModelClient`](crate::testing::MockModelClient) for tests.

pub mod model;

pub use model::ModelClient;
