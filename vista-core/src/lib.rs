//! Vista Core - Search coordination and shared plumbing
//!
//! This crate provides the pieces every Vista feed shares: the debounced,
//! generation-tagged search coordinator, the `SearchSource` capability that
//! feeds plug into, configuration, runtime mode, error types and tracing setup.

pub mod config;
pub mod coordinator;
pub mod errors;
pub mod mode;
pub mod tracing_setup;

// Re-export main types for convenient access
pub use config::{Provider, ProviderCredentials, VistaConfig};
pub use coordinator::{
    ResultPage, SearchCoordinatorHandle, SearchPolicy, SearchRequest, SearchSnapshot,
    SearchSource, Status, spawn_search_coordinator,
};
pub use errors::{CoordinatorError, SearchError, VistaError};
pub use mode::RuntimeMode;

pub type Result<T> = std::result::Result<T, VistaError>;
