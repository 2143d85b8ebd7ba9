// GymFlow - Core Library
// Store document, repository and (with the `server` feature) the HTTP API

pub mod error;
pub mod store;
pub mod backend;
pub mod lookup;
pub mod ids;
pub mod stats;
pub mod repository;

#[cfg(feature = "server")]
pub mod config;
#[cfg(feature = "server")]
pub mod http;

// Re-export commonly used types
pub use error::{StoreError, StoreResult};
pub use store::{Entity, EntityKind, Store};
pub use backend::{JsonFileBackend, MemoryBackend, StorageBackend};
pub use lookup::LookupStrategy;
pub use ids::{assign_id, slugify, IdPolicy, RandomIds, SequentialIds};
pub use stats::{DashboardStats, RETENTION};
pub use repository::Repository;

#[cfg(feature = "server")]
pub use config::ServerConfig;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
