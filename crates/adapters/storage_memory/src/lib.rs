//! # sleephub-adapter-storage-memory
//!
//! In-memory persistence adapter.
//!
//! ## Responsibilities
//! - Implement the repository port traits defined in `sleephub-app::ports::storage`
//! - Keep the latest entity and device snapshots for the HTTP adapter to read
//!
//! State lives for the process lifetime only; there is no on-disk cache.
//!
//! ## Dependency rule
//! Depends on `sleephub-app` (for port traits) and `sleephub-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

mod device_repo;
mod entity_repo;
mod error;

pub use device_repo::MemoryDeviceRepository;
pub use entity_repo::MemoryEntityRepository;
pub use error::StorageError;
