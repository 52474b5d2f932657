//! # sleephub-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `EntityRepository`: create, read and update entities
//!   - `DeviceRepository`: create, read and update devices
//!   - `Integration` / `IntegrationContext`: device integration lifecycle
//! - Define **driving/inbound ports** as use-case structs:
//!   - `EntityService`: upsert, list, get
//!   - `DeviceService`: upsert, list, get
//! - Drive integrations on a fixed cadence (`polling`)
//! - Orchestrate domain objects without knowing *how* persistence or IO works
//!
//! ## Dependency rule
//! Depends on `sleephub-domain` only (plus `tokio` for timers and channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod polling;
pub mod ports;
pub mod services;
