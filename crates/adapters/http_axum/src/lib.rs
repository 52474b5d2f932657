//! # sleephub-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve a **read-only JSON API** over what the integrations discovered
//!   (`/api/entities`, `/api/devices`, …)
//! - Map HTTP requests into application service calls (driving adapter)
//! - Map application errors into HTTP status codes
//!
//! ## Dependency rule
//! Depends on `sleephub-app` (for port traits and services) and `sleephub-domain`
//! (for domain types used in response mapping). Never leaks axum types
//! into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;
