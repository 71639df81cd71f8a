//! Common types for meshcheck: routing objects, manifest loading, and errors
//!
//! The validation engine in `meshcheck-validation` consumes the types defined
//! here. Nothing in this crate talks to a cluster; every object is built from
//! manifests or snapshots the caller already has in memory.

#![deny(missing_docs)]

pub mod crd;
pub mod error;
pub mod manifests;
pub mod mesh;
pub mod yaml;

pub use error::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;
