//! # graphload testkit
//!
//! Test utilities for graphload.
//!
//! This crate provides:
//! - [`MemoryStore`], applying statement text in memory, and
//!   [`StoreEndpoint`], serving it as an update endpoint
//! - Record fixtures in original and updated versions
//! - [`ScriptedClient`] and [`StaticLookup`] test doubles
//! - Property-based test generators using proptest
//! - Fuzz targets for the reader, decoder and mapper
//! - [`IntegrationHarness`], wiring mapper, generator and store together
//!
//! ## Usage
//!
//! ```rust
//! use graphload_testkit::prelude::*;
//!
//! let mut harness = IntegrationHarness::new();
//! harness.ingest(&[person_record(person_profile())]);
//! assert!(!harness.store().is_empty());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod fuzz;
pub mod generators;
pub mod integration;
pub mod scripted;
pub mod store;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::fuzz::*;
    pub use crate::generators::*;
    pub use crate::integration::*;
    pub use crate::scripted::*;
    pub use crate::store::*;
}

pub use fixtures::*;
pub use fuzz::*;
pub use generators::*;
pub use integration::*;
pub use scripted::*;
pub use store::*;
