//! berth - A lazy resource registry
//!
//! This crate provides the core library functionality for berth: an
//! in-memory registry of named, typed resources, a durable index that
//! records which source file declares each resource, incremental
//! reconciliation of that index by content hash, and on-demand resolution
//! that loads only the file a requested resource lives in.

pub mod core;
pub mod ops;
pub mod sources;
pub mod util;

/// Test utilities for berth unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests.
#[cfg(test)]
pub mod test_support;

pub use crate::core::{
    errors::RegistryError, identity::ResourceId, identity::SourceAttribution,
    index::IndexDocument, index::IndexEntry, registry::Registry, resource::Resource,
};

pub use ops::{ReconcileOptions, ReconcileReport, RegistrationSystem};
pub use sources::{Declaration, DeclarationLoader, Loader};
pub use util::context::GlobalContext;
