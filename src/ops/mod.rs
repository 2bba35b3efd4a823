//! High-level operations.
//!
//! This module contains the registration system and the operations the
//! berth commands are built from: reconciliation, resolution and recovery.

pub mod reconcile;
pub mod recovery;
pub mod resolve;
pub mod system;

pub use reconcile::{
    collect_sources, plan_reconcile, ReconcileOptions, ReconcilePlan, ReconcileReport,
};
pub use recovery::{quarantine_path, CorruptionHandler, Quarantine};
pub use system::{DeclarationSystem, RegistrationSystem};
