//! Core data structures: identities, the in-memory registry, and the
//! durable index.

pub mod errors;
pub mod identity;
pub mod index;
pub mod registry;
pub mod resource;

pub use errors::RegistryError;
pub use identity::{ResourceId, SourceAttribution};
pub use index::{IndexDocument, IndexEntry, RawIndex};
pub use registry::Registry;
pub use resource::Resource;
