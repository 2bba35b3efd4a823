//! Source files: how they are found and how they are executed.

pub mod declared;
pub mod loader;
pub mod walk;

pub use declared::{Declaration, DeclarationLoader};
pub use loader::Loader;
pub use walk::{Exclusion, SourceFile, SourceWalker};
