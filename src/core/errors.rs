//! Registry error types and diagnostics.

use std::fmt;
use std::path::PathBuf;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::core::identity::ResourceId;
use crate::util::diagnostic::{suggestions, Diagnostic};

/// The part of an identity that registration failed to infer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InferredField {
    Name,
    Type,
}

impl fmt::Display for InferredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InferredField::Name => write!(f, "name"),
            InferredField::Type => write!(f, "type"),
        }
    }
}

/// Error raised by registration, resolution, or index handling.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum RegistryError {
    #[error("trying to register another resource with the same name and type: `{id}`")]
    #[diagnostic(
        code(berth::registry::conflict),
        help("Rename one of the resources or register it under a different type")
    )]
    Conflict { id: ResourceId },

    #[error("could not infer the resource {what}; specify it explicitly (source: {location})")]
    #[diagnostic(code(berth::registry::inference))]
    Inference {
        what: InferredField,
        location: String,
    },

    #[error("the resource `{id}` was not found")]
    #[diagnostic(code(berth::resolve::not_found))]
    NotFound { id: ResourceId },

    #[error("index {} is corrupted: {detail}", .index_path.display())]
    #[diagnostic(
        code(berth::index::corrupted),
        help("Run `berth index` to rebuild the index")
    )]
    Corrupted { index_path: PathBuf, detail: String },
}

impl RegistryError {
    pub fn not_found(module_type: &str, module_name: &str) -> Self {
        RegistryError::NotFound {
            id: ResourceId::new(module_type, module_name),
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            RegistryError::Conflict { id } => {
                Diagnostic::error(format!("`{}` is registered twice with different values", id))
                    .with_suggestion("Rename one of the resources")
                    .with_suggestion("Register one of them under a different type")
            }

            RegistryError::Inference { what, location } => {
                let suggestion = match what {
                    InferredField::Name => suggestions::EXPLICIT_NAME,
                    InferredField::Type => suggestions::EXPLICIT_TYPE,
                };
                Diagnostic::error(format!("could not infer the resource {}", what))
                    .with_context(format!("declared in {}", location))
                    .with_suggestion(suggestion)
            }

            RegistryError::NotFound { id } => {
                Diagnostic::error(format!("the resource `{}` was not found", id))
                    .with_suggestion(suggestions::REINDEX)
                    .with_suggestion(suggestions::LIST)
            }

            RegistryError::Corrupted { index_path, detail } => {
                Diagnostic::error("the index is corrupted")
                    .with_location(index_path.clone())
                    .with_context(detail.clone())
                    .with_suggestion(suggestions::REINDEX)
            }
        }
    }
}
