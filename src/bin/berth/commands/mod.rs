//! Command implementations

pub mod clean;
pub mod completions;
pub mod get;
pub mod index;
pub mod list;
pub mod status;

use berth::ops::{DeclarationSystem, ReconcileOptions};
use berth::sources::{DeclarationLoader, SourceWalker};
use berth::util::GlobalContext;

use crate::cli::SourceArgs;

/// Build reconcile options from flags layered over the configuration.
pub fn reconcile_options(ctx: &GlobalContext, args: &SourceArgs) -> ReconcileOptions {
    let root = ctx.source_root(args.root.as_deref());
    let namespace = ctx.namespace(args.namespace.as_deref(), &root);

    ReconcileOptions {
        index_path: ctx.index_path(args.index.index.as_deref()),
        namespace,
        external_roots: ctx.external_roots(&args.external),
        exclude: ctx.exclude(&args.exclude),
        root,
    }
}

/// A registration system over declaration files with the configured
/// extensions.
pub fn declaration_system(ctx: &GlobalContext) -> DeclarationSystem {
    DeclarationSystem::new(DeclarationLoader::new())
        .with_walker(SourceWalker::new(ctx.extensions()))
}
