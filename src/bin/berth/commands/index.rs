//! `berth index` command

use anyhow::Result;

use crate::cli::IndexArgs;
use crate::commands::{declaration_system, reconcile_options};
use berth::util::fs::relative_path;
use berth::util::GlobalContext;

pub fn execute(args: IndexArgs) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let options = reconcile_options(&ctx, &args.sources);

    let mut system = declaration_system(&ctx);
    let report = system.generate_config(&options)?;

    for path in &report.loaded {
        eprintln!("     Indexed {}", relative_path(ctx.cwd(), path).display());
    }
    for path in &report.pruned {
        eprintln!("      Pruned {}", relative_path(ctx.cwd(), path).display());
    }

    if report.written {
        eprintln!(
            "     Updated {} ({} sources)",
            relative_path(ctx.cwd(), &options.index_path).display(),
            report.scanned
        );
    } else {
        eprintln!("  Up to date {} sources", report.scanned);
    }

    Ok(())
}
