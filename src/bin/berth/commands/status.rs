//! `berth status` command

use anyhow::Result;

use crate::cli::StatusArgs;
use crate::commands::{declaration_system, reconcile_options};
use berth::core::IndexDocument;
use berth::ops::{collect_sources, plan_reconcile};
use berth::util::fs::relative_path;
use berth::util::GlobalContext;

pub fn execute(args: StatusArgs) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let options = reconcile_options(&ctx, &args.sources);
    let system = declaration_system(&ctx);

    let document = IndexDocument::load(&options.index_path)?;
    let sources = collect_sources(&options, system.walker())?;
    let plan = plan_reconcile(document, sources)?;

    if plan.is_up_to_date() {
        println!("index is up to date ({} sources)", plan.sources.len());
        return Ok(());
    }

    for source in &plan.changed {
        let marker = if plan.is_new(source) { "new" } else { "modified" };
        println!(
            "{:>10}: {}",
            marker,
            relative_path(ctx.cwd(), &source.path).display()
        );
    }
    for path in &plan.removed {
        println!("{:>10}: {}", "deleted", relative_path(ctx.cwd(), path).display());
    }

    Ok(())
}
