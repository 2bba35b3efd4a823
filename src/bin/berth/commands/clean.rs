//! `berth clean` command

use anyhow::Result;

use crate::cli::CleanArgs;
use berth::ops::quarantine_path;
use berth::util::fs::remove_file_if_exists;
use berth::util::GlobalContext;

pub fn execute(args: CleanArgs) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let index_path = ctx.index_path(args.index.index.as_deref());

    let mut targets = vec![index_path.clone()];
    if args.all {
        targets.push(quarantine_path(&index_path));
    }

    for target in targets {
        if remove_file_if_exists(&target)? {
            eprintln!("     Removed {}", target.display());
        }
    }

    Ok(())
}
