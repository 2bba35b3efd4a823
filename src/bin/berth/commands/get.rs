//! `berth get` command

use anyhow::{Context, Result};

use crate::cli::GetArgs;
use crate::commands::declaration_system;
use berth::util::GlobalContext;
use berth::RegistryError;

pub fn execute(args: GetArgs) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let index_path = ctx.index_path(args.index.index.as_deref());
    let mut system = declaration_system(&ctx);

    if args.source {
        let entry = system
            .find_entry(&args.module_type, &args.name, &index_path)?
            .ok_or_else(|| RegistryError::not_found(&args.module_type, &args.name))?;
        println!("{} ({})", entry.source_name, entry.source_path.display());
        return Ok(());
    }

    let resource = system.get_module(&args.module_type, &args.name, &index_path)?;
    let json = serde_json::to_string_pretty(resource).context("failed to serialize resource")?;
    println!("{}", json);

    Ok(())
}
