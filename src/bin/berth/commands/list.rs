//! `berth list` command

use anyhow::Result;

use crate::cli::ListArgs;
use berth::core::{IndexDocument, IndexEntry};
use berth::util::GlobalContext;

pub fn execute(args: ListArgs) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let index_path = ctx.index_path(args.index.index.as_deref());
    let document = IndexDocument::load(&index_path)?;

    let mut entries: Vec<&IndexEntry> = document
        .config
        .iter()
        .filter(|entry| {
            args.module_type
                .as_deref()
                .map_or(true, |t| entry.module_type == t)
        })
        .collect();
    entries.sort_by(|a, b| {
        (&a.module_type, &a.module_name).cmp(&(&b.module_type, &b.module_name))
    });

    if entries.is_empty() {
        eprintln!("no resources indexed");
        return Ok(());
    }

    let width = entries
        .iter()
        .map(|e| e.module_type.len() + e.module_name.len() + 1)
        .max()
        .unwrap_or(0);
    for entry in entries {
        let id = format!("{}:{}", entry.module_type, entry.module_name);
        println!("{:<width$}  {}", id, entry.source_name, width = width);
    }

    Ok(())
}
