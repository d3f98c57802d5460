//! Site command.

use std::path::PathBuf;

use ctx_journal::config::JournalConfig;
use ctx_journal::services::{SiteGenerator, run_zensical};
use ctx_journal::storage::{FilesystemStore, JournalState};

use super::print_warnings;

/// Site command.
pub fn cmd_site(
    config: &JournalConfig,
    output: Option<PathBuf>,
    build: bool,
    serve: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let journal_dir = config.journal_dir();
    let output = output.unwrap_or_else(|| config.site_output());

    let store = FilesystemStore::new();
    let state = JournalState::load(&store, &journal_dir)?;
    let report = SiteGenerator::new(&store, &state)
        .with_site_name(config.site_name.clone())
        .generate(&journal_dir, &output)?;

    print_warnings(&report);
    println!(
        "✓ Generated site with {} entries in {}",
        report.entries,
        output.display()
    );

    if build {
        run_zensical(&output, "build")?;
    } else if serve {
        run_zensical(&output, "serve")?;
    } else {
        println!();
        println!("Next steps:");
        println!("  cd {} && zensical serve", output.display());
        println!("  or");
        println!("  ctx-journal site --serve");
    }

    Ok(())
}
