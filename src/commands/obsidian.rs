//! Obsidian command.

use std::path::PathBuf;

use ctx_journal::config::JournalConfig;
use ctx_journal::services::VaultGenerator;
use ctx_journal::storage::FilesystemStore;

use super::print_warnings;

/// Obsidian command.
pub fn cmd_obsidian(
    config: &JournalConfig,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let journal_dir = config.journal_dir();
    let output = output.unwrap_or_else(|| config.vault_output());

    let store = FilesystemStore::new();
    let report = VaultGenerator::new(&store).generate(&journal_dir, &output)?;

    print_warnings(&report);
    println!(
        "✓ Generated Obsidian vault with {} entries in {}",
        report.entries,
        output.display()
    );
    println!();
    println!("Next steps:");
    println!(
        "  Open Obsidian → Open folder as vault → Select {}",
        output.display()
    );

    Ok(())
}
