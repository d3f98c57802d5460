//! Command handlers module.
//!
//! - `site.rs`: static site generation and the optional zensical run
//! - `obsidian.rs`: Obsidian vault generation
//! - `mark.rs`: journal state stage marking and checks

mod mark;
mod obsidian;
mod site;

use ctx_journal::services::GenerationReport;

pub use mark::cmd_mark;
pub use obsidian::cmd_obsidian;
pub use site::cmd_site;

/// Prints per-file warnings collected during generation.
fn print_warnings(report: &GenerationReport) {
    for warning in &report.warnings {
        eprintln!("  ! {warning}");
    }
}
