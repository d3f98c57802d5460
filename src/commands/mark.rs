//! Mark command.

use ctx_journal::config::JournalConfig;
use ctx_journal::storage::{FilesystemStore, JournalState, Stage};

/// Mark command.
///
/// Records today's date for `stage`, or with `check` prints the recorded
/// date and fails when the stage is not done.
pub fn cmd_mark(
    config: &JournalConfig,
    filename: &str,
    stage: &str,
    check: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let stage: Stage = stage.parse()?;
    let journal_dir = config.journal_dir();
    let store = FilesystemStore::new();
    let mut state = JournalState::load(&store, &journal_dir)?;

    if check {
        let date = state.stage_date(filename, stage);
        if date.is_empty() {
            return Err(format!("{filename}: {stage} not set").into());
        }
        println!("{date}");
        return Ok(());
    }

    state.mark(filename, stage);
    state.save(&store, &journal_dir)?;
    println!("✓ {filename}: {stage} = {}", state.stage_date(filename, stage));

    Ok(())
}
