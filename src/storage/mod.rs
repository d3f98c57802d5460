//! Storage layer.
//!
//! - [`ContentStore`]: list, read and write journal and output files
//! - [`JournalState`]: the `.state.json` sidecar tracking per-file stages

pub mod filesystem;
pub mod state;
pub mod traits;

pub use filesystem::FilesystemStore;
pub use state::{CURRENT_VERSION, FileState, JournalState, STATE_FILE, Stage};
pub use traits::ContentStore;
