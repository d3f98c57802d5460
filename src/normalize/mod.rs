//! Text normalization passes for journal entries.
//!
//! Two chains are built from the passes in this module:
//!
//! | Chain | Passes | Applied to |
//! |-------|--------|------------|
//! | [`Pipeline::mutating`] | reminders, JSON tool output, repeated runs, turn merge, soft wrap | the source file (site) or an in-memory copy (vault) |
//! | [`Pipeline::site`] | fence strip, tool output fencing, user turn escaping, line sanitizing | the published site copy only |
//!
//! Every pass is a plain `fn(&str) -> String`, so each can be tested on its
//! own and the chains can be reordered in one place.

pub mod reduce;
pub mod site;
pub mod turns;
pub mod wrap;

pub use reduce::{clean_tool_output_json, strip_fences, strip_system_reminders};
pub use site::{sanitize_lines, wrap_tool_outputs, wrap_user_turns};
pub use turns::{consolidate_tool_runs, merge_consecutive_turns};
pub use wrap::{LINE_WRAP_WIDTH, soft_wrap, soft_wrap_content};

/// Signature shared by every pass.
pub type PassFn = fn(&str) -> String;

/// A named normalization pass.
#[derive(Debug, Clone, Copy)]
pub struct Pass {
    /// Name used in log events.
    pub name: &'static str,
    /// The transformation.
    pub apply: PassFn,
}

impl Pass {
    /// Creates a pass.
    #[must_use]
    pub const fn new(name: &'static str, apply: PassFn) -> Self {
        Self { name, apply }
    }
}

/// An ordered list of passes applied one after another.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    passes: Vec<Pass>,
}

impl Pipeline {
    /// Creates a pipeline from explicit passes.
    #[must_use]
    pub const fn new(passes: Vec<Pass>) -> Self {
        Self { passes }
    }

    /// The chain that rewrites transcripts in place.
    #[must_use]
    pub fn mutating() -> Self {
        Self::new(vec![
            Pass::new("strip_system_reminders", strip_system_reminders),
            Pass::new("clean_tool_output_json", clean_tool_output_json),
            Pass::new("consolidate_tool_runs", consolidate_tool_runs),
            Pass::new("merge_consecutive_turns", merge_consecutive_turns),
            Pass::new("soft_wrap_content", soft_wrap_content),
        ])
    }

    /// The chain for published site pages.
    ///
    /// Fence stripping is left out for files whose fences were verified.
    #[must_use]
    pub fn site(fences_verified: bool) -> Self {
        let mut passes = Vec::with_capacity(4);
        if !fences_verified {
            passes.push(Pass::new("strip_fences", reduce::strip_unverified_fences));
        }
        passes.push(Pass::new("wrap_tool_outputs", wrap_tool_outputs));
        passes.push(Pass::new("wrap_user_turns", wrap_user_turns));
        passes.push(Pass::new("sanitize_lines", sanitize_lines));
        Self::new(passes)
    }

    /// The passes in application order.
    #[must_use]
    pub fn passes(&self) -> &[Pass] {
        &self.passes
    }

    /// Runs every pass in order.
    #[must_use]
    pub fn run(&self, content: &str) -> String {
        self.passes.iter().fold(content.to_string(), |text, pass| {
            let next = (pass.apply)(&text);
            if next != text {
                tracing::trace!(pass = pass.name, "pass changed content");
            }
            next
        })
    }
}

/// Runs the read-only site chain.
#[must_use]
pub fn normalize_site_content(content: &str, fences_verified: bool) -> String {
    Pipeline::site(fences_verified).run(content)
}
