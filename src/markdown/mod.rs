//! Markdown primitives shared by the pipeline stages.
//!
//! - [`frontmatter`]: locating and parsing the YAML preamble
//! - [`patterns`]: named matchers for turn headers, fences, headings, boilerplate
//! - [`wikilink`]: Markdown link to wikilink conversion for the vault

pub mod frontmatter;
pub mod patterns;
pub mod wikilink;

pub use frontmatter::{FrontmatterBlock, FrontmatterParser};
pub use patterns::{FenceLine, FenceTracker, LineClassifier, LineKind, TurnHeader};
pub use wikilink::{convert_markdown_links, format_wikilink, format_wikilink_entry};
