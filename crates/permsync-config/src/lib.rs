//! # Configuration Reader
//!
//! Turns a YAML configuration source into resolved model beans:
//!
//! 1. Parse the document into a raw YAML value tree.
//! 2. Expand `FOR`/`IF` macros with `${var}` substitution
//!    ([`expand_macros`]).
//! 3. Deserialize the expanded tree into typed sections.
//! 4. Validate and extract [`AceEntry`]/[`AuthorizableConfig`] beans,
//!    deduplicated per (path, principal), plus the managed principal
//!    set.
//!
//! [`AceEntry`]: permsync_model::AceEntry
//! [`AuthorizableConfig`]: permsync_model::AuthorizableConfig

pub mod error;
pub mod macros;
pub mod reader;

pub use error::{ConfigError, ConfigResult};
pub use macros::expand_macros;
pub use reader::{load_file, parse_str, ResolvedConfig};
