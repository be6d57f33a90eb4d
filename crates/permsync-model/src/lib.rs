//! # Configuration Model
//!
//! Value types shared across the permsync workspace:
//! - Desired access-control entries ([`AceEntry`], [`Restriction`], [`Permission`])
//! - Declared authorizables ([`AuthorizableConfig`])
//! - Path relevance filtering for restricted installs

pub mod authorizable;
pub mod entry;
pub mod error;
pub mod paths;

pub use authorizable::AuthorizableConfig;
pub use entry::{group_by_path, AceEntry, Permission, Restriction};
pub use error::{ModelError, ModelResult};
pub use paths::is_relevant_path;
