//! CLI subcommands.

pub mod apply;
pub mod diff;
pub mod validate;
