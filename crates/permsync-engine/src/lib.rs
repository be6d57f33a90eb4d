//! # Reconciliation Engine
//!
//! Converges the access-control state of a hierarchical permission
//! store to a declared set of entries, touching only the minimal delta
//! and only entries of managed principals.
//!
//! ## Architecture
//!
//! ```text
//! desired entries (per path)        store state (per path)
//!         │                                 │
//!         ▼                                 ▼
//! ┌───────────────┐  ComparableAce  ┌───────────────┐
//! │  Normalizer   │────────────────►│  Reconciler   │
//! │ (privileges)  │                 │  (set diff)   │
//! └───────────────┘                 └───────┬───────┘
//!                                           │ to_remove / to_install
//!                                           ▼
//!                                   ┌───────────────┐
//!                                   │   Installer   │──► per-path
//!                                   │ (transaction) │    commit
//!                                   └───────┬───────┘
//!                                           │
//!                                           ▼
//!                                   InstallationReport
//! ```
//!
//! Entries of principals outside the managed set are invisible to the
//! diff and never touched. Each path is one atomic unit of work; a
//! failed path is reported and the batch continues.

pub mod compare;
pub mod error;
pub mod installer;
pub mod privileges;
pub mod reconcile;
pub mod report;
pub mod service;

pub use compare::ComparableAce;
pub use error::{EngineError, EngineResult};
pub use installer::{install_path, ActionHandler, PathDelta};
pub use privileges::{comparable_set, expand, expand_all};
pub use reconcile::{reconcile, ReconcileOutcome};
pub use report::{ActionFailure, InstallationReport, PathOutcome, PathStatus, Summary};
pub use service::{ApplyOptions, ApplyService};
