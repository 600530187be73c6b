//! # resweep-core
//!
//! Domain model and sweep engine for reserved-runtime remediation.
//!
//! This crate provides:
//! - the allow-list gate and account resolution
//! - the reserved-name predicate shared by every pass
//! - storage traits with a consumed-once cursor seam
//! - the generic sweep loop and the three concrete passes
//! - the failure report and the run orchestrator
//!
//! Backend adapters (`resweep-mongo`) implement the storage traits;
//! `memory` carries in-process implementations for tests.

pub mod account;
pub mod allowlist;
pub mod document;
pub mod memory;
pub mod remediation;
pub mod report;
pub mod reserved;
pub mod store;
pub mod sweep;
pub mod sweeps;

pub use account::{AccountId, AccountScope, ResolveError, resolve_account};
pub use allowlist::{Allowlist, AllowlistError};
pub use document::{Account, DefaultRuntimeBinding, Pipeline, RuntimeEnvironment, RuntimeReference};
pub use remediation::{RemediationError, RemediationSummary, run_remediation};
pub use report::{FailureRecord, REPORT_PATH, ReportError, write_report};
pub use reserved::{DEFAULT_RESERVED_LITERAL, ReservedPattern};
pub use store::{
    AccountDirectory, BoxCursor, DefaultRuntimeStore, DocumentCursor, PipelineStore,
    RuntimeEnvironmentStore, StoreError,
};
pub use sweep::{DocumentLabel, Sweep, SweepOutcome, run_sweep};
pub use sweeps::{DefaultRuntimeSweep, PipelineSweep, RuntimeMembershipSweep};
