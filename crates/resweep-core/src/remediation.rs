//! Orchestration: the three sweeps in order, plus report writes.

use std::path::Path;

use tracing::info;

use crate::account::AccountScope;
use crate::report::{self, ReportError};
use crate::reserved::ReservedPattern;
use crate::store::{DefaultRuntimeStore, PipelineStore, RuntimeEnvironmentStore, StoreError};
use crate::sweep::{SweepOutcome, run_sweep};
use crate::sweeps::{DefaultRuntimeSweep, PipelineSweep, RuntimeMembershipSweep};

/// Fatal remediation failures. Per-document errors are not among them;
/// those live in the per-sweep outcomes.
#[derive(Debug, thiserror::Error)]
pub enum RemediationError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Report(#[from] ReportError),
}

/// Per-sweep outcomes of one full run.
#[derive(Debug)]
pub struct RemediationSummary {
    pub pipelines: SweepOutcome,
    pub default_runtime: SweepOutcome,
    pub runtime_membership: SweepOutcome,
}

impl RemediationSummary {
    /// Documents mutated across all three sweeps.
    pub fn total_swept(&self) -> u64 {
        self.pipelines.swept + self.default_runtime.swept + self.runtime_membership.swept
    }

    /// Per-document failures across all three sweeps.
    pub fn total_failures(&self) -> u64 {
        self.pipelines.failed() + self.default_runtime.failed() + self.runtime_membership.failed()
    }
}

/// Run the three sweeps strictly in order against the resolved account.
///
/// Any sweep that collected failures rewrites the report at
/// `report_path` before the next sweep starts, so after a full run the
/// file holds the most recent failing sweep's records. The sweeps'
/// outcomes are independent; there is no rollback across them.
pub async fn run_remediation<P, D, R>(
    pipelines: &P,
    defaults: &D,
    runtimes: &R,
    scope: &AccountScope,
    pattern: &ReservedPattern,
    report_path: &Path,
) -> Result<RemediationSummary, RemediationError>
where
    P: PipelineStore + ?Sized,
    D: DefaultRuntimeStore + ?Sized,
    R: RuntimeEnvironmentStore + ?Sized,
{
    let pipelines = finish_sweep(
        run_sweep(&PipelineSweep {
            store: pipelines,
            scope,
            pattern,
        })
        .await?,
        report_path,
    )?;

    let default_runtime = finish_sweep(
        run_sweep(&DefaultRuntimeSweep {
            store: defaults,
            scope,
            pattern,
        })
        .await?,
        report_path,
    )?;

    let runtime_membership = finish_sweep(
        run_sweep(&RuntimeMembershipSweep {
            store: runtimes,
            scope,
            pattern,
        })
        .await?,
        report_path,
    )?;

    Ok(RemediationSummary {
        pipelines,
        default_runtime,
        runtime_membership,
    })
}

fn finish_sweep(
    outcome: SweepOutcome,
    report_path: &Path,
) -> Result<SweepOutcome, RemediationError> {
    if !outcome.failures.is_empty() {
        report::write_report(report_path, &outcome.failures)?;
        info!(
            failures = outcome.failures.len(),
            path = %report_path.display(),
            "failure report written"
        );
    }
    Ok(outcome)
}
