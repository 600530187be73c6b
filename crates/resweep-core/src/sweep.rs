//! The shared cursor-scan-and-mutate pass.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::report::FailureRecord;
use crate::store::{BoxCursor, StoreError};

/// Re-identification data for one document: primary key plus a display
/// name for logs and failure records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentLabel {
    pub id: String,
    pub name: String,
}

/// Counters and collected failures from one finished sweep.
#[derive(Debug, Default)]
pub struct SweepOutcome {
    pub swept: u64,
    pub failures: Vec<FailureRecord>,
}

impl SweepOutcome {
    pub fn failed(&self) -> u64 {
        self.failures.len() as u64
    }
}

/// One cursor-scan-and-mutate pass over a single collection.
///
/// Implementations supply the filtered cursor, the per-document
/// mutation, and the wording used for logs and failure records; the
/// drain loop itself lives in [`run_sweep`].
#[async_trait]
pub trait Sweep: Send + Sync {
    /// Document type scanned by this pass. Owned data only: the boxed
    /// cursor outlives the borrow it was opened through.
    type Doc: Send + 'static;

    /// What this pass removes, for logs and summaries.
    fn description(&self) -> &'static str;

    /// Open the filtered cursor of candidate documents.
    async fn open(&self) -> Result<BoxCursor<Self::Doc>, StoreError>;

    /// Primary key and display name used to re-identify `doc`.
    fn label(&self, doc: &Self::Doc) -> DocumentLabel;

    /// Apply the mutation to one document, keyed by its own identity.
    async fn apply(&self, doc: &Self::Doc) -> Result<(), StoreError>;

    /// Log line for one successful mutation.
    fn success_message(&self, doc: &Self::Doc) -> String;
}

/// Drain a sweep's cursor, mutating one document at a time.
///
/// Mutation failures are collected and never stop the iteration; a
/// cursor that fails to advance aborts the pass. The next document is
/// not fetched until the current attempt completes.
pub async fn run_sweep<S: Sweep>(sweep: &S) -> Result<SweepOutcome, StoreError> {
    let mut cursor = sweep.open().await?;
    let mut outcome = SweepOutcome::default();

    while let Some(doc) = cursor.advance().await? {
        let label = sweep.label(&doc);
        match sweep.apply(&doc).await {
            Ok(()) => {
                outcome.swept += 1;
                info!(
                    document = %label.id,
                    name = %label.name,
                    "{}",
                    sweep.success_message(&doc)
                );
            }
            Err(err) => {
                warn!(
                    document = %label.id,
                    name = %label.name,
                    error = %err,
                    "failed to remove {}",
                    sweep.description()
                );
                outcome.failures.push(FailureRecord::new(label, &err));
            }
        }
    }

    info!(
        swept = outcome.swept,
        failed = outcome.failed(),
        "finished sweep: {}",
        sweep.description()
    );
    Ok(outcome)
}
