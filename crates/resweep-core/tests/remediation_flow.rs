//! Full remediation flows against the in-memory backend.

use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use resweep_core::memory::{MemoryDefaults, MemoryPipelines, MemoryRuntimes};
use resweep_core::{
    AccountId, AccountScope, DefaultRuntimeBinding, FailureRecord, Pipeline, ReservedPattern,
    RuntimeEnvironment, RuntimeReference, run_remediation,
};

struct ReportGuard {
    path: PathBuf,
}

impl ReportGuard {
    fn new(prefix: &str) -> Self {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        let path = std::env::temp_dir().join(format!(
            "resweep-flow-{prefix}-{}-{unique}.json",
            std::process::id()
        ));
        Self { path }
    }
}

impl Drop for ReportGuard {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

fn scope(id: &str, name: &str) -> AccountScope {
    AccountScope {
        id: AccountId::new(id),
        name: name.to_string(),
    }
}

fn pipeline(id: &str, account: &str, name: &str, runtime: Option<&str>) -> Pipeline {
    Pipeline {
        id: id.to_string(),
        account_id: AccountId::new(account),
        name: name.to_string(),
        runtime_environment: runtime.map(|name| RuntimeReference {
            name: name.to_string(),
        }),
    }
}

fn binding(account: &str, runtime: &str) -> DefaultRuntimeBinding {
    DefaultRuntimeBinding {
        account_id: AccountId::new(account),
        runtime_environment_name: runtime.to_string(),
    }
}

fn environment(id: &str, name: &str, members: &[&str]) -> RuntimeEnvironment {
    RuntimeEnvironment {
        id: id.to_string(),
        name: name.to_string(),
        accounts: members.iter().copied().map(AccountId::new).collect(),
    }
}

fn read_report(guard: &ReportGuard) -> Vec<FailureRecord> {
    let text = fs::read_to_string(&guard.path).expect("report should exist");
    serde_json::from_str(&text).expect("report should parse")
}

#[tokio::test]
async fn clean_run_removes_reserved_references_and_writes_no_report() {
    let scope = scope("A1", "monday");
    let pipelines = MemoryPipelines::new(vec![
        pipeline("P1", "A1", "deploy", Some("system-v2")),
        pipeline("P2", "A1", "build", Some("custom")),
    ]);
    let defaults = MemoryDefaults::new(vec![binding("A1", "system-v2")]);
    let runtimes = MemoryRuntimes::new(vec![environment("R1", "system-v2", &["A1", "A9"])]);
    let report = ReportGuard::new("clean");

    let summary = run_remediation(
        &pipelines,
        &defaults,
        &runtimes,
        &scope,
        &ReservedPattern::default(),
        &report.path,
    )
    .await
    .expect("remediation should finish");

    assert_eq!(summary.total_swept(), 3);
    assert_eq!(summary.total_failures(), 0);
    assert!(!report.path.exists());

    let pipelines_after = pipelines.snapshot();
    let p1 = pipelines_after
        .iter()
        .find(|p| p.id == "P1")
        .expect("P1 should survive");
    assert!(p1.runtime_environment.is_none());
    let p2 = pipelines_after
        .iter()
        .find(|p| p.id == "P2")
        .expect("P2 should survive");
    assert_eq!(
        p2.runtime_environment.as_ref().map(|r| r.name.as_str()),
        Some("custom")
    );

    assert!(defaults.snapshot().is_empty());

    let runtimes_after = runtimes.snapshot();
    let r1 = runtimes_after
        .iter()
        .find(|e| e.id == "R1")
        .expect("environment document must survive the sweep");
    assert_eq!(r1.accounts, vec![AccountId::new("A9")]);
}

#[tokio::test]
async fn other_accounts_and_unreserved_names_are_untouched() {
    let scope = scope("A1", "monday");
    let pipelines = MemoryPipelines::new(vec![pipeline(
        "P9",
        "A2",
        "deploy",
        Some("system-v2"),
    )]);
    let defaults = MemoryDefaults::new(vec![
        binding("A2", "system-v2"),
        binding("A1", "custom"),
    ]);
    let runtimes = MemoryRuntimes::new(vec![
        environment("R2", "system-v2", &["A2"]),
        environment("R3", "custom", &["A1"]),
    ]);
    let report = ReportGuard::new("untouched");

    let summary = run_remediation(
        &pipelines,
        &defaults,
        &runtimes,
        &scope,
        &ReservedPattern::default(),
        &report.path,
    )
    .await
    .expect("remediation should finish");

    assert_eq!(summary.total_swept(), 0);
    assert_eq!(summary.total_failures(), 0);
    assert_eq!(defaults.snapshot().len(), 2);
    assert!(
        pipelines.snapshot()[0].runtime_environment.is_some(),
        "foreign pipeline must keep its reference"
    );
    assert_eq!(runtimes.snapshot()[0].accounts, vec![AccountId::new("A2")]);
    assert_eq!(runtimes.snapshot()[1].accounts, vec![AccountId::new("A1")]);
}

#[tokio::test]
async fn rerun_after_clean_run_is_a_no_op() {
    let scope = scope("A1", "monday");
    let pipelines = MemoryPipelines::new(vec![pipeline(
        "P1",
        "A1",
        "deploy",
        Some("system-v2"),
    )]);
    let defaults = MemoryDefaults::new(vec![binding("A1", "system-v2")]);
    let runtimes = MemoryRuntimes::new(vec![environment("R1", "system-v2", &["A1"])]);
    let report = ReportGuard::new("rerun");
    let pattern = ReservedPattern::default();

    let first = run_remediation(
        &pipelines,
        &defaults,
        &runtimes,
        &scope,
        &pattern,
        &report.path,
    )
    .await
    .expect("first run should finish");
    assert_eq!(first.total_swept(), 3);

    let second = run_remediation(
        &pipelines,
        &defaults,
        &runtimes,
        &scope,
        &pattern,
        &report.path,
    )
    .await
    .expect("second run should finish");
    assert_eq!(second.total_swept(), 0);
    assert_eq!(second.total_failures(), 0);
    assert!(!report.path.exists());
}

#[tokio::test]
async fn mutation_failure_is_collected_and_iteration_continues() {
    let scope = scope("A1", "monday");
    let pipelines = MemoryPipelines::new(vec![
        pipeline("P1", "A1", "deploy", Some("system-v2")),
        pipeline("P2", "A1", "build", Some("system-v3")),
    ])
    .fail_on("P1");
    let defaults = MemoryDefaults::new(Vec::new());
    let runtimes = MemoryRuntimes::new(Vec::new());
    let report = ReportGuard::new("failure");

    let summary = run_remediation(
        &pipelines,
        &defaults,
        &runtimes,
        &scope,
        &ReservedPattern::default(),
        &report.path,
    )
    .await
    .expect("per-document failures must not abort the run");

    assert_eq!(summary.pipelines.swept, 1);
    assert_eq!(summary.pipelines.failed(), 1);

    let pipelines_after = pipelines.snapshot();
    assert!(
        pipelines_after
            .iter()
            .find(|p| p.id == "P1")
            .expect("P1 should survive")
            .runtime_environment
            .is_some(),
        "failed mutation must leave the document as-is"
    );
    assert!(
        pipelines_after
            .iter()
            .find(|p| p.id == "P2")
            .expect("P2 should survive")
            .runtime_environment
            .is_none(),
        "iteration must continue past the failure"
    );

    let records = read_report(&report);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].account_id, "P1");
    assert_eq!(records[0].account_name, "deploy");
    assert!(records[0].cause.contains("injected failure"));
}

#[tokio::test]
async fn later_failing_sweep_overwrites_earlier_report() {
    let scope = scope("A1", "monday");
    let pipelines = MemoryPipelines::new(vec![pipeline(
        "P1",
        "A1",
        "deploy",
        Some("system-v2"),
    )])
    .fail_on("P1");
    let defaults = MemoryDefaults::new(Vec::new());
    let runtimes =
        MemoryRuntimes::new(vec![environment("R1", "system-v2", &["A1"])]).fail_on("R1");
    let report = ReportGuard::new("overwrite");

    let summary = run_remediation(
        &pipelines,
        &defaults,
        &runtimes,
        &scope,
        &ReservedPattern::default(),
        &report.path,
    )
    .await
    .expect("remediation should finish");

    assert_eq!(summary.total_failures(), 2);

    // Each failing sweep rewrites the file in full, so only the last
    // writer's records survive.
    let records = read_report(&report);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].account_id, "R1");
    assert_eq!(records[0].account_name, "system-v2");
}

#[tokio::test]
async fn membership_sweep_only_touches_the_target_account() {
    let scope = scope("A1", "monday");
    let pipelines = MemoryPipelines::new(Vec::new());
    let defaults = MemoryDefaults::new(Vec::new());
    let runtimes = MemoryRuntimes::new(vec![environment(
        "R1",
        "system-v2",
        &["A7", "A1", "A9"],
    )]);
    let report = ReportGuard::new("membership");

    run_remediation(
        &pipelines,
        &defaults,
        &runtimes,
        &scope,
        &ReservedPattern::default(),
        &report.path,
    )
    .await
    .expect("remediation should finish");

    let runtimes_after = runtimes.snapshot();
    assert_eq!(
        runtimes_after[0].accounts,
        vec![AccountId::new("A7"), AccountId::new("A9")]
    );
}
