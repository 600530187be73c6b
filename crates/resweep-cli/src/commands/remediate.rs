//! The single remediation command: validate, connect, resolve, sweep.
//!
//! Startup failures (bad allow-list, unknown account, connection or
//! resolution errors, an unwritable report) exit non-zero before or
//! during the run; per-document failures are reported, not fatal.

use std::process;

use resweep_core::{Allowlist, ReservedPattern, resolve_account, run_remediation};
use resweep_mongo::{MongoConfig, connect};
use tracing::info;

use crate::cli::Cli;

pub fn run(args: Cli) {
    let allowlist = Allowlist::load(&args.allowlist).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        process::exit(1);
    });
    let account_name = allowlist
        .authorize(args.account_name.as_deref())
        .unwrap_or_else(|e| {
            eprintln!("error: {e}");
            process::exit(1);
        })
        .to_string();

    // Sweeps run one after another and documents one at a time; a
    // current-thread runtime keeps the whole run on that schedule.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap_or_else(|e| {
            eprintln!("error: failed to create tokio runtime: {e}");
            process::exit(1);
        });

    runtime.block_on(execute(&args, &account_name));
}

async fn execute(args: &Cli, account_name: &str) {
    let config = MongoConfig {
        accounts_uri: args.accounts_uri.clone(),
        pipelines_uri: args.pipelines_uri.clone(),
        runtimes_uri: args.runtimes_uri.clone(),
    };
    let stores = connect(&config).await.unwrap_or_else(|e| {
        eprintln!("error: {e}");
        process::exit(1);
    });

    let scope = resolve_account(&stores.accounts, account_name)
        .await
        .unwrap_or_else(|e| {
            eprintln!("error: {e}");
            process::exit(1);
        });
    info!(account = %scope.name, id = %scope.id, "account resolved");

    let summary = run_remediation(
        &stores.pipelines,
        &stores.defaults,
        &stores.runtimes,
        &scope,
        &ReservedPattern::default(),
        &args.report,
    )
    .await
    .unwrap_or_else(|e| {
        eprintln!("error: {e}");
        process::exit(1);
    });

    println!(
        "[resweep] OK (account={}, pipelines={}/{}, defaults={}/{}, memberships={}/{})",
        scope.name,
        summary.pipelines.swept,
        summary.pipelines.failed(),
        summary.default_runtime.swept,
        summary.default_runtime.failed(),
        summary.runtime_membership.swept,
        summary.runtime_membership.failed(),
    );
    if summary.total_failures() > 0 {
        println!("[resweep] failure report at {}", args.report.display());
    }
}
