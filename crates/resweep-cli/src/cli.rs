use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "resweep",
    about = "Remove system-reserved runtime-environment references for one account",
    version
)]
pub struct Cli {
    /// Account whose reserved runtime references are removed
    #[arg(long, env = "ACCOUNT_NAME")]
    pub account_name: Option<String>,

    /// Newline-delimited file of account names permitted as targets
    #[arg(long, env = "ALLOWED_ACCOUNTS_FILE")]
    pub allowlist: PathBuf,

    /// Connection string for the accounts store
    #[arg(long, env = "MONGO_URI", hide_env_values = true)]
    pub accounts_uri: String,

    /// Connection string for the pipeline store
    #[arg(long, env = "PIPELINE_MANAGER_MONGO_URI", hide_env_values = true)]
    pub pipelines_uri: String,

    /// Connection string for the runtime-environment store
    #[arg(long, env = "RUNTIME_ENVIRONMENT_MANAGER_MONGO_URI", hide_env_values = true)]
    pub runtimes_uri: String,

    /// Path the failure report is written to when a sweep fails
    #[arg(long, default_value = resweep_core::REPORT_PATH)]
    pub report: PathBuf,
}
