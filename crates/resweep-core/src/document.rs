//! Document types for the three remediation targets.
//!
//! The backing collections are schemaless; only the fields the
//! remediation reads or mutates are modeled here.

use serde::{Deserialize, Serialize};

use crate::account::AccountId;

/// A tenant. Read-only for this tool: looked up once by name to resolve
/// the internal id, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
}

/// An embedded runtime-environment reference inside a pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeReference {
    pub name: String,
}

/// A per-account workflow definition that may reference a runtime
/// environment by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pipeline {
    pub id: String,
    pub account_id: AccountId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime_environment: Option<RuntimeReference>,
}

/// "This account's default runtime is X". The row has no identity of
/// its own; it is re-identified by (account, runtime name).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultRuntimeBinding {
    pub account_id: AccountId,
    pub runtime_environment_name: String,
}

/// A shared named resource that accounts reference through membership
/// in its `accounts` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeEnvironment {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub accounts: Vec<AccountId>,
}
