//! Account identity and resolution.

use serde::{Deserialize, Serialize};

use crate::store::{AccountDirectory, StoreError};

/// Internal account identifier: the string form of the backend primary
/// key. Every entity in the other stores references accounts by this
/// id, never by name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolved account context threaded into every sweep.
///
/// Built exactly once, after the directory lookup; sweeps never consult
/// ambient state for the target account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountScope {
    pub id: AccountId,
    pub name: String,
}

/// Errors from account resolution.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("account not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Look up the internal id for `name` and build the scope for the run.
///
/// A miss is fatal for the caller: no sweep may run without a resolved
/// id.
pub async fn resolve_account(
    directory: &(impl AccountDirectory + ?Sized),
    name: &str,
) -> Result<AccountScope, ResolveError> {
    let id = directory
        .find_account_id(name)
        .await?
        .ok_or_else(|| ResolveError::NotFound(name.to_string()))?;
    Ok(AccountScope {
        id,
        name: name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Account;
    use crate::memory::MemoryAccounts;

    #[tokio::test]
    async fn resolve_account_returns_scope_for_known_name() {
        let directory = MemoryAccounts::new(vec![Account {
            id: AccountId::new("A1"),
            name: "monday".to_string(),
        }]);

        let scope = resolve_account(&directory, "monday")
            .await
            .expect("known account should resolve");
        assert_eq!(scope.id, AccountId::new("A1"));
        assert_eq!(scope.name, "monday");
    }

    #[tokio::test]
    async fn resolve_account_fails_for_unknown_name() {
        let directory = MemoryAccounts::new(vec![Account {
            id: AccountId::new("A1"),
            name: "monday".to_string(),
        }]);

        let err = resolve_account(&directory, "tuesday")
            .await
            .expect_err("unknown account must not resolve");
        assert!(matches!(err, ResolveError::NotFound(name) if name == "tuesday"));
    }
}
