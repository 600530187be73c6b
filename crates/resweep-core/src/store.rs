//! Storage seams: cursors and the four collection handles.
//!
//! Backends implement these traits; the sweep engine only ever consumes
//! them. Mutations are keyed by a document's own identity, never by
//! re-evaluating the filter that found it, so a document that drifted
//! between fetch and mutation is still addressed precisely.

use async_trait::async_trait;

use crate::account::AccountId;
use crate::document::{DefaultRuntimeBinding, Pipeline, RuntimeEnvironment};
use crate::reserved::ReservedPattern;

/// Backend-agnostic storage failure.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backend rejected or failed the operation.
    #[error("backend error: {0}")]
    Backend(String),

    /// A stored value could not be decoded into its model type.
    #[error("malformed document: {0}")]
    MalformedDocument(String),
}

/// A lazy, finite sequence of documents read one at a time.
///
/// Not restartable, consumed exactly once. The next document is only
/// fetched when the caller asks for it.
#[async_trait]
pub trait DocumentCursor<D>: Send {
    /// Fetch the next document, or `None` once exhausted.
    async fn advance(&mut self) -> Result<Option<D>, StoreError>;
}

/// Boxed cursor handed from a store to the sweep engine.
pub type BoxCursor<D> = Box<dyn DocumentCursor<D>>;

/// Read-only lookup of account ids by name.
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    /// Exact-match lookup; `None` when no account carries `name`.
    async fn find_account_id(&self, name: &str) -> Result<Option<AccountId>, StoreError>;
}

/// Pipelines owned by accounts.
#[async_trait]
pub trait PipelineStore: Send + Sync {
    /// Pipelines of `account` whose embedded runtime name is reserved.
    async fn reserved_runtime_pipelines(
        &self,
        account: &AccountId,
        pattern: &ReservedPattern,
    ) -> Result<BoxCursor<Pipeline>, StoreError>;

    /// Unset the embedded runtime reference on one pipeline, keyed by
    /// its id. Unsetting an already-clean pipeline is a no-op success.
    async fn clear_runtime_reference(&self, pipeline_id: &str) -> Result<(), StoreError>;
}

/// Per-account default-runtime bindings.
#[async_trait]
pub trait DefaultRuntimeStore: Send + Sync {
    /// Bindings of `account` whose runtime name is reserved.
    async fn reserved_default_bindings(
        &self,
        account: &AccountId,
        pattern: &ReservedPattern,
    ) -> Result<BoxCursor<DefaultRuntimeBinding>, StoreError>;

    /// Delete one binding re-identified by runtime name and account id.
    async fn delete_binding(
        &self,
        account: &AccountId,
        runtime_name: &str,
    ) -> Result<(), StoreError>;
}

/// Shared runtime environments with account membership lists.
#[async_trait]
pub trait RuntimeEnvironmentStore: Send + Sync {
    /// Reserved-named environments listing `account` as a member.
    async fn reserved_memberships(
        &self,
        account: &AccountId,
        pattern: &ReservedPattern,
    ) -> Result<BoxCursor<RuntimeEnvironment>, StoreError>;

    /// Remove `account` from one environment's membership list, keyed
    /// by the environment's id. The environment itself survives.
    async fn remove_member(&self, runtime_id: &str, account: &AccountId) -> Result<(), StoreError>;
}
