//! The three remediation passes.
//!
//! Each pass borrows its store handle, the resolved account scope, and
//! the shared reserved-name predicate; none holds state of its own.

use async_trait::async_trait;

use crate::account::AccountScope;
use crate::document::{DefaultRuntimeBinding, Pipeline, RuntimeEnvironment};
use crate::reserved::ReservedPattern;
use crate::store::{
    BoxCursor, DefaultRuntimeStore, PipelineStore, RuntimeEnvironmentStore, StoreError,
};
use crate::sweep::{DocumentLabel, Sweep};

/// Unsets the embedded reserved-runtime reference on the account's
/// pipelines. Field removal only; the pipeline document survives.
pub struct PipelineSweep<'a, S: ?Sized> {
    pub store: &'a S,
    pub scope: &'a AccountScope,
    pub pattern: &'a ReservedPattern,
}

#[async_trait]
impl<S> Sweep for PipelineSweep<'_, S>
where
    S: PipelineStore + ?Sized,
{
    type Doc = Pipeline;

    fn description(&self) -> &'static str {
        "reserved runtime reference from pipeline"
    }

    async fn open(&self) -> Result<BoxCursor<Pipeline>, StoreError> {
        self.store
            .reserved_runtime_pipelines(&self.scope.id, self.pattern)
            .await
    }

    fn label(&self, doc: &Pipeline) -> DocumentLabel {
        DocumentLabel {
            id: doc.id.clone(),
            name: doc.name.clone(),
        }
    }

    async fn apply(&self, doc: &Pipeline) -> Result<(), StoreError> {
        self.store.clear_runtime_reference(&doc.id).await
    }

    fn success_message(&self, doc: &Pipeline) -> String {
        let runtime = doc
            .runtime_environment
            .as_ref()
            .map(|r| r.name.as_str())
            .unwrap_or("<unset>");
        format!(
            "removed runtime {runtime} from pipeline {} for account {}",
            doc.name, self.scope.name
        )
    }
}

/// Deletes the account's default-runtime bindings with reserved names.
/// Whole-row deletion, re-identified by (runtime name, account id).
pub struct DefaultRuntimeSweep<'a, S: ?Sized> {
    pub store: &'a S,
    pub scope: &'a AccountScope,
    pub pattern: &'a ReservedPattern,
}

#[async_trait]
impl<S> Sweep for DefaultRuntimeSweep<'_, S>
where
    S: DefaultRuntimeStore + ?Sized,
{
    type Doc = DefaultRuntimeBinding;

    fn description(&self) -> &'static str {
        "reserved default-runtime binding"
    }

    async fn open(&self) -> Result<BoxCursor<DefaultRuntimeBinding>, StoreError> {
        self.store
            .reserved_default_bindings(&self.scope.id, self.pattern)
            .await
    }

    fn label(&self, doc: &DefaultRuntimeBinding) -> DocumentLabel {
        DocumentLabel {
            id: doc.account_id.to_string(),
            name: doc.runtime_environment_name.clone(),
        }
    }

    async fn apply(&self, doc: &DefaultRuntimeBinding) -> Result<(), StoreError> {
        self.store
            .delete_binding(&self.scope.id, &doc.runtime_environment_name)
            .await
    }

    fn success_message(&self, doc: &DefaultRuntimeBinding) -> String {
        format!(
            "removed default runtime {} for account {}",
            doc.runtime_environment_name, self.scope.name
        )
    }
}

/// Pulls the account out of reserved runtime environments' membership
/// lists. The environment document survives for its other members.
pub struct RuntimeMembershipSweep<'a, S: ?Sized> {
    pub store: &'a S,
    pub scope: &'a AccountScope,
    pub pattern: &'a ReservedPattern,
}

#[async_trait]
impl<S> Sweep for RuntimeMembershipSweep<'_, S>
where
    S: RuntimeEnvironmentStore + ?Sized,
{
    type Doc = RuntimeEnvironment;

    fn description(&self) -> &'static str {
        "account membership from reserved runtime environment"
    }

    async fn open(&self) -> Result<BoxCursor<RuntimeEnvironment>, StoreError> {
        self.store
            .reserved_memberships(&self.scope.id, self.pattern)
            .await
    }

    fn label(&self, doc: &RuntimeEnvironment) -> DocumentLabel {
        DocumentLabel {
            id: doc.id.clone(),
            name: doc.name.clone(),
        }
    }

    async fn apply(&self, doc: &RuntimeEnvironment) -> Result<(), StoreError> {
        self.store.remove_member(&doc.id, &self.scope.id).await
    }

    fn success_message(&self, doc: &RuntimeEnvironment) -> String {
        format!(
            "removed account {} from runtime {}",
            self.scope.name, doc.name
        )
    }
}
