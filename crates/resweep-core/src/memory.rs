//! In-memory store backends for exercising the engine without a server.
//!
//! State lives behind a mutex so the handles can be shared by reference
//! the same way backend handles are. Mutation failures are injectable
//! per document to drive the failure-collection paths.

use std::collections::BTreeSet;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::account::AccountId;
use crate::document::{Account, DefaultRuntimeBinding, Pipeline, RuntimeEnvironment};
use crate::reserved::ReservedPattern;
use crate::store::{
    AccountDirectory, BoxCursor, DefaultRuntimeStore, DocumentCursor, PipelineStore,
    RuntimeEnvironmentStore, StoreError,
};

/// Cursor over pre-collected documents.
pub struct VecCursor<D> {
    items: std::vec::IntoIter<D>,
}

impl<D> VecCursor<D> {
    pub fn new(items: Vec<D>) -> Self {
        Self {
            items: items.into_iter(),
        }
    }
}

#[async_trait]
impl<D: Send> DocumentCursor<D> for VecCursor<D> {
    async fn advance(&mut self) -> Result<Option<D>, StoreError> {
        Ok(self.items.next())
    }
}

/// Account directory backed by a fixed list.
#[derive(Debug, Default)]
pub struct MemoryAccounts {
    accounts: Vec<Account>,
}

impl MemoryAccounts {
    pub fn new(accounts: Vec<Account>) -> Self {
        Self { accounts }
    }
}

#[async_trait]
impl AccountDirectory for MemoryAccounts {
    async fn find_account_id(&self, name: &str) -> Result<Option<AccountId>, StoreError> {
        Ok(self
            .accounts
            .iter()
            .find(|account| account.name == name)
            .map(|account| account.id.clone()))
    }
}

fn injected_failure(key: &str) -> StoreError {
    StoreError::Backend(format!("injected failure for {key}"))
}

/// Pipeline store with injectable per-pipeline mutation failures.
#[derive(Debug, Default)]
pub struct MemoryPipelines {
    state: Mutex<Vec<Pipeline>>,
    fail_on: BTreeSet<String>,
}

impl MemoryPipelines {
    pub fn new(pipelines: Vec<Pipeline>) -> Self {
        Self {
            state: Mutex::new(pipelines),
            fail_on: BTreeSet::new(),
        }
    }

    /// Make mutations of the pipeline with `id` fail.
    pub fn fail_on(mut self, id: impl Into<String>) -> Self {
        self.fail_on.insert(id.into());
        self
    }

    /// Current pipeline documents, in insertion order.
    pub fn snapshot(&self) -> Vec<Pipeline> {
        self.state.lock().expect("pipeline state lock").clone()
    }
}

#[async_trait]
impl PipelineStore for MemoryPipelines {
    async fn reserved_runtime_pipelines(
        &self,
        account: &AccountId,
        pattern: &ReservedPattern,
    ) -> Result<BoxCursor<Pipeline>, StoreError> {
        let matching: Vec<Pipeline> = self
            .state
            .lock()
            .expect("pipeline state lock")
            .iter()
            .filter(|pipeline| pipeline.account_id == *account)
            .filter(|pipeline| {
                pipeline
                    .runtime_environment
                    .as_ref()
                    .is_some_and(|runtime| pattern.matches(&runtime.name))
            })
            .cloned()
            .collect();
        Ok(Box::new(VecCursor::new(matching)))
    }

    async fn clear_runtime_reference(&self, pipeline_id: &str) -> Result<(), StoreError> {
        if self.fail_on.contains(pipeline_id) {
            return Err(injected_failure(pipeline_id));
        }
        let mut state = self.state.lock().expect("pipeline state lock");
        // Unknown ids fall through: an update keyed by primary key on a
        // vanished document is a no-op success.
        if let Some(pipeline) = state.iter_mut().find(|p| p.id == pipeline_id) {
            pipeline.runtime_environment = None;
        }
        Ok(())
    }
}

/// Default-runtime binding store with injectable failures keyed by
/// runtime name.
#[derive(Debug, Default)]
pub struct MemoryDefaults {
    state: Mutex<Vec<DefaultRuntimeBinding>>,
    fail_on: BTreeSet<String>,
}

impl MemoryDefaults {
    pub fn new(bindings: Vec<DefaultRuntimeBinding>) -> Self {
        Self {
            state: Mutex::new(bindings),
            fail_on: BTreeSet::new(),
        }
    }

    /// Make deletions of bindings naming `runtime_name` fail.
    pub fn fail_on(mut self, runtime_name: impl Into<String>) -> Self {
        self.fail_on.insert(runtime_name.into());
        self
    }

    /// Current bindings, in insertion order.
    pub fn snapshot(&self) -> Vec<DefaultRuntimeBinding> {
        self.state.lock().expect("binding state lock").clone()
    }
}

#[async_trait]
impl DefaultRuntimeStore for MemoryDefaults {
    async fn reserved_default_bindings(
        &self,
        account: &AccountId,
        pattern: &ReservedPattern,
    ) -> Result<BoxCursor<DefaultRuntimeBinding>, StoreError> {
        let matching: Vec<DefaultRuntimeBinding> = self
            .state
            .lock()
            .expect("binding state lock")
            .iter()
            .filter(|binding| binding.account_id == *account)
            .filter(|binding| pattern.matches(&binding.runtime_environment_name))
            .cloned()
            .collect();
        Ok(Box::new(VecCursor::new(matching)))
    }

    async fn delete_binding(
        &self,
        account: &AccountId,
        runtime_name: &str,
    ) -> Result<(), StoreError> {
        if self.fail_on.contains(runtime_name) {
            return Err(injected_failure(runtime_name));
        }
        let mut state = self.state.lock().expect("binding state lock");
        state.retain(|binding| {
            !(binding.account_id == *account && binding.runtime_environment_name == runtime_name)
        });
        Ok(())
    }
}

/// Runtime-environment store with injectable failures keyed by
/// environment id.
#[derive(Debug, Default)]
pub struct MemoryRuntimes {
    state: Mutex<Vec<RuntimeEnvironment>>,
    fail_on: BTreeSet<String>,
}

impl MemoryRuntimes {
    pub fn new(environments: Vec<RuntimeEnvironment>) -> Self {
        Self {
            state: Mutex::new(environments),
            fail_on: BTreeSet::new(),
        }
    }

    /// Make membership removals on the environment with `id` fail.
    pub fn fail_on(mut self, id: impl Into<String>) -> Self {
        self.fail_on.insert(id.into());
        self
    }

    /// Current environments, in insertion order.
    pub fn snapshot(&self) -> Vec<RuntimeEnvironment> {
        self.state.lock().expect("environment state lock").clone()
    }
}

#[async_trait]
impl RuntimeEnvironmentStore for MemoryRuntimes {
    async fn reserved_memberships(
        &self,
        account: &AccountId,
        pattern: &ReservedPattern,
    ) -> Result<BoxCursor<RuntimeEnvironment>, StoreError> {
        let matching: Vec<RuntimeEnvironment> = self
            .state
            .lock()
            .expect("environment state lock")
            .iter()
            .filter(|environment| pattern.matches(&environment.name))
            .filter(|environment| environment.accounts.contains(account))
            .cloned()
            .collect();
        Ok(Box::new(VecCursor::new(matching)))
    }

    async fn remove_member(&self, runtime_id: &str, account: &AccountId) -> Result<(), StoreError> {
        if self.fail_on.contains(runtime_id) {
            return Err(injected_failure(runtime_id));
        }
        let mut state = self.state.lock().expect("environment state lock");
        if let Some(environment) = state.iter_mut().find(|e| e.id == runtime_id) {
            environment.accounts.retain(|member| member != account);
        }
        Ok(())
    }
}
