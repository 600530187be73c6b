//! # resweep-mongo
//!
//! MongoDB adapter for the resweep storage seams.
//!
//! Three independent clients, one per logical store, exposing the four
//! collection handles a remediation run needs. Filters and mutations
//! are the server-side mirror of the core predicates: `$regex` on the
//! runtime name plus account equality, `$unset` for the pipeline
//! reference, `deleteOne` for default bindings, `$pull` for
//! memberships.

mod records;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{Bson, Document, Regex as BsonRegex, doc};
use mongodb::{Client, Collection, Database};
use tracing::info;

use resweep_core::{
    AccountDirectory, AccountId, BoxCursor, DefaultRuntimeBinding, DefaultRuntimeStore,
    DocumentCursor, Pipeline, PipelineStore, ReservedPattern, RuntimeEnvironment,
    RuntimeEnvironmentStore, StoreError,
};

use records::{AccountRecord, DefaultRuntimeRecord, PipelineRecord, RuntimeEnvironmentRecord};

/// Connection strings for the three logical stores. Each URI must name
/// a default database.
#[derive(Debug, Clone)]
pub struct MongoConfig {
    pub accounts_uri: String,
    pub pipelines_uri: String,
    pub runtimes_uri: String,
}

/// Errors from connection bootstrap.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("failed to connect to {store} store: {cause}")]
    Connect { store: &'static str, cause: String },

    #[error("{store} connection string names no default database")]
    MissingDatabase { store: &'static str },
}

/// The four collection handles, ready for a remediation run.
pub struct MongoStores {
    pub accounts: MongoAccounts,
    pub pipelines: MongoPipelines,
    pub defaults: MongoDefaults,
    pub runtimes: MongoRuntimes,
}

/// Connect the three clients and resolve the collection handles.
///
/// The clients are established concurrently; any failure is fatal to
/// the run before a single document is touched. The driver defers
/// socket work until the first operation, so an unreachable server
/// surfaces at the account lookup rather than here.
pub async fn connect(config: &MongoConfig) -> Result<MongoStores, ConnectError> {
    info!("connecting to stores");
    let (accounts_client, pipelines_client, runtimes_client) = tokio::try_join!(
        connect_store("accounts", &config.accounts_uri),
        connect_store("pipelines", &config.pipelines_uri),
        connect_store("runtime-environments", &config.runtimes_uri),
    )?;

    let accounts_db = default_database(&accounts_client, "accounts")?;
    let pipelines_db = default_database(&pipelines_client, "pipelines")?;
    let runtimes_db = default_database(&runtimes_client, "runtime-environments")?;
    info!("connected to stores");

    Ok(MongoStores {
        accounts: MongoAccounts {
            collection: accounts_db.collection("accounts"),
        },
        pipelines: MongoPipelines {
            collection: pipelines_db.collection("pipelines"),
        },
        defaults: MongoDefaults {
            collection: runtimes_db.collection("defaults"),
        },
        runtimes: MongoRuntimes {
            collection: runtimes_db.collection("runtime-environment"),
        },
    })
}

async fn connect_store(store: &'static str, uri: &str) -> Result<Client, ConnectError> {
    Client::with_uri_str(uri)
        .await
        .map_err(|e| ConnectError::Connect {
            store,
            cause: e.to_string(),
        })
}

fn default_database(client: &Client, store: &'static str) -> Result<Database, ConnectError> {
    client
        .default_database()
        .ok_or(ConnectError::MissingDatabase { store })
}

fn backend_error(err: mongodb::error::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

fn parse_object_id(id: &str) -> Result<ObjectId, StoreError> {
    ObjectId::parse_str(id)
        .map_err(|e| StoreError::MalformedDocument(format!("invalid object id {id}: {e}")))
}

fn reserved_name_regex(pattern: &ReservedPattern) -> Bson {
    Bson::RegularExpression(BsonRegex {
        pattern: pattern.pattern().to_string(),
        options: String::new(),
    })
}

fn pipeline_filter(account: ObjectId, pattern: &ReservedPattern) -> Document {
    doc! {
        "$and": [
            { "metadata.accountId": account },
            { "spec.runtimeEnvironment.name": reserved_name_regex(pattern) },
        ]
    }
}

fn clear_runtime_update() -> Document {
    doc! { "$unset": { "spec.runtimeEnvironment": "" } }
}

fn default_binding_filter(account: ObjectId, pattern: &ReservedPattern) -> Document {
    doc! {
        "$and": [
            { "runtimeEnvironmentName": reserved_name_regex(pattern) },
            { "accountId": account },
        ]
    }
}

fn delete_binding_filter(account: ObjectId, runtime_name: &str) -> Document {
    doc! {
        "$and": [
            { "runtimeEnvironmentName": runtime_name },
            { "accountId": account },
        ]
    }
}

fn membership_filter(account: ObjectId, pattern: &ReservedPattern) -> Document {
    doc! {
        "$and": [
            { "metadata.name": reserved_name_regex(pattern) },
            { "accounts": { "$in": [account] } },
        ]
    }
}

fn pull_member_update(account: ObjectId) -> Document {
    doc! { "$pull": { "accounts": { "$in": [account] } } }
}

/// Cursor adapter mapping wire records into core documents.
struct RecordCursor<R, D> {
    inner: mongodb::Cursor<R>,
    convert: fn(R) -> D,
}

#[async_trait]
impl<R, D> DocumentCursor<D> for RecordCursor<R, D>
where
    R: serde::de::DeserializeOwned + Send + Sync + Unpin,
    D: Send,
{
    async fn advance(&mut self) -> Result<Option<D>, StoreError> {
        let next = self.inner.try_next().await.map_err(backend_error)?;
        Ok(next.map(self.convert))
    }
}

/// Accounts collection: read-only name to id lookup.
pub struct MongoAccounts {
    collection: Collection<AccountRecord>,
}

#[async_trait]
impl AccountDirectory for MongoAccounts {
    async fn find_account_id(&self, name: &str) -> Result<Option<AccountId>, StoreError> {
        let record = self
            .collection
            .find_one(doc! { "name": name })
            .await
            .map_err(backend_error)?;
        Ok(record.map(|record| AccountId::new(record.id.to_hex())))
    }
}

/// Pipelines collection.
pub struct MongoPipelines {
    collection: Collection<PipelineRecord>,
}

#[async_trait]
impl PipelineStore for MongoPipelines {
    async fn reserved_runtime_pipelines(
        &self,
        account: &AccountId,
        pattern: &ReservedPattern,
    ) -> Result<BoxCursor<Pipeline>, StoreError> {
        let account = parse_object_id(account.as_str())?;
        let cursor = self
            .collection
            .find(pipeline_filter(account, pattern))
            .await
            .map_err(backend_error)?;
        Ok(Box::new(RecordCursor {
            inner: cursor,
            convert: Pipeline::from,
        }))
    }

    async fn clear_runtime_reference(&self, pipeline_id: &str) -> Result<(), StoreError> {
        let id = parse_object_id(pipeline_id)?;
        self.collection
            .update_one(doc! { "_id": id }, clear_runtime_update())
            .await
            .map_err(backend_error)?;
        Ok(())
    }
}

/// Default-runtime bindings collection.
pub struct MongoDefaults {
    collection: Collection<DefaultRuntimeRecord>,
}

#[async_trait]
impl DefaultRuntimeStore for MongoDefaults {
    async fn reserved_default_bindings(
        &self,
        account: &AccountId,
        pattern: &ReservedPattern,
    ) -> Result<BoxCursor<DefaultRuntimeBinding>, StoreError> {
        let account = parse_object_id(account.as_str())?;
        let cursor = self
            .collection
            .find(default_binding_filter(account, pattern))
            .await
            .map_err(backend_error)?;
        Ok(Box::new(RecordCursor {
            inner: cursor,
            convert: DefaultRuntimeBinding::from,
        }))
    }

    async fn delete_binding(
        &self,
        account: &AccountId,
        runtime_name: &str,
    ) -> Result<(), StoreError> {
        let account = parse_object_id(account.as_str())?;
        self.collection
            .delete_one(delete_binding_filter(account, runtime_name))
            .await
            .map_err(backend_error)?;
        Ok(())
    }
}

/// Runtime-environments collection.
pub struct MongoRuntimes {
    collection: Collection<RuntimeEnvironmentRecord>,
}

#[async_trait]
impl RuntimeEnvironmentStore for MongoRuntimes {
    async fn reserved_memberships(
        &self,
        account: &AccountId,
        pattern: &ReservedPattern,
    ) -> Result<BoxCursor<RuntimeEnvironment>, StoreError> {
        let account = parse_object_id(account.as_str())?;
        let cursor = self
            .collection
            .find(membership_filter(account, pattern))
            .await
            .map_err(backend_error)?;
        Ok(Box::new(RecordCursor {
            inner: cursor,
            convert: RuntimeEnvironment::from,
        }))
    }

    async fn remove_member(&self, runtime_id: &str, account: &AccountId) -> Result<(), StoreError> {
        let id = parse_object_id(runtime_id)?;
        let account = parse_object_id(account.as_str())?;
        self.collection
            .update_one(doc! { "_id": id }, pull_member_update(account))
            .await
            .map_err(backend_error)?;
        Ok(())
    }
}
