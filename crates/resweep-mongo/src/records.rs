//! Wire-format records for the three stores.
//!
//! The collections are schemaless; these mirror only the paths the
//! filters and mutations touch. Account references are ObjectIds on
//! the wire and hex strings in the core model; the conversion lives at
//! this boundary only.

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use resweep_core::{
    AccountId, DefaultRuntimeBinding, Pipeline, RuntimeEnvironment, RuntimeReference,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct AccountRecord {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct PipelineRecord {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub metadata: PipelineMetadata,
    #[serde(default)]
    pub spec: PipelineSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PipelineMetadata {
    pub account_id: ObjectId,
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PipelineSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime_environment: Option<RuntimeReferenceRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct RuntimeReferenceRecord {
    pub name: String,
}

impl From<PipelineRecord> for Pipeline {
    fn from(record: PipelineRecord) -> Self {
        Self {
            id: record.id.to_hex(),
            account_id: AccountId::new(record.metadata.account_id.to_hex()),
            name: record.metadata.name,
            runtime_environment: record
                .spec
                .runtime_environment
                .map(|runtime| RuntimeReference { name: runtime.name }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DefaultRuntimeRecord {
    pub account_id: ObjectId,
    pub runtime_environment_name: String,
}

impl From<DefaultRuntimeRecord> for DefaultRuntimeBinding {
    fn from(record: DefaultRuntimeRecord) -> Self {
        Self {
            account_id: AccountId::new(record.account_id.to_hex()),
            runtime_environment_name: record.runtime_environment_name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct RuntimeEnvironmentRecord {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub metadata: RuntimeEnvironmentMetadata,
    #[serde(default)]
    pub accounts: Vec<ObjectId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct RuntimeEnvironmentMetadata {
    pub name: String,
}

impl From<RuntimeEnvironmentRecord> for RuntimeEnvironment {
    fn from(record: RuntimeEnvironmentRecord) -> Self {
        Self {
            id: record.id.to_hex(),
            name: record.metadata.name,
            accounts: record
                .accounts
                .into_iter()
                .map(|id| AccountId::new(id.to_hex()))
                .collect(),
        }
    }
}
