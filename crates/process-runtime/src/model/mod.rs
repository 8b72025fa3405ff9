//! API-facing process models and the conversion from repository entities.

use serde::{Deserialize, Serialize};

use crate::repository::ProcessDefinitionEntity;

/// Process definition as exposed to listeners and HTTP clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessDefinition {
    pub id: String,
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub version: u32,
    pub deployment_id: String,
}

impl ProcessDefinition {
    pub fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unable to convert process definition '{id}': {reason}")]
pub struct ConversionError {
    pub id: String,
    pub reason: String,
}

/// Maps repository entities onto [`ProcessDefinition`]s.
pub trait ProcessDefinitionConverter: Send + Sync {
    fn convert(
        &self,
        entity: &ProcessDefinitionEntity,
    ) -> Result<ProcessDefinition, ConversionError>;

    /// One output per input, in input order.
    fn convert_all(
        &self,
        entities: &[ProcessDefinitionEntity],
    ) -> Result<Vec<ProcessDefinition>, ConversionError> {
        entities
            .iter()
            .map(|entity| self.convert(entity))
            .collect()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ApiProcessDefinitionConverter;

impl ProcessDefinitionConverter for ApiProcessDefinitionConverter {
    fn convert(
        &self,
        entity: &ProcessDefinitionEntity,
    ) -> Result<ProcessDefinition, ConversionError> {
        Ok(ProcessDefinition {
            id: entity.id.clone(),
            key: entity.key.clone(),
            name: entity.name.clone(),
            description: entity.description.clone(),
            version: entity.version,
            deployment_id: entity.deployment_id.to_string(),
        })
    }
}
