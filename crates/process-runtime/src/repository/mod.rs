//! Process definition storage and lookup.
//!
//! [`RepositoryService`] is the read side the deployment event producer
//! depends on; [`InMemoryRepositoryService`] is the bundled implementation
//! that also accepts new deployments.

pub mod bpmn;
pub mod definition;
pub mod memory;

use std::io::Read;

pub use bpmn::{parse_processes, BpmnParseError, BpmnProcess};
pub use definition::{
    DeploymentBuilder, DeploymentEntity, DeploymentId, ProcessDefinitionEntity,
    ProcessDefinitionQuery, ResourceEntity,
};
pub use memory::InMemoryRepositoryService;

/// Read access to deployed process definitions and their models.
pub trait RepositoryService: Send + Sync {
    /// Definitions matching `query`, in the order the store returns them.
    fn list_process_definitions(
        &self,
        query: &ProcessDefinitionQuery,
    ) -> Result<Vec<ProcessDefinitionEntity>, RepositoryError>;

    /// The BPMN resource a definition was deployed from.
    fn process_model(&self, process_definition_id: &str)
        -> Result<Box<dyn Read + Send>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("process definition '{0}' not found")]
    NotFound(String),
    #[error("resource '{resource}' is not a valid process model: {source}")]
    InvalidModel {
        resource: String,
        #[source]
        source: BpmnParseError,
    },
    #[error("process key '{key}' appears more than once in deployment '{deployment}'")]
    DuplicateProcessKey { key: String, deployment: String },
    #[error("resource '{resource}' appears more than once in deployment '{deployment}'")]
    DuplicateResource { resource: String, deployment: String },
    #[error("deployment '{0}' has no resources")]
    EmptyDeployment(String),
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
