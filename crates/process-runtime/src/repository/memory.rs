use std::collections::{BTreeMap, HashSet};
use std::io::{Cursor, Read};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use tracing::info;

use super::bpmn::{parse_processes, BpmnProcess};
use super::definition::{
    DeploymentBuilder, DeploymentEntity, DeploymentId, ProcessDefinitionEntity,
    ProcessDefinitionQuery,
};
use super::{RepositoryError, RepositoryService};

/// Process repository kept entirely in memory for the lifetime of the host.
#[derive(Debug, Default)]
pub struct InMemoryRepositoryService {
    state: RwLock<RepositoryState>,
}

#[derive(Debug, Default)]
struct RepositoryState {
    last_deployment_id: u64,
    deployments: Vec<DeploymentEntity>,
    definitions: Vec<ProcessDefinitionEntity>,
}

impl RepositoryState {
    fn latest_version(&self, key: &str) -> u32 {
        self.definitions
            .iter()
            .filter(|definition| definition.key == key)
            .map(|definition| definition.version)
            .max()
            .unwrap_or(0)
    }
}

impl InMemoryRepositoryService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every executable process found in the builder's resources.
    ///
    /// All resources are parsed before anything is stored, so a bad model
    /// leaves the repository untouched.
    pub fn deploy(&self, builder: DeploymentBuilder) -> Result<DeploymentEntity, RepositoryError> {
        let DeploymentBuilder {
            name,
            resources,
            duplicate_filtering,
        } = builder;

        if resources.is_empty() {
            return Err(RepositoryError::EmptyDeployment(name));
        }

        let mut resource_names = HashSet::new();
        if let Some(repeated) = resources
            .iter()
            .find(|resource| !resource_names.insert(resource.name.as_str()))
        {
            return Err(RepositoryError::DuplicateResource {
                resource: repeated.name.clone(),
                deployment: name,
            });
        }

        let mut parsed: Vec<(String, Vec<BpmnProcess>)> = Vec::with_capacity(resources.len());
        let mut keys = HashSet::new();
        for resource in &resources {
            let processes =
                parse_processes(&resource.bytes).map_err(|source| RepositoryError::InvalidModel {
                    resource: resource.name.clone(),
                    source,
                })?;
            for process in processes.iter().filter(|process| process.executable) {
                if !keys.insert(process.id.clone()) {
                    return Err(RepositoryError::DuplicateProcessKey {
                        key: process.id.clone(),
                        deployment: name,
                    });
                }
            }
            parsed.push((resource.name.clone(), processes));
        }

        let mut state = self.write()?;

        if duplicate_filtering {
            let previous = state
                .deployments
                .iter()
                .rev()
                .find(|deployment| deployment.name == name);
            if let Some(previous) = previous {
                if previous.has_same_resources(&resources) {
                    info!(
                        deployment_id = %previous.id,
                        deployment = %name,
                        "resources unchanged; keeping existing deployment"
                    );
                    return Ok(previous.clone());
                }
            }
        }

        state.last_deployment_id += 1;
        let deployment_id = DeploymentId(state.last_deployment_id.to_string());

        let mut registered = Vec::new();
        for (resource_name, processes) in parsed {
            for process in processes.into_iter().filter(|process| process.executable) {
                let version = state.latest_version(&process.id) + 1;
                registered.push(ProcessDefinitionEntity {
                    id: ProcessDefinitionEntity::compose_id(&process.id, version, &deployment_id),
                    key: process.id,
                    name: process.name,
                    description: process.documentation,
                    version,
                    deployment_id: deployment_id.clone(),
                    resource_name: resource_name.clone(),
                });
            }
        }

        let deployment = DeploymentEntity {
            id: deployment_id,
            name,
            deployed_at: Utc::now(),
            resources,
        };

        info!(
            deployment_id = %deployment.id,
            deployment = %deployment.name,
            resources = deployment.resources.len(),
            definitions = registered.len(),
            "deployment registered"
        );

        state.definitions.extend(registered);
        state.deployments.push(deployment.clone());
        Ok(deployment)
    }

    pub fn deployments(&self) -> Result<Vec<DeploymentEntity>, RepositoryError> {
        Ok(self.read()?.deployments.clone())
    }

    pub fn process_definition(
        &self,
        process_definition_id: &str,
    ) -> Result<ProcessDefinitionEntity, RepositoryError> {
        self.read()?
            .definitions
            .iter()
            .find(|definition| definition.id == process_definition_id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(process_definition_id.to_string()))
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, RepositoryState>, RepositoryError> {
        self.state
            .read()
            .map_err(|_| RepositoryError::Unavailable("repository lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, RepositoryState>, RepositoryError> {
        self.state
            .write()
            .map_err(|_| RepositoryError::Unavailable("repository lock poisoned".to_string()))
    }
}

impl RepositoryService for InMemoryRepositoryService {
    fn list_process_definitions(
        &self,
        query: &ProcessDefinitionQuery,
    ) -> Result<Vec<ProcessDefinitionEntity>, RepositoryError> {
        let state = self.read()?;
        let matching = state
            .definitions
            .iter()
            .filter(|definition| query.matches(definition));

        let mut definitions: Vec<ProcessDefinitionEntity> = if query.latest_version {
            let mut latest: BTreeMap<&str, &ProcessDefinitionEntity> = BTreeMap::new();
            for definition in matching {
                let slot = latest.entry(definition.key.as_str()).or_insert(definition);
                if definition.version > slot.version {
                    *slot = definition;
                }
            }
            latest.into_values().cloned().collect()
        } else {
            matching.cloned().collect()
        };

        definitions.sort_by(|left, right| {
            left.key
                .cmp(&right.key)
                .then_with(|| left.version.cmp(&right.version))
        });
        Ok(definitions)
    }

    fn process_model(
        &self,
        process_definition_id: &str,
    ) -> Result<Box<dyn Read + Send>, RepositoryError> {
        let state = self.read()?;
        let definition = state
            .definitions
            .iter()
            .find(|definition| definition.id == process_definition_id)
            .ok_or_else(|| RepositoryError::NotFound(process_definition_id.to_string()))?;

        let bytes = state
            .deployments
            .iter()
            .find(|deployment| deployment.id == definition.deployment_id)
            .and_then(|deployment| deployment.resource(&definition.resource_name))
            .map(|resource| resource.bytes.clone())
            .ok_or_else(|| RepositoryError::NotFound(process_definition_id.to_string()))?;

        Ok(Box::new(Cursor::new(bytes)))
    }
}
