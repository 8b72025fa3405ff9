use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DeploymentId(pub String);

impl fmt::Display for DeploymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stored form of a deployed process definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessDefinitionEntity {
    /// `{key}:{version}:{deployment_id}`
    pub id: String,
    pub key: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub version: u32,
    pub deployment_id: DeploymentId,
    pub resource_name: String,
}

impl ProcessDefinitionEntity {
    pub fn compose_id(key: &str, version: u32, deployment_id: &DeploymentId) -> String {
        format!("{key}:{version}:{deployment_id}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceEntity {
    pub name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct DeploymentEntity {
    pub id: DeploymentId,
    pub name: String,
    pub deployed_at: DateTime<Utc>,
    pub resources: Vec<ResourceEntity>,
}

impl DeploymentEntity {
    pub fn resource(&self, name: &str) -> Option<&ResourceEntity> {
        self.resources.iter().find(|resource| resource.name == name)
    }

    /// Same resource names with byte-identical content, order insensitive.
    pub(crate) fn has_same_resources(&self, other: &[ResourceEntity]) -> bool {
        self.resources.len() == other.len()
            && other.iter().all(|candidate| {
                self.resource(&candidate.name)
                    .is_some_and(|existing| existing.bytes == candidate.bytes)
            })
    }
}

/// Collects resources for a single deployment.
#[derive(Debug, Clone)]
pub struct DeploymentBuilder {
    pub(crate) name: String,
    pub(crate) resources: Vec<ResourceEntity>,
    pub(crate) duplicate_filtering: bool,
}

impl DeploymentBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resources: Vec::new(),
            duplicate_filtering: false,
        }
    }

    pub fn add_bytes(mut self, resource_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.resources.push(ResourceEntity {
            name: resource_name.into(),
            bytes,
        });
        self
    }

    pub fn add_string(self, resource_name: impl Into<String>, text: &str) -> Self {
        self.add_bytes(resource_name, text.as_bytes().to_vec())
    }

    /// Skip the deployment when the latest one with the same name carries
    /// identical resources.
    pub fn enable_duplicate_filtering(mut self) -> Self {
        self.duplicate_filtering = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }
}

/// Filter over deployed definitions. The default matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessDefinitionQuery {
    pub key: Option<String>,
    pub deployment_id: Option<DeploymentId>,
    pub latest_version: bool,
}

impl ProcessDefinitionQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process_definition_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn deployment_id(mut self, deployment_id: DeploymentId) -> Self {
        self.deployment_id = Some(deployment_id);
        self
    }

    pub fn latest_version(mut self) -> Self {
        self.latest_version = true;
        self
    }

    /// Key and deployment filters only; `latest_version` needs the whole set.
    pub(crate) fn matches(&self, entity: &ProcessDefinitionEntity) -> bool {
        let key_matches = self.key.as_ref().map_or(true, |key| &entity.key == key);
        let deployment_matches = self
            .deployment_id
            .as_ref()
            .map_or(true, |id| &entity.deployment_id == id);
        key_matches && deployment_matches
    }
}
