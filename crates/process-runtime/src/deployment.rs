//! Startup deployment of process models found on disk.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::DeploymentConfig;
use crate::repository::{
    DeploymentBuilder, DeploymentEntity, InMemoryRepositoryService, RepositoryError,
};

#[derive(Debug, thiserror::Error)]
pub enum DeploymentError {
    #[error("unable to read process models from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Scans the configured location and deploys every matching model as one
/// deployment, skipping it when nothing changed since the last run.
#[derive(Debug, Clone)]
pub struct ProcessDefinitionDeployer {
    config: DeploymentConfig,
}

impl ProcessDefinitionDeployer {
    pub fn new(config: DeploymentConfig) -> Self {
        Self { config }
    }

    /// Matching model files, sorted by path.
    pub fn discover(&self) -> Result<Vec<PathBuf>, DeploymentError> {
        let root = &self.config.process_definition_location;
        if !root.is_dir() {
            return Ok(Vec::new());
        }

        let mut found = Vec::new();
        collect_models(root, &self.config.process_definition_suffixes, &mut found)?;
        found.sort();
        Ok(found)
    }

    pub fn deploy(
        &self,
        repository: &InMemoryRepositoryService,
    ) -> Result<Option<DeploymentEntity>, DeploymentError> {
        if !self.config.check_process_definitions {
            info!("process definition check disabled; skipping auto deployment");
            return Ok(None);
        }

        let location = &self.config.process_definition_location;
        if !location.is_dir() {
            warn!(location = %location.display(), "process definition location not found");
            return Ok(None);
        }

        let models = self.discover()?;
        if models.is_empty() {
            info!(location = %location.display(), "no process definitions found");
            return Ok(None);
        }

        let mut builder =
            DeploymentBuilder::new(self.config.deployment_name.clone()).enable_duplicate_filtering();
        for path in &models {
            let bytes = fs::read(path).map_err(|source| DeploymentError::Io {
                path: path.clone(),
                source,
            })?;
            builder = builder.add_bytes(resource_name(location, path), bytes);
        }

        info!(
            deployment = builder.name(),
            resources = builder.resource_count(),
            location = %location.display(),
            "deploying process models"
        );
        let deployment = repository.deploy(builder)?;
        Ok(Some(deployment))
    }
}

fn collect_models(
    dir: &Path,
    suffixes: &[String],
    found: &mut Vec<PathBuf>,
) -> Result<(), DeploymentError> {
    let io_error = |source| DeploymentError::Io {
        path: dir.to_path_buf(),
        source,
    };

    for entry in fs::read_dir(dir).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();
        if path.is_dir() {
            collect_models(&path, suffixes, found)?;
            continue;
        }

        let matches = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| suffixes.iter().any(|suffix| name.ends_with(suffix.as_str())));
        if matches {
            found.push(path);
        }
    }
    Ok(())
}

/// Location-relative path with `/` separators.
fn resource_name(location: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(location).unwrap_or(path);
    relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
