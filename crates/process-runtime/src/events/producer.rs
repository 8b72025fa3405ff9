use std::io::Read;
use std::sync::Arc;

use tracing::{debug, info};

use super::deployed::{ProcessDeployedEvent, ProcessDeployedEvents};
use super::listener::{ListenerError, ProcessRuntimeEventListener};
use super::publisher::{ApplicationEvent, ApplicationEventPublisher, PublishError};
use crate::application::ApplicationReadyEvent;
use crate::model::{ConversionError, ProcessDefinition, ProcessDefinitionConverter};
use crate::repository::{ProcessDefinitionQuery, RepositoryError, RepositoryService};

/// Announces every deployed process definition once a servlet host is ready.
///
/// Events are built up front, one per definition. Each listener then sees
/// the complete sequence before the next listener is called, and the batch
/// is finally handed to the application publisher. Failures stop delivery
/// where they happen; listeners already notified stay notified.
pub struct ProcessDeployedEventProducer {
    repository: Arc<dyn RepositoryService>,
    converter: Arc<dyn ProcessDefinitionConverter>,
    listeners: Vec<Arc<dyn ProcessRuntimeEventListener<ProcessDeployedEvent>>>,
    publisher: Arc<dyn ApplicationEventPublisher>,
}

impl ProcessDeployedEventProducer {
    pub fn new(
        repository: Arc<dyn RepositoryService>,
        converter: Arc<dyn ProcessDefinitionConverter>,
        listeners: Vec<Arc<dyn ProcessRuntimeEventListener<ProcessDeployedEvent>>>,
        publisher: Arc<dyn ApplicationEventPublisher>,
    ) -> Self {
        Self {
            repository,
            converter,
            listeners,
            publisher,
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn on_application_event(
        &self,
        event: &ApplicationReadyEvent,
    ) -> Result<(), DeploymentEventError> {
        let application_type = event.web_application_type();
        if !application_type.is_servlet() {
            debug!(%application_type, "not a servlet application; skipping deployed events");
            return Ok(());
        }

        let entities = self
            .repository
            .list_process_definitions(&ProcessDefinitionQuery::new())?;
        let definitions = self.converter.convert_all(&entities)?;

        let batch = definitions
            .into_iter()
            .map(|definition| self.deployed_event(definition))
            .collect::<Result<Vec<_>, _>>()
            .map(ProcessDeployedEvents::new)?;

        for listener in &self.listeners {
            for deployed in batch.events() {
                listener.on_event(deployed)?;
            }
        }

        let delivered = batch.len();
        if !batch.is_empty() {
            self.publisher
                .publish_event(ApplicationEvent::ProcessesDeployed(batch))?;
        }

        info!(
            definitions = delivered,
            listeners = self.listeners.len(),
            ready_at = %event.ready_at(),
            "deployed process definitions announced"
        );
        Ok(())
    }

    fn deployed_event(
        &self,
        definition: ProcessDefinition,
    ) -> Result<ProcessDeployedEvent, DeploymentEventError> {
        let mut content = String::new();
        self.repository
            .process_model(definition.id())?
            .read_to_string(&mut content)
            .map_err(|source| DeploymentEventError::ModelContent {
                process_definition_id: definition.id.clone(),
                source,
            })?;
        Ok(ProcessDeployedEvent::new(definition, content))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DeploymentEventError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Conversion(#[from] ConversionError),
    #[error("unable to read process model for '{process_definition_id}': {source}")]
    ModelContent {
        process_definition_id: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Listener(#[from] ListenerError),
    #[error(transparent)]
    Publish(#[from] PublishError),
}
