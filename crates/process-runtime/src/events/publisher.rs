use std::sync::Mutex;

use serde::Serialize;

use super::deployed::ProcessDeployedEvents;

/// Events handed to the host's general-purpose publisher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
#[non_exhaustive]
pub enum ApplicationEvent {
    ProcessesDeployed(ProcessDeployedEvents),
}

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("event channel unavailable: {0}")]
    Unavailable(String),
}

pub trait ApplicationEventPublisher: Send + Sync {
    fn publish_event(&self, event: ApplicationEvent) -> Result<(), PublishError>;
}

/// Keeps every published event in memory.
#[derive(Debug, Default)]
pub struct InMemoryEventPublisher {
    events: Mutex<Vec<ApplicationEvent>>,
}

impl InMemoryEventPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ApplicationEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Most recent deployment batch, if any was published.
    pub fn latest_deployed(&self) -> Option<ProcessDeployedEvents> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .rev()
            .find_map(|event| match event {
                ApplicationEvent::ProcessesDeployed(deployed) => Some(deployed.clone()),
            })
    }
}

impl ApplicationEventPublisher for InMemoryEventPublisher {
    fn publish_event(&self, event: ApplicationEvent) -> Result<(), PublishError> {
        let mut guard = self
            .events
            .lock()
            .map_err(|_| PublishError::Unavailable("publisher mutex poisoned".to_string()))?;
        guard.push(event);
        Ok(())
    }
}
