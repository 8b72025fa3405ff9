use tracing::info;

use super::deployed::ProcessDeployedEvent;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("listener failed: {0}")]
pub struct ListenerError(pub String);

impl ListenerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Sink for runtime events of type `E`.
pub trait ProcessRuntimeEventListener<E>: Send + Sync {
    fn on_event(&self, event: &E) -> Result<(), ListenerError>;
}

impl<E, F> ProcessRuntimeEventListener<E> for F
where
    F: Fn(&E) -> Result<(), ListenerError> + Send + Sync,
{
    fn on_event(&self, event: &E) -> Result<(), ListenerError> {
        self(event)
    }
}

/// Writes one log line per deployed definition.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingDeployedListener;

impl ProcessRuntimeEventListener<ProcessDeployedEvent> for LoggingDeployedListener {
    fn on_event(&self, event: &ProcessDeployedEvent) -> Result<(), ListenerError> {
        let definition = event.entity();
        info!(
            event_id = event.id(),
            process_definition_id = %definition.id,
            key = %definition.key,
            version = definition.version,
            model_bytes = event.process_model_content().len(),
            created_at = %event.timestamp(),
            "process definition deployed"
        );
        Ok(())
    }
}
