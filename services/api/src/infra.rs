use metrics_exporter_prometheus::PrometheusHandle;
use process_runtime::config::DeploymentConfig;
use process_runtime::deployment::ProcessDefinitionDeployer;
use process_runtime::error::AppError;
use process_runtime::events::{
    InMemoryEventPublisher, LoggingDeployedListener, ProcessDeployedEvent,
    ProcessDeployedEventProducer, ProcessRuntimeEventListener,
};
use process_runtime::model::ApiProcessDefinitionConverter;
use process_runtime::repository::InMemoryRepositoryService;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) repository: Arc<InMemoryRepositoryService>,
    pub(crate) publisher: Arc<InMemoryEventPublisher>,
}

/// Repository, publisher and producer wired together for one process.
pub(crate) struct ProcessRuntime {
    pub(crate) repository: Arc<InMemoryRepositoryService>,
    pub(crate) publisher: Arc<InMemoryEventPublisher>,
    pub(crate) producer: ProcessDeployedEventProducer,
}

impl ProcessRuntime {
    /// Auto-deploys the configured models before building the producer.
    pub(crate) fn bootstrap(config: &DeploymentConfig) -> Result<Self, AppError> {
        let repository = Arc::new(InMemoryRepositoryService::new());
        ProcessDefinitionDeployer::new(config.clone()).deploy(&repository)?;

        let publisher = Arc::new(InMemoryEventPublisher::new());
        let listeners: Vec<Arc<dyn ProcessRuntimeEventListener<ProcessDeployedEvent>>> =
            vec![Arc::new(LoggingDeployedListener)];
        let producer = ProcessDeployedEventProducer::new(
            repository.clone(),
            Arc::new(ApiProcessDefinitionConverter),
            listeners,
            publisher.clone(),
        );

        Ok(Self {
            repository,
            publisher,
            producer,
        })
    }
}
