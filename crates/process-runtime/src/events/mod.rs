//! Runtime events raised for deployed process definitions and the
//! plumbing that delivers them.

pub mod deployed;
pub mod listener;
pub mod producer;
pub mod publisher;

pub use deployed::{ProcessDeployedEvent, ProcessDeployedEvents, PROCESS_DEPLOYED};
pub use listener::{ListenerError, LoggingDeployedListener, ProcessRuntimeEventListener};
pub use producer::{DeploymentEventError, ProcessDeployedEventProducer};
pub use publisher::{
    ApplicationEvent, ApplicationEventPublisher, InMemoryEventPublisher, PublishError,
};
