use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::sync::{Arc, Mutex};

use process_runtime::application::{ApplicationReadyEvent, WebApplicationType};
use process_runtime::events::{
    ApplicationEvent, DeploymentEventError, InMemoryEventPublisher, ListenerError,
    ProcessDeployedEvent, ProcessDeployedEventProducer, ProcessRuntimeEventListener,
};
use process_runtime::model::{
    ApiProcessDefinitionConverter, ConversionError, ProcessDefinition, ProcessDefinitionConverter,
};
use process_runtime::repository::{
    DeploymentBuilder, DeploymentId, InMemoryRepositoryService, ProcessDefinitionEntity,
    ProcessDefinitionQuery, RepositoryError, RepositoryService,
};

#[derive(Default)]
struct StubRepository {
    definitions: Vec<ProcessDefinitionEntity>,
    models: HashMap<String, String>,
    calls: Mutex<Vec<String>>,
}

impl StubRepository {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls mutex").clone()
    }
}

impl RepositoryService for StubRepository {
    fn list_process_definitions(
        &self,
        _query: &ProcessDefinitionQuery,
    ) -> Result<Vec<ProcessDefinitionEntity>, RepositoryError> {
        self.calls.lock().expect("calls mutex").push("list".to_string());
        Ok(self.definitions.clone())
    }

    fn process_model(
        &self,
        process_definition_id: &str,
    ) -> Result<Box<dyn Read + Send>, RepositoryError> {
        self.calls
            .lock()
            .expect("calls mutex")
            .push(format!("model:{process_definition_id}"));
        let content = self
            .models
            .get(process_definition_id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(process_definition_id.to_string()))?;
        Ok(Box::new(Cursor::new(content.into_bytes())))
    }
}

/// Returns canned API definitions regardless of the entity contents.
#[derive(Default)]
struct StubConverter {
    converted: Vec<ProcessDefinition>,
    batches: Mutex<Vec<usize>>,
}

impl ProcessDefinitionConverter for StubConverter {
    fn convert(
        &self,
        entity: &ProcessDefinitionEntity,
    ) -> Result<ProcessDefinition, ConversionError> {
        Err(ConversionError {
            id: entity.id.clone(),
            reason: "single conversion not expected".to_string(),
        })
    }

    fn convert_all(
        &self,
        entities: &[ProcessDefinitionEntity],
    ) -> Result<Vec<ProcessDefinition>, ConversionError> {
        self.batches.lock().expect("batch mutex").push(entities.len());
        Ok(self.converted.clone())
    }
}

type DeliveryLog = Arc<Mutex<Vec<(&'static str, ProcessDefinition, String)>>>;

struct RecordingListener {
    name: &'static str,
    log: DeliveryLog,
    fail_on: Option<&'static str>,
}

impl RecordingListener {
    fn new(name: &'static str, log: DeliveryLog) -> Self {
        Self {
            name,
            log,
            fail_on: None,
        }
    }

    fn failing_on(name: &'static str, log: DeliveryLog, id: &'static str) -> Self {
        Self {
            name,
            log,
            fail_on: Some(id),
        }
    }
}

impl ProcessRuntimeEventListener<ProcessDeployedEvent> for RecordingListener {
    fn on_event(&self, event: &ProcessDeployedEvent) -> Result<(), ListenerError> {
        if self.fail_on == Some(event.entity().id.as_str()) {
            return Err(ListenerError::new(format!("{} rejected", self.name)));
        }
        self.log.lock().expect("log mutex").push((
            self.name,
            event.entity().clone(),
            event.process_model_content().to_string(),
        ));
        Ok(())
    }
}

fn internal_definition(key: &str) -> ProcessDefinitionEntity {
    let deployment_id = DeploymentId("1".to_string());
    ProcessDefinitionEntity {
        id: ProcessDefinitionEntity::compose_id(key, 1, &deployment_id),
        key: key.to_string(),
        name: None,
        description: None,
        version: 1,
        deployment_id,
        resource_name: format!("{key}.bpmn20.xml"),
    }
}

fn api_definition(id: &str) -> ProcessDefinition {
    ProcessDefinition {
        id: id.to_string(),
        key: id.to_string(),
        name: None,
        description: None,
        version: 1,
        deployment_id: "1".to_string(),
    }
}

struct Fixture {
    repository: Arc<StubRepository>,
    converter: Arc<StubConverter>,
    publisher: Arc<InMemoryEventPublisher>,
    log: DeliveryLog,
}

impl Fixture {
    fn two_definitions() -> Self {
        let mut models = HashMap::new();
        models.insert("id1".to_string(), "content1".to_string());
        models.insert("id2".to_string(), "content2".to_string());

        Self {
            repository: Arc::new(StubRepository {
                definitions: vec![internal_definition("first"), internal_definition("second")],
                models,
                calls: Mutex::new(Vec::new()),
            }),
            converter: Arc::new(StubConverter {
                converted: vec![api_definition("id1"), api_definition("id2")],
                batches: Mutex::new(Vec::new()),
            }),
            publisher: Arc::new(InMemoryEventPublisher::new()),
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn empty() -> Self {
        Self {
            repository: Arc::new(StubRepository::default()),
            converter: Arc::new(StubConverter::default()),
            publisher: Arc::new(InMemoryEventPublisher::new()),
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn producer(
        &self,
        listeners: Vec<Arc<dyn ProcessRuntimeEventListener<ProcessDeployedEvent>>>,
    ) -> ProcessDeployedEventProducer {
        ProcessDeployedEventProducer::new(
            self.repository.clone(),
            self.converter.clone(),
            listeners,
            self.publisher.clone(),
        )
    }

    fn two_listeners(&self) -> ProcessDeployedEventProducer {
        self.producer(vec![
            Arc::new(RecordingListener::new("first", self.log.clone())),
            Arc::new(RecordingListener::new("second", self.log.clone())),
        ])
    }

    fn deliveries(&self) -> Vec<(&'static str, String, String)> {
        self.log
            .lock()
            .expect("log mutex")
            .iter()
            .map(|(listener, entity, content)| (*listener, entity.id.clone(), content.clone()))
            .collect()
    }
}

fn ready(application_type: WebApplicationType) -> ApplicationReadyEvent {
    ApplicationReadyEvent::new(application_type)
}

#[test]
fn should_call_registered_listeners_when_web_application_type_is_servlet() {
    let fixture = Fixture::two_definitions();
    let producer = fixture.two_listeners();

    producer
        .on_application_event(&ready(WebApplicationType::Servlet))
        .expect("delivery succeeds");

    let delivered = fixture.log.lock().expect("log mutex").clone();
    assert_eq!(
        delivered,
        vec![
            ("first", api_definition("id1"), "content1".to_string()),
            ("first", api_definition("id2"), "content2".to_string()),
            ("second", api_definition("id1"), "content1".to_string()),
            ("second", api_definition("id2"), "content2".to_string()),
        ]
    );
}

#[test]
fn converts_the_whole_query_result_in_one_batch_and_fetches_each_model_once() {
    let fixture = Fixture::two_definitions();
    let producer = fixture.two_listeners();

    producer
        .on_application_event(&ready(WebApplicationType::Servlet))
        .expect("delivery succeeds");

    assert_eq!(*fixture.converter.batches.lock().expect("batch mutex"), vec![2]);
    assert_eq!(
        fixture.repository.calls(),
        vec!["list", "model:id1", "model:id2"]
    );
}

#[test]
fn should_not_call_registered_listeners_when_application_type_is_none() {
    let fixture = Fixture::two_definitions();
    let producer = fixture.two_listeners();

    producer
        .on_application_event(&ready(WebApplicationType::None))
        .expect("skipping is not an error");

    assert!(fixture.deliveries().is_empty());
    assert!(fixture.repository.calls().is_empty());
    assert!(fixture.converter.batches.lock().expect("batch mutex").is_empty());
    assert!(fixture.publisher.events().is_empty());
}

#[test]
fn reactive_applications_are_skipped_too() {
    let fixture = Fixture::two_definitions();
    let producer = fixture.two_listeners();

    producer
        .on_application_event(&ready(WebApplicationType::Reactive))
        .expect("skipping is not an error");

    assert!(fixture.deliveries().is_empty());
    assert!(fixture.repository.calls().is_empty());
}

#[test]
fn publishes_the_batch_once_after_listeners_ran() {
    let fixture = Fixture::two_definitions();
    let producer = fixture.two_listeners();

    producer
        .on_application_event(&ready(WebApplicationType::Servlet))
        .expect("delivery succeeds");

    let published = fixture.publisher.events();
    assert_eq!(published.len(), 1);
    let batch = match &published[0] {
        ApplicationEvent::ProcessesDeployed(batch) => batch,
        other => panic!("unexpected event {other:?}"),
    };
    let pairs: Vec<_> = batch
        .events()
        .iter()
        .map(|event| {
            (
                event.entity().id.clone(),
                event.process_model_content().to_string(),
            )
        })
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("id1".to_string(), "content1".to_string()),
            ("id2".to_string(), "content2".to_string()),
        ]
    );
}

#[test]
fn nothing_deployed_means_nothing_delivered_or_published() {
    let fixture = Fixture::empty();
    let producer = fixture.two_listeners();

    producer
        .on_application_event(&ready(WebApplicationType::Servlet))
        .expect("empty repository is fine");

    assert!(fixture.deliveries().is_empty());
    assert!(fixture.publisher.events().is_empty());
    assert_eq!(fixture.repository.calls(), vec!["list"]);
}

#[test]
fn no_listeners_still_publishes_the_batch() {
    let fixture = Fixture::two_definitions();
    let producer = fixture.producer(Vec::new());
    assert_eq!(producer.listener_count(), 0);

    producer
        .on_application_event(&ready(WebApplicationType::Servlet))
        .expect("delivery succeeds");

    assert_eq!(fixture.publisher.events().len(), 1);
}

#[test]
fn repeated_activations_deliver_again() {
    let fixture = Fixture::two_definitions();
    let producer = fixture.two_listeners();

    producer
        .on_application_event(&ready(WebApplicationType::Servlet))
        .expect("first delivery");
    let first_cycle = fixture.deliveries();
    producer
        .on_application_event(&ready(WebApplicationType::Servlet))
        .expect("second delivery");

    let deliveries = fixture.deliveries();
    assert_eq!(deliveries.len(), 8);
    assert_eq!(&deliveries[..4], first_cycle.as_slice());
    assert_eq!(&deliveries[4..], first_cycle.as_slice());
    assert_eq!(fixture.publisher.events().len(), 2);
}

#[test]
fn listener_failure_stops_delivery_without_rollback() {
    let fixture = Fixture::two_definitions();
    let producer = fixture.producer(vec![
        Arc::new(RecordingListener::new("first", fixture.log.clone())),
        Arc::new(RecordingListener::failing_on(
            "second",
            fixture.log.clone(),
            "id2",
        )),
        Arc::new(RecordingListener::new("third", fixture.log.clone())),
    ]);

    let result = producer.on_application_event(&ready(WebApplicationType::Servlet));

    match result {
        Err(DeploymentEventError::Listener(err)) => {
            assert_eq!(err, ListenerError::new("second rejected"))
        }
        other => panic!("expected listener failure, got {other:?}"),
    }
    assert_eq!(
        fixture.deliveries(),
        vec![
            ("first", "id1".to_string(), "content1".to_string()),
            ("first", "id2".to_string(), "content2".to_string()),
            ("second", "id1".to_string(), "content1".to_string()),
        ]
    );
    assert!(fixture.publisher.events().is_empty());
}

#[test]
fn missing_model_fails_before_any_listener_runs() {
    let mut models = HashMap::new();
    models.insert("id1".to_string(), "content1".to_string());
    let fixture = Fixture {
        repository: Arc::new(StubRepository {
            definitions: vec![internal_definition("first"), internal_definition("second")],
            models,
            calls: Mutex::new(Vec::new()),
        }),
        ..Fixture::two_definitions()
    };
    let producer = fixture.two_listeners();

    let result = producer.on_application_event(&ready(WebApplicationType::Servlet));

    assert!(matches!(
        result,
        Err(DeploymentEventError::Repository(RepositoryError::NotFound(ref id))) if id == "id2"
    ));
    assert!(fixture.deliveries().is_empty());
}

#[test]
fn announces_definitions_from_the_in_memory_repository() {
    let repository = Arc::new(InMemoryRepositoryService::new());
    let invoice = r#"<definitions><process id="invoice" name="Invoice"/></definitions>"#;
    let payroll = r#"<definitions><process id="payroll"/></definitions>"#;
    repository
        .deploy(
            DeploymentBuilder::new("auto")
                .add_string("payroll.bpmn", payroll)
                .add_string("invoice.bpmn20.xml", invoice),
        )
        .expect("deployment succeeds");

    let publisher = Arc::new(InMemoryEventPublisher::new());
    let log: DeliveryLog = Arc::new(Mutex::new(Vec::new()));
    let producer = ProcessDeployedEventProducer::new(
        repository,
        Arc::new(ApiProcessDefinitionConverter),
        vec![Arc::new(RecordingListener::new("only", log.clone()))],
        publisher.clone(),
    );

    producer
        .on_application_event(&ready(WebApplicationType::Servlet))
        .expect("delivery succeeds");

    let delivered = log.lock().expect("log mutex").clone();
    assert_eq!(delivered.len(), 2);
    assert_eq!(delivered[0].1.id, "invoice:1:1");
    assert_eq!(delivered[0].1.name.as_deref(), Some("Invoice"));
    assert_eq!(delivered[0].2, invoice);
    assert_eq!(delivered[1].1.id, "payroll:1:1");
    assert_eq!(delivered[1].2, payroll);
    assert!(publisher.latest_deployed().is_some());
}
