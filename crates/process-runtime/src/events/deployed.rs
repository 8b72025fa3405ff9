use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::ProcessDefinition;

pub const PROCESS_DEPLOYED: &str = "PROCESS_DEPLOYED";

static EVENT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_event_id() -> String {
    let id = EVENT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("evt-{id:06}")
}

/// A deployed process definition together with its BPMN model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessDeployedEvent {
    id: String,
    timestamp: DateTime<Utc>,
    entity: ProcessDefinition,
    process_model_content: String,
}

impl ProcessDeployedEvent {
    pub fn new(entity: ProcessDefinition, process_model_content: String) -> Self {
        Self {
            id: next_event_id(),
            timestamp: Utc::now(),
            entity,
            process_model_content,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn event_type(&self) -> &'static str {
        PROCESS_DEPLOYED
    }

    pub fn entity(&self) -> &ProcessDefinition {
        &self.entity
    }

    pub fn process_model_content(&self) -> &str {
        &self.process_model_content
    }
}

/// Every event built during one activation, published as a single batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessDeployedEvents {
    published_at: DateTime<Utc>,
    events: Vec<ProcessDeployedEvent>,
}

impl ProcessDeployedEvents {
    pub fn new(events: Vec<ProcessDeployedEvent>) -> Self {
        Self {
            published_at: Utc::now(),
            events,
        }
    }

    pub fn published_at(&self) -> DateTime<Utc> {
        self.published_at
    }

    pub fn events(&self) -> &[ProcessDeployedEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
