use crate::infra::ProcessRuntime;
use clap::Args;
use process_runtime::application::{ApplicationReadyEvent, WebApplicationType};
use process_runtime::config::AppConfig;
use process_runtime::error::AppError;
use process_runtime::model::{
    ApiProcessDefinitionConverter, ProcessDefinition, ProcessDefinitionConverter,
};
use process_runtime::repository::{ProcessDefinitionQuery, RepositoryService};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct ListArgs {
    /// Only list definitions with this process key
    #[arg(long)]
    pub(crate) key: Option<String>,
    /// Only list the latest version of each key
    #[arg(long)]
    pub(crate) latest: bool,
    /// Override the configured process definition location
    #[arg(long)]
    pub(crate) location: Option<PathBuf>,
}

pub(crate) fn run_list(args: ListArgs) -> Result<(), AppError> {
    let ListArgs {
        key,
        latest,
        location,
    } = args;

    let mut config = AppConfig::load()?;
    if let Some(location) = location {
        config.deployment.process_definition_location = location;
    }

    let runtime = ProcessRuntime::bootstrap(&config.deployment)?;
    // no web server here, so deployed-event listeners are not notified
    runtime
        .producer
        .on_application_event(&ApplicationReadyEvent::new(WebApplicationType::None))?;

    let query = definition_query(key, latest);
    let entities = runtime.repository.list_process_definitions(&query)?;
    let definitions = ApiProcessDefinitionConverter.convert_all(&entities)?;

    print!("{}", render_definitions(&definitions));
    Ok(())
}

pub(crate) fn definition_query(key: Option<String>, latest: bool) -> ProcessDefinitionQuery {
    let mut query = ProcessDefinitionQuery::new();
    if let Some(key) = key {
        query = query.process_definition_key(key);
    }
    if latest {
        query = query.latest_version();
    }
    query
}

fn render_definitions(definitions: &[ProcessDefinition]) -> String {
    if definitions.is_empty() {
        return "No process definitions deployed\n".to_string();
    }

    let mut out = String::from("Deployed process definitions\n");
    for definition in definitions {
        let name = definition.name.as_deref().unwrap_or("(unnamed)");
        out.push_str(&format!(
            "- {} | {} | v{} | deployment {}\n",
            definition.id, name, definition.version, definition.deployment_id
        ));
    }
    out
}
