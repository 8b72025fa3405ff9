use crate::definitions::{run_list, ListArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use process_runtime::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Process Runtime",
    about = "Deploy BPMN process definitions and announce them to runtime listeners",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Inspect process definitions without starting the web server
    Definitions {
        #[command(subcommand)]
        command: DefinitionsCommand,
    },
}

#[derive(Subcommand, Debug)]
enum DefinitionsCommand {
    /// Deploy the configured models and list the resulting definitions
    List(ListArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Definitions {
            command: DefinitionsCommand::List(args),
        } => run_list(args),
    }
}
