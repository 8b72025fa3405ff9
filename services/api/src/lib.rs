mod cli;
mod definitions;
mod infra;
mod routes;
mod server;

use process_runtime::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
