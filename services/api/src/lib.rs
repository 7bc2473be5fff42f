mod cli;
mod commands;
mod infra;
mod routes;
mod server;

use sri_toolkit::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
