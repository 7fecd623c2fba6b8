mod cli;
mod infra;
mod routes;
mod server;

use payroll_sync::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
