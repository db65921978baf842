mod cli;
mod demo;
mod infra;

use directory_access::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
