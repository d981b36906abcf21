mod cli;
mod infra;
mod ops;
mod routes;
mod server;

use awards_review::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
