//! AWS Lambda entry point for the Madeira user API.

use lambda_runtime::Error;

#[tokio::main]
async fn main() -> Result<(), Error> {
    madeira_lambda_api::run().await
}
