//! Caller Service Binary
//!
//! Entry point for the upstream demo service.

#![deny(unsafe_code)]

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    // Variables already set in the environment win over .env
    dotenvy::dotenv().ok();

    caller::run_server().await
}
