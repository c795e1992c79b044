//! Callee Service Binary
//!
//! Entry point for the downstream demo service.

#![deny(unsafe_code)]

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    // Variables already set in the environment win over .env
    dotenvy::dotenv().ok();

    callee::run_server().await
}
