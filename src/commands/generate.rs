//! Output generation command

use crate::config::Config;
use crate::error::Result;
use crate::gateway::SyncGateway;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResult {
    pub sermon_id: String,
    pub status: String,
    pub downloaded_to: Option<String>,
}

/// Regenerate a sermon's presentation from its persisted decisions,
/// optionally downloading the result into the configured directory.
pub async fn cmd_generate(
    config: &Config,
    gateway: &SyncGateway,
    sermon_id: &str,
    download: bool,
) -> Result<GenerateResult> {
    let receipt = gateway.generate_output(sermon_id).await?;
    info!("Generation for {} finished: {}", sermon_id, receipt.status);

    let downloaded_to = if download {
        let path = gateway
            .download_output(sermon_id, Path::new(&config.download_dir))
            .await?;
        Some(path.display().to_string())
    } else {
        None
    };

    Ok(GenerateResult {
        sermon_id: sermon_id.to_string(),
        status: receipt.status,
        downloaded_to,
    })
}

pub fn print_generate(result: &GenerateResult) {
    println!(
        "✓ Updated presentation for {} is {}",
        result.sermon_id, result.status
    );
    match &result.downloaded_to {
        Some(path) => println!("  Saved to {}", path),
        None => println!(
            "  Run 'sermon-review generate {} --download' to fetch it",
            result.sermon_id
        ),
    }
}
