//! Sermon listing and upload commands

use crate::config::Config;
use crate::error::Result;
use crate::gateway::SyncGateway;
use crate::models::{next_sunday, Sermon, SermonFilter, SermonUpload};
use chrono::Local;
use std::path::PathBuf;
use tracing::info;

/// List sermons known to the review service, narrowed by `filter`
pub async fn cmd_list_sermons(gateway: &SyncGateway, filter: &SermonFilter) -> Result<Vec<Sermon>> {
    info!("Listing sermons");
    let sermons = gateway.fetch_sermons().await?;
    Ok(filter.apply(&sermons).into_iter().cloned().collect())
}

/// Print sermons list to console
pub fn print_sermons(sermons: &[Sermon]) {
    println!("\n📖 Sermons\n");

    if sermons.is_empty() {
        println!("No sermons found. Use 'sermon-review upload' to add one.");
        return;
    }

    for sermon in sermons {
        println!("• {} [{}]", sermon.sermon_name, sermon.status);
        println!("  ID: {}", sermon.id);
        if let Some(series) = &sermon.series_name {
            println!("  Series: {}", series);
        }
        if let Some(date) = &sermon.week_or_date {
            println!("  Week: {}", date);
        }
        if let Some(pastor) = &sermon.pastor_name {
            println!("  Presenter: {}", pastor);
        }
        println!("  Created: {}", sermon.display_date());
        println!();
    }
}

/// Options for uploading a sermon presentation
#[derive(Debug, Clone)]
pub struct UploadOptions {
    pub file: PathBuf,
    pub name: String,
    pub series: Option<String>,
    pub date: Option<String>,
    pub presenter: Option<String>,
}

/// Upload a presentation.
///
/// The week defaults to the coming Sunday and the presenter to the
/// configured reviewer.
pub async fn cmd_upload(
    config: &Config,
    gateway: &SyncGateway,
    options: UploadOptions,
) -> Result<Sermon> {
    let upload = build_upload(config, options, Local::now().date_naive());
    let sermon = gateway.upload_sermon(&upload).await?;
    info!("Uploaded sermon {} ({})", sermon.id, sermon.sermon_name);
    Ok(sermon)
}

fn build_upload(config: &Config, options: UploadOptions, today: chrono::NaiveDate) -> SermonUpload {
    let week_or_date = options
        .date
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| next_sunday(today).format("%Y-%m-%d").to_string());

    SermonUpload {
        sermon_name: options.name.trim().to_string(),
        series_name: options.series.filter(|s| !s.trim().is_empty()),
        week_or_date: Some(week_or_date),
        pastor_name: options.presenter.or_else(|| config.reviewer.clone()),
        file: options.file,
    }
}
