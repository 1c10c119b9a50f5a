//! sermon-review CLI entry point

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use sermon_review::{
    commands::{
        cmd_generate, cmd_init, cmd_list_sermons, cmd_review, cmd_status, cmd_upload,
        print_generate, print_init, print_sermons, print_status, UploadOptions,
    },
    config::Config,
    error::Result,
    gateway::SyncGateway,
    models::{SermonFilter, SermonStatus},
    progress::{spinner, LogWriterFactory},
};
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "sermon-review")]
#[command(version, about = "Review AI-suggested edits to sermon slide decks", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init {
        /// Force overwrite existing config
        #[arg(long)]
        force: bool,
    },

    /// Check the review service
    Status,

    /// List sermons
    Sermons {
        /// Filter by sermon name
        #[arg(long)]
        name: Option<String>,

        /// Filter by series name
        #[arg(long)]
        series: Option<String>,

        /// Filter by week or date
        #[arg(long)]
        date: Option<String>,

        /// Filter by presenter
        #[arg(long)]
        presenter: Option<String>,

        /// Filter by status (uploaded, processing, ready, error)
        #[arg(long)]
        status: Option<SermonStatus>,
    },

    /// Upload a .pptx presentation
    Upload {
        /// Presentation file
        file: PathBuf,

        /// Sermon name
        #[arg(short, long)]
        name: String,

        /// Series name
        #[arg(long)]
        series: Option<String>,

        /// Week or date (defaults to the coming Sunday)
        #[arg(long)]
        date: Option<String>,

        /// Presenter (defaults to the configured reviewer)
        #[arg(long)]
        presenter: Option<String>,
    },

    /// Review a sermon's slides interactively
    ///
    /// Use 'sermon-review sermons' to list available sermon IDs
    Review {
        /// Sermon ID
        sermon_id: String,
    },

    /// Regenerate a sermon's presentation from its saved decisions
    Generate {
        /// Sermon ID
        sermon_id: String,

        /// Download the result into the configured download directory
        #[arg(long)]
        download: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(LogWriterFactory::default()))
        .with(filter)
        .init();

    if let Commands::Init { force } = cli.command {
        let config_path = cli.config.unwrap_or_else(Config::default_config_path);
        let config = cmd_init(config_path, force)?;
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&config)?);
        } else {
            print_init(&config);
        }
        return Ok(());
    }

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "sermon-review", &mut std::io::stdout());
        return Ok(());
    }

    let config = Config::load_or_default(cli.config.as_deref())?;
    let gateway = SyncGateway::from_config(&config)?;

    match cli.command {
        Commands::Init { .. } | Commands::Completions { .. } => unreachable!(),

        Commands::Status => {
            let status = cmd_status(&config, &gateway).await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                print_status(&status);
            }
        }

        Commands::Sermons {
            name,
            series,
            date,
            presenter,
            status,
        } => {
            let filter = SermonFilter {
                name,
                series,
                date,
                presenter,
                status,
            };
            let sermons = cmd_list_sermons(&gateway, &filter).await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&sermons)?);
            } else {
                print_sermons(&sermons);
            }
        }

        Commands::Upload {
            file,
            name,
            series,
            date,
            presenter,
        } => {
            let options = UploadOptions {
                file,
                name,
                series,
                date,
                presenter,
            };
            let pb = spinner("Uploading presentation", cli.json);
            let result = cmd_upload(&config, &gateway, options).await;
            pb.finish_and_clear();
            let sermon = result?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&sermon)?);
            } else {
                println!("✓ Uploaded '{}' ({})", sermon.sermon_name, sermon.id);
                println!("  Review it with: sermon-review review {}", sermon.id);
            }
        }

        Commands::Review { sermon_id } => {
            cmd_review(&config, &gateway, &sermon_id).await?;
        }

        Commands::Generate {
            sermon_id,
            download,
        } => {
            let pb = spinner("Generating updated presentation", cli.json);
            let result = cmd_generate(&config, &gateway, &sermon_id, download).await;
            pb.finish_and_clear();
            let result = result?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_generate(&result);
            }
        }
    }

    Ok(())
}
