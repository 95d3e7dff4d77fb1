use std::{path::PathBuf, sync::Arc, time::Instant};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{AdminApiClient, AttachmentUpload, GradeCriteriaClient};
use proposal_form::{AddEventProposal, SubmitOutcome};
use shared::{
    domain::PolicyDocumentId,
    protocol::{CreateGradeCriteriaRequest, PageRequest, DEFAULT_PAGE_SIZE},
    util::split_millis,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod config;
mod presenter;

use config::{load_settings, normalize_api_endpoint, DEFAULT_CONFIG_FILE};
use presenter::TerminalPresenter;

#[derive(Parser, Debug)]
#[command(name = "event-admin", about = "Administration client for event proposals and grade criteria")]
struct Cli {
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    /// Overrides the configured API endpoint.
    #[arg(long)]
    api_endpoint: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    SubmitProposal {
        #[arg(long, default_value = "")]
        title: String,
        #[arg(long, conflicts_with = "content_file")]
        content: Option<String>,
        #[arg(long)]
        content_file: Option<PathBuf>,
        #[arg(long = "file")]
        files: Vec<PathBuf>,
    },
    ListGradeCriteria {
        #[arg(long, default_value_t = 0)]
        page: u32,
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        size: u32,
    },
    CreateGradeCriteria {
        #[arg(long)]
        content: String,
        #[arg(long)]
        policy_document_id: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = load_settings(&cli.config)?;
    if let Some(endpoint) = cli.api_endpoint.as_deref() {
        settings.api_endpoint = normalize_api_endpoint(endpoint)?;
    }
    info!(api_endpoint = %settings.api_endpoint, "using admin api");

    let client = Arc::new(AdminApiClient::new(settings.api_endpoint.clone()));

    match cli.command {
        Command::SubmitProposal {
            title,
            content,
            content_file,
            files,
        } => {
            let content_html = match (content, content_file) {
                (Some(content), _) => content,
                (None, Some(path)) => tokio::fs::read_to_string(&path)
                    .await
                    .with_context(|| format!("failed to read content file '{}'", path.display()))?,
                (None, None) => String::new(),
            };

            let mut attachments = Vec::with_capacity(files.len());
            for path in &files {
                attachments.push(AttachmentUpload::from_path(path).await?);
            }

            let images = attachments.iter().filter(|file| file.is_image()).count();

            let presenter = Arc::new(TerminalPresenter::new(std::io::stderr()));
            let form = AddEventProposal::new(client.clone(), client, presenter.clone())
                .with_toast_position(settings.toast_position);
            form.set_title(title).await;
            form.set_content_html(content_html).await;
            form.add_files(attachments).await;
            info!(files = %form.selected_file_names().await, images, "attachments selected");

            let started = Instant::now();
            let outcome = form.submit().await;
            let elapsed = split_millis(started.elapsed().as_millis() as u64);
            info!(
                "submission finished in {:02}:{:02}:{:02}",
                elapsed.hours, elapsed.minutes, elapsed.seconds
            );
            debug!(toasts = ?presenter.visible_titles(), "notifications still visible");

            match outcome {
                SubmitOutcome::Submitted { file_urls } => {
                    for url in file_urls {
                        println!("{url}");
                    }
                }
                SubmitOutcome::Failed(failure) => bail!(failure),
                SubmitOutcome::Rejected => bail!("a submission is already in progress"),
            }
        }
        Command::ListGradeCriteria { page, size } => {
            let page = client
                .list_grade_criteria(PageRequest { page, size })
                .await?;
            println!("{}", serde_json::to_string_pretty(&page)?);
        }
        Command::CreateGradeCriteria {
            content,
            policy_document_id,
        } => {
            let created = client
                .create_grade_criteria(&CreateGradeCriteriaRequest {
                    content,
                    policy_document_id: PolicyDocumentId(policy_document_id),
                })
                .await?;
            println!("created grade criteria id={}", created.id.0);
        }
    }

    Ok(())
}
