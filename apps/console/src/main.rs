use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use console_core::{
    CollectionController, ConsoleApi, FilePayload, MoveDirection, MoveOutcome, PublishService,
    UploadPipeline,
};
use shared::domain::{IssueId, SeriesId};
use tracing::info;

mod config;

#[derive(Parser, Debug)]
#[command(about = "Administrative console for the studio publishing platform")]
struct Args {
    /// Backend base URL; falls back to console.toml / CONSOLE_SERVER_URL.
    #[arg(long)]
    server_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Direction {
    Up,
    Down,
}

impl From<Direction> for MoveDirection {
    fn from(value: Direction) -> Self {
        match value {
            Direction::Up => MoveDirection::Up,
            Direction::Down => MoveDirection::Down,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List all series in display order.
    ListSeries,
    /// List the issues of a series.
    ListIssues {
        #[arg(long)]
        series: i64,
    },
    /// List the pages of an issue.
    ListPages {
        #[arg(long)]
        series: i64,
        #[arg(long)]
        issue: i64,
    },
    /// Move a page one position up or down and reconcile with the server.
    MovePage {
        #[arg(long)]
        series: i64,
        #[arg(long)]
        issue: i64,
        #[arg(long)]
        index: usize,
        #[arg(long, value_enum)]
        direction: Direction,
    },
    /// Upload one or more page images to an issue, in argument order.
    UploadPages {
        #[arg(long)]
        series: i64,
        #[arg(long)]
        issue: i64,
        files: Vec<PathBuf>,
    },
    /// Show the current site theme configuration.
    ShowSiteConfig,
    /// Replace the site hero image.
    UploadHero { file: PathBuf },
    /// Generate a preview build of the public site.
    PublishPreview,
    /// Show the file summary of the last preview build.
    PreviewSummary,
    /// Deploy the previewed site to production.
    Deploy,
}

fn mime_for(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => return None,
    };
    Some(mime.to_string())
}

fn read_payload(path: &Path) -> Result<FilePayload> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload.bin".to_string());
    Ok(FilePayload {
        filename,
        mime_type: mime_for(path),
        bytes,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();

    let settings = config::load_settings();
    let server_url = args.server_url.unwrap_or(settings.server_url);
    info!(%server_url, "connecting to backend");
    let api = ConsoleApi::new(server_url);

    match args.command {
        Command::ListSeries => {
            let controller = CollectionController::new(Arc::new(api.series()));
            controller.load().await;
            for series in controller.items().await {
                println!(
                    "{:>4}  {}  ({})",
                    series.id.map(|id| id.0).unwrap_or(-1),
                    series.title,
                    series.slug
                );
            }
        }
        Command::ListIssues { series } => {
            let controller =
                CollectionController::new(Arc::new(api.issues(SeriesId(series))));
            controller.load().await;
            for issue in controller.items().await {
                println!(
                    "{:>4}  #{:<3} {}  published={}",
                    issue.id.map(|id| id.0).unwrap_or(-1),
                    issue.issue_number,
                    issue.title,
                    issue.published
                );
            }
        }
        Command::ListPages { series, issue } => {
            let controller = CollectionController::new(Arc::new(
                api.pages(SeriesId(series), IssueId(issue)),
            ));
            controller.load().await;
            for page in controller.items().await {
                println!(
                    "{:>4}  page {:<3} {}",
                    page.id.map(|id| id.0).unwrap_or(-1),
                    page.page_number,
                    page.image_url
                );
            }
        }
        Command::MovePage {
            series,
            issue,
            index,
            direction,
        } => {
            let controller = CollectionController::new(Arc::new(
                api.pages(SeriesId(series), IssueId(issue)),
            ));
            controller.load().await;
            let outcome = controller.move_item(index, direction.into()).await;
            match outcome {
                MoveOutcome::Reconciled => println!("moved; server order applied"),
                MoveOutcome::RolledBack => println!("reorder failed; server order restored"),
                MoveOutcome::OutOfBounds => println!("page is already at the edge"),
                MoveOutcome::Busy => println!("a reorder is already in flight"),
                MoveOutcome::Unsaved => println!("collection holds an unsaved page"),
            }
            for page in controller.items().await {
                println!(
                    "{:>4}  page {:<3}",
                    page.id.map(|id| id.0).unwrap_or(-1),
                    page.page_number
                );
            }
        }
        Command::UploadPages {
            series,
            issue,
            files,
        } => {
            let payloads = files
                .iter()
                .map(|path| read_payload(path))
                .collect::<Result<Vec<_>>>()?;
            info!(count = payloads.len(), series, issue, "starting upload batch");
            let store = Arc::new(api.pages(SeriesId(series), IssueId(issue)));
            let controller = CollectionController::new(store.clone());
            let pipeline = UploadPipeline::new(store, controller.clone());
            match pipeline.start_batch(payloads).await {
                Some(report) => {
                    println!(
                        "uploaded {} of {} files ({} failed)",
                        report.succeeded, report.total, report.failed
                    );
                    println!("issue now has {} pages", controller.items().await.len());
                }
                None => println!("nothing to upload"),
            }
        }
        Command::ShowSiteConfig => {
            let config = api.site_config().get().await?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Command::UploadHero { file } => {
            let payload = read_payload(&file)?;
            let config = api.site_config().upload_hero_image(&payload).await?;
            println!(
                "hero image set: {}",
                config.hero_image_url.as_deref().unwrap_or("<none>")
            );
        }
        Command::PublishPreview => {
            let preview = api.publish().generate_preview().await?;
            println!(
                "preview {}: {} files{}",
                preview.status,
                preview.file_count,
                preview
                    .preview_url
                    .map(|url| format!(" at {url}"))
                    .unwrap_or_default()
            );
        }
        Command::PreviewSummary => {
            let summary = api.publish().preview_summary().await?;
            println!("{} files in preview build:", summary.file_count);
            for file in summary.files {
                println!("  {file}");
            }
        }
        Command::Deploy => {
            let deploy = api.publish().deploy().await?;
            println!("deploy {}", deploy.status);
            if let Some(message) = deploy.message {
                println!("{message}");
            }
        }
    }

    Ok(())
}
