//! catalog-admin - command-line front end for the catalog console

use anyhow::{bail, Context};
use catalog_client::{CatalogClient, ContentKind, UploadFile, PDF_MIME};
use catalog_console::{CatalogConsole, ConnectionArgs, NavigationView, TreeRow};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Administer a hierarchical content catalog
#[derive(Parser, Debug)]
#[command(name = "catalog-admin")]
#[command(about = "Browse and edit the category tree of a content catalog")]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List top-level categories
    Tops,
    /// List the children of a category
    Children { id: String },
    /// Print a category as JSON
    Show { id: String },
    /// Enter a chain of categories and print the resulting view
    Browse {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Create a category under --parent, or at the top level
    Add {
        name: String,
        /// Create a content (leaf) category
        #[arg(long)]
        leaf: bool,
        #[arg(long)]
        parent: Option<String>,
    },
    /// Create a top-level structural category
    AddMain { name: String },
    /// Delete a category and everything below it
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
    /// Attach text to a content category
    AttachText { id: String, text: String },
    /// Attach a YouTube video to a content category
    AttachVideo { id: String, url: String },
    /// Upload images or a PDF to a content category
    AttachFiles {
        id: String,
        #[arg(long, value_enum)]
        kind: FileKind,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Print the content of a content category
    Preview { id: String },
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum FileKind {
    Image,
    Pdf,
}

impl From<FileKind> for ContentKind {
    fn from(kind: FileKind) -> Self {
        match kind {
            FileKind::Image => ContentKind::Image,
            FileKind::Pdf => ContentKind::Pdf,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = cli.connection.resolve();
    let log_level = config
        .as_ref()
        .map(|c| c.log_level.clone())
        .unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "catalog_admin={0},catalog_console={0},catalog_client={0},warn",
                    log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };
    let client = CatalogClient::new(config.client_config()).context("building HTTP client")?;
    debug!(base_url = client.base_url(), "catalog configured");
    let console = CatalogConsole::new(Arc::new(client));

    run(&console, cli.command).await
}

async fn run(console: &CatalogConsole, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Tops => {
            let view = console.browse(&[]).await?;
            print_rows(&view.top_level);
        }
        Command::Children { id } => {
            let view = console.browse(&[id]).await?;
            print_rows(&view.children);
        }
        Command::Show { id } => {
            let category = console.category(&id).await?;
            println!("{}", serde_json::to_string_pretty(&category)?);
        }
        Command::Browse { ids } => {
            let view = console.browse(&ids).await?;
            print_view(&view);
        }
        Command::Add { name, leaf, parent } => {
            if let Some(parent) = parent {
                let parent = console.category(&parent).await?;
                console.navigation().enter(parent).await?;
            }
            let notice = console.add_category(&name, leaf).await?;
            println!("{} ({})", notice.message, notice.value.id);
        }
        Command::AddMain { name } => {
            let notice = console.add_top_level(&name).await?;
            println!("{} ({})", notice.message, notice.value.id);
        }
        Command::Delete { id, yes } => {
            let target = console.category(&id).await?;
            console.deletion().request_delete(target.clone()).await?;
            if !yes && !confirm(&format!("Delete {} and everything below it?", target.name))? {
                console.deletion().cancel().await;
                println!("Cancelled");
                return Ok(());
            }
            let notice = console.confirm_delete().await?;
            println!("{}", notice.message);
        }
        Command::AttachText { id, text } => {
            let target = console.category(&id).await?;
            console.drafts().open_draft(&target, ContentKind::Text).await?;
            console.drafts().set_text(text).await?;
            submit(console).await?;
        }
        Command::AttachVideo { id, url } => {
            let target = console.category(&id).await?;
            console.drafts().open_draft(&target, ContentKind::Video).await?;
            console.drafts().set_video_url(url).await?;
            submit(console).await?;
        }
        Command::AttachFiles { id, kind, files } => {
            let target = console.category(&id).await?;
            let uploads = files
                .iter()
                .map(|path| read_upload(path))
                .collect::<anyhow::Result<Vec<_>>>()?;

            console.drafts().open_draft(&target, kind.into()).await?;
            let report = console.drafts().stage_files(uploads).await?;
            for name in &report.rejected {
                eprintln!("skipped {}", name);
            }
            if report.accepted == 0 {
                bail!("none of the given files can be attached as {:?}", kind);
            }
            submit(console).await?;
        }
        Command::Preview { id } => match console.preview(&id).await? {
            Some(preview) => {
                println!("{}", preview.title);
                println!("{}", preview.breadcrumb);
                if let Some(text) = &preview.text {
                    println!("\n{}", text);
                }
                for url in &preview.image_urls {
                    println!("image: {}", url);
                }
                if let Some(url) = &preview.pdf_url {
                    println!("pdf:   {}", url);
                }
                if let Some(url) = &preview.video_embed_url {
                    println!("video: {}", url);
                }
            }
            None => println!("No content"),
        },
    }
    Ok(())
}

async fn submit(console: &CatalogConsole) -> anyhow::Result<()> {
    let notice = console.submit_draft().await?;
    println!("{}", notice.message);
    Ok(())
}

fn read_upload(path: &Path) -> anyhow::Result<UploadFile> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    let mime_type = match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "pdf" => PDF_MIME,
        _ => "application/octet-stream",
    };
    Ok(UploadFile::new(file_name, mime_type, bytes))
}

fn confirm(question: &str) -> anyhow::Result<bool> {
    print!("{} [y/N] ", question);
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

fn print_rows(rows: &[TreeRow]) {
    for row in rows {
        let marker = if row.selected { "*" } else { " " };
        let badges = row.badges.labels();
        if badges.is_empty() {
            println!("{} {}  {}  [{}]", marker, row.id, row.name, row.kind);
        } else {
            println!(
                "{} {}  {}  [{}]  ({})",
                marker,
                row.id,
                row.name,
                row.kind,
                badges.join(", ")
            );
        }
    }
}

fn print_view(view: &NavigationView) {
    println!("{}", view.title);
    if !view.breadcrumb.is_empty() {
        println!("{}", view.breadcrumb.join(" > "));
    }
    println!("\nTop level:");
    print_rows(&view.top_level);
    println!("\nChildren:");
    print_rows(&view.children);
    if let Some(hint) = &view.empty_hint {
        println!("  {}", hint);
    }
}
