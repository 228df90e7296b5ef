use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::LevelFilter;

use parassis_core::navigation::{self, Direction};
use parassis_core::pagination::paginate;
use parassis_core::store::{keys, MemoryPageStore, MemorySettingsStore, SettingsStore};
use parassis_core::{chat_with_ai, generate_thread_summary, Message, PageRecord, SummarySink};

#[derive(Parser, Debug)]
#[clap(
    name = "Parassis",
    author,
    version = "0.1.0",
    about = "Paginated reader with LLM thread summaries"
)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,

    #[clap(long, short, help = "Text or markdown file to read")]
    file: PathBuf,

    #[clap(long, default_value = "1200", help = "Maximum characters per page")]
    page_size: usize,

    #[clap(long, env = "PARASSIS_PROVIDER", help = "LLM provider id (openai, anthropic, deepseek, volcengine)")]
    provider: Option<String>,

    #[clap(long, env = "PARASSIS_TOKEN", hide_env_values = true, help = "API token for the provider")]
    token: Option<String>,

    #[clap(long, env = "PARASSIS_ENDPOINT", help = "Endpoint override, e.g. a self-hosted gateway")]
    endpoint: Option<String>,

    #[clap(long, help = "Output language for summaries (display name)")]
    language: Option<String>,

    #[clap(long, help = "Require $...$ / $$...$$ delimiters for math in summaries")]
    math: bool,

    #[clap(long, short, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the current page (or a specific one)
    Show {
        #[clap(long)]
        page: Option<u64>,
    },
    /// Turn to the next page and print it
    Next,
    /// Turn to the previous page and print it
    Prev,
    /// List the document's heading records
    Toc,
    /// Generate the thread summary for the current page (or a specific one)
    Summarize {
        #[clap(long)]
        page: Option<u64>,
    },
    /// Ask a question about the current page (or a specific one)
    Chat {
        message: String,
        #[clap(long)]
        page: Option<u64>,
    },
}

/// Sink that streams fragments to stdout as they arrive; phase updates and
/// failures go through the logger so they land on stderr.
struct CliSink;

impl SummarySink for CliSink {
    fn status(&self, message: &str) {
        log::info!("{}", message);
    }

    fn error(&self, message: &str) {
        log::error!("{}", message);
    }

    fn fragment(&self, text: &str) {
        print!("{}", text);
        let _ = std::io::stdout().flush();
    }
}

fn settings_path(file: &Path) -> PathBuf {
    let mut path = file.as_os_str().to_owned();
    path.push(".parassis.json");
    PathBuf::from(path)
}

fn load_settings(path: &Path) -> Result<MemorySettingsStore> {
    if !path.exists() {
        return Ok(MemorySettingsStore::new());
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read settings file {}", path.display()))?;
    let entries: HashMap<String, String> = serde_json::from_str(&raw)
        .with_context(|| format!("settings file {} is not valid JSON", path.display()))?;
    Ok(MemorySettingsStore::from_entries(entries))
}

fn save_settings(path: &Path, settings: &MemorySettingsStore) -> Result<()> {
    let snapshot = settings.snapshot();
    let raw = serde_json::to_string_pretty(&snapshot)?;
    std::fs::write(path, raw)
        .with_context(|| format!("failed to write settings file {}", path.display()))?;
    Ok(())
}

async fn apply_overrides(cli: &Cli, settings: &MemorySettingsStore) -> Result<()> {
    if let Some(provider) = &cli.provider {
        settings.set_value(keys::LLM_PROVIDER, provider).await?;
    }
    if let Some(token) = &cli.token {
        settings.set_value(keys::LLM_TOKEN, token).await?;
    }
    if let Some(endpoint) = &cli.endpoint {
        settings.set_value(keys::LLM_ENDPOINT, endpoint).await?;
    }
    if let Some(language) = &cli.language {
        settings.set_value(keys::LANGUAGE, language).await?;
    }
    if cli.math {
        settings.set_value(keys::MATH_RENDERING, "true").await?;
    }
    Ok(())
}

fn ingest(file: &Path, page_size: usize) -> Result<MemoryPageStore> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let store = MemoryPageStore::new();
    for record in paginate(&text, page_size) {
        store.append(record.content, record.heading);
    }
    log::debug!("Ingested {} records from {}", store.len(), file.display());
    Ok(store)
}

async fn resolve_page(
    pages: &MemoryPageStore,
    settings: &MemorySettingsStore,
    requested: Option<u64>,
) -> Result<PageRecord> {
    match requested {
        Some(id) => {
            settings
                .set_value(keys::CURRENT_PAGE, &id.to_string())
                .await?;
            Ok(navigation::current_page(pages, settings).await?)
        }
        None => Ok(navigation::current_page(pages, settings).await?),
    }
}

fn print_page(page: &PageRecord) {
    println!("--- page {} ---", page.id);
    println!("{}", page.content);
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = LevelFilter::from_str(&cli.log_level).unwrap_or(LevelFilter::Info);
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    let pages = ingest(&cli.file, cli.page_size)?;
    let settings_file = settings_path(&cli.file);
    let settings = load_settings(&settings_file)?;
    apply_overrides(&cli, &settings).await?;

    match &cli.command {
        Commands::Show { page } => {
            let page = resolve_page(&pages, &settings, *page).await?;
            print_page(&page);
        }
        Commands::Next => {
            let page = navigation::turn_page(&pages, &settings, Direction::Forward).await?;
            print_page(&page);
        }
        Commands::Prev => {
            let page = navigation::turn_page(&pages, &settings, Direction::Backward).await?;
            print_page(&page);
        }
        Commands::Toc => {
            use parassis_core::store::PageStore;
            let headings = pages.headings_before(u64::MAX).await?;
            for heading in headings {
                println!(
                    "{}{}",
                    "  ".repeat((heading.heading as usize).saturating_sub(1)),
                    heading.content
                );
            }
        }
        Commands::Summarize { page } => {
            let page = resolve_page(&pages, &settings, *page).await?;
            generate_thread_summary(&pages, &settings, page.id, &CliSink).await;
            println!();
        }
        Commands::Chat { message, page } => {
            let page = resolve_page(&pages, &settings, *page).await?;
            let history = vec![Message::user(message.clone())];
            chat_with_ai(&pages, &settings, page.id, &history, &CliSink).await;
            println!();
        }
    }

    save_settings(&settings_file, &settings)?;
    Ok(())
}
