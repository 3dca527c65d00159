use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use showrun::banner::{BannerInfo, print_banner};
use showrun::consts::{DEFAULT_POLL_INTERVAL, DEFAULT_POLL_TIMEOUT, default_db_path};
use showrun::demo::{DemoRequest, DemoService};
use showrun::engine::browser::BrowserEngine;
use showrun::extract::{self, Extractor, gemini::GeminiExtractor};
use showrun::relay::http::HttpTransport;
use showrun::relay::{NullTransport, Relay, Transport};
use showrun::runs::log::RunLog;
use showrun::runs::RunRegistry;
use showrun::task::Task;

#[derive(Parser)]
#[command(name = "showrun", version, about = "Live demos, run by an agent.")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Browser-agent gateway base URL
    #[arg(long, env = "SHOWRUN_ENGINE_URL", default_value = "http://localhost:8550")]
    engine_url: String,

    /// Signaling bridge base URL for relaying live URLs to the front-end
    #[arg(long, env = "SHOWRUN_BRIDGE_URL")]
    bridge_url: Option<String>,

    /// Run-log database path (use :memory: for ephemeral)
    #[arg(long)]
    db: Option<String>,

    /// Seconds to wait for the live URL before responding without one
    #[arg(long, default_value_t = DEFAULT_POLL_TIMEOUT.as_secs())]
    poll_timeout: u64,

    /// Milliseconds between live-URL checks
    #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL.as_millis() as u64)]
    poll_interval: u64,
}

#[derive(Subcommand)]
enum Command {
    /// Start a demo in the background and report its live URL
    Start {
        /// Natural-language task for the automation engine
        #[arg(short, long)]
        task: String,

        /// Feature documentation to fold into the task (.txt, .md, .rst)
        #[arg(long)]
        docs: Option<PathBuf>,

        /// Wait for the run to finish and print its terminal state too
        #[arg(long, default_value_t = false)]
        wait: bool,
    },
    /// Create a demo and wait for the automation to finish
    Create {
        /// Natural-language task for the automation engine
        #[arg(short, long)]
        task: String,

        /// Name of the feature being demoed
        #[arg(long)]
        feature_name: Option<String>,

        /// Feature documentation to fold into the task (.txt, .md, .rst)
        #[arg(long)]
        docs: Option<PathBuf>,
    },
    /// List recorded runs
    Runs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("showrun=info")),
        )
        .init();

    let cli = Cli::parse();

    let db_path = cli
        .db
        .clone()
        .unwrap_or_else(|| default_db_path().to_string_lossy().into_owned());
    if db_path != ":memory:"
        && let Some(parent) = std::path::Path::new(&db_path).parent()
    {
        std::fs::create_dir_all(parent)?;
    }
    let log = Arc::new(RunLog::open(&db_path)?);

    if let Command::Runs = cli.command {
        for entry in log.list()? {
            println!(
                "{}  {:<12}  {}  {}",
                entry.started_at,
                entry.status,
                entry.id,
                entry.task
            );
            if let Some(url) = &entry.live_url {
                println!("  live: {}", url);
            }
            if let Some(detail) = &entry.detail {
                println!("  {}", detail);
            }
        }
        return Ok(());
    }

    let poll_timeout = Duration::from_secs(cli.poll_timeout);
    let poll_interval = Duration::from_millis(cli.poll_interval);

    let transport: Arc<dyn Transport> = match &cli.bridge_url {
        Some(url) => Arc::new(HttpTransport::new(url.clone())),
        None => Arc::new(NullTransport),
    };

    print_banner(&BannerInfo {
        engine: &cli.engine_url,
        relay: cli.bridge_url.as_deref().unwrap_or("none"),
        run_log: if db_path == ":memory:" { "ephemeral" } else { &db_path },
        poll_timeout,
        poll_interval,
    });

    let engine = Arc::new(BrowserEngine::new(cli.engine_url.clone()));
    let runs = Arc::new(RunRegistry::with_log(Arc::clone(&log)));

    let mut service = DemoService::new(engine, Arc::clone(&runs), Relay::new(transport))
        .with_log(Arc::clone(&log))
        .with_poll_budget(poll_timeout, poll_interval);

    match cli.command {
        Command::Start { task, docs, wait } => {
            let task = match docs {
                Some(path) => {
                    let text = extract::read_docs(&path).await?;
                    let extractor = GeminiExtractor::new(None)?;
                    let instructions = extractor.extract_usage(&text).await?;
                    Task::with_usage_instructions(&task, Some(&instructions))
                }
                None => Task::new(task),
            };

            let response = service.start(&task).await;
            println!("{}", serde_json::to_string_pretty(&response)?);

            if wait && let showrun::demo::DemoResponse::Started(started) = &response {
                let status = runs.wait_terminal(started.run_id, poll_interval).await;
                println!("{}", serde_json::to_string_pretty(&status)?);
            }
        }
        Command::Create {
            task,
            feature_name,
            docs,
        } => {
            let docs = match docs {
                Some(path) => {
                    let filename = path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    let text = extract::read_docs(&path).await?;
                    service = service.with_extractor(Arc::new(GeminiExtractor::new(None)?));
                    Some((filename, text))
                }
                None => None,
            };

            let report = service
                .create(DemoRequest {
                    task,
                    feature_name,
                    docs,
                })
                .await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Runs => unreachable!("handled above"),
    }

    Ok(())
}
