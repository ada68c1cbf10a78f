use anyhow::Context as _;
use tokio::io::AsyncBufReadExt;
use tokio::task::JoinHandle;

use wk_reporter::agent;
use wk_reporter::config::Config;
use wk_reporter::events::Activity;
use wk_reporter::project::Project;
use wk_reporter::transport::http::HttpTransport;
use wk_reporter::{Delivery, Reporter};

fn env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn parse_line(line: &str) -> anyhow::Result<Activity> {
    let mut parts = line.trim().splitn(2, char::is_whitespace);

    let kind = parts.next().unwrap_or_default().parse()?;
    let entity = parts.next().map(str::trim).filter(|p| !p.is_empty());

    Ok(Activity::new(kind, entity))
}

/// Forgets deliveries that already completed; their outcome was logged by
/// the dispatcher.
fn prune(pending: &mut Vec<JoinHandle<Delivery>>) {
    pending.retain(|h| !h.is_finished());
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();

    let use_ansi = env("NO_COLOR").is_none();
    let level = if config.debug { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_ansi(use_ansi)
        .init();

    let root = std::env::current_dir().context("failed to get current directory")?;
    let default_name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Untitled".to_owned());
    let project = Project::resolve(&root, &default_name);

    let editor = env("WK_EDITOR").unwrap_or_else(|| "unity".to_owned());
    let editor_version = env("WK_EDITOR_VERSION").unwrap_or_else(|| "unknown".to_owned());
    let user_agent = agent::user_agent(&editor, &editor_version);
    let machine = agent::machine_name();

    let reporter = match Reporter::from_config(
        &config,
        project,
        |key| HttpTransport::new(&config.api_url, key, &user_agent, &machine),
        tokio::runtime::Handle::current(),
    ) {
        Some(r) => r,
        None => return Ok(()),
    };

    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    let mut pending = Vec::new();

    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        if line.trim().is_empty() {
            continue;
        }

        match parse_line(&line) {
            Ok(activity) => pending.extend(reporter.record(&activity)),
            Err(e) => tracing::warn!("{:#}", e),
        }

        prune(&mut pending);
    }

    for delivery in pending {
        if let Err(e) = delivery.await {
            tracing::error!("heartbeat task failed: {}", e);
        }
    }

    Ok(())
}
