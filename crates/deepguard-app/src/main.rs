#![warn(missing_docs)]
//! # deepguard-app binary
//!
//! Terminal entry point: analyses every communication in the demo inbox and
//! prints one summary line per item.

use deepguard_app::{AppError, app_version, dashboard_from_env};
use tracing_subscriber::EnvFilter;

/// CLI entry point.
#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    println!("deepguard-app {}", app_version());
    if let Err(error) = run().await {
        eprintln!("deepguard failed: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    let mut dashboard = dashboard_from_env()?;
    let ids: Vec<String> = dashboard
        .inbox()
        .iter()
        .map(|message| message.id.clone())
        .collect();
    println!("inbox: {} messages, {} unread", ids.len(), dashboard.inbox().unread_count());

    for id in ids {
        dashboard.select_and_analyze(&id).await?;
        let state = dashboard.state();
        let subject = state
            .selected()
            .map(|message| message.subject.as_str())
            .unwrap_or_default();
        let action = state
            .analysis()
            .map(|result| result.suggested_action.to_string())
            .unwrap_or_default();
        println!("[{id}] {subject}: {} -> {action}", state.status_line());
    }

    Ok(())
}
