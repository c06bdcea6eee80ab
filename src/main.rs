//! Chat widget console front-end.
//!
//! Drives the widget controller from a terminal: every line read from stdin
//! is typed into the input and sent, as if Enter had been pressed.

use mimalloc::MiMalloc;

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::io::IsTerminal;

use anyhow::Context;
use dotenvy::dotenv;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use chat_widget::config::WidgetConfig;
use chat_widget::surface::ConsoleSurface;
use chat_widget::transport::HttpTransport;
use chat_widget::widget::ChatWidget;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (if present)
    let _ = dotenv();

    // Initialize tracing (M-LOG-STRUCTURED). Stdout belongs to the chat.
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let config = WidgetConfig::load().context("failed to load configuration")?;
    let transport =
        HttpTransport::from_config(&config.backend).context("invalid backend configuration")?;

    info!(
        name: "widget.config.loaded",
        endpoint = %transport.endpoint(),
        timeout_secs = ?config.backend.timeout_secs,
        "Chat widget configuration loaded"
    );

    // A typed line is already on screen; the transcript rewrites it in place.
    let surface = ConsoleSurface::new(std::io::stdout())
        .overwrite_echo(std::io::stdin().is_terminal());
    let mut widget = ChatWidget::attach(surface, transport, config.labels)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        widget.submit_line(line).await?;
    }

    Ok(())
}
