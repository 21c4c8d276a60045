use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use instalite::api::ApiClient;
use instalite::auth::FileTokenStore;
use instalite::config::{Cli, Config};
use instalite::host::TerminalHost;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so rendered pages on stdout stay clean
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli)?;
    tracing::debug!("Using API at {}", config.api.base_url);

    let tokens = Arc::new(FileTokenStore::new(config.token_path()));
    let host = Arc::new(TerminalHost::new(cli.yes));
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.api.timeout_secs))
        .build()?;
    let api = ApiClient::with_http(http, &config.base_url()?, tokens, host);

    let app = instalite::cli::run(cli.command, api).await?;

    let output = if cli.html {
        app.render_html().await?
    } else {
        app.render_text().await
    };
    if !output.is_empty() {
        println!("{}", output);
    }

    Ok(())
}
