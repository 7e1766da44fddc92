use anyhow::Context;
use clap::Parser;
use docindex::cli::Cli;
use docindex::{IndexServer, Settings};
use rmcp::{ServiceExt, transport::stdio};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr to avoid interfering with MCP protocol on stdout
    docindex::tracing::init(cli.verbose);

    let mut settings = Settings::load(cli.config.as_deref()).context("Failed to load configuration")?;
    cli.apply(&mut settings);

    tracing::info!("Starting docindex MCP server");

    let server = IndexServer::new(settings);

    // Preload the configured directory; a bad path is reported but not fatal
    let preload = server.state().search_dir().await;
    if let Some(dir) = preload {
        match server.state().set_search_dir(&dir).await {
            Ok(corpus) => tracing::info!(
                "Preloaded {} ({} entries)",
                corpus.root().display(),
                corpus.total_entries()
            ),
            Err(e) => tracing::warn!("Could not preload {}: {:#}", dir.display(), e),
        }
    }

    // Create and serve the MCP server over stdio
    let service = server.serve(stdio()).await.inspect_err(|e| {
        tracing::error!("Error serving MCP server: {:?}", e);
    })?;

    // Wait for the service to complete
    service.waiting().await?;

    Ok(())
}
