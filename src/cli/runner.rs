//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands};
use crate::config::IngestConfig;
use crate::connector::ConnectorFacade;
use crate::output::{DatasetSink, JsonWriter, OutputFormat};
use crate::types::CorrelationId;
use anyhow::Context;
use std::io;
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> anyhow::Result<()> {
        match &self.cli.command {
            Commands::Fetch {
                seed_url,
                correlation_id,
                output,
                format,
                max_pages,
                timeout_ms,
            } => {
                let mut config = self.load_config()?;
                if let Some(max_pages) = max_pages {
                    config = config.with_max_pages(*max_pages);
                }
                if let Some(timeout_ms) = timeout_ms {
                    config = config.with_timeout_ms(*timeout_ms);
                }
                let correlation_id = correlation_id
                    .as_deref()
                    .map_or_else(CorrelationId::generate, CorrelationId::from);

                self.fetch(&config, seed_url, correlation_id, output.as_deref(), *format)
                    .await
            }
            Commands::Config => self.show_config(),
        }
    }

    /// Load the config file, or defaults when none was given
    fn load_config(&self) -> anyhow::Result<IngestConfig> {
        match &self.cli.config {
            Some(path) => IngestConfig::load(path)
                .with_context(|| format!("failed to load config from {}", path.display())),
            None => Ok(IngestConfig::default()),
        }
    }

    async fn fetch(
        &self,
        config: &IngestConfig,
        seed_url: &str,
        correlation_id: CorrelationId,
        output: Option<&Path>,
        format: OutputFormat,
    ) -> anyhow::Result<()> {
        let facade = ConnectorFacade::from_config(config).context("invalid configuration")?;

        let token = CancellationToken::new();
        let interrupt = {
            let token = token.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("interrupted, cancelling traversal");
                    token.cancel();
                }
            })
        };

        let result = facade
            .fetch_all_with_cancel(seed_url, correlation_id, token)
            .await;
        interrupt.abort();
        let result = result?;

        let written = match output {
            Some(path) => JsonWriter::create(path, format)
                .and_then(|mut sink| sink.write_all(&result))
                .with_context(|| format!("failed to write {}", path.display()))?,
            None => JsonWriter::new(io::stdout().lock(), format)
                .write_all(&result)
                .context("failed to write to stdout")?,
        };

        let stats = result.stats();
        info!(
            items = written,
            pages = stats.pages_fetched,
            elapsed_ms = stats.elapsed.as_millis() as u64,
            "dataset written"
        );
        Ok(())
    }

    fn show_config(&self) -> anyhow::Result<()> {
        let config = self.load_config()?;
        config.validate()?;
        print!("{}", config.to_yaml()?);
        Ok(())
    }
}
