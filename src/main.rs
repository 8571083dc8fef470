use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use mindmap_gen::anthropic::AnthropicClient;
use mindmap_gen::cli::{Cli, Command};
use mindmap_gen::config::AppConfig;
use mindmap_gen::generator::MindMapGenerator;
use mindmap_gen::pipeline::generate_from_csv;
use mindmap_gen::server::{self, AppState};
use mindmap_gen::store::{FileStore, MindMapFilter, MindMapStore};
use mindmap_gen::ui::{self, BatchProgress};

/// `RUST_LOG` wins when set; otherwise `debug` with `--verbose`, `warn` without.
fn log_filter(verbose: bool, rust_log: Option<&str>) -> EnvFilter {
    let default_level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    EnvFilter::builder()
        .with_default_directive(default_level.into())
        .parse_lossy(rust_log.unwrap_or_default())
}

fn init_tracing(verbose: bool) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(verbose, rust_log.as_deref()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn build_generator(config: &AppConfig) -> Result<MindMapGenerator<AnthropicClient, FileStore>> {
    let client = AnthropicClient::new(config.api_key.clone())
        .context("failed to build HTTP client")?;
    Ok(MindMapGenerator::new(
        client,
        FileStore::new(&config.store_dir),
        config.completion_settings(),
    ))
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = AppConfig::load().context("failed to load configuration")?;
    if let Some(concurrency) = cli.concurrency {
        config.concurrency = concurrency;
    }
    if let Some(model) = cli.model {
        config.model = model;
    }

    match cli.command {
        Command::Generate { file } => {
            config.validate()?;
            let generator = build_generator(&config)?;
            let progress = BatchProgress::start(&file);

            let result = generate_from_csv(&config, &file, |item| {
                let progress = &progress;
                let pending = generator.transform(item);
                async move {
                    let result = pending.await;
                    progress.item_settled();
                    result
                }
            })
            .await;

            match result {
                Ok(report) => progress.complete(&report),
                Err(e) => {
                    progress.abandon();
                    return Err(e).with_context(|| format!("batch for {file} did not run"));
                }
            }
        }
        Command::List {
            subject,
            topic,
            json,
        } => {
            let store = FileStore::new(&config.store_dir);
            let docs = store.list(&MindMapFilter { subject, topic }).await?;
            ui::print_mind_maps(&docs, json);
        }
        Command::Serve { port } => {
            if let Some(port) = port {
                config.port = port;
            }
            config.validate_for_server()?;
            let generator = build_generator(&config)?;
            let state = AppState {
                config: Arc::new(config),
                generator: Arc::new(generator),
            };
            server::serve(state).await?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_level_follows_verbose_flag() {
        assert_eq!(log_filter(false, None).to_string(), "warn");
        assert_eq!(log_filter(true, None).to_string(), "debug");
        assert_eq!(log_filter(false, Some("")).to_string(), "warn");
    }

    #[test]
    fn rust_log_overrides_default_level() {
        assert_eq!(log_filter(false, Some("debug")).to_string(), "debug");
        assert_eq!(log_filter(true, Some("error")).to_string(), "error");
    }
}
