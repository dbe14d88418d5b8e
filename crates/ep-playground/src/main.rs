//! ep-playground: Editor Playground Main Binary
//!
//! Usage:
//!   ep-playground                   - Start the playground server
//!   ep-playground --config <path>   - Start with a specific config file
//!   ep-playground --port <n>        - Override the listen port
//!   ep-playground --help            - Show help

use std::path::PathBuf;

use ep_api::{AppState, PlaygroundServer};
use ep_core::Config;
use tracing_subscriber::EnvFilter;

/// Run mode
#[derive(Debug, PartialEq)]
enum RunMode {
    /// Serve the playground
    Server {
        config_path: Option<PathBuf>,
        port: Option<u16>,
    },
    /// Show help
    Help,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let mode = parse_args(std::env::args().skip(1))?;

    let (config_path, port) = match mode {
        RunMode::Help => {
            print_help();
            return Ok(());
        }
        RunMode::Version => {
            println!("ep-playground {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        RunMode::Server { config_path, port } => (config_path, port),
    };

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    // Load .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let mut config = match &config_path {
        Some(path) => Config::from_toml_file(path),
        None => Config::load(),
    }
    .map_err(|e| anyhow::anyhow!("Config error: {}", e))?;
    if let Some(port) = port {
        config.server.port = port;
    }

    tracing::info!("Starting ep-playground...");
    tracing::info!("Editor: {}", config.editor.url);
    tracing::info!("Sessions directory: {}", config.storage.sessions_dir.display());

    run_server(config).await
}

/// Parse command line arguments
fn parse_args(args: impl IntoIterator<Item = String>) -> anyhow::Result<RunMode> {
    let mut config_path = None;
    let mut port = None;

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--help" | "-h" => return Ok(RunMode::Help),
            "--version" | "-v" => return Ok(RunMode::Version),
            "--config" | "-c" => {
                let path = args.next().ok_or_else(|| anyhow::anyhow!("--config requires a path"))?;
                config_path = Some(PathBuf::from(path));
            }
            "--port" | "-p" => {
                let value = args.next().ok_or_else(|| anyhow::anyhow!("--port requires a number"))?;
                port = Some(value.parse::<u16>().map_err(|e| anyhow::anyhow!("Invalid port {:?}: {}", value, e))?);
            }
            other => anyhow::bail!("Unknown argument: {} (see --help)", other),
        }
    }

    Ok(RunMode::Server { config_path, port })
}

/// Print help message
fn print_help() {
    println!("ep-playground - Editor Playground");
    println!();
    println!("Usage:");
    println!("  ep-playground                  Start the playground server");
    println!("  ep-playground --config <path>  Load configuration from <path>");
    println!("  ep-playground --port <n>       Listen on port <n>");
    println!("  ep-playground --help           Show this help message");
    println!("  ep-playground --version        Show version");
    println!();
    println!("Configuration file: ./editor-playground.toml (optional)");
    println!();
    println!("Environment Variables:");
    println!("  PLAYGROUND_HOST            Listen address (default: 127.0.0.1)");
    println!("  PLAYGROUND_PORT            Listen port (default: 3000)");
    println!("  PLAYGROUND_ALLOWED_ORIGINS Comma-separated CORS origins (default: any)");
    println!("  SESSIONS_DIR               Session directory (default: data/sessions)");
    println!("  EDITOR_URL                 Editor URL (default: https://www.photopea.com)");
    println!("  AUTOSAVE_ENABLED           Save sessions automatically (default: true)");
    println!("  AUTOSAVE_DELAY_MS          Quiet period before saving (default: 1000)");
}

/// Run the playground server until Ctrl+C
async fn run_server(config: Config) -> anyhow::Result<()> {
    let state = AppState::new(config).map_err(|e| anyhow::anyhow!("Failed to initialize: {}", e))?;
    let server = PlaygroundServer::new(state.clone());

    let mut handle = tokio::spawn(async move {
        if let Err(e) = server.run().await {
            tracing::error!("HTTP server error: {}", e);
        }
    });

    tracing::info!("Press Ctrl+C to exit");

    // Wait for shutdown signal or server exit
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result?;
            tracing::info!("Shutting down...");
        }
        _ = &mut handle => {
            tracing::warn!("HTTP server stopped");
        }
    }
    handle.abort();

    // Persist anything still waiting for its quiet period
    let saved = state.flush().await;
    let released = state.live.lock().await.release_previews(&state.previews);
    tracing::info!("Saved {} pending session(s), released {} preview(s)", saved, released);

    tracing::info!("ep-playground stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_default() {
        assert_eq!(
            parse_args(args(&[])).unwrap(),
            RunMode::Server {
                config_path: None,
                port: None
            }
        );
    }

    #[test]
    fn test_parse_flags() {
        assert_eq!(parse_args(args(&["--help"])).unwrap(), RunMode::Help);
        assert_eq!(parse_args(args(&["-v"])).unwrap(), RunMode::Version);
        assert_eq!(
            parse_args(args(&["--config", "custom.toml", "--port", "8080"])).unwrap(),
            RunMode::Server {
                config_path: Some(PathBuf::from("custom.toml")),
                port: Some(8080)
            }
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_args(args(&["--port"])).is_err());
        assert!(parse_args(args(&["--port", "http"])).is_err());
        assert!(parse_args(args(&["--verbose"])).is_err());
    }
}
