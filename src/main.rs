//! Better Playwright MCP
//!
//! Serves the MCP bridge over stdio, or launches the Playwright HTTP server.

use anyhow::{bail, Context};
use better_playwright_mcp::config::{BASE_URL_ENV_VAR, DEFAULT_BASE_URL};
use better_playwright_mcp::launcher::{
    LaunchConfig, RunOutcome, ServerLauncher, DEFAULT_SERVER_SCRIPT, PORT_ENV_VAR,
};
use better_playwright_mcp::{ClientConfig, McpServer, PlaywrightClient};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Better Playwright MCP
#[derive(Parser, Debug)]
#[command(name = "better-playwright")]
#[command(version)]
#[command(about = "Token-efficient browser automation over MCP")]
#[command(long_about = r#"Token-efficient browser automation over MCP

Exposes a Playwright HTTP server as MCP tools on stdio. get_outline and
search_snapshot return compact views of the page instead of full snapshots.

EXAMPLES:
  # Serve MCP on stdio against the default server
  better-playwright

  # Point at a server on another port
  BETTER_PLAYWRIGHT_URL=http://localhost:3103 better-playwright mcp

  # Start the Playwright HTTP server
  PORT=3103 better-playwright server --headless
"#)]
struct Args {
    /// Enable verbose logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve MCP over stdio (default)
    Mcp {
        /// Base URL of the Playwright HTTP server
        #[arg(long, env = BASE_URL_ENV_VAR, default_value = DEFAULT_BASE_URL)]
        url: String,
    },

    /// Launch the Playwright HTTP server and stop it on SIGINT/SIGTERM
    Server {
        /// Port the server listens on
        #[arg(short, long, env = PORT_ENV_VAR, default_value_t = 3102)]
        port: u16,

        /// Run the browser headless
        #[arg(long)]
        headless: bool,

        /// Program used to run the server script
        #[arg(long, default_value = "node")]
        node: String,

        /// Server entry script
        #[arg(long, default_value = DEFAULT_SERVER_SCRIPT)]
        script: PathBuf,

        /// Seconds to wait after SIGTERM before killing the server
        #[arg(long, default_value_t = 5)]
        stop_grace: u64,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // stdout carries MCP frames, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let command = args.command.unwrap_or_else(|| Commands::Mcp {
        url: std::env::var(BASE_URL_ENV_VAR)
            .ok()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
    });

    match command {
        Commands::Mcp { url } => {
            let config = ClientConfig::new(&url).context("invalid Playwright server URL")?;
            let server = McpServer::new(PlaywrightClient::new(config));
            server.run().await?;
        }
        Commands::Server {
            port,
            headless,
            node,
            script,
            stop_grace,
        } => {
            let config = LaunchConfig::builder()
                .program(node)
                .script(script)
                .port(port)
                .headless(headless)
                .stop_grace(Duration::from_secs(stop_grace))
                .build();

            let mut launcher = ServerLauncher::new(config);
            if let RunOutcome::Exited(status) = launcher.run_until_signal().await? {
                if !status.success() {
                    bail!("Playwright server exited with {}", status);
                }
            }
        }
    }

    Ok(())
}
