//! # Bloom Node
//!
//! Entry point for the keyword bloom service.
//!
//! ```text
//! bloom-node -f dicts/animals.txt,dicts/colors.txt -p 8080
//! bloom-node token --id animals.txt --keyword fox
//! ```

use anyhow::Result;
use bloom_filters::TokenValidator;
use bloom_gateway::install_panic_hook;
use bloom_node::{block_on, shutdown_signal, Cli, Command, NodeConfig, NodeRuntime};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.into_command() {
        Command::Token(args) => {
            let token = TokenValidator::new(args.salt).expected_token(&args.id, &args.keyword);
            println!("{token}");
            Ok(())
        }
        Command::Serve(args) => {
            init_tracing()?;
            install_panic_hook();

            let config = NodeConfig::from_args(&args)?;
            block_on(serve(config))
        }
    }
}

async fn serve(config: NodeConfig) -> Result<()> {
    let node = NodeRuntime::new(config).start(shutdown_signal()).await?;
    info!(addr = %node.local_addr(), "Bloom node is running. Press Ctrl+C to stop.");

    node.wait().await
}

/// Initialize logging; `RUST_LOG` overrides the default `info` level
fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
