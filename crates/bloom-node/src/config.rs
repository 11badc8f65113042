//! # Node Configuration
//!
//! Command-line arguments and the resolved node configuration.
//!
//! Precedence: explicit flag > environment (`BLOOM_FILES`, `BLOOM_PORT`) >
//! built-in default.

use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use bloom_filters::config::{DEFAULT_HASH_COUNT, DEFAULT_SIZE_BITS};
use bloom_filters::{FilterConfig, LEGACY_SALT};
use bloom_gateway::GatewayConfig;
use clap::{Args, Parser, Subcommand};

/// Default dictionary list
pub const DEFAULT_FILES: &str = "mid";

/// Default listen port
pub const DEFAULT_PORT: u16 = 8080;

/// Bloom Node: keyword membership service
#[derive(Parser, Debug)]
#[command(name = "bloom-node")]
#[command(about = "Serve keyword bloom filters loaded from dictionary files")]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub serve: ServeArgs,
}

impl Cli {
    /// The command to run; serving is the default
    pub fn into_command(self) -> Command {
        self.command.unwrap_or(Command::Serve(self.serve))
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load dictionaries and serve HTTP (default)
    Serve(ServeArgs),
    /// Print the add-keyword token for a filter and keyword
    Token(TokenArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Comma-separated dictionary files; each becomes a filter named after its base name
    #[arg(short = 'f', long = "files")]
    pub files: Option<String>,

    /// Listen port
    #[arg(short = 'p', long = "port")]
    pub port: Option<u16>,

    /// Bind address
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,

    /// Filter size in bits
    #[arg(long, default_value_t = DEFAULT_SIZE_BITS)]
    pub bits: usize,

    /// Number of hash functions per filter
    #[arg(long, default_value_t = DEFAULT_HASH_COUNT)]
    pub hashes: usize,

    /// Salt for add-keyword tokens
    #[arg(long, default_value = LEGACY_SALT)]
    pub salt: String,

    /// Abort startup if loading takes longer than this many seconds
    #[arg(long)]
    pub load_timeout: Option<u64>,
}

#[derive(Args, Debug, Clone)]
pub struct TokenArgs {
    /// Filter name
    #[arg(long)]
    pub id: String,

    /// Keyword to authorize
    #[arg(long)]
    pub keyword: String,

    /// Salt for add-keyword tokens
    #[arg(long, default_value = LEGACY_SALT)]
    pub salt: String,
}

/// Complete node configuration
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Dictionary sources, in the order given
    pub sources: Vec<PathBuf>,
    /// Filter parameters
    pub filters: FilterConfig,
    /// Gateway configuration
    pub gateway: GatewayConfig,
}

impl NodeConfig {
    /// Resolve configuration from arguments, reading the process environment
    pub fn from_args(args: &ServeArgs) -> Result<Self> {
        Self::resolve(args, |key| std::env::var(key).ok())
    }

    /// Resolve configuration from arguments and an environment lookup
    pub fn resolve<E>(args: &ServeArgs, env: E) -> Result<Self>
    where
        E: Fn(&str) -> Option<String>,
    {
        let files = match &args.files {
            Some(files) => files.clone(),
            None => env("BLOOM_FILES").unwrap_or_else(|| DEFAULT_FILES.to_string()),
        };
        let sources = parse_sources(&files);
        if sources.is_empty() {
            bail!("no dictionary files given");
        }

        let port = match args.port {
            Some(port) => port,
            None => match env("BLOOM_PORT") {
                Some(value) => value
                    .parse()
                    .with_context(|| format!("BLOOM_PORT is not a valid port: {value:?}"))?,
                None => DEFAULT_PORT,
            },
        };

        let mut filters = FilterConfig::new(args.bits, args.hashes);
        if let Some(secs) = args.load_timeout {
            filters = filters.with_load_timeout(Duration::from_secs(secs));
        }
        filters.validate().context("invalid filter parameters")?;

        let mut gateway = GatewayConfig::default();
        gateway.http.host = args.host;
        gateway.http.port = port;
        gateway.token.salt = args.salt.clone();
        gateway.validate().context("invalid gateway configuration")?;

        Ok(Self {
            sources,
            filters,
            gateway,
        })
    }
}

/// Split a comma-separated file list, dropping blank entries
pub fn parse_sources(files: &str) -> Vec<PathBuf> {
    files
        .split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(PathBuf::from)
        .collect()
}
