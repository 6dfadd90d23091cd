//! usermap command-line tool.
//!
//! Creates `UserIdentityMapping` objects on a cluster API server, binding an
//! external identity to a cluster user. Also provides helpers to generate and
//! validate the connection configuration.

mod create;
mod style;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use usermap_core::client::{ConfigClientFactory, RestClient};
use usermap_core::config::{self, ClientConfig, ConfigOverrides};

use create::CreateCommands;

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// usermap command-line tool.
#[derive(Parser, Debug)]
#[command(
    name = "usermap",
    version,
    about = "Map external identities to cluster user accounts"
)]
struct Cli {
    /// Path to the connection configuration file.
    #[arg(long, global = true, env = config::CONFIG_ENV)]
    config: Option<PathBuf>,

    /// API server URL, overriding the configuration file.
    #[arg(long, global = true)]
    server: Option<String>,

    /// Bearer token for the API server.
    #[arg(long, global = true)]
    token: Option<String>,

    /// Do not verify the server certificate.
    #[arg(long, global = true)]
    insecure_skip_tls_verify: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a resource on the cluster.
    Create {
        #[command(subcommand)]
        resource: CreateCommands,
    },

    /// Generate a default connection configuration file.
    Init {
        /// Output path for the generated config file.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate the connection configuration.
    Validate,
}

impl Cli {
    fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(config::default_config_path)
    }

    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            server: self.server.clone(),
            token: self.token.clone(),
            insecure_skip_tls_verify: self.insecure_skip_tls_verify,
        }
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Minimal logging for CLI; stdout is reserved for command output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config_path();
    match cli.command {
        Commands::Create { ref resource } => match resource {
            CreateCommands::UserIdentityMapping(args) => {
                let factory = ConfigClientFactory::new(&config_path, cli.overrides());
                create::run_create_user_identity_mapping(args, &factory, std::io::stdout()).await
            }
        },
        Commands::Init { ref output } => {
            cmd_init(output.as_deref().unwrap_or(config_path.as_path()))
        }
        Commands::Validate => cmd_validate(&config_path, &cli.overrides()),
    }
}

// ---------------------------------------------------------------------------
// Subcommand implementations
// ---------------------------------------------------------------------------

fn cmd_init(output: &Path) -> Result<()> {
    if output.exists() {
        anyhow::bail!(
            "file already exists: {}. Use a different path or remove the existing file.",
            output.display()
        );
    }

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    std::fs::write(output, config::DEFAULT_CONFIG_TEMPLATE)
        .context("failed to write config file")?;

    println!("Default configuration written to {}", output.display());
    println!();
    println!("Next steps:");
    println!("  1. Set [cluster].server to your API server URL");
    println!("  2. Export the token variable named by [auth].token_env (default USERMAP_TOKEN)");
    println!(
        "  3. Validate with: usermap validate --config {}",
        output.display()
    );

    Ok(())
}

fn cmd_validate(config_path: &Path, overrides: &ConfigOverrides) -> Result<()> {
    println!(
        "{}",
        style::header(&format!("Validating configuration: {}", config_path.display()))
    );
    println!();

    let mut config =
        ClientConfig::load_or_default(config_path).context("failed to parse configuration")?;
    if config_path.exists() {
        println!("  {}", style::success("TOML structure is valid"));
    } else {
        println!(
            "  {}",
            style::warn("no configuration file found, using defaults")
        );
    }

    config.resolve_env_vars();
    config.apply_overrides(overrides);
    println!(
        "  {}",
        style::success("Environment variable references processed")
    );

    if let Err(e) = config.validate() {
        println!(
            "  {}",
            style::error(&format!("Validation error: {}", e))
        );
        anyhow::bail!("configuration validation failed");
    }
    println!("  {}", style::success("All required fields are valid"));

    RestClient::from_config(&config).context("failed to build API client")?;
    println!("  {}", style::success("API client can be built"));

    // Summary
    println!();
    println!("Configuration summary:");
    println!("  Server        : {}", config.cluster.server);
    println!(
        "  CA bundle     : {}",
        config
            .cluster
            .certificate_authority
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| style::dim("system roots"))
    );
    println!(
        "  TLS verify    : {}",
        if config.cluster.insecure_skip_tls_verify {
            "DISABLED"
        } else {
            "enabled"
        }
    );
    println!(
        "  Token         : {} (from {})",
        if config.auth.token.is_some() {
            "set"
        } else {
            "NOT SET"
        },
        config.auth.token_env
    );
    println!("  Timeout       : {}s", config.client.timeout_secs);
    println!();
    println!("Configuration is valid.");

    Ok(())
}
