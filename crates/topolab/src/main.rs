mod commands;
mod connect;

use clap::{Parser, Subcommand};
use topolab_config::CloudSettings;

#[derive(Parser)]
#[command(name = "topolab")]
#[command(about = "Run network topology labs on cloud instances", long_about = None)]
struct Cli {
    /// Cloud provider (rackspace, dummy); overrides the settings file.
    /// The dummy account is in memory and is reset on every command.
    #[arg(short, long, global = true)]
    provider: Option<String>,

    /// Provider region (e.g. DFW); overrides the settings file
    #[arg(short, long, global = true)]
    region: Option<String>,

    /// Log provider calls (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the configured credentials against the provider
    Auth,
    /// List machine sizes offered by the provider
    Sizes,
    /// List boot images offered by the provider
    Images,
    /// Manage cloud instances
    #[command(subcommand)]
    Instances(InstanceCommands),
    /// Manage SSH key pairs
    #[command(subcommand)]
    Keypairs(KeyPairCommands),
    /// Show cloud settings
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Show version information
    Version,
}

#[derive(Subcommand)]
pub enum InstanceCommands {
    /// List instances in the current region
    List,
    /// Show one instance
    Get {
        /// Instance ID
        id: String,
    },
    /// Create an instance
    Create {
        /// Instance name
        name: String,
        /// Size (flavor) ID; defaults to new_instance_flavor
        #[arg(long)]
        size: Option<String>,
        /// Image ID; defaults to default_image
        #[arg(long)]
        image: Option<String>,
        /// Name of a registered key pair to install for SSH access
        #[arg(long)]
        keypair: Option<String>,
    },
    /// Delete an instance
    Delete {
        /// Instance ID
        id: String,
    },
}

#[derive(Subcommand)]
pub enum KeyPairCommands {
    /// List key pairs
    List,
    /// Register a new key pair and print its private key
    Create {
        /// Key pair name
        name: String,
    },
    /// Delete a key pair
    Delete {
        /// Key pair name
        name: String,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective settings (API key masked)
    Show,
    /// Print the settings file path
    Path,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // version needs no settings file
    if matches!(cli.command, Commands::Version) {
        println!("topolab {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let mut settings = CloudSettings::load()?;
    if let Some(provider) = cli.provider {
        settings.cloud_provider = provider;
    }
    if let Some(region) = cli.region {
        settings.cloud_region = region;
    }

    if let Commands::Config(cmd) = cli.command {
        return commands::config::handle(&settings, cmd);
    }

    let ctrl = connect::connect(&settings)?;

    match cli.command {
        Commands::Auth => commands::auth::handle(&ctrl).await,
        Commands::Sizes => commands::catalog::sizes(&ctrl).await,
        Commands::Images => commands::catalog::images(&ctrl).await,
        Commands::Instances(cmd) => commands::instances::handle(&ctrl, &settings, cmd).await,
        Commands::Keypairs(cmd) => commands::keypairs::handle(&ctrl, cmd).await,
        Commands::Config(_) | Commands::Version => Ok(()),
    }
}
