//! CLI for uploading and booting ROMs through a USB2SNES daemon.

#![allow(
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::missing_docs_in_private_items
)]

mod upload;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use tracing_subscriber::EnvFilter;
use usb2snes::{Client, WsTransport};

#[derive(Parser)]
#[command(name = "usb2snes", version, about = "Upload and boot ROMs on an SD2SNES")]
struct Cli {
    /// WebSocket address of the usb2snes daemon.
    #[arg(
        short = 'a',
        long,
        global = true,
        env = "USB2SNES_ADDRESS",
        default_value = usb2snes::DEFAULT_ADDRESS
    )]
    address: String,

    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` overrides.
    #[arg(short = 'v', long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors.
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Upload a file to the device.
    #[command(visible_alias = "put")]
    Upload(upload::UploadArgs),

    /// List a directory on the device.
    #[command(visible_alias = "ls")]
    List {
        /// Directory to list.
        #[arg(default_value = "/")]
        path: String,

        /// Output format.
        #[arg(long, default_value = "table")]
        format: OutputFormat,
    },

    /// Boot a file already on the device.
    Boot {
        /// usb2snes path of the file.
        path: String,
    },

    /// Show the devices the daemon can see.
    Devices,

    /// Generate shell completion scripts.
    #[command(hide = true)]
    Completion {
        /// Target shell.
        shell: Shell,
    },
}

/// Output format for list commands.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable listing.
    #[default]
    Table,
    /// Machine-readable JSON.
    Json,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);
    if let Err(e) = cli.dispatch().await {
        eprintln!("usb2snes: {e:#}");
        std::process::exit(1);
    }
}

/// Default filter directives for the given verbosity flags.
const fn log_filter(verbose: u8, quiet: bool) -> &'static str {
    match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn,usb2snes=info,usb2snes_cli=info",
        (false, 1) => "debug",
        (false, _) => "trace",
    }
}

/// Installs a stderr subscriber; `RUST_LOG` takes precedence over flags.
fn init_tracing(verbose: u8, quiet: bool) {
    let level = log_filter(verbose, quiet);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

impl Cli {
    async fn dispatch(self) -> Result<()> {
        match self.command {
            Command::Upload(args) => upload::run(&self.address, args).await,
            Command::List { path, format } => list(&self.address, &path, format).await,
            Command::Boot { path } => boot(&self.address, &path).await,
            Command::Devices => devices(&self.address).await,
            Command::Completion { shell } => {
                clap_complete::generate(
                    shell,
                    &mut Self::command(),
                    "usb2snes",
                    &mut std::io::stdout(),
                );
                Ok(())
            }
        }
    }
}

/// Connects to the daemon at `address`.
pub(crate) async fn connect(address: &str) -> Result<Client<WsTransport>> {
    let transport = WsTransport::connect(address)
        .await
        .with_context(|| format!("cannot connect to usb2snes at {address}"))?;
    Ok(Client::new(transport))
}

/// Connects and attaches, returning the client and the device name.
pub(crate) async fn connect_attached(address: &str) -> Result<(Client<WsTransport>, String)> {
    let mut client = connect(address).await?;
    let device = client.find_and_attach_device().await?;
    Ok((client, device))
}

async fn list(address: &str, path: &str, format: OutputFormat) -> Result<()> {
    let (mut client, _device) = connect_attached(address).await?;
    let listing = client
        .list_directory(path)
        .await
        .with_context(|| format!("cannot list {path}"))?;

    if matches!(format, OutputFormat::Json) {
        let obj = serde_json::json!({
            "dirs": listing.dirs,
            "files": listing.files,
        });
        println!("{}", serde_json::to_string_pretty(&obj)?);
        close(client).await;
        return Ok(());
    }

    for d in &listing.dirs {
        println!("{d}/");
    }
    for f in &listing.files {
        println!("{f}");
    }
    close(client).await;
    Ok(())
}

async fn boot(address: &str, path: &str) -> Result<()> {
    let (mut client, device) = connect_attached(address).await?;
    println!("Booting {path} on {device}");
    client.boot(path).await?;
    close(client).await;
    Ok(())
}

async fn devices(address: &str) -> Result<()> {
    let mut client = connect(address).await?;
    let list = client.device_list().await?;
    if list.is_empty() {
        println!("No devices.");
    }
    for d in &list {
        println!("{d}");
    }
    close(client).await;
    Ok(())
}

/// Closes the WebSocket so fire-and-forget commands are flushed.
pub(crate) async fn close(client: Client<WsTransport>) {
    let mut transport = client.into_inner();
    if let Err(e) = transport.close().await {
        tracing::debug!(error = %e, "close handshake failed");
    }
}
