//! Oscar CLI - send and receive Open Sound Control messages
//!
//! `oscar send` writes a single message to a UDP endpoint; `oscar receive`
//! runs a dispatch listener that logs every message it routes.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use oscar_core::{codec, Argument, Message};
use oscar_server::{handler_fn, Listener, ServerError, Shutdown};
use oscar_transport::{DatagramSocket, UdpTransport};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod args;
mod config;

use config::{Config, ReceiveConfig};

/// Oscar - Open Sound Control over UDP
#[derive(Parser)]
#[command(name = "oscar")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send one message
    Send {
        /// Destination host:port
        #[arg(short, long)]
        to: String,

        /// Local address to send from
        #[arg(short, long, default_value = "0.0.0.0:0")]
        bind: String,

        /// Address pattern of the message
        #[arg(short, long, default_value = "/test")]
        address: String,

        /// Arguments: i:12, f:0.5, s:text, t:now, t:<raw>, T, F, N, I
        #[arg(value_parser = args::parse_argument, allow_hyphen_values = true)]
        arguments: Vec<Argument>,
    },

    /// Listen for messages and log the ones matching the patterns
    Receive {
        /// Address to listen on
        #[arg(short, long)]
        bind: Option<String>,

        /// Number of worker tasks
        #[arg(short, long)]
        workers: Option<usize>,

        /// Decoded messages buffered ahead of the workers
        #[arg(short, long)]
        queue_capacity: Option<usize>,

        /// Log messages that match no pattern
        #[arg(long)]
        strict: bool,

        /// Pattern to register (repeatable)
        #[arg(short, long = "pattern")]
        patterns: Vec<String>,
    },

    /// Show version and supported argument types
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    setup_logging(&cli.log_level, cli.json_logs)?;

    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Send {
            to,
            bind,
            address,
            arguments,
        } => {
            send(&to, &bind, address, arguments).await?;
        }

        Commands::Receive {
            bind,
            workers,
            queue_capacity,
            strict,
            patterns,
        } => {
            let mut receive_config = config.receive;
            if let Some(bind) = bind {
                receive_config.bind = bind;
            }
            if let Some(workers) = workers {
                receive_config.workers = workers;
            }
            if let Some(capacity) = queue_capacity {
                receive_config.queue_capacity = capacity;
            }
            if strict {
                receive_config.strict_routing = true;
            }
            if !patterns.is_empty() {
                receive_config.patterns = patterns;
            }
            receive(receive_config).await?;
        }

        Commands::Info => {
            print_info();
        }
    }

    Ok(())
}

fn setup_logging(level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .context("Failed to parse log level")?;

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).compact())
            .init();
    }

    Ok(())
}

async fn send(to: &str, bind: &str, address: String, arguments: Vec<Argument>) -> Result<()> {
    let socket = UdpTransport::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;

    let arguments = if arguments.is_empty() {
        vec![Argument::Int32(12)]
    } else {
        arguments
    };
    let message = Message { address, arguments };

    println!(
        "{} Sending {} to {}",
        "OSCAR".cyan().bold(),
        message.to_string().yellow(),
        to
    );
    oscar_transport::send(&socket, to, &message)
        .await
        .with_context(|| format!("Failed to send to {}", to))?;
    println!("{} Sent {} bytes", "OK".green().bold(), message.encoded_len());

    Ok(())
}

async fn receive(config: ReceiveConfig) -> Result<()> {
    let socket = UdpTransport::bind(&config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    let addr = socket.local_addr()?;

    let mut listener = Listener::with_config(socket, config.listener_config());
    for pattern in &config.patterns {
        let registered = pattern.clone();
        listener.handle(
            pattern.as_str(),
            handler_fn(move |msg: &Message| {
                info!("{}: recv: {}", registered, msg);
                Ok(())
            }),
        );
    }

    println!(
        "{} Listening on {} ({} workers)",
        "OSCAR".cyan().bold(),
        addr.to_string().green(),
        config.workers
    );
    for pattern in &config.patterns {
        println!("  {}", pattern.yellow());
    }

    // Handle Ctrl+C
    let shutdown = Shutdown::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received shutdown signal");
                signal.cancel();
            }
            Err(e) => warn!("Failed to listen for ctrl+c: {}", e),
        }
    });

    match listener.serve(shutdown).await {
        Ok(()) | Err(ServerError::Cancelled) => {
            println!("{}", "Listener stopped".yellow());
            Ok(())
        }
        Err(e) => Err(e).context("Listener failed"),
    }
}

fn print_info() {
    println!("{}", "Oscar - Open Sound Control over UDP".cyan().bold());
    println!();
    println!("Version:    {}", env!("CARGO_PKG_VERSION"));
    println!("Platform:   {}", std::env::consts::OS);
    println!("Arch:       {}", std::env::consts::ARCH);
    println!();
    println!("{}", "Supported Argument Types:".green());
    for tag in codec::registered_tags() {
        println!("  {}  {}", tag.to_string().yellow(), type_name(tag));
    }
    println!();
    println!("{}", "Examples:".green());
    println!("  oscar receive --bind 127.0.0.1:9000           # Log /test, /test/a..c");
    println!("  oscar send --to 127.0.0.1:9000                # Send /test 12");
    println!("  oscar send --to 127.0.0.1:9000 -a '/test/*' s:hi f:0.5");
}

fn type_name(tag: char) -> &'static str {
    match tag {
        'i' => "int32",
        'f' => "float32",
        's' => "string",
        't' => "time tag",
        'T' => "true",
        'F' => "false",
        'N' => "null",
        'I' => "impulse",
        _ => "unknown",
    }
}
