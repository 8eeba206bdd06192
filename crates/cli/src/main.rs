use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "line-echo")]
#[command(about = "LINE webhook relay that echoes text messages back to the sender", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Run the relay: GET / for liveness, POST /callback for LINE webhooks. Requires ACCESS_TOKEN and CHANNEL_SECRET (env or config).
    Serve {
        /// Config file path (default: LINE_ECHO_CONFIG_PATH or ./line-echo.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,

        /// HTTP port (default from PORT, config, or 8000)
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// Print the X-Line-Signature value for a request body (for manual callback testing).
    Sign {
        /// Body file; reads stdin when omitted or "-".
        #[arg(value_name = "FILE")]
        body: Option<PathBuf>,

        /// Channel secret (default: CHANNEL_SECRET env or config)
        #[arg(long, value_name = "SECRET")]
        secret: Option<String>,

        /// Config file path (default: LINE_ECHO_CONFIG_PATH or ./line-echo.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    // .env values override the inherited environment.
    if let Err(e) = dotenvy::dotenv_override() {
        if !e.not_found() {
            eprintln!("warning: failed to load .env: {}", e);
        }
    }
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            println!("line-echo {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Serve { config, port }) => {
            if let Err(e) = run_serve(config, port).await {
                log::error!("serve failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Sign {
            body,
            secret,
            config,
        }) => {
            if let Err(e) = run_sign(body, secret, config) {
                log::error!("sign failed: {:#}", e);
                std::process::exit(1);
            }
        }
        None => {
            println!("Run with --help for usage");
        }
    }
}

async fn run_serve(config_path: Option<PathBuf>, port: Option<u16>) -> anyhow::Result<()> {
    let (config, path) = lib::config::load_config(config_path)?;
    log::debug!("config path: {}", path.display());
    lib::gateway::run_gateway(config, port).await
}

fn run_sign(
    body_path: Option<PathBuf>,
    secret: Option<String>,
    config_path: Option<PathBuf>,
) -> anyhow::Result<()> {
    let secret = match secret {
        Some(s) => s,
        None => {
            let (config, _) = lib::config::load_config(config_path)?;
            lib::config::resolve_channel_secret(&config)
                .ok_or(lib::config::ConfigError::MissingChannelSecret)?
        }
    };
    let body = match body_path {
        Some(p) if p.as_os_str() != "-" => {
            std::fs::read(&p).with_context(|| format!("reading {}", p.display()))?
        }
        _ => {
            let mut buf = Vec::new();
            std::io::stdin().read_to_end(&mut buf)?;
            buf
        }
    };
    println!("{}", lib::signature::sign(&body, &secret));
    Ok(())
}
