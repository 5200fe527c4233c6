use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use log::info;

use media_dl_client::commands;
use media_dl_client::config::AppConfig;
use media_dl_client::trigger::{Provider, TriggerOutcome};

#[derive(Parser, Debug)]
#[command(
    name = "media-dl",
    version,
    about = "Send Spotify/YouTube links to a download server and pick up the result"
)]
struct Cli {
    /// Download server base URL (overrides the config file)
    #[arg(long, global = true)]
    server: Option<String>,

    /// Read configuration from this file instead of the user config
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ask the server to download a track and show the result link
    Download {
        #[arg(short, long, value_enum, default_value = "spotify")]
        provider: ProviderArg,
        url: String,
        /// Fetch the produced file once the server is done
        #[arg(long)]
        save: bool,
    },
    /// Fetch a result reference (e.g. /descargar/song.mp3) into the download directory
    Fetch {
        reference: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Fetch every produced file as one zip archive
    FetchAll {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// End the server session
    Logout,
    /// Print the effective configuration
    Config {
        /// Print only the config file location
        #[arg(long)]
        path: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ProviderArg {
    #[value(alias = "spdl")]
    Spotify,
    #[value(name = "youtube", alias = "ytdl")]
    YouTube,
}

impl From<ProviderArg> for Provider {
    fn from(arg: ProviderArg) -> Self {
        match arg {
            ProviderArg::Spotify => Provider::Spotify,
            ProviderArg::YouTube => Provider::YouTube,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_default_env()
        .filter_level(if cli.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .init();

    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => AppConfig::get_config_path()?,
    };

    if let Command::Config { path: true } = cli.command {
        println!("{}", config_path.display());
        return Ok(());
    }

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    }
    .unwrap_or_else(|e| {
        log::error!("Failed to load configuration: {}", e);
        AppConfig::default()
    });

    if let Some(server) = cli.server {
        config.server_url = server;
    }
    info!("Using server {}", config.server_url);

    if let Command::Config { .. } = cli.command {
        commands::show_config(&config)?;
        return Ok(());
    }

    let state = commands::AppState::new(config)?;

    match cli.command {
        Command::Download { provider, url, save } => {
            let outcome = commands::download(&state, provider.into(), &url, save).await?;
            if !matches!(outcome, TriggerOutcome::Completed { .. }) {
                std::process::exit(1);
            }
        }
        Command::Fetch { reference, output } => {
            commands::fetch(&state, &reference, output.as_deref()).await?;
        }
        Command::FetchAll { output } => {
            commands::fetch_all(&state, output.as_deref()).await?;
        }
        Command::Logout => commands::logout(&state).await?,
        Command::Config { .. } => {}
    }

    Ok(())
}
