//! Library Desk - text menu library catalog manager

use std::io;
use std::path::Path;

use clap::Parser;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use library_desk::{cli, config::AppConfig, AppState};

#[derive(Parser, Debug)]
#[command(name = "library-desk", version, about = "In-memory library catalog manager")]
struct Args {
    /// Configuration file replacing config/default
    #[arg(short, long)]
    config: Option<String>,

    /// Library snapshot to use for Save/Load, loaded at startup when present
    #[arg(short, long)]
    data: Option<String>,
}

fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(ref data) = args.data {
        config.storage.data_file = data.clone();
    }

    // Initialize tracing on stderr, the menu owns stdout
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("library_desk={}", config.logging.level).into());
    let json = config.logging.format.eq_ignore_ascii_case("json");

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| fmt::layer().json().with_writer(io::stderr)))
        .with((!json).then(|| fmt::layer().with_writer(io::stderr)))
        .init();

    tracing::info!("Starting Library Desk v{}", env!("CARGO_PKG_VERSION"));

    let mut state = AppState::new(config);

    if args.data.is_some() {
        let path = Path::new(&state.config.storage.data_file).to_path_buf();
        if path.exists() {
            state.services.persistence.load(&mut state.repository, &path)?;
        } else {
            tracing::info!("No snapshot at {}, starting with an empty library", path.display());
        }
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut console = cli::Console::new(stdin.lock(), stdout.lock());
    cli::run(&mut state, &mut console)?;

    tracing::info!("Library Desk stopped");
    Ok(())
}
