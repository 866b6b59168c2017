mod app;
mod handler;
mod tui;
mod ui;

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{bail, Context, Result};
use clap::Parser;
use thiepcuoi_core::{ApiKey, ChatConfig, Config, ExchangeController, OpenRouterClient};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::app::App;
use crate::tui::{EventHandler, Tui};
use crate::ui::LayoutMode;

/// Environment variable holding the log filter (e.g. `debug`, `thiepcuoi_core=trace`)
const LOG_ENV: &str = "THIEPCUOI_LOG";

#[derive(Parser)]
#[command(name = "thiepcuoi")]
#[command(version, about = "Chat with the wedding invitation sales assistant")]
struct Cli {
    /// Presentation layout (defaults to the config file, then `full`)
    #[arg(short, long, value_enum)]
    layout: Option<LayoutMode>,

    /// Completion model override
    #[arg(short, long)]
    model: Option<String>,

    /// Config file to use instead of the default location
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Store an OpenRouter API key in the config file and exit
    #[arg(long, value_name = "KEY")]
    set_api_key: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_path = init_logging()?;

    let config_path = match cli.config {
        Some(path) => path,
        None => Config::config_path()?,
    };
    let config = load_config(&config_path).inspect_err(|err| error!("{err:#}"))?;

    if let Some(key) = cli.set_api_key {
        return save_api_key(config, key, &config_path);
    }

    let layout = cli
        .layout
        .or_else(|| config.layout.as_deref().and_then(LayoutMode::from_str))
        .unwrap_or_default();

    let mut chat_config: ChatConfig = config.resolve();
    if let Some(model) = cli.model {
        chat_config = chat_config.with_model(model);
    }

    info!(
        model = %chat_config.model,
        layout = layout.as_str(),
        has_key = chat_config.has_credential(),
        log = %log_path.display(),
        "starting"
    );

    let backend = Arc::new(OpenRouterClient::new(&chat_config)?);

    let mut events = EventHandler::new();
    let notifier = Arc::new(events.notifier());
    let controller = ExchangeController::new(chat_config, backend, notifier);
    events.forward_chat(controller.subscribe());

    let mut app = App::new(controller, layout);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let result = run(&mut terminal, &mut app, &mut events).await;
    tui::restore()?;

    info!("exiting");
    result
}

async fn run(terminal: &mut Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event)?,
            None => break,
        }
    }
    Ok(())
}

/// A missing file means defaults; one that exists but cannot be parsed is an error.
fn load_config(path: &Path) -> Result<Config> {
    Config::load_from(path).with_context(|| format!("failed to read config {}", path.display()))
}

fn save_api_key(mut config: Config, key: String, path: &Path) -> Result<()> {
    if ApiKey::new(key.as_str()).is_none() {
        bail!("API key must not be blank");
    }
    config.api_key = Some(key.trim().to_string());
    config.save_to(path)?;

    info!(path = %path.display(), "stored API key");
    println!("Saved API key to {}", path.display());
    Ok(())
}

/// Log to a file in the config directory; the terminal belongs to the UI.
fn init_logging() -> Result<PathBuf> {
    let dir = Config::config_dir()?;
    fs::create_dir_all(&dir)?;
    let path = dir.join("thiepcuoi.log");

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(path)
}
