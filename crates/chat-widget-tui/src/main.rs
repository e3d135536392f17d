use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chat_widget_core::{
    ChatController, Config, CycleOutcome, HttpChatBackend, Origin, Resolution, SendStatus,
};
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;

mod app;
mod handler;
mod tui;
mod ui;

#[cfg(test)]
mod test_support;

use app::App;
use tui::EventHandler;

#[derive(Parser)]
#[command(name = "chat-widget")]
#[command(about = "Terminal chat widget for a /chat backend", version)]
struct Cli {
    /// Backend base URL (overrides CHAT_WIDGET_ENDPOINT and the config file)
    #[arg(short, long, global = true)]
    endpoint: Option<String>,

    /// Config file to use instead of the default location
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Send one message and print the reply
    Ask {
        /// Message text
        message: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => Config::load().context("failed to load config from the default location")?,
    };
    let endpoint = config.resolve_endpoint(cli.endpoint.clone());

    let (tx, rx) = mpsc::unbounded_channel();
    let backend = HttpChatBackend::with_timeout(&endpoint, config.request_timeout())?;
    let controller = ChatController::new(Arc::new(backend), tx, config.shortcuts())
        .with_fallback_message(config.fallback_message());

    match cli.command {
        Some(Commands::Ask { message }) => {
            init_logging(false);
            ask(controller, rx, message).await
        }
        None => {
            init_logging(true);
            log::info!("chat widget started against {}", endpoint);
            run_tui(App::new(controller, endpoint), rx).await
        }
    }
}

/// The TUI owns the terminal, so its logs go to a file in the config dir.
fn init_logging(to_file: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));

    if to_file {
        let log_file = Config::config_dir().and_then(|dir| {
            std::fs::create_dir_all(&dir)?;
            Ok(OpenOptions::new()
                .create(true)
                .append(true)
                .open(dir.join("chat-widget.log"))?)
        });
        match log_file {
            Ok(file) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            // No writable log file: stay quiet rather than draw over the UI
            Err(_) => {
                builder.filter_level(log::LevelFilter::Off);
            }
        }
    }

    let _ = builder.try_init();
}

async fn run_tui(
    mut app: App,
    outcomes: mpsc::UnboundedReceiver<CycleOutcome>,
) -> Result<()> {
    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new(outcomes);

    let result = async {
        while !app.should_quit {
            terminal.draw(|frame| ui::render(&mut app, frame))?;

            match events.next().await {
                Some(event) => handler::handle_event(&mut app, event).await?,
                None => break,
            }
        }
        Ok::<(), anyhow::Error>(())
    }
    .await;

    tui::restore()?;
    result
}

async fn ask(
    mut controller: ChatController,
    mut outcomes: mpsc::UnboundedReceiver<CycleOutcome>,
    message: String,
) -> Result<()> {
    if controller.send_message(message) == SendStatus::Empty {
        anyhow::bail!("nothing to send: message is empty");
    }

    let outcome = outcomes
        .recv()
        .await
        .context("request task ended without reporting back")?;
    let resolution = controller.resolve(outcome);

    if let Some(reply) = controller
        .log()
        .last_message()
        .filter(|m| m.origin == Origin::Assistant)
    {
        println!("{}", reply.content);
    }

    if resolution == Resolution::Failed {
        std::process::exit(1);
    }
    Ok(())
}
