mod action;
mod app;
mod event;
mod tui;
mod ui;

use std::panic;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use pagelist::{Config, HttpMethod, HttpSource, ListSignal, PageData, PageList};

use crate::action::Action;
use crate::app::{App, Entry};
use crate::event::Event;
use crate::tui::{EventHandler, Rates};

/// Browse a paginated JSON list endpoint in the terminal.
#[derive(Debug, Parser)]
#[command(name = "pagelist", version, about)]
struct Cli {
    /// List endpoint; overrides `[source] url` from the config file.
    #[arg(long)]
    url: Option<String>,

    /// Records per page.
    #[arg(long)]
    page_size: Option<u32>,

    /// Send the request as a JSON POST body instead of a query string.
    #[arg(long)]
    post: bool,

    /// Config file to use instead of the default location.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load(),
    };
    if let Some(url) = cli.url {
        config.source.url = url;
    }
    if let Some(size) = cli.page_size {
        config.list.page_size = size;
    }
    if cli.post {
        config.source.method = HttpMethod::Post;
    }

    let source = HttpSource::new(
        config.source.url.clone(),
        config.source.method,
        config.source.timeout(),
    )?
    .with_token(config.source.token());

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = tui::restore();
        original_hook(panic_info);
    }));

    let result = run(config, source).await;

    // Restore terminal
    tui::restore()?;

    result
}

async fn run(config: Config, source: HttpSource) -> Result<(), Box<dyn std::error::Error>> {
    let mut terminal = tui::init()?;

    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();
    let (signal_tx, mut signal_rx) = mpsc::unbounded_channel::<ListSignal<Entry>>();

    let title_field = config.source.title_field.clone();
    let list = PageList::new(&config.list, signal_tx)
        .with_fetcher(Arc::new(source))
        .with_formatter(move |raw: Value, _page: &PageData| -> pagelist::Result<Entry> {
            Ok(Entry::from_record(raw, &title_field))
        });

    let mut app = App::new(list, config.source.url.clone(), action_tx.clone());

    let mut events = EventHandler::new(Rates::default());

    loop {
        tokio::select! {
            Some(event) = events.next() => {
                if event.is_quit() {
                    break;
                }

                match event {
                    Event::Render => {
                        terminal.draw(|frame| ui::render(frame, &app))?;
                    }
                    _ => {
                        let action = app.handle_event(event);
                        if !matches!(action, Action::None) {
                            action_tx.send(action)?;
                        }
                    }
                }
            }
            Some(action) = action_rx.recv() => {
                app.update(action);
            }
            Some(signal) = signal_rx.recv() => {
                app.update(Action::Signal(signal));
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
