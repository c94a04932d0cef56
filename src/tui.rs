use std::io::{self, Stdout};
use std::time::Duration;

use crossterm::{
    event::{Event as CrosstermEvent, EventStream, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tokio_util::sync::CancellationToken;

use crate::event::Event;

pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Switch to the alternate screen in raw mode.
pub fn init() -> io::Result<Tui> {
    execute!(io::stdout(), EnterAlternateScreen)?;
    enable_raw_mode()?;
    Terminal::new(CrosstermBackend::new(io::stdout()))
}

/// Undo [`init`]. Also called from the panic hook, so it must not assume
/// `init` succeeded.
pub fn restore() -> io::Result<()> {
    execute!(io::stdout(), LeaveAlternateScreen)?;
    disable_raw_mode()
}

/// How often the browser ticks and redraws.
#[derive(Debug, Clone, Copy)]
pub struct Rates {
    pub tick: Duration,
    pub render: Duration,
}

impl Default for Rates {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(250),
            render: Duration::from_millis(16),
        }
    }
}

/// Map a terminal event onto a browser event. Key releases and repeats are
/// dropped; a resize only needs a redraw.
fn translate(raw: CrosstermEvent) -> Option<Event> {
    match raw {
        CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Some(Event::Key(key)),
        CrosstermEvent::Resize(..) => Some(Event::Render),
        _ => None,
    }
}

async fn pump(tx: mpsc::UnboundedSender<Event>, rates: Rates, cancel: CancellationToken) {
    let mut terminal_events = EventStream::new();
    let mut ticks = interval(rates.tick);
    let mut frames = interval(rates.render);

    if tx.send(Event::Init).is_err() {
        return;
    }

    loop {
        let next = tokio::select! {
            _ = cancel.cancelled() => return,
            _ = ticks.tick() => Some(Event::Tick),
            _ = frames.tick() => Some(Event::Render),
            raw = terminal_events.next() => match raw {
                Some(Ok(raw)) => translate(raw),
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "terminal event read failed");
                    None
                }
                None => return,
            },
        };
        if let Some(event) = next {
            if tx.send(event).is_err() {
                return;
            }
        }
    }
}

/// Terminal input plus tick and render timers, read from a background task.
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<Event>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl EventHandler {
    pub fn new(rates: Rates) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let task = tokio::spawn(pump(tx, rates, cancel.clone()));
        Self { rx, cancel, task }
    }

    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}

impl Drop for EventHandler {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.task.abort();
    }
}
