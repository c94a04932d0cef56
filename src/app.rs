use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::mpsc;

use pagelist::{FetchMode, Item, ListSignal, PageList, PendingFetch};

use crate::action::Action;
use crate::event::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    List,
    Detail,
}

/// A browsed record: a display title plus the raw JSON.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub struct Entry {
    pub title: String,
    pub raw: Value,
}

impl Entry {
    pub fn from_record(raw: Value, title_field: &str) -> Self {
        let title = match raw.get(title_field).or_else(|| raw.get("id")) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => "(untitled)".to_string(),
            Some(other) => other.to_string(),
        };
        Self { title, raw }
    }
}

impl From<Value> for Entry {
    fn from(raw: Value) -> Self {
        Entry::from_record(raw, "title")
    }
}

pub struct App {
    pub screen: Screen,
    pub list: PageList<Entry>,
    /// Position among the rows still displayed (soft-deleted rows skipped).
    pub selected: usize,
    pub scroll_offset: usize,
    pub error: Option<String>,
    pub notice: Option<String>,
    pub should_quit: bool,
    pub source_name: String,
    action_tx: mpsc::UnboundedSender<Action>,
}

impl App {
    pub fn new(
        list: PageList<Entry>,
        source_name: String,
        action_tx: mpsc::UnboundedSender<Action>,
    ) -> Self {
        Self {
            screen: Screen::List,
            list,
            selected: 0,
            scroll_offset: 0,
            error: None,
            notice: None,
            should_quit: false,
            source_name,
            action_tx,
        }
    }

    pub fn handle_event(&self, event: Event) -> Action {
        match event {
            Event::Init => Action::LoadFirst,
            Event::Key(key) => self.handle_key(key),
            _ => Action::None,
        }
    }

    fn handle_key(&self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => match self.screen {
                Screen::List => Action::Quit,
                Screen::Detail => Action::Back,
            },
            KeyCode::Char('j') | KeyCode::Down => Action::ScrollDown,
            KeyCode::Char('k') | KeyCode::Up => Action::ScrollUp,
            KeyCode::Char('g') => Action::GoToTop,
            KeyCode::Char('G') => Action::GoToBottom,
            KeyCode::Enter if self.screen == Screen::List => Action::Select,
            KeyCode::Char('n') if self.screen == Screen::List => Action::LoadMore,
            KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => Action::Reset,
            KeyCode::Char('r') if self.screen == Screen::List => Action::Reset,
            KeyCode::Char('R') if self.screen == Screen::List => Action::RefreshItem,
            KeyCode::Char('d') if self.screen == Screen::Detail => Action::Delete,
            _ => Action::None,
        }
    }

    pub fn visible_len(&self) -> usize {
        self.list.state().visible_items().count()
    }

    /// Backing index of the highlighted row.
    pub fn selected_index(&self) -> Option<usize> {
        self.list
            .state()
            .visible_items()
            .nth(self.selected)
            .map(|(index, _)| index)
    }

    /// The item open in the detail screen.
    pub fn current_item(&self) -> Option<&Item<Entry>> {
        let index = self.list.state().pending_index?;
        self.list.state().items.get(index)
    }

    fn clamp_selection(&mut self) {
        let len = self.visible_len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    pub fn update(&mut self, action: Action) {
        if self.error.is_some()
            && !matches!(
                action,
                Action::Fetched(_) | Action::Signal(_) | Action::None | Action::Error(_)
            )
        {
            self.error = None;
        }

        match action {
            Action::Quit => {
                self.should_quit = true;
            }
            Action::Back => match self.screen {
                Screen::List => self.should_quit = true,
                Screen::Detail => {
                    self.screen = Screen::List;
                    self.scroll_offset = 0;
                    let pending = self.list.on_list_shown();
                    self.spawn(pending);
                }
            },
            Action::ScrollUp => match self.screen {
                Screen::List => self.selected = self.selected.saturating_sub(1),
                Screen::Detail => self.scroll_offset = self.scroll_offset.saturating_sub(1),
            },
            Action::ScrollDown => match self.screen {
                Screen::List => {
                    if self.selected + 1 < self.visible_len() {
                        self.selected += 1;
                    } else {
                        self.update(Action::LoadMore);
                    }
                }
                Screen::Detail => self.scroll_offset += 1,
            },
            Action::GoToTop => match self.screen {
                Screen::List => self.selected = 0,
                Screen::Detail => self.scroll_offset = 0,
            },
            Action::GoToBottom => {
                if self.screen == Screen::List {
                    self.selected = self.visible_len().saturating_sub(1);
                }
            }
            Action::Select => {
                if let Some(index) = self.selected_index() {
                    if let Err(e) = self.list.select(index) {
                        self.update(e.into());
                    }
                }
            }

            Action::LoadFirst => {
                let pending = self.list.fetch_page(FetchMode::Page);
                self.spawn(pending);
            }
            Action::LoadMore => {
                let pending = self.list.load_more();
                if self.list.state().reached_end {
                    self.notice = Some("End of list".to_string());
                }
                self.spawn(pending);
            }
            Action::Reset => {
                self.selected = 0;
                self.notice = None;
                let pending = self.list.reset();
                self.spawn(pending);
            }
            Action::RefreshItem => {
                if let Some(index) = self.selected_index() {
                    let pending = self.list.refresh_now(index);
                    self.spawn(pending);
                }
            }
            Action::Delete => {
                match self.list.delete_current() {
                    Ok(_) => {
                        // A deleted item is not re-fetched on the way back.
                        self.screen = Screen::List;
                        self.scroll_offset = 0;
                        self.clamp_selection();
                    }
                    Err(e) => self.update(e.into()),
                }
            }
            Action::Fetched(completion) => {
                self.list.complete(completion);
                self.clamp_selection();
            }
            Action::Signal(signal) => self.on_signal(signal),

            Action::Error(msg) => {
                self.error = Some(msg);
            }
            Action::None => {}
        }
    }

    fn on_signal(&mut self, signal: ListSignal<Entry>) {
        match signal {
            ListSignal::Ready(payload) => {
                let ok = payload.as_ref().is_some_and(|p| p.records.is_some());
                if !ok {
                    self.error = Some("Request failed; press r to retry".to_string());
                }
            }
            ListSignal::ClearIndicators => {
                if !self.list.state().reached_end {
                    self.notice = None;
                }
            }
            ListSignal::ItemSelected(item) => {
                tracing::debug!(title = %item.record.title, "opening item");
                self.screen = Screen::Detail;
                self.scroll_offset = 0;
            }
            ListSignal::ItemDeleted(total) => {
                self.notice = Some(format!("Deleted, {} remaining", total));
            }
        }
    }

    fn spawn(&self, pending: Option<PendingFetch>) {
        let Some(pending) = pending else {
            return;
        };
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let completion = pending.run().await;
            tx.send(Action::Fetched(completion)).ok();
        });
    }
}
