use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u32 = 5;

fn is_false(b: &bool) -> bool {
    !*b
}

/// A list entry. `is_del` marks a soft-deleted item that hosts should hide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item<T> {
    #[serde(flatten)]
    pub record: T,
    #[serde(rename = "isDel", default, skip_serializing_if = "is_false")]
    pub is_del: bool,
}

impl<T> Item<T> {
    pub fn new(record: T) -> Self {
        Self {
            record,
            is_del: false,
        }
    }
}

/// Whole-list fetch phase, derived from the flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListPhase {
    Idle,
    Loading,
    ReachedEnd,
}

/// Paging and loading state for one list view.
#[derive(Debug, Clone)]
pub struct ListState<T> {
    page_size: u32,
    pub current: u32,
    /// Server-reported record count. Negative means unknown.
    pub total: i64,
    pub items: Vec<Item<T>>,
    pub loading: bool,
    pub reached_end: bool,
    pub awaiting_detail_refresh: bool,
    pub pending_index: Option<usize>,
}

impl<T> ListState<T> {
    pub fn new(page_size: u32) -> Self {
        Self {
            page_size: page_size.max(1),
            current: 1,
            total: 0,
            items: Vec::new(),
            loading: false,
            reached_end: false,
            awaiting_detail_refresh: false,
            pending_index: None,
        }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn has_more(&self) -> bool {
        self.total < 0 || (self.current as i64) * (self.page_size as i64) < self.total
    }

    pub fn phase(&self) -> ListPhase {
        if self.loading {
            ListPhase::Loading
        } else if self.reached_end {
            ListPhase::ReachedEnd
        } else {
            ListPhase::Idle
        }
    }

    /// Items not soft-deleted, with their backing index.
    pub fn visible_items(&self) -> impl Iterator<Item = (usize, &Item<T>)> {
        self.items.iter().enumerate().filter(|(_, item)| !item.is_del)
    }

    /// Step the cursor back after a failed page fetch, never below page 1.
    pub(crate) fn roll_back_page(&mut self) {
        self.current = self.current.saturating_sub(1).max(1);
    }
}

impl<T> Default for ListState<T> {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}
