use pagelist::{Completion, ListSignal};

use crate::app::Entry;

#[derive(Debug)]
pub enum Action {
    Quit,
    Back,
    ScrollUp,
    ScrollDown,
    GoToTop,
    GoToBottom,
    Select,

    // Paging
    LoadFirst,
    LoadMore,
    Reset,
    RefreshItem,
    Delete,
    Fetched(Completion),

    // Controller notifications
    Signal(ListSignal<Entry>),

    Error(String),
    None,
}

impl From<pagelist::PagelistError> for Action {
    fn from(err: pagelist::PagelistError) -> Self {
        Action::Error(err.to_string())
    }
}
