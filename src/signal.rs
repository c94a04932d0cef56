use crate::response::PageData;
use crate::state::Item;

/// Notifications sent from the controller to its host.
#[derive(Debug, Clone, PartialEq)]
pub enum ListSignal<T> {
    /// A fetch finished. Carries the page payload, or `None` when the response had none.
    Ready(Option<PageData>),
    /// The user picked an item.
    ItemSelected(Item<T>),
    /// An item was soft-deleted; carries the new total.
    ItemDeleted(i64),
    /// Hide pull-to-refresh and loading indicators.
    ClearIndicators,
}
