use serde::de::DeserializeOwned;

use crate::controller::PageList;
use crate::error::{PagelistError, Result};
use crate::signal::ListSignal;

impl<T> PageList<T>
where
    T: DeserializeOwned + Clone,
{
    /// Soft-delete the last viewed item and return the new total.
    ///
    /// Not idempotent: calling it twice for the same item decrements the total
    /// twice. Hosts should only offer delete on items they still display.
    pub fn delete_current(&mut self) -> Result<i64> {
        let index = self.state.pending_index.ok_or(PagelistError::NoPendingItem)?;
        let len = self.state.items.len();
        let item = self
            .state
            .items
            .get_mut(index)
            .ok_or(PagelistError::InvalidIndex { index, len })?;

        item.is_del = true;
        self.state.total -= 1;
        let total = self.state.total;
        tracing::debug!(index, total, "item soft-deleted");

        self.emit(ListSignal::ItemDeleted(total));
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Item;
    use crate::testing::{list, r, Scripted};

    #[test]
    fn delete_marks_item_and_decrements_total() {
        let (mut list, mut rx) = list(2, Scripted::new(vec![]));
        list.state.items = vec![Item::new(r(1)), Item::new(r(2))];
        list.state.total = 2;
        list.mark_viewed(0);

        assert_eq!(list.delete_current().unwrap(), 1);
        assert!(list.state().items[0].is_del);
        assert!(!list.state().items[1].is_del);
        assert_eq!(list.state().items.len(), 2);
        assert_eq!(list.state().total, 1);
        assert_eq!(rx.try_recv().unwrap(), ListSignal::ItemDeleted(1));
        assert_eq!(list.state().visible_items().count(), 1);
    }

    #[test]
    fn delete_twice_decrements_twice() {
        let (mut list, _rx) = list(2, Scripted::new(vec![]));
        list.state.items = vec![Item::new(r(1))];
        list.state.total = 5;
        list.mark_viewed(0);

        list.delete_current().unwrap();
        list.delete_current().unwrap();
        assert_eq!(list.state().total, 3);
    }

    #[test]
    fn delete_without_view_errors() {
        let (mut list, mut rx) = list(2, Scripted::new(vec![]));
        list.state.items = vec![Item::new(r(1))];
        assert!(matches!(list.delete_current(), Err(PagelistError::NoPendingItem)));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn delete_out_of_range_errors() {
        let (mut list, _rx) = list(2, Scripted::new(vec![]));
        list.state.total = 4;
        list.mark_viewed(2);
        assert!(matches!(
            list.delete_current(),
            Err(PagelistError::InvalidIndex { index: 2, len: 0 })
        ));
        assert_eq!(list.state().total, 4);
    }
}
