use serde::de::DeserializeOwned;

use crate::controller::{FetchMode, PageList, PendingFetch};
use crate::error::{PagelistError, Result};
use crate::signal::ListSignal;

/// The list -> detail -> back round trip.
impl<T> PageList<T>
where
    T: DeserializeOwned + Clone,
{
    /// Remember that the user opened `index`, so it is re-fetched when the list shows again.
    pub fn mark_viewed(&mut self, index: usize) {
        self.state.awaiting_detail_refresh = true;
        self.state.pending_index = Some(index);
    }

    /// Re-fetch the viewed item if one is waiting.
    ///
    /// The waiting flag is only cleared once the fetch is actually issued, so a
    /// rejected refresh is retried on the next show.
    pub fn on_list_shown(&mut self) -> Option<PendingFetch> {
        if !self.state.awaiting_detail_refresh {
            return None;
        }
        let pending = self.fetch_page(FetchMode::Detail)?;
        self.state.awaiting_detail_refresh = false;
        Some(pending)
    }

    pub fn refresh_now(&mut self, index: usize) -> Option<PendingFetch> {
        self.mark_viewed(index);
        self.on_list_shown()
    }

    /// Item tap: mark it viewed and tell the host which item was picked.
    pub fn select(&mut self, index: usize) -> Result<()> {
        let item = self
            .state
            .items
            .get(index)
            .cloned()
            .ok_or(PagelistError::InvalidIndex {
                index,
                len: self.state.items.len(),
            })?;
        self.mark_viewed(index);
        self.emit(ListSignal::ItemSelected(item));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::FetchResponse;
    use crate::state::Item;
    use crate::testing::{list, r, Scripted};
    use serde_json::json;

    async fn loaded(
        source: std::sync::Arc<Scripted>,
    ) -> (
        PageList<serde_json::Value>,
        tokio::sync::mpsc::UnboundedReceiver<ListSignal<serde_json::Value>>,
    ) {
        let (mut list, mut rx) = list(2, source);
        let first = list.fetch_page(FetchMode::Page);
        list.drive(first).await;
        while rx.try_recv().is_ok() {}
        (list, rx)
    }

    #[tokio::test]
    async fn scenario_b_refreshes_one_item() {
        let source = Scripted::new(vec![
            Ok(FetchResponse::ok(vec![r(1), r(2)], 5)),
            Ok(FetchResponse::ok(vec![json!({"id": 2, "read": true})], 5)),
        ]);
        let (mut list, _rx) = loaded(source.clone()).await;

        list.mark_viewed(1);
        assert!(list.state().awaiting_detail_refresh);

        let pending = list.on_list_shown().unwrap();
        assert_eq!(pending.request().size, 1);
        assert_eq!(pending.request().current, 2);
        assert!(!list.state().awaiting_detail_refresh);
        assert!(!list.state().loading);

        list.drive(Some(pending)).await;
        assert_eq!(list.state().items[0].record, r(1));
        assert_eq!(list.state().items[1].record, json!({"id": 2, "read": true}));
        assert_eq!(list.state().items.len(), 2);
        assert_eq!(list.state().total, 5);
    }

    #[tokio::test]
    async fn list_shown_without_view_is_noop() {
        let source = Scripted::new(vec![Ok(FetchResponse::ok(vec![r(1)], 1))]);
        let (mut list, _rx) = loaded(source.clone()).await;
        assert!(list.on_list_shown().is_none());
        assert_eq!(source.request_count(), 1);
    }

    #[tokio::test]
    async fn detail_params_override_base() {
        let source = Scripted::new(vec![]);
        let config = crate::config::ListConfig {
            page_size: 2,
            params: crate::params::QueryParams::new()
                .with("status", "open")
                .with("owner", "me"),
            detail_params: Some(crate::params::QueryParams::new().with("status", "any")),
        };
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        let mut list: PageList<serde_json::Value> =
            PageList::new(&config, tx).with_fetcher(source);
        list.state.items = vec![Item::new(r(1))];

        let page = list.fetch_page(FetchMode::Page).unwrap();
        assert_eq!(page.request().params.get("status"), Some(&json!("open")));

        let detail = list.refresh_now(0).unwrap();
        assert_eq!(detail.request().params.get("status"), Some(&json!("any")));
        assert_eq!(detail.request().params.get("owner"), Some(&json!("me")));
        assert_eq!(detail.request().current, 1);
    }

    #[tokio::test]
    async fn detail_failure_leaves_list_alone() {
        let source = Scripted::new(vec![
            Ok(FetchResponse::ok(vec![r(1), r(2)], 4)),
            Ok(FetchResponse::error_code(7)),
        ]);
        let (mut list, mut rx) = loaded(source).await;
        let before = list.state().current;

        let pending = list.refresh_now(0);
        list.drive(pending).await;
        assert_eq!(list.state().current, before);
        assert_eq!(list.state().items[0].record, r(1));
        assert_eq!(rx.try_recv().unwrap(), ListSignal::Ready(None));
    }

    #[test]
    fn busy_detail_keeps_waiting_flag() {
        let source = Scripted::new(vec![]);
        let (mut list, _rx) = list(2, source);
        list.state.items = vec![Item::new(r(1)), Item::new(r(2))];

        assert!(list.refresh_now(0).is_some());
        list.mark_viewed(1);
        assert!(list.on_list_shown().is_none());
        assert!(list.state().awaiting_detail_refresh);
    }

    #[tokio::test]
    async fn detail_and_page_fetch_can_overlap() {
        let source = Scripted::new(vec![
            Ok(FetchResponse::ok(vec![r(1), r(2)], 6)),
            Ok(FetchResponse::ok(vec![r(3), r(4)], 6)),
            Ok(FetchResponse::ok(vec![json!({"id": 1, "seen": true})], 6)),
        ]);
        let (mut list, _rx) = loaded(source).await;

        let page = list.load_more().unwrap();
        let detail = list.refresh_now(0).unwrap();
        let page_done = page.run().await;
        let detail_done = detail.run().await;
        list.complete(detail_done);
        list.complete(page_done);

        assert_eq!(list.state().items.len(), 4);
        assert_eq!(list.state().items[0].record, json!({"id": 1, "seen": true}));
        assert_eq!(list.state().current, 2);
    }

    #[tokio::test]
    async fn refresh_lands_on_the_item_it_was_issued_for() {
        let source = Scripted::new(vec![
            Ok(FetchResponse::ok(vec![r(1), r(2), r(3)], 3)),
            Ok(FetchResponse::ok(vec![json!({"id": 2, "fresh": true})], 3)),
        ]);
        let (mut list, mut rx) = list(3, source);
        let first = list.fetch_page(FetchMode::Page);
        list.drive(first).await;
        while rx.try_recv().is_ok() {}

        let pending = list.refresh_now(1).unwrap();
        // user opens another row before the refresh returns
        list.select(2).unwrap();
        list.drive(Some(pending)).await;

        assert_eq!(list.state().items[1].record, json!({"id": 2, "fresh": true}));
        assert_eq!(list.state().items[2].record, r(3));
        assert_eq!(list.state().pending_index, Some(2));
        assert!(list.state().awaiting_detail_refresh);
    }

    #[test]
    fn select_emits_item_and_marks_viewed() {
        let source = Scripted::new(vec![]);
        let (mut list, mut rx) = list(2, source);
        list.state.items = vec![Item::new(r(1)), Item::new(r(2))];

        list.select(1).unwrap();
        assert_eq!(list.state().pending_index, Some(1));
        assert!(list.state().awaiting_detail_refresh);
        assert_eq!(rx.try_recv().unwrap(), ListSignal::ItemSelected(Item::new(r(2))));
    }

    #[test]
    fn select_out_of_range_errors() {
        let source = Scripted::new(vec![]);
        let (mut list, _rx) = list(2, source);
        assert!(matches!(
            list.select(3),
            Err(PagelistError::InvalidIndex { index: 3, len: 0 })
        ));
        assert!(!list.state().awaiting_detail_refresh);
    }
}
