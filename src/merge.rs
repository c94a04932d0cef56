use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{PagelistError, Result};
use crate::response::PageData;
use crate::state::{Item, ListState};

/// Shapes one raw record into a list item, with the full page payload at hand.
pub trait Formatter<T>: Send + Sync {
    fn format(&self, raw: Value, payload: &PageData) -> Result<T>;
}

impl<T, F> Formatter<T> for F
where
    F: Fn(Value, &PageData) -> Result<T> + Send + Sync,
{
    fn format(&self, raw: Value, payload: &PageData) -> Result<T> {
        self(raw, payload)
    }
}

/// Run every record through `formatter`, or deserialize it directly when there is none.
pub fn shape_records<T: DeserializeOwned>(
    records: Vec<Value>,
    payload: &PageData,
    formatter: Option<&dyn Formatter<T>>,
) -> Result<Vec<T>> {
    records
        .into_iter()
        .map(|raw| match formatter {
            Some(f) => f.format(raw, payload),
            None => serde_json::from_value(raw).map_err(|e| PagelistError::Format(e.to_string())),
        })
        .collect()
}

/// Where a finished fetch lands in the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeTarget {
    /// A page of records at the current cursor.
    Page,
    /// The single item at this index, fixed when the fetch was issued.
    Item(usize),
}

/// Merge shaped records into the list.
///
/// Page fetches append when past the first page and replace everything on
/// page 1, and take the server total. An item refresh patches one slot in
/// place and leaves the total alone.
pub fn apply_page<T>(state: &mut ListState<T>, shaped: Vec<T>, total: i64, target: MergeTarget) {
    match target {
        MergeTarget::Item(index) => {
            if shaped.len() > 1 {
                tracing::warn!(count = shaped.len(), "detail refresh returned more than one record");
            }
            let Some(record) = shaped.into_iter().next() else {
                return;
            };
            match state.items.get_mut(index) {
                Some(slot) => *slot = Item::new(record),
                None => tracing::warn!(index, len = state.items.len(), "refreshed item no longer in list"),
            }
        }
        MergeTarget::Page => {
            let shaped = shaped.into_iter().map(Item::new);
            if state.current > 1 {
                state.items.extend(shaped);
            } else {
                state.items = shaped.collect();
            }
            state.loading = false;
            state.total = total;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    fn state_with(items: &[u32], current: u32) -> ListState<u32> {
        let mut state = ListState::new(2);
        state.items = items.iter().copied().map(Item::new).collect();
        state.current = current;
        state.loading = true;
        state
    }

    #[test]
    fn first_page_replaces() {
        let mut state = state_with(&[9, 9, 9], 1);
        apply_page(&mut state, vec![1, 2], 5, MergeTarget::Page);
        assert_eq!(state.items, vec![Item::new(1), Item::new(2)]);
        assert_eq!(state.total, 5);
        assert!(!state.loading);
    }

    #[test]
    fn later_page_appends_in_order() {
        let mut state = state_with(&[1, 2], 2);
        apply_page(&mut state, vec![3, 4], 6, MergeTarget::Page);
        let records: Vec<u32> = state.items.iter().map(|i| i.record).collect();
        assert_eq!(records, vec![1, 2, 3, 4]);
        assert_eq!(state.total, 6);
    }

    #[test]
    fn detail_patches_one_slot() {
        let mut state = state_with(&[1, 2, 3], 2);
        state.items[1].is_del = true;
        state.total = 3;
        apply_page(&mut state, vec![20], 99, MergeTarget::Item(1));
        let records: Vec<u32> = state.items.iter().map(|i| i.record).collect();
        assert_eq!(records, vec![1, 20, 3]);
        assert!(!state.items[1].is_del);
        // detail refresh leaves total and loading alone
        assert_eq!(state.total, 3);
        assert!(state.loading);
    }

    #[test]
    fn detail_with_no_records_is_noop() {
        let mut state = state_with(&[1, 2], 1);
        apply_page(&mut state, vec![], 2, MergeTarget::Item(0));
        assert_eq!(state.items[0].record, 1);
    }

    #[test]
    fn detail_ignores_the_currently_viewed_index() {
        let mut state = state_with(&[1, 2, 3], 2);
        state.pending_index = Some(2);
        apply_page(&mut state, vec![20], 3, MergeTarget::Item(0));
        let records: Vec<u32> = state.items.iter().map(|i| i.record).collect();
        assert_eq!(records, vec![20, 2, 3]);
    }

    #[test]
    fn detail_out_of_range_is_ignored() {
        let mut state = state_with(&[1], 1);
        apply_page(&mut state, vec![7], 1, MergeTarget::Item(4));
        assert_eq!(state.items, vec![Item::new(1)]);
    }

    #[test]
    fn shape_without_formatter_deserializes() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Row {
            id: u32,
        }
        let rows: Vec<Row> =
            shape_records(vec![json!({"id": 1}), json!({"id": 2})], &PageData::default(), None)
                .unwrap();
        assert_eq!(rows, vec![Row { id: 1 }, Row { id: 2 }]);
    }

    #[test]
    fn shape_with_formatter_sees_payload() {
        let payload = PageData {
            extra: json!({"prefix": "#"}).as_object().unwrap().clone(),
            ..Default::default()
        };
        let fmt = |raw: Value, page: &PageData| -> Result<String> {
            let prefix = page.extra["prefix"].as_str().unwrap_or_default();
            Ok(format!("{}{}", prefix, raw["id"]))
        };
        let out =
            shape_records(vec![json!({"id": 4})], &payload, Some(&fmt as &dyn Formatter<String>))
                .unwrap();
        assert_eq!(out, vec!["#4".to_string()]);
    }

    #[test]
    fn shape_error_surfaces() {
        let result: Result<Vec<u32>> =
            shape_records(vec![json!("nope")], &PageData::default(), None);
        assert!(matches!(result, Err(PagelistError::Format(_))));
    }
}
