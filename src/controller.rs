use std::sync::Arc;

use serde::de::DeserializeOwned;
use tokio::sync::mpsc;

use crate::config::ListConfig;
use crate::error::Result;
use crate::merge::{apply_page, shape_records, Formatter, MergeTarget};
use crate::params::{QueryParams, RESERVED_KEYS};
use crate::response::{FetchRequest, FetchResponse};
use crate::signal::ListSignal;
use crate::source::Fetcher;
use crate::state::ListState;

/// Whole-page fetch, or a size-1 fetch that patches the viewed item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    Page,
    Detail,
}

/// Identifies one issued fetch. Completions whose ticket is no longer
/// current are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    id: u64,
    mode: FetchMode,
    generation: u64,
    target: MergeTarget,
}

impl FetchTicket {
    pub fn mode(&self) -> FetchMode {
        self.mode
    }

    /// Where the result will be merged. Detail fetches pin the item index at
    /// issue time, so a later `select` cannot redirect the patch.
    pub fn target(&self) -> MergeTarget {
        self.target
    }
}

/// A fetch that has been registered with the controller but not yet run.
#[derive(Debug)]
pub struct PendingFetch {
    ticket: FetchTicket,
    request: FetchRequest,
    fetcher: Arc<dyn Fetcher>,
}

impl PendingFetch {
    pub fn ticket(&self) -> FetchTicket {
        self.ticket
    }

    pub fn request(&self) -> &FetchRequest {
        &self.request
    }

    /// Call the fetcher. Safe to run on another task; hand the result back via
    /// [`PageList::complete`].
    pub async fn run(self) -> Completion {
        tracing::debug!(
            source = self.fetcher.name(),
            mode = ?self.ticket.mode,
            size = self.request.size,
            current = self.request.current,
            "fetching"
        );
        let result = self.fetcher.fetch(&self.request).await;
        Completion {
            ticket: self.ticket,
            result,
        }
    }
}

#[derive(Debug)]
pub struct Completion {
    pub ticket: FetchTicket,
    pub result: Result<FetchResponse>,
}

#[derive(Debug, Default)]
pub(crate) struct InFlight {
    page: Option<u64>,
    detail: Option<u64>,
}

impl InFlight {
    fn slot(&mut self, mode: FetchMode) -> &mut Option<u64> {
        match mode {
            FetchMode::Page => &mut self.page,
            FetchMode::Detail => &mut self.detail,
        }
    }

    pub(crate) fn is_busy(&self, mode: FetchMode) -> bool {
        match mode {
            FetchMode::Page => self.page.is_some(),
            FetchMode::Detail => self.detail.is_some(),
        }
    }
}

/// Controller for one paginated list view.
///
/// Operations that need data return a [`PendingFetch`]; the host runs it and
/// passes the [`Completion`] back to [`PageList::complete`]. At most one fetch
/// per [`FetchMode`] is outstanding, and [`PageList::reset`] supersedes all of
/// them.
pub struct PageList<T> {
    pub(crate) state: ListState<T>,
    params: QueryParams,
    detail_params: Option<QueryParams>,
    fetcher: Option<Arc<dyn Fetcher>>,
    formatter: Option<Arc<dyn Formatter<T>>>,
    signals: mpsc::UnboundedSender<ListSignal<T>>,
    pub(crate) in_flight: InFlight,
    next_ticket: u64,
    generation: u64,
}

impl<T> std::fmt::Debug for PageList<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageList")
            .field("current", &self.state.current)
            .field("total", &self.state.total)
            .field("items", &self.state.items.len())
            .field("loading", &self.state.loading)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

impl<T> PageList<T>
where
    T: DeserializeOwned + Clone,
{
    pub fn new(config: &ListConfig, signals: mpsc::UnboundedSender<ListSignal<T>>) -> Self {
        Self {
            state: ListState::new(config.page_size),
            params: config.params.clone(),
            detail_params: config.detail_params.clone(),
            fetcher: None,
            formatter: None,
            signals,
            in_flight: InFlight::default(),
            next_ticket: 0,
            generation: 0,
        }
    }

    pub fn with_fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn with_formatter(mut self, formatter: impl Formatter<T> + 'static) -> Self {
        self.formatter = Some(Arc::new(formatter));
        self
    }

    pub fn state(&self) -> &ListState<T> {
        &self.state
    }

    pub fn is_fetching(&self, mode: FetchMode) -> bool {
        self.in_flight.is_busy(mode)
    }

    pub(crate) fn fetcher_or_log(&self) -> Option<Arc<dyn Fetcher>> {
        if self.fetcher.is_none() {
            tracing::error!("no fetcher configured for this list; check the controller setup");
        }
        self.fetcher.clone()
    }

    pub(crate) fn emit(&self, signal: ListSignal<T>) {
        self.signals.send(signal).ok();
    }

    fn resolve_params(&self, mode: FetchMode) -> QueryParams {
        let params = match (mode, &self.detail_params) {
            (FetchMode::Detail, Some(detail)) => self.params.merged(detail),
            _ => self.params.clone(),
        };
        let mut params = params.sanitized();
        for key in RESERVED_KEYS {
            if params.remove(key).is_some() {
                tracing::warn!(key, "dropping query param that collides with paging field");
            }
        }
        params
    }

    /// Register and build a fetch for `mode`.
    ///
    /// Returns `None` without touching state when no fetcher is configured,
    /// when a fetch of the same mode is already outstanding, or when a detail
    /// fetch is asked for with no viewed item.
    pub fn fetch_page(&mut self, mode: FetchMode) -> Option<PendingFetch> {
        let fetcher = self.fetcher_or_log()?;

        if self.in_flight.is_busy(mode) {
            tracing::debug!(?mode, "fetch already in flight, rejecting");
            return None;
        }

        let (size, current, target) = match mode {
            FetchMode::Page => (self.state.page_size(), self.state.current, MergeTarget::Page),
            FetchMode::Detail => {
                let Some(index) = self.state.pending_index else {
                    tracing::warn!("detail refresh requested with no viewed item");
                    return None;
                };
                (1, u32::try_from(index + 1).unwrap_or(u32::MAX), MergeTarget::Item(index))
            }
        };

        let request = FetchRequest {
            size,
            current,
            params: self.resolve_params(mode),
        };

        if mode == FetchMode::Page {
            self.state.loading = true;
        }

        let ticket = FetchTicket {
            id: self.next_ticket,
            mode,
            generation: self.generation,
            target,
        };
        self.next_ticket += 1;
        *self.in_flight.slot(mode) = Some(ticket.id);

        Some(PendingFetch {
            ticket,
            request,
            fetcher,
        })
    }

    /// Apply a finished fetch. Superseded completions are dropped silently.
    pub fn complete(&mut self, completion: Completion) {
        let Completion { ticket, result } = completion;

        let slot = self.in_flight.slot(ticket.mode);
        if ticket.generation != self.generation || *slot != Some(ticket.id) {
            tracing::debug!(mode = ?ticket.mode, id = ticket.id, "discarding superseded response");
            return;
        }
        *slot = None;

        let payload = result.as_ref().ok().and_then(|r| r.payload().cloned());

        let formatter = self.formatter.as_deref();
        let merged = result.and_then(|response| response.into_page()).and_then(|page| {
            let shaped = shape_records(page.records, &page.payload, formatter)?;
            Ok((shaped, page.total))
        });

        match merged {
            Ok((shaped, total)) => apply_page(&mut self.state, shaped, total, ticket.target),
            Err(e) => {
                tracing::warn!(error = %e, mode = ?ticket.mode, "fetch failed");
                if ticket.mode == FetchMode::Page {
                    self.state.loading = false;
                    self.state.roll_back_page();
                }
            }
        }

        self.emit(ListSignal::Ready(payload));
        self.emit(ListSignal::ClearIndicators);
    }

    /// Run a pending fetch inline and apply it. Returns whether anything ran.
    pub async fn drive(&mut self, pending: Option<PendingFetch>) -> bool {
        let Some(pending) = pending else {
            return false;
        };
        let completion = pending.run().await;
        self.complete(completion);
        true
    }

    /// Advance to the next page, or mark the end when there is none.
    pub fn load_more(&mut self) -> Option<PendingFetch> {
        if self.in_flight.is_busy(FetchMode::Page) {
            tracing::debug!("page fetch in flight, ignoring load_more");
            return None;
        }

        if !self.state.has_more() {
            self.state.reached_end = true;
            self.state.loading = false;
            return None;
        }

        self.fetcher_or_log()?;
        self.state.loading = true;
        self.state.current += 1;
        self.fetch_page(FetchMode::Page)
    }

    /// Restart from page 1. Anything still in flight is superseded.
    pub fn reset(&mut self) -> Option<PendingFetch> {
        self.fetcher_or_log()?;
        self.state.reached_end = false;
        self.state.loading = false;
        self.state.awaiting_detail_refresh = false;
        self.state.current = 1;
        self.generation += 1;
        self.in_flight = InFlight::default();
        self.fetch_page(FetchMode::Page)
    }
}
