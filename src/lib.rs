//! Paginated list controller.
//!
//! [`PageList`] owns the page cursor, the loading and end-of-list flags, and
//! the merge of fetched records into an in-memory list. It also handles the
//! single-item refresh that follows a trip to an item's detail view, and
//! soft deletion.
//!
//! Fetching is delegated to a [`Fetcher`]. Operations that need data return a
//! [`PendingFetch`] which the host runs, inline or on a spawned task, and
//! hands back through [`PageList::complete`]. Host notifications go out as
//! [`ListSignal`]s on a channel.

pub mod config;
pub mod controller;
mod delete;
pub mod error;
pub mod merge;
pub mod params;
mod refresh;
pub mod response;
pub mod signal;
pub mod source;
pub mod state;

#[cfg(test)]
mod testing;

pub use config::{Config, ListConfig, SourceConfig};
pub use controller::{Completion, FetchMode, FetchTicket, PageList, PendingFetch};
pub use error::{PagelistError, Result};
pub use merge::{Formatter, MergeTarget};
pub use params::QueryParams;
pub use response::{FetchRequest, FetchResponse, PageData};
pub use signal::ListSignal;
pub use source::{Fetcher, HttpMethod, HttpSource};
pub use state::{Item, ListPhase, ListState};
