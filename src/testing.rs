//! In-memory fetcher and helpers shared by the unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::mpsc;

use crate::config::ListConfig;
use crate::controller::PageList;
use crate::error::{PagelistError, Result};
use crate::response::{FetchRequest, FetchResponse};
use crate::signal::ListSignal;
use crate::source::Fetcher;

/// Replays a fixed queue of responses and records every request it sees.
#[derive(Debug, Default)]
pub struct Scripted {
    responses: Mutex<VecDeque<Result<FetchResponse>>>,
    requests: Mutex<Vec<FetchRequest>>,
}

impl Scripted {
    pub fn new(responses: Vec<Result<FetchResponse>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Fetcher for Scripted {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(PagelistError::Fetch("script exhausted".into())))
    }
}

pub fn r(id: u64) -> Value {
    json!({ "id": id })
}

pub fn list(
    page_size: u32,
    source: Arc<Scripted>,
) -> (
    PageList<Value>,
    mpsc::UnboundedReceiver<ListSignal<Value>>,
) {
    let config = ListConfig {
        page_size,
        ..ListConfig::default()
    };
    let (tx, rx) = mpsc::unbounded_channel();
    (PageList::new(&config, tx).with_fetcher(source), rx)
}
