use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{PagelistError, Result};
use crate::params::{QueryParams, RESERVED_KEYS};

/// What the controller asks the fetcher for.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub size: u32,
    pub current: u32,
    pub params: QueryParams,
}

impl FetchRequest {
    /// Flat payload: `{ size, current, ...params }`. Reserved keys in params are ignored.
    pub fn to_payload(&self) -> Map<String, Value> {
        let mut payload = Map::new();
        payload.insert("size".to_string(), Value::from(self.size));
        payload.insert("current".to_string(), Value::from(self.current));
        for (key, value) in self.params.iter() {
            if RESERVED_KEYS.contains(&key.as_str()) {
                continue;
            }
            payload.insert(key.clone(), value.clone());
        }
        payload
    }

    /// `key=value` pairs for a GET query string. Strings are sent bare, everything else as JSON.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        self.to_payload()
            .into_iter()
            .map(|(key, value)| {
                let value = match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                (key, value)
            })
            .collect()
    }
}

/// Response envelope returned by a fetcher.
///
/// Every level is optional so that malformed responses still deserialize;
/// [`FetchResponse::into_page`] decides whether the shape is usable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FetchResponse {
    #[serde(default)]
    pub data: Option<Envelope>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub data: Option<PageData>,
}

/// The nested page payload. Unknown keys are kept in `extra` so formatters can see them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageData {
    #[serde(default)]
    pub records: Option<Vec<Value>>,
    #[serde(default)]
    pub total: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A page that passed shape validation.
#[derive(Debug, Clone)]
pub struct ValidPage {
    pub records: Vec<Value>,
    pub total: i64,
    pub payload: PageData,
}

impl FetchResponse {
    pub fn ok(records: Vec<Value>, total: i64) -> Self {
        FetchResponse {
            data: Some(Envelope {
                code: Some(0),
                data: Some(PageData {
                    records: Some(records),
                    total: Some(total),
                    extra: Map::new(),
                }),
            }),
        }
    }

    pub fn error_code(code: i64) -> Self {
        FetchResponse {
            data: Some(Envelope {
                code: Some(code),
                data: None,
            }),
        }
    }

    /// The nested payload, whatever its shape. Handed to the host on every completion.
    pub fn payload(&self) -> Option<&PageData> {
        self.data.as_ref()?.data.as_ref()
    }

    pub fn into_page(self) -> Result<ValidPage> {
        let envelope = self
            .data
            .ok_or_else(|| PagelistError::Shape("missing response data".into()))?;

        match envelope.code {
            Some(0) => {}
            Some(code) => return Err(PagelistError::Fetch(format!("server returned code {}", code))),
            None => return Err(PagelistError::Shape("missing code".into())),
        }

        let mut payload = envelope
            .data
            .ok_or_else(|| PagelistError::Shape("missing page data".into()))?;
        let records = payload
            .records
            .take()
            .ok_or_else(|| PagelistError::Shape("missing records".into()))?;
        let total = payload
            .total
            .ok_or_else(|| PagelistError::Shape("missing total".into()))?;

        payload.records = Some(records.clone());
        Ok(ValidPage {
            records,
            total,
            payload,
        })
    }
}
