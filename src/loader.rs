//! Dataset loading.
//!
//! Sources are fetched one at a time in list order. A failing source is
//! reported as a warning and skipped; it never aborts the batch. Records
//! keep source order, then array order within a source, with no
//! deduplication.

use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::SourceError;
use crate::fetch::SourceFetcher;
use crate::models::Record;
use crate::normalize::normalize;
use crate::progress::{LoadEvent, LoadProgressReporter};

/// A source that contributed no records, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceWarning {
    pub uri: String,
    pub message: String,
}

/// Everything a load produced.
#[derive(Debug, Default)]
pub struct LoadOutcome {
    pub records: Vec<Record>,
    pub warnings: Vec<SourceWarning>,
}

/// Load and normalize every source.
///
/// Emits exactly one [`LoadEvent::Loaded`] per source, after any
/// [`LoadEvent::Warning`] for that source.
pub async fn load_sources(
    fetcher: &dyn SourceFetcher,
    sources: &[String],
    timeout: Option<Duration>,
    reporter: &dyn LoadProgressReporter,
) -> LoadOutcome {
    let total = sources.len();
    let mut outcome = LoadOutcome::default();

    for (i, uri) in sources.iter().enumerate() {
        match load_source(fetcher, uri, timeout).await {
            Ok(records) => {
                debug!(source = %uri, records = records.len(), "source loaded");
                outcome.records.extend(records);
            }
            Err(e) => {
                let message = e.to_string();
                warn!(source = %uri, error = %message, "source skipped");
                reporter.report(LoadEvent::Warning {
                    uri: uri.clone(),
                    message: message.clone(),
                });
                outcome.warnings.push(SourceWarning {
                    uri: uri.clone(),
                    message,
                });
            }
        }

        reporter.report(LoadEvent::Loaded {
            uri: uri.clone(),
            loaded: i + 1,
            total,
        });
    }

    outcome
}

async fn load_source(
    fetcher: &dyn SourceFetcher,
    uri: &str,
    timeout: Option<Duration>,
) -> Result<Vec<Record>, SourceError> {
    let body = match timeout {
        Some(after) => tokio::time::timeout(after, fetcher.fetch(uri))
            .await
            .map_err(|_| SourceError::Timeout { after })??,
        None => fetcher.fetch(uri).await?,
    };

    match serde_json::from_slice::<Value>(&body)? {
        Value::Array(items) => Ok(items.iter().map(normalize).collect()),
        other => Err(SourceError::Format {
            found: json_kind(&other),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
