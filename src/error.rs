//! Error taxonomy for loading and indexing.
//!
//! Per-source failures ([`SourceError`]) are recovered by the loader and
//! downgraded to warnings. Index construction failures ([`IndexBuildError`])
//! end the build that produced them but leave the installed index alone.
//! [`NotReady`] is not a failure at all; it marks a query made before any
//! index exists.

use std::time::Duration;

use thiserror::Error;

/// Why a single source contributed no records.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Transport failure: connection refused, unreadable file, bad scheme.
    #[error("{0}")]
    Fetch(String),

    /// The server answered with a non-success status.
    #[error("HTTP {status}")]
    Http { status: u16 },

    /// The fetch did not complete within the configured timeout.
    #[error("timed out after {after:?}")]
    Timeout { after: Duration },

    /// The body was not valid JSON.
    #[error("invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// Valid JSON whose top level is not an array of records.
    #[error("expected a JSON array of records, found {found}")]
    Format { found: &'static str },
}

/// The matching engine could not be constructed.
#[derive(Debug, Error)]
pub enum IndexBuildError {
    #[error("invalid index configuration: {0}")]
    InvalidConfig(String),

    /// Construction panicked or was torn down before completing.
    #[error("index construction aborted: {0}")]
    Aborted(String),
}

/// No index has been built successfully yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no index has been built yet")]
pub struct NotReady;
