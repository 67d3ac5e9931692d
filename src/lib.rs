//! # Card Search
//!
//! A background indexing and fuzzy-search worker for trading-card catalogs.
//!
//! The host talks to the worker only through messages: it asks for a build
//! over a list of JSON sources, then sends free-text searches. The worker
//! loads the sources one by one, normalizes every card, builds a fuzzy index
//! over name, set, number and rarity, and answers with ranked results.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐ BUILD ┌──────────┐ fetch ┌──────────┐ normalize ┌──────────┐
//! │   Host   │──────▶│  Worker  │──────▶│  Loader  │──────────▶│  Index   │
//! │          │◀──────│ session  │◀──────│          │           │ manager  │
//! └──────────┘ events└──────────┘progress└──────────┘           └──────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`error`] | Source and index error types |
//! | [`models`] | Core data types |
//! | [`normalize`] | Raw card JSON to [`models::Record`] |
//! | [`fetch`] | HTTP and file source fetching |
//! | [`progress`] | Per-source load progress |
//! | [`loader`] | Sequential, failure-tolerant dataset loading |
//! | [`fuzzy`] | Approximate substring matching |
//! | [`index`] | Search index and its owner |
//! | [`protocol`] | Inbound and outbound messages |
//! | [`worker`] | The session actor |

pub mod config;
pub mod error;
pub mod fetch;
pub mod fuzzy;
pub mod index;
pub mod loader;
pub mod models;
pub mod normalize;
pub mod progress;
pub mod protocol;
pub mod worker;
