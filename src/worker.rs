//! The search worker: a single session actor driven by [`Command`]s.
//!
//! The session owns the [`IndexManager`] and is the only writer to it.
//! Searches and lookups run inline on the session task against whatever
//! index is installed. Builds run on their own task so the session keeps
//! answering while sources load; the finished index comes back to the
//! session, which installs it.
//!
//! # Builds
//!
//! At most one build is pending at a time. A `BUILD` that arrives while
//! another is pending aborts it and reports `ERROR` for it before starting
//! (last writer wins). Every build message is tagged with its generation,
//! and messages from anything but the pending generation are dropped, so a
//! superseded build never emits after its terminal `ERROR`.
//!
//! When the host closes the command channel the session stops taking
//! commands but lets a pending build finish, so every `BUILD` the host sent
//! still gets its `READY` or `ERROR`. A hung source is bounded by the loader
//! timeout.
//!
//! ```text
//!  host ──Command──▶ session ──spawn──▶ build task
//!   ▲                  │  ▲                 │
//!   └──────Event───────┘  └──BuildMessage───┘
//! ```

use anyhow::{anyhow, Result};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::{Config, LoaderConfig};
use crate::error::{IndexBuildError, NotReady};
use crate::fetch::SourceFetcher;
use crate::index::{IndexManager, SearchIndex};
use crate::loader::load_sources;
use crate::models::scalar_text;
use crate::progress::LoadEvent;
use crate::protocol::{Command, Event};

const SUPERSEDED: &str = "build superseded by a newer BUILD request";

/// Host-side ends of a running worker.
pub struct WorkerHandle {
    commands: mpsc::UnboundedSender<Command>,
    events: mpsc::UnboundedReceiver<Event>,
    task: JoinHandle<()>,
}

impl WorkerHandle {
    pub fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| anyhow!("search worker has shut down"))
    }

    /// Next outbound message, or `None` once the worker has stopped.
    pub async fn recv(&mut self) -> Option<Event> {
        self.events.recv().await
    }

    /// Split into the command sender, the event receiver, and the session
    /// task. Dropping the sender ends the session once any
    /// pending build has reported.
    pub fn into_parts(
        self,
    ) -> (
        mpsc::UnboundedSender<Command>,
        mpsc::UnboundedReceiver<Event>,
        JoinHandle<()>,
    ) {
        (self.commands, self.events, self.task)
    }
}

/// Start a worker session on the current tokio runtime.
pub fn spawn_worker(config: &Config, fetcher: Arc<dyn SourceFetcher>) -> WorkerHandle {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let (build_tx, build_rx) = mpsc::unbounded_channel();

    let session = Session {
        indexes: IndexManager::new(config.index.clone()),
        loader: config.loader.clone(),
        fetcher,
        events: event_tx,
        build_tx,
        generation: 0,
        pending: None,
    };
    let task = tokio::spawn(session.run(command_rx, build_rx));

    WorkerHandle {
        commands: command_tx,
        events: event_rx,
        task,
    }
}

enum BuildMessage {
    Progress {
        generation: u64,
        event: LoadEvent,
    },
    Finished {
        generation: u64,
        result: Result<SearchIndex, IndexBuildError>,
    },
}

struct PendingBuild {
    generation: u64,
    task: JoinHandle<()>,
}

struct Session {
    indexes: IndexManager,
    loader: LoaderConfig,
    fetcher: Arc<dyn SourceFetcher>,
    events: mpsc::UnboundedSender<Event>,
    build_tx: mpsc::UnboundedSender<BuildMessage>,
    generation: u64,
    pending: Option<PendingBuild>,
}

impl Session {
    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut builds: mpsc::UnboundedReceiver<BuildMessage>,
    ) {
        loop {
            tokio::select! {
                biased;
                Some(message) = builds.recv() => self.on_build_message(message),
                command = commands.recv() => match command {
                    Some(command) => self.handle(command),
                    None => break,
                },
            }
        }

        while self.pending.is_some() {
            match builds.recv().await {
                Some(message) => self.on_build_message(message),
                None => break,
            }
        }
        debug!("search worker stopped");
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Build { files } => self.start_build(files),
            Command::Search { query } => {
                let event = match self.indexes.query(&query) {
                    Ok(items) => Event::Results { items },
                    Err(NotReady) => Event::NotReady,
                };
                self.emit(event);
            }
            Command::Get { id } => {
                let event = match scalar_text(&id) {
                    Some(key) => match self.indexes.lookup(&key) {
                        Ok(Some(record)) => Event::Record {
                            item: record.clone(),
                        },
                        Ok(None) => Event::NotFound { id },
                        Err(NotReady) => Event::NotReady,
                    },
                    None if !self.indexes.is_ready() => Event::NotReady,
                    None => Event::NotFound { id },
                };
                self.emit(event);
            }
            Command::Ping => self.emit(Event::Pong),
            Command::Malformed { message } => {
                warn!(error = %message, "undecodable message");
                self.emit(Event::Error { message });
            }
        }
    }

    fn start_build(&mut self, files: Vec<String>) {
        if let Some(previous) = self.pending.take() {
            previous.task.abort();
            info!(generation = previous.generation, "build superseded");
            self.emit(Event::Error {
                message: SUPERSEDED.to_string(),
            });
        }

        self.generation += 1;
        let generation = self.generation;
        info!(generation, sources = files.len(), "build started");

        let fetcher = Arc::clone(&self.fetcher);
        let timeout = self.loader.timeout();
        let config = self.indexes.config().clone();
        let tx = self.build_tx.clone();

        let task = tokio::spawn(async move {
            let progress_tx = tx.clone();
            let reporter = move |event: LoadEvent| {
                let _ = progress_tx.send(BuildMessage::Progress { generation, event });
            };
            let outcome = load_sources(fetcher.as_ref(), &files, timeout, &reporter).await;

            let result =
                tokio::task::spawn_blocking(move || SearchIndex::build(outcome.records, &config))
                    .await
                    .unwrap_or_else(|e| Err(IndexBuildError::Aborted(e.to_string())));
            let _ = tx.send(BuildMessage::Finished { generation, result });
        });

        self.pending = Some(PendingBuild { generation, task });
    }

    fn on_build_message(&mut self, message: BuildMessage) {
        let current = self.pending.as_ref().map(|p| p.generation);
        match message {
            BuildMessage::Progress { generation, event } => {
                if current == Some(generation) {
                    self.emit(event.into());
                }
            }
            BuildMessage::Finished { generation, result } => {
                if current != Some(generation) {
                    debug!(generation, "discarding result of superseded build");
                    return;
                }
                self.pending = None;
                match result {
                    Ok(index) => {
                        let count = self.indexes.install(index);
                        info!(generation, count, "index installed");
                        self.emit(Event::Ready { count });
                    }
                    Err(e) => {
                        warn!(generation, error = %e, "build failed");
                        self.emit(Event::Error {
                            message: format!("index build failed: {}", e),
                        });
                    }
                }
            }
        }
    }

    fn emit(&self, event: Event) {
        if self.events.send(event).is_err() {
            debug!("host dropped the event receiver");
        }
    }
}
