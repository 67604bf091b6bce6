//! File watcher module
//!
//! Watches the trend import directory for changes:
//! - New or updated trend files
//! - Removed trend files

pub mod handler;

use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use thiserror::Error;

/// Watcher errors
#[derive(Error, Debug)]
pub enum WatcherError {
    #[error("Notify error: {0}")]
    Notify(#[from] notify::Error),

    #[error("Channel error: {0}")]
    Channel(String),

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),
}

/// Events emitted by the watcher
#[derive(Debug, Clone, PartialEq)]
pub enum WatchEvent {
    /// A trend file was created or rewritten
    TrendFileChanged {
        reference: String,
        path: PathBuf,
    },
    /// A trend file was deleted
    TrendFileRemoved {
        path: PathBuf,
    },
}

/// Import directory watcher
pub struct ImportWatcher {
    watcher: RecommendedWatcher,
    import_path: PathBuf,
    rx: Receiver<Result<Event, notify::Error>>,
}

impl ImportWatcher {
    /// Create a new import watcher
    pub fn new(import_path: PathBuf) -> Result<Self, WatcherError> {
        let (tx, rx) = channel();

        let watcher = RecommendedWatcher::new(
            move |res| {
                let _ = tx.send(res);
            },
            Config::default().with_poll_interval(Duration::from_secs(1)),
        )?;

        Ok(Self {
            watcher,
            import_path,
            rx,
        })
    }

    /// Start watching the import directory
    pub fn start(&mut self) -> Result<(), WatcherError> {
        if !self.import_path.exists() {
            return Err(WatcherError::PathNotFound(self.import_path.clone()));
        }

        self.watcher.watch(&self.import_path, RecursiveMode::NonRecursive)?;

        tracing::info!("Started watching: {:?}", self.import_path);

        Ok(())
    }

    /// Poll for new events (non-blocking)
    pub fn poll(&self) -> Vec<WatchEvent> {
        let mut events = Vec::new();

        while let Ok(result) = self.rx.try_recv() {
            self.push_event(result, &mut events);
        }

        events
    }

    /// Block until at least one event arrives or `timeout` elapses,
    /// then drain whatever else is queued
    pub fn wait(&self, timeout: Duration) -> Result<Vec<WatchEvent>, WatcherError> {
        let mut events = Vec::new();

        match self.rx.recv_timeout(timeout) {
            Ok(result) => self.push_event(result, &mut events),
            Err(RecvTimeoutError::Timeout) => return Ok(events),
            Err(RecvTimeoutError::Disconnected) => {
                return Err(WatcherError::Channel("watcher channel closed".to_string()))
            }
        }

        events.extend(self.poll());
        events.dedup();
        Ok(events)
    }

    fn push_event(&self, result: Result<Event, notify::Error>, events: &mut Vec<WatchEvent>) {
        match result {
            Ok(event) => {
                if let Some(watch_event) = handler::handle_event(event) {
                    events.push(watch_event);
                }
            }
            Err(e) => {
                tracing::error!("Watch error: {:?}", e);
            }
        }
    }
}
