//! File change event handlers
//!
//! Processes notify events and converts them to WatchEvents

use std::path::Path;

use notify::{Event, EventKind};

use super::WatchEvent;
use crate::parser::{reference_from_path, TrendFileKind};

/// Handle a file system event
pub fn handle_event(event: Event) -> Option<WatchEvent> {
    let path = event.paths.first()?;

    match event.kind {
        EventKind::Create(_) | EventKind::Modify(_) => handle_change(path),
        EventKind::Remove(_) => handle_remove(path),
        _ => None,
    }
}

/// Handle file creation or modification
fn handle_change(path: &Path) -> Option<WatchEvent> {
    if !is_trend_file(path) {
        return None;
    }

    let reference = reference_from_path(path)?;
    Some(WatchEvent::TrendFileChanged {
        reference,
        path: path.to_path_buf(),
    })
}

/// Handle file removal
fn handle_remove(path: &Path) -> Option<WatchEvent> {
    if !is_trend_file(path) {
        return None;
    }

    Some(WatchEvent::TrendFileRemoved {
        path: path.to_path_buf(),
    })
}

/// Check if a path is an importable trend file
fn is_trend_file(path: &Path) -> bool {
    TrendFileKind::from_path(path).is_some()
}
