//! Narration emitted by the rename engine.
//!
//! Events are delivered synchronously, in processing order, to whatever
//! [`ProgressSink`] the caller hands in. Their `Display` form is the
//! human-readable line a console or GUI would show.

use crate::metadata::TimestampSource;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameEvent {
    Found {
        count: usize,
    },
    BackupFolderReady {
        path: PathBuf,
    },
    BackedUp {
        file_name: String,
        backup_path: PathBuf,
    },
    AlreadyNamed {
        file_name: String,
    },
    NoTimestamp {
        file_name: String,
    },
    Renamed {
        from: String,
        to: String,
        source: TimestampSource,
    },
    RenameFailed {
        from: String,
        to: String,
        message: String,
    },
}

impl fmt::Display for RenameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenameEvent::Found { count } => write!(f, "Found {count} image file(s)"),
            RenameEvent::BackupFolderReady { path } => {
                write!(f, "Backing up originals to {}", path.display())
            }
            RenameEvent::BackedUp {
                file_name,
                backup_path,
            } => write!(f, "Backed up {file_name} to {}", backup_path.display()),
            RenameEvent::AlreadyNamed { file_name } => {
                write!(f, "Skipping {file_name} (already named correctly)")
            }
            RenameEvent::NoTimestamp { file_name } => {
                write!(f, "Skipping {file_name} (no usable timestamp)")
            }
            RenameEvent::Renamed { from, to, source } => {
                write!(f, "Renamed: {from} -> {to} (from {source})")
            }
            RenameEvent::RenameFailed { from, to, message } => {
                write!(f, "Error renaming {from} -> {to}: {message}")
            }
        }
    }
}

/// Receives narration. Any `FnMut(&RenameEvent)` closure is a sink.
pub trait ProgressSink {
    fn report(&mut self, event: &RenameEvent);
}

impl<F> ProgressSink for F
where
    F: FnMut(&RenameEvent),
{
    fn report(&mut self, event: &RenameEvent) {
        self(event)
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&mut self, _event: &RenameEvent) {}
}
