use crate::exif_reader::extract_capture_time;
use crate::planner::ImageFile;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TimestampSource {
    ExifCaptureTime,
    FileCreated,
    FileModified,
}

impl TimestampSource {
    pub const DEFAULT_CHAIN: [TimestampSource; 3] = [
        TimestampSource::ExifCaptureTime,
        TimestampSource::FileCreated,
        TimestampSource::FileModified,
    ];

    pub fn resolve(self, file: &ImageFile) -> Option<NaiveDateTime> {
        match self {
            TimestampSource::ExifCaptureTime => extract_capture_time(&file.path),
            TimestampSource::FileCreated => file.created,
            TimestampSource::FileModified => file.modified,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TimestampSource::ExifCaptureTime => "EXIF capture time",
            TimestampSource::FileCreated => "file creation time",
            TimestampSource::FileModified => "file modification time",
        }
    }
}

impl fmt::Display for TimestampSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A fully resolved timestamp together with the source that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateTimestamp {
    pub value: NaiveDateTime,
    pub source: TimestampSource,
}

/// Tries each source in order and stops at the first one that yields a value.
pub fn resolve_timestamp(
    file: &ImageFile,
    chain: &[TimestampSource],
) -> Option<CandidateTimestamp> {
    chain.iter().find_map(|source| {
        let value = source.resolve(file)?;
        tracing::debug!(path = %file.path.display(), %source, %value, "timestamp resolved");
        Some(CandidateTimestamp {
            value,
            source: *source,
        })
    })
}
