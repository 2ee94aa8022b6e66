use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use exif::{In, Reader, Tag, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

const EXIF_DATE_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Reads `DateTimeOriginal` from the image's embedded EXIF block.
///
/// Every failure (unreadable file, no EXIF container, missing tag, malformed
/// value) collapses to `None` so the caller moves on to the next source.
pub fn extract_capture_time(path: &Path) -> Option<NaiveDateTime> {
    match read_capture_time(path) {
        Ok(Some(value)) => Some(value),
        Ok(None) => {
            tracing::trace!(path = %path.display(), "no usable DateTimeOriginal tag");
            None
        }
        Err(err) => {
            let reason = format!("{err:#}");
            tracing::debug!(path = %path.display(), error = %reason, "EXIF unavailable");
            None
        }
    }
}

fn read_capture_time(path: &Path) -> Result<Option<NaiveDateTime>> {
    let file = File::open(path)
        .with_context(|| format!("failed to open image for EXIF: {}", path.display()))?;
    let mut buf = BufReader::new(file);
    let exif = Reader::new()
        .read_from_container(&mut buf)
        .with_context(|| format!("failed to parse EXIF: {}", path.display()))?;

    let Some(field) = exif.get_field(Tag::DateTimeOriginal, In::PRIMARY) else {
        return Ok(None);
    };

    Ok(ascii_value(&field.value).and_then(parse_exif_datetime))
}

fn ascii_value(value: &Value) -> Option<&str> {
    match value {
        Value::Ascii(parts) => parts
            .first()
            .and_then(|bytes| std::str::from_utf8(bytes).ok()),
        _ => None,
    }
}

fn parse_exif_datetime(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim_end_matches('\0').trim();
    NaiveDateTime::parse_from_str(trimmed, EXIF_DATE_FORMAT).ok()
}
