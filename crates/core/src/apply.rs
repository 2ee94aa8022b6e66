use crate::metadata::{resolve_timestamp, TimestampSource};
use crate::planner::{collect_image_files, DirectoryListing, ImageFile, NameRegistry};
use crate::progress::{NoProgress, ProgressSink, RenameEvent};
use crate::template::{parse_template, NameTemplate};
use crate::{DEFAULT_FORMAT, DEFAULT_MAX_FILENAME_LEN};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, FileTimes};
use std::path::{Path, PathBuf};

pub const BACKUP_DIR_NAME: &str = "backup";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameOptions {
    pub create_backup: bool,
    pub format: String,
    /// Tried in order for every file; the first source with a value wins.
    pub timestamp_sources: Vec<TimestampSource>,
    pub max_filename_len: usize,
}

impl Default for RenameOptions {
    fn default() -> Self {
        Self {
            create_backup: false,
            format: DEFAULT_FORMAT.to_string(),
            timestamp_sources: TimestampSource::DEFAULT_CHAIN.to_vec(),
            max_filename_len: DEFAULT_MAX_FILENAME_LEN,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameOutcome {
    Renamed,
    Skipped,
    Failed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStatistics {
    pub total: usize,
    pub renamed: usize,
    pub skipped: usize,
    /// Set only when the folder itself could not be used; counts are zero then.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RunStatistics {
    fn folder_error(message: String) -> Self {
        Self {
            error: Some(message),
            ..Self::default()
        }
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }
}

pub fn rename_images(directory: &Path, options: &RenameOptions) -> Result<RunStatistics> {
    rename_images_with_progress(directory, options, &mut NoProgress)
}

/// Renames every supported image directly inside `directory`.
///
/// Returns `Err` only when a requested backup cannot be made or the format
/// pattern is unusable. A missing folder is reported through
/// [`RunStatistics::error`]; per-file failures are counted as skipped.
pub fn rename_images_with_progress(
    directory: &Path,
    options: &RenameOptions,
    progress: &mut dyn ProgressSink,
) -> Result<RunStatistics> {
    if !directory.is_dir() {
        let message = if directory.exists() {
            format!("Not a directory: {}", directory.display())
        } else {
            format!("Directory not found: {}", directory.display())
        };
        tracing::warn!(folder = %directory.display(), "{message}");
        return Ok(RunStatistics::folder_error(message));
    }

    let template = parse_template(&options.format)
        .with_context(|| format!("invalid format pattern: {:?}", options.format))?;

    let DirectoryListing { files, names } = match collect_image_files(directory) {
        Ok(listing) => listing,
        Err(err) => {
            let message = format!("{err:#}");
            tracing::warn!(folder = %directory.display(), error = %message, "listing failed");
            return Ok(RunStatistics::folder_error(message));
        }
    };

    let total = files.len();
    tracing::info!(folder = %directory.display(), total, "starting rename pass");
    progress.report(&RenameEvent::Found { count: total });

    let backup_root = if options.create_backup {
        Some(prepare_backup_folder(directory, progress)?)
    } else {
        None
    };

    let mut registry = NameRegistry::new(directory, names);
    let mut renamed = 0usize;
    let mut skipped = 0usize;

    for mut file in files {
        if let Some(backup_root) = backup_root.as_deref() {
            backup_original(&file, backup_root, progress)?;
        }

        match process_file(&mut file, &template, options, &mut registry, progress)? {
            RenameOutcome::Renamed => renamed += 1,
            RenameOutcome::Skipped | RenameOutcome::Failed => skipped += 1,
        }
    }

    tracing::info!(total, renamed, skipped, "rename pass finished");
    Ok(RunStatistics {
        total,
        renamed,
        skipped,
        error: None,
    })
}

fn process_file(
    file: &mut ImageFile,
    template: &NameTemplate,
    options: &RenameOptions,
    registry: &mut NameRegistry,
    progress: &mut dyn ProgressSink,
) -> Result<RenameOutcome> {
    let Some(timestamp) = resolve_timestamp(file, &options.timestamp_sources) else {
        tracing::warn!(path = %file.path.display(), "no timestamp source produced a value");
        progress.report(&RenameEvent::NoTimestamp {
            file_name: file.file_name.clone(),
        });
        return Ok(RenameOutcome::Skipped);
    };

    let rendered = template
        .render(&timestamp.value)
        .with_context(|| format!("failed to render name for {}", file.path.display()))?;
    let target_name = registry.claim(file, &rendered, options.max_filename_len);

    if target_name == file.file_name {
        tracing::debug!(path = %file.path.display(), "already named correctly");
        progress.report(&RenameEvent::AlreadyNamed {
            file_name: file.file_name.clone(),
        });
        return Ok(RenameOutcome::Skipped);
    }

    Ok(apply_rename(file, target_name, timestamp.source, progress))
}

fn apply_rename(
    file: &mut ImageFile,
    target_name: String,
    source: TimestampSource,
    progress: &mut dyn ProgressSink,
) -> RenameOutcome {
    let target_path = file
        .path
        .parent()
        .map(|parent| parent.join(&target_name))
        .unwrap_or_else(|| PathBuf::from(&target_name));

    match fs::rename(&file.path, &target_path) {
        Ok(()) => {
            tracing::info!(
                from = %file.path.display(),
                to = %target_path.display(),
                %source,
                "renamed"
            );
            progress.report(&RenameEvent::Renamed {
                from: file.file_name.clone(),
                to: target_name.clone(),
                source,
            });
            file.path = target_path;
            file.file_name = target_name;
            RenameOutcome::Renamed
        }
        Err(err) => {
            tracing::warn!(
                from = %file.path.display(),
                to = %target_path.display(),
                error = %err,
                "rename failed"
            );
            progress.report(&RenameEvent::RenameFailed {
                from: file.file_name.clone(),
                to: target_name,
                message: err.to_string(),
            });
            RenameOutcome::Failed
        }
    }
}

fn prepare_backup_folder(directory: &Path, progress: &mut dyn ProgressSink) -> Result<PathBuf> {
    let backup_root = directory.join(BACKUP_DIR_NAME);
    fs::create_dir_all(&backup_root)
        .with_context(|| format!("failed to create backup folder: {}", backup_root.display()))?;
    progress.report(&RenameEvent::BackupFolderReady {
        path: backup_root.clone(),
    });
    Ok(backup_root)
}

fn backup_original(
    file: &ImageFile,
    backup_root: &Path,
    progress: &mut dyn ProgressSink,
) -> Result<()> {
    let backup_path = free_backup_path(backup_root, file);

    fs::copy(&file.path, &backup_path).with_context(|| {
        format!("backup failed: {} -> {}", file.path.display(), backup_path.display())
    })?;
    copy_file_times(&file.path, &backup_path)?;

    tracing::debug!(from = %file.path.display(), to = %backup_path.display(), "backed up");
    progress.report(&RenameEvent::BackedUp {
        file_name: file.file_name.clone(),
        backup_path,
    });
    Ok(())
}

/// `fs::copy` carries permissions over, so the copy may already be read-only.
/// A read handle is enough for `set_times` as long as we own the file.
fn copy_file_times(source: &Path, target: &Path) -> Result<()> {
    let metadata = fs::metadata(source)
        .with_context(|| format!("failed to read metadata: {}", source.display()))?;
    let mut times = FileTimes::new();
    if let Ok(modified) = metadata.modified() {
        times = times.set_modified(modified);
    }
    if let Ok(accessed) = metadata.accessed() {
        times = times.set_accessed(accessed);
    }

    File::open(target)
        .and_then(|handle| handle.set_times(times))
        .with_context(|| format!("failed to copy timestamps to backup: {}", target.display()))
}

/// The backup copy keeps the original name unless an earlier run already left
/// one there; then `<stem>_001.<ext>`, `<stem>_002.<ext>`, ... are tried.
fn free_backup_path(backup_root: &Path, file: &ImageFile) -> PathBuf {
    let plain = backup_root.join(&file.file_name);
    if !plain.exists() {
        return plain;
    }

    let stem = Path::new(&file.file_name)
        .file_stem()
        .map(|v| v.to_string_lossy().to_string())
        .unwrap_or_else(|| file.file_name.clone());
    let original_ext = Path::new(&file.file_name)
        .extension()
        .map(|v| format!(".{}", v.to_string_lossy()))
        .unwrap_or_default();

    (1usize..)
        .map(|n| backup_root.join(format!("{stem}_{n:03}{original_ext}")))
        .find(|candidate| !candidate.exists())
        .unwrap_or(plain)
}
