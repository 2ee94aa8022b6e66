mod apply;
mod config;
mod exif_reader;
mod metadata;
mod planner;
mod progress;
mod sanitize;
mod template;

#[cfg(test)]
pub(crate) mod test_helpers;

pub const DEFAULT_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";
pub const DEFAULT_MAX_FILENAME_LEN: usize = 240;

pub use apply::{
    rename_images, rename_images_with_progress, RenameOptions, RenameOutcome, RunStatistics,
    BACKUP_DIR_NAME,
};
pub use config::{
    app_paths, load_config, load_config_from, save_config, save_config_to, AppConfig, AppPaths,
};
pub use exif_reader::extract_capture_time;
pub use metadata::{resolve_timestamp, CandidateTimestamp, TimestampSource};
pub use planner::{collect_image_files, DirectoryListing, ImageFile, SUPPORTED_EXTENSIONS};
pub use progress::{NoProgress, ProgressSink, RenameEvent};
pub use template::{parse_template, validate_template, NameTemplate, TemplateError};
