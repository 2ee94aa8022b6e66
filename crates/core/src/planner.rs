use crate::sanitize::{sanitize_filename, truncate_filename_if_needed};
use anyhow::{Context, Result};
use chrono::{DateTime, Local, NaiveDateTime};
use std::collections::HashSet;
use std::ffi::{OsStr, OsString};
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// An image discovered in the target directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub path: PathBuf,
    pub file_name: String,
    /// Lower-cased, without the leading dot.
    pub extension: String,
    pub created: Option<NaiveDateTime>,
    pub modified: Option<NaiveDateTime>,
}

impl ImageFile {
    pub fn extension_with_dot(&self) -> String {
        format!(".{}", self.extension)
    }

    fn from_entry(path: &Path, metadata: &Metadata) -> Option<Self> {
        let extension = supported_extension(path)?;
        let file_name = path.file_name()?.to_string_lossy().to_string();
        Some(Self {
            path: path.to_path_buf(),
            file_name,
            extension,
            created: metadata.created().ok().map(to_local_naive),
            modified: metadata.modified().ok().map(to_local_naive),
        })
    }
}

/// Result of a single non-recursive listing of the target directory.
#[derive(Debug, Clone, Default)]
pub struct DirectoryListing {
    pub files: Vec<ImageFile>,
    /// Every entry name in the directory, images or not.
    pub names: HashSet<OsString>,
}

pub fn collect_image_files(root: &Path) -> Result<DirectoryListing> {
    let mut listing = DirectoryListing::default();

    for entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 => {
                return Err(err)
                    .with_context(|| format!("failed to read folder: {}", root.display()));
            }
            Err(err) => {
                tracing::warn!(folder = %root.display(), error = %err, "skipping unreadable entry");
                continue;
            }
        };

        listing.names.insert(entry.file_name().to_os_string());
        if !entry.file_type().is_file() {
            continue;
        }

        let metadata = match entry.metadata() {
            Ok(metadata) => metadata,
            Err(err) => {
                tracing::warn!(
                    path = %entry.path().display(),
                    error = %err,
                    "skipping entry without metadata"
                );
                continue;
            }
        };
        if let Some(file) = ImageFile::from_entry(entry.path(), &metadata) {
            listing.files.push(file);
        }
    }

    Ok(listing)
}

/// Tracks names that are taken in the target directory: the original listing
/// plus every name handed out earlier in the same run.
#[derive(Debug, Clone)]
pub struct NameRegistry {
    root: PathBuf,
    claimed: HashSet<OsString>,
}

impl NameRegistry {
    pub fn new(root: &Path, claimed: HashSet<OsString>) -> Self {
        Self {
            root: root.to_path_buf(),
            claimed,
        }
    }

    /// Picks the final file name for `file`, appending `_1`, `_2`, ... before
    /// the extension when the plain name belongs to something else.
    pub fn claim(&mut self, file: &ImageFile, rendered_base: &str, max_len: usize) -> String {
        let extension = file.extension_with_dot();
        let base = sanitize_filename(rendered_base);

        let plain = format!(
            "{}{}",
            truncate_filename_if_needed(&base, "", &extension, max_len),
            extension
        );
        if self.is_available(&plain, file) {
            return self.reserve(plain);
        }

        let mut n = 1usize;
        loop {
            let suffix = format!("_{n}");
            let candidate = format!(
                "{}{}{}",
                truncate_filename_if_needed(&base, &suffix, &extension, max_len),
                suffix,
                extension
            );
            if self.is_available(&candidate, file) {
                return self.reserve(candidate);
            }
            n += 1;
        }
    }

    /// A name differing from the file's own only by case is treated as the
    /// file itself, since on case-insensitive filesystems it resolves to it.
    fn is_available(&self, name: &str, file: &ImageFile) -> bool {
        if name == file.file_name {
            return true;
        }
        if self.claimed.contains(OsStr::new(name)) {
            return false;
        }
        name.eq_ignore_ascii_case(&file.file_name) || !self.root.join(name).exists()
    }

    fn reserve(&mut self, name: String) -> String {
        self.claimed.insert(OsString::from(&name));
        name
    }
}

fn supported_extension(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_string_lossy().to_ascii_lowercase();
    SUPPORTED_EXTENSIONS
        .contains(&ext.as_str())
        .then_some(ext)
}

fn to_local_naive(time: SystemTime) -> NaiveDateTime {
    DateTime::<Local>::from(time).naive_local()
}

#[cfg(test)]
mod tests {
    use super::{collect_image_files, ImageFile, NameRegistry};
    use std::collections::HashSet;
    use std::ffi::OsString;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn image(root: &Path, name: &str) -> ImageFile {
        let extension = Path::new(name)
            .extension()
            .map(|v| v.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        ImageFile {
            path: root.join(name),
            file_name: name.to_string(),
            extension,
            created: None,
            modified: None,
        }
    }

    fn claimed(names: &[&str]) -> HashSet<OsString> {
        names.iter().map(OsString::from).collect()
    }

    #[test]
    fn collect_filters_supported_extensions_case_insensitively() {
        let temp = tempdir().expect("tempdir");
        for name in ["b.JPG", "a.jpeg", "c.Png", "notes.txt", "raw.dng", "noext"] {
            fs::write(temp.path().join(name), b"x").expect("write file");
        }
        fs::create_dir(temp.path().join("nested.jpg")).expect("create dir");
        fs::write(temp.path().join("nested.jpg").join("inner.jpg"), b"x").expect("write nested");

        let listing = collect_image_files(temp.path()).expect("listing");
        let names: Vec<&str> = listing.files.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(names, vec!["a.jpeg", "b.JPG", "c.Png"]);
        assert_eq!(listing.files[1].extension, "jpg");
        assert_eq!(listing.files[2].extension, "png");
        assert!(listing.names.contains(&OsString::from("notes.txt")));
        assert!(listing.names.contains(&OsString::from("nested.jpg")));
        assert_eq!(listing.names.len(), 7);
    }

    #[test]
    fn collect_records_filesystem_times() {
        let temp = tempdir().expect("tempdir");
        fs::write(temp.path().join("IMG_0001.jpg"), b"x").expect("write file");

        let listing = collect_image_files(temp.path()).expect("listing");
        assert!(listing.files[0].modified.is_some());
    }

    #[test]
    fn collect_fails_for_missing_folder() {
        let temp = tempdir().expect("tempdir");
        assert!(collect_image_files(&temp.path().join("missing")).is_err());
    }

    #[test]
    fn claim_returns_plain_name_when_free() {
        let temp = tempdir().expect("tempdir");
        let file = image(temp.path(), "IMG_0001.JPG");
        let mut registry = NameRegistry::new(temp.path(), claimed(&["IMG_0001.JPG"]));

        let name = registry.claim(&file, "2022-10-15_08-30-00", 240);
        assert_eq!(name, "2022-10-15_08-30-00.jpg");
    }

    #[test]
    fn claim_keeps_own_name() {
        let temp = tempdir().expect("tempdir");
        let file = image(temp.path(), "2022-10-15_08-30-00.jpg");
        let mut registry = NameRegistry::new(temp.path(), claimed(&["2022-10-15_08-30-00.jpg"]));

        let name = registry.claim(&file, "2022-10-15_08-30-00", 240);
        assert_eq!(name, "2022-10-15_08-30-00.jpg");
    }

    #[test]
    fn claim_treats_case_variant_of_own_name_as_free() {
        let temp = tempdir().expect("tempdir");
        fs::write(temp.path().join("2022-10-15_08-30-00.JPG"), b"x").expect("write file");
        let file = image(temp.path(), "2022-10-15_08-30-00.JPG");
        let mut registry = NameRegistry::new(temp.path(), claimed(&["2022-10-15_08-30-00.JPG"]));

        let name = registry.claim(&file, "2022-10-15_08-30-00", 240);
        assert_eq!(name, "2022-10-15_08-30-00.jpg");
    }

    #[test]
    fn claim_respects_listed_name_differing_only_by_case() {
        let temp = tempdir().expect("tempdir");
        let file = image(temp.path(), "2022-10-15_08-30-00.JPG");
        let mut registry = NameRegistry::new(
            temp.path(),
            claimed(&["2022-10-15_08-30-00.JPG", "2022-10-15_08-30-00.jpg"]),
        );

        let name = registry.claim(&file, "2022-10-15_08-30-00", 240);
        assert_eq!(name, "2022-10-15_08-30-00_1.jpg");
    }

    #[test]
    fn claim_appends_numeric_suffix_on_collision() {
        let temp = tempdir().expect("tempdir");
        let mut registry = NameRegistry::new(
            temp.path(),
            claimed(&["A.jpg", "B.jpg", "C.jpg", "2022-10-15_08-30-00_1.jpg"]),
        );

        let first = registry.claim(&image(temp.path(), "A.jpg"), "2022-10-15_08-30-00", 240);
        let second = registry.claim(&image(temp.path(), "B.jpg"), "2022-10-15_08-30-00", 240);
        let third = registry.claim(&image(temp.path(), "C.jpg"), "2022-10-15_08-30-00", 240);

        assert_eq!(first, "2022-10-15_08-30-00.jpg");
        assert_eq!(second, "2022-10-15_08-30-00_2.jpg");
        assert_eq!(third, "2022-10-15_08-30-00_3.jpg");
    }

    #[test]
    fn claim_avoids_names_that_exist_on_disk() {
        let temp = tempdir().expect("tempdir");
        fs::write(temp.path().join("2022.jpg"), b"late arrival").expect("write file");
        let mut registry = NameRegistry::new(temp.path(), HashSet::new());

        let name = registry.claim(&image(temp.path(), "IMG.jpg"), "2022", 240);
        assert_eq!(name, "2022_1.jpg");
    }

    #[test]
    fn claim_sanitizes_rendered_base() {
        let temp = tempdir().expect("tempdir");
        let mut registry = NameRegistry::new(temp.path(), HashSet::new());

        let name = registry.claim(&image(temp.path(), "IMG.png"), "2022/10/15", 240);
        assert_eq!(name, "2022_10_15.png");
    }
}
