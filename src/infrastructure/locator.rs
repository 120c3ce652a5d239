use crate::domain::error::{StoreError, StoreResult};
use directories::BaseDirs;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

pub const STORE_FILE_NAME: &str = "Bookmarks.plist";

/// Where to look for the bookmark store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    /// A known path. Created with the default skeleton when absent.
    Fixed(PathBuf),
    /// Exactly one file named `file_name` somewhere under `root`.
    Search { root: PathBuf, file_name: String },
}

fn library_dir() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| dirs.home_dir().join("Library"))
}

/// `~/Library/Safari/Bookmarks.plist`
pub fn well_known_store_path() -> Option<PathBuf> {
    library_dir().map(|lib| lib.join("Safari").join(STORE_FILE_NAME))
}

pub fn default_search_root() -> Option<PathBuf> {
    library_dir()
}

/// Walks `root` iteratively. Unreadable directories are skipped and symlinks are not followed.
pub async fn find_candidates(root: &Path, file_name: &str) -> Vec<PathBuf> {
    let target = OsStr::new(file_name);
    let mut found = Vec::new();
    let mut stack = vec![root.to_path_buf()];

    while let Some(dir) = stack.pop() {
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) => {
                debug!(dir = %dir.display(), error = %e, "skipping unreadable directory");
                continue;
            }
        };

        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    debug!(dir = %dir.display(), error = %e, "stopped listing directory");
                    break;
                }
            };
            let Ok(file_type) = entry.file_type().await else {
                continue;
            };

            if file_type.is_dir() {
                stack.push(entry.path());
            } else if file_type.is_file() && entry.file_name().as_os_str() == target {
                found.push(entry.path());
            }
        }
    }

    found.sort();
    found
}

pub async fn find_unique(root: &Path, file_name: &str) -> StoreResult<PathBuf> {
    let mut candidates = find_candidates(root, file_name).await;
    match candidates.len() {
        0 => Err(StoreError::NotFound {
            root: root.to_path_buf(),
            file_name: file_name.to_string(),
        }),
        1 => Ok(candidates.remove(0)),
        _ => Err(StoreError::Ambiguous {
            root: root.to_path_buf(),
            candidates,
        }),
    }
}

pub async fn is_file(path: &Path) -> bool {
    fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn well_known_path_ends_in_safari_store() {
        if let Some(path) = well_known_store_path() {
            assert!(path.ends_with("Library/Safari/Bookmarks.plist"));
        }
    }

    #[tokio::test]
    async fn find_unique_returns_the_single_match() {
        let dir = tempdir().expect("tempdir");
        let nested = dir.path().join("Safari").join("deep");
        std::fs::create_dir_all(&nested).expect("mkdir");
        std::fs::write(nested.join(STORE_FILE_NAME), b"x").expect("write");
        std::fs::write(dir.path().join("Other.plist"), b"x").expect("write");

        let found = find_unique(dir.path(), STORE_FILE_NAME).await.expect("found");
        assert_eq!(found, nested.join(STORE_FILE_NAME));
    }

    #[tokio::test]
    async fn find_unique_reports_not_found() {
        let dir = tempdir().expect("tempdir");
        let err = find_unique(dir.path(), STORE_FILE_NAME).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));

        let missing_root = dir.path().join("nope");
        let err = find_unique(&missing_root, STORE_FILE_NAME).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn find_unique_refuses_to_guess_between_candidates() {
        let dir = tempdir().expect("tempdir");
        for sub in ["a", "b"] {
            let d = dir.path().join(sub);
            std::fs::create_dir_all(&d).expect("mkdir");
            std::fs::write(d.join(STORE_FILE_NAME), b"x").expect("write");
        }

        match find_unique(dir.path(), STORE_FILE_NAME).await.unwrap_err() {
            StoreError::Ambiguous { candidates, .. } => {
                assert_eq!(
                    candidates,
                    vec![
                        dir.path().join("a").join(STORE_FILE_NAME),
                        dir.path().join("b").join(STORE_FILE_NAME),
                    ]
                );
            }
            other => panic!("expected ambiguous, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn directories_with_the_store_name_are_not_candidates() {
        let dir = tempdir().expect("tempdir");
        std::fs::create_dir_all(dir.path().join(STORE_FILE_NAME)).expect("mkdir");

        assert!(find_candidates(dir.path(), STORE_FILE_NAME).await.is_empty());
        assert!(!is_file(&dir.path().join(STORE_FILE_NAME)).await);
    }
}
