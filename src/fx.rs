//! Effect clip resolution
//!
//! Effect commands name a clip loosely; the actual file is found by
//! case-insensitive substring match against the effects directory listing.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Resolve an effect name to a clip file in `dir`
///
/// An exact file-stem match wins; otherwise the first entry whose file name
/// contains `name` (case-insensitive) is used, so `applause` picks
/// `applause.mp3` even when `audience_applause.mp3` is listed first. Misses
/// are `Error::EffectNotFound`.
pub async fn resolve_effect(dir: &Path, name: &str) -> Result<PathBuf> {
    let needle = name.trim().to_lowercase();
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut substring_match = None;

    while let Some(entry) = entries.next_entry().await? {
        let file_name = entry.file_name().to_string_lossy().to_lowercase();
        let stem = file_name
            .rsplit_once('.')
            .map_or(file_name.as_str(), |(stem, _)| stem);

        if stem == needle {
            return Ok(entry.path());
        }
        if substring_match.is_none() && file_name.contains(&needle) {
            substring_match = Some(entry.path());
        }
    }

    substring_match.ok_or_else(|| Error::EffectNotFound(name.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fx_dir(files: &[&str]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for file in files {
            std::fs::write(dir.path().join(file), b"clip").unwrap();
        }
        dir
    }

    #[tokio::test]
    async fn test_resolves_by_substring() {
        let dir = fx_dir(&["audience_applause.mp3", "boo.mp3"]);

        let clip = resolve_effect(dir.path(), "applause").await.unwrap();
        assert_eq!(clip, dir.path().join("audience_applause.mp3"));
    }

    #[tokio::test]
    async fn test_exact_stem_wins_over_substring() {
        let dir = fx_dir(&["audience_applause.mp3", "applause.mp3"]);

        // Deterministic regardless of directory listing order
        let clip = resolve_effect(dir.path(), "applause").await.unwrap();
        assert_eq!(clip, dir.path().join("applause.mp3"));

        let clip = resolve_effect(dir.path(), "audience_applause").await.unwrap();
        assert_eq!(clip, dir.path().join("audience_applause.mp3"));
    }

    #[tokio::test]
    async fn test_resolution_is_case_insensitive() {
        let dir = fx_dir(&["Laughing.mp3"]);

        let clip = resolve_effect(dir.path(), "LAUGHING").await.unwrap();
        assert_eq!(clip, dir.path().join("Laughing.mp3"));
    }

    #[tokio::test]
    async fn test_miss_is_not_found() {
        let dir = fx_dir(&["applause.mp3"]);

        let result = resolve_effect(dir.path(), "unknown").await;
        assert!(matches!(result, Err(Error::EffectNotFound(name)) if name == "unknown"));
    }

    #[tokio::test]
    async fn test_missing_directory_is_io_error() {
        let result = resolve_effect(Path::new("/nonexistent/fx"), "boo").await;
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
