//! Platform-specific paths for pipeline files.
//!
//! User pipelines live in `wavetrace/pipelines/` under the platform config
//! directory: `~/.config` on Linux, `~/Library/Application Support` on macOS,
//! `%APPDATA%` on Windows.
//!
//! # Example
//!
//! ```rust,no_run
//! use wavetrace_config::paths;
//!
//! if let Some(path) = paths::find_pipeline("echo_envelope") {
//!     println!("Found pipeline at: {:?}", path);
//! }
//! ```

use std::path::{Path, PathBuf};

/// Application name used for directory paths.
const APP_NAME: &str = "wavetrace";

/// Subdirectory name for pipelines.
const PIPELINES_SUBDIR: &str = "pipelines";

/// Returns the user-specific pipelines directory.
///
/// Falls back to `./wavetrace/pipelines` if the config directory cannot be
/// determined.
pub fn user_pipelines_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
        .join(PIPELINES_SUBDIR)
}

/// Find a pipeline file by path or by name.
///
/// `name` may be a path to an existing file, or a pipeline name (with or
/// without `.toml`) in the user pipelines directory.
pub fn find_pipeline(name: &str) -> Option<PathBuf> {
    find_pipeline_in(name, &user_pipelines_dir())
}

fn find_pipeline_in(name: &str, dir: &Path) -> Option<PathBuf> {
    let path = PathBuf::from(name);
    if path.is_file() {
        return Some(path);
    }

    let filename = if name.ends_with(".toml") {
        name.to_string()
    } else {
        format!("{name}.toml")
    };
    let candidate = dir.join(filename);
    candidate.is_file().then_some(candidate)
}

/// List all pipeline files in the user pipelines directory, sorted.
///
/// Returns an empty vector if the directory doesn't exist or can't be read.
pub fn list_user_pipelines() -> Vec<PathBuf> {
    list_pipelines_in_dir(&user_pipelines_dir())
}

fn list_pipelines_in_dir(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut pipelines: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "toml"))
        .collect();
    pipelines.sort();
    pipelines
}

/// Pipeline name from a file path (the file stem).
pub fn pipeline_name_from_path(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_user_pipelines_dir() {
        let dir = user_pipelines_dir();
        assert!(dir.ends_with("wavetrace/pipelines"));
    }

    #[test]
    fn test_find_by_path_and_name() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("echo.toml");
        fs::write(&file, "name = \"echo\"").unwrap();

        let by_path = file.to_string_lossy().to_string();
        assert_eq!(find_pipeline_in(&by_path, Path::new("/nonexistent")), Some(file.clone()));
        assert_eq!(find_pipeline_in("echo", temp.path()), Some(file.clone()));
        assert_eq!(find_pipeline_in("echo.toml", temp.path()), Some(file));
        assert_eq!(find_pipeline_in("missing", temp.path()), None);
    }

    #[test]
    fn test_list_pipelines() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("b.toml"), "").unwrap();
        fs::write(temp.path().join("a.toml"), "").unwrap();
        fs::write(temp.path().join("notes.txt"), "").unwrap();
        fs::create_dir(temp.path().join("dir.toml")).unwrap();

        let listed = list_pipelines_in_dir(temp.path());
        assert_eq!(
            listed,
            vec![temp.path().join("a.toml"), temp.path().join("b.toml")]
        );
        assert!(list_pipelines_in_dir(&temp.path().join("absent")).is_empty());
    }

    #[test]
    fn test_pipeline_name_from_path() {
        assert_eq!(
            pipeline_name_from_path(Path::new("/x/echo_envelope.toml")),
            Some("echo_envelope".to_string())
        );
    }
}
