//! Path normalization and shell quoting.

use std::path::{Component, Path, PathBuf};

use expyre_protocols::SchedulerError;

/// Normalize a user supplied path into the key used for scheduled jobs.
///
/// Expands a leading `~`, makes the path absolute against the working
/// directory, folds `.` and `..` lexically and resolves symlinks in the parent
/// directory. The final component is kept as given so the key stays stable
/// after the path itself has been deleted.
pub fn normalize(path: &Path) -> Result<PathBuf, SchedulerError> {
    let expanded = expand_tilde(path);
    let absolute = if expanded.is_absolute() {
        expanded
    } else {
        std::env::current_dir()?.join(expanded)
    };
    Ok(resolve_parent(lexical_clean(&absolute)))
}

/// Normalize a directory used as a listing scope.
///
/// Unlike [`normalize`] the final component is resolved too, so a scope given
/// through a symlink matches the keys of the jobs below it. A directory that
/// does not exist falls back to [`normalize`].
pub fn resolve_dir(path: &Path) -> Result<PathBuf, SchedulerError> {
    let normalized = normalize(path)?;
    Ok(normalized.canonicalize().unwrap_or(normalized))
}

fn expand_tilde(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(text) if text.starts_with('~') => PathBuf::from(shellexpand::tilde(text).as_ref()),
        _ => path.to_path_buf(),
    }
}

fn lexical_clean(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // `..` at the root stays at the root
                cleaned.pop();
            }
            other => cleaned.push(other.as_os_str()),
        }
    }
    cleaned
}

fn resolve_parent(path: PathBuf) -> PathBuf {
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => match parent.canonicalize() {
            Ok(parent) => parent.join(name),
            Err(_) => path,
        },
        _ => path,
    }
}

/// Whether `path` is `prefix` or lies below it.
pub fn is_within(path: &Path, prefix: &Path) -> bool {
    path.starts_with(prefix)
}

/// Quote a string for POSIX `sh` using single quotes.
pub fn shell_quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', r"'\''"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_normalize_absolute_path() {
        let normalized = normalize(Path::new("/")).unwrap();
        assert_eq!(normalized, PathBuf::from("/"));
    }

    #[test]
    fn test_normalize_folds_dots() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().canonicalize().unwrap();
        let messy = base.join("a").join("..").join(".").join("file.txt");

        assert_eq!(normalize(&messy).unwrap(), base.join("file.txt"));
    }

    #[test]
    fn test_normalize_parent_beyond_root() {
        assert_eq!(normalize(Path::new("/../../a")).unwrap(), PathBuf::from("/a"));
    }

    #[test]
    fn test_normalize_relative_path() {
        let cwd = std::env::current_dir().unwrap().canonicalize().unwrap();
        assert_eq!(normalize(Path::new("some-file")).unwrap(), cwd.join("some-file"));
    }

    #[test]
    fn test_normalize_expands_tilde() {
        let normalized = normalize(Path::new("~/expyre-test-file")).unwrap();
        assert!(normalized.is_absolute());
        assert!(!normalized.to_string_lossy().contains('~'));
        assert!(normalized.ends_with("expyre-test-file"));
    }

    #[cfg(unix)]
    #[test]
    fn test_normalize_resolves_symlinked_parent() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().canonicalize().unwrap();
        let real = base.join("real");
        std::fs::create_dir(&real).unwrap();
        std::os::unix::fs::symlink(&real, base.join("link")).unwrap();

        let normalized = normalize(&base.join("link").join("data.bin")).unwrap();
        assert_eq!(normalized, real.join("data.bin"));
    }

    #[test]
    fn test_normalize_keeps_missing_parent() {
        let normalized = normalize(Path::new("/nonexistent-expyre-dir/x")).unwrap();
        assert_eq!(normalized, PathBuf::from("/nonexistent-expyre-dir/x"));
    }

    #[test]
    fn test_resolve_dir_follows_symlinked_scope() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().canonicalize().unwrap();
        let real = base.join("real");
        std::fs::create_dir(&real).unwrap();
        std::os::unix::fs::symlink(&real, base.join("link")).unwrap();

        assert_eq!(resolve_dir(&base.join("link")).unwrap(), real);
        assert_eq!(resolve_dir(&base.join("link").join(".")).unwrap(), real);
    }

    #[test]
    fn test_resolve_dir_missing_directory() {
        let resolved = resolve_dir(Path::new("/nonexistent-expyre-dir/sub/..")).unwrap();
        assert_eq!(resolved, PathBuf::from("/nonexistent-expyre-dir"));
    }

    #[test]
    fn test_is_within_is_component_aware() {
        assert!(is_within(Path::new("/data/logs/a.log"), Path::new("/data/logs")));
        assert!(is_within(Path::new("/data/logs"), Path::new("/data/logs")));
        assert!(!is_within(Path::new("/data/logs-old/a.log"), Path::new("/data/logs")));
    }

    #[test]
    fn test_shell_quote() {
        assert_eq!(shell_quote("/tmp/foo"), "'/tmp/foo'");
        assert_eq!(shell_quote("/tmp/a b"), "'/tmp/a b'");
        assert_eq!(shell_quote("/tmp/it's"), r"'/tmp/it'\''s'");
    }
}
