//! Path validation
//!
//! Maps client-supplied paths onto the server root. A single leading `/` is
//! stripped so clients cannot trivially name absolute host paths; relative
//! paths pass through unchanged. This is a policy, not a sandbox: `..`
//! components are not rejected.

use std::path::{Path, PathBuf};

const SEPARATOR: char = '/';

/// Applies the leading-separator rule to a client path argument.
///
/// `"sub"` stays `"sub"`, `"/sub"` becomes `"sub"`, and a bare `"/"` means
/// "no path", i.e. the default location.
pub fn strip_leading_separator(arg: &str) -> Option<&str> {
    match arg.strip_prefix(SEPARATOR) {
        None => Some(arg),
        Some("") => None,
        Some(rest) => Some(rest),
    }
}

/// Resolves an optional client path argument against `server_root`.
///
/// Returns `None` when the argument reduces to the default location.
pub fn resolve_client_path(server_root: &Path, arg: Option<&str>) -> Option<PathBuf> {
    arg.and_then(strip_leading_separator)
        .map(|relative| server_root.join(relative))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_leading_separator() {
        assert_eq!(strip_leading_separator("sub"), Some("sub"));
        assert_eq!(strip_leading_separator("sub/file.txt"), Some("sub/file.txt"));
        assert_eq!(strip_leading_separator("/sub"), Some("sub"));
        assert_eq!(strip_leading_separator("/"), None);
    }

    #[test]
    fn test_only_one_separator_is_stripped() {
        assert_eq!(strip_leading_separator("//etc"), Some("/etc"));
    }

    #[test]
    fn test_resolve_client_path() {
        let root = Path::new("/srv/ftp");
        assert_eq!(
            resolve_client_path(root, Some("/a.txt")),
            Some(PathBuf::from("/srv/ftp/a.txt"))
        );
        assert_eq!(
            resolve_client_path(root, Some("a.txt")),
            Some(PathBuf::from("/srv/ftp/a.txt"))
        );
        assert_eq!(resolve_client_path(root, Some("/")), None);
        assert_eq!(resolve_client_path(root, None), None);
    }
}
