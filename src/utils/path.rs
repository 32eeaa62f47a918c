use std::path::{Path, PathBuf};

/// Expand a leading `~` or `~/` to `$HOME`.
///
/// Other paths are returned unchanged. `None` when the path needs `$HOME`
/// and it is unset, or when the path is not valid UTF-8.
///
/// # Examples
///
/// ```
/// use cliagent::utils::path::expand_tilde;
/// use std::path::PathBuf;
///
/// assert_eq!(expand_tilde("/opt/bin/tool"), Some(PathBuf::from("/opt/bin/tool")));
/// ```
pub fn expand_tilde<P: AsRef<Path>>(path: P) -> Option<PathBuf> {
    let path = path.as_ref();
    let path_str = path.to_str()?;

    let rest = match path_str.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
        _ => return Some(path.to_path_buf()),
    };

    let home = std::env::var_os("HOME").filter(|home| !home.is_empty())?;
    Some(PathBuf::from(home).join(rest.trim_start_matches('/')))
}

/// Home directory from `$HOME`.
pub fn home_dir() -> Option<PathBuf> {
    expand_tilde("~")
}
