//! Helpers for slash-separated node paths.

pub const ROOT: &str = "/";

/// Parent of `path`. The parent of `/` and of any top-level node is `/`.
pub fn parent(path: &str) -> &str {
    match path.trim_end_matches('/').rfind('/') {
        Some(0) | None => ROOT,
        Some(idx) => &path[..idx],
    }
}

/// Join a child name onto an absolute path.
pub fn join(base: &str, child: &str) -> String {
    if base.ends_with('/') {
        format!("{}{}", base, child)
    } else {
        format!("{}/{}", base, child)
    }
}

/// Join a child name onto a path relative to some walk root.
pub fn join_relative(base: &str, child: &str) -> String {
    if base.is_empty() {
        child.to_string()
    } else {
        format!("{}/{}", base, child)
    }
}

/// Last segment of `path`, empty for the root.
pub fn name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or_default()
}

/// Whether `path` is absolute, free of empty segments, and has no
/// trailing slash (other than the root itself).
pub fn is_valid(path: &str) -> bool {
    if path == ROOT {
        return true;
    }
    path.starts_with('/') && path[1..].split('/').all(|segment| !segment.is_empty())
}
