//! Path normalization for registry keys and FROM targets.

/// Key under which the walk root is registered.
pub const ROOT_PATH: &str = ".";

/// Normalizes a POSIX-style relative path into a registry key.
///
/// `./` prefixes, repeated and trailing slashes, and `.` segments are dropped;
/// `..` pops one segment. Returns `None` for empty input, absolute paths, and
/// paths that climb above the walk root.
pub fn normalize_relative_path(raw: &str) -> Option<String> {
    if raw.is_empty() || raw.starts_with('/') {
        return None;
    }

    let mut segments: Vec<&str> = Vec::new();
    for segment in raw.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            other => segments.push(other),
        }
    }

    if segments.is_empty() {
        Some(ROOT_PATH.to_string())
    } else {
        Some(segments.join("/"))
    }
}

/// Normalizes an absolute path for prefix comparison (no trailing slash).
pub fn normalize_absolute_path(raw: &str) -> String {
    let mut normalized = raw.to_string();
    while normalized.len() > 1 && normalized.ends_with('/') {
        normalized.pop();
    }
    normalized
}

/// Strips an absolute walk root from `candidate`, yielding a relative path.
pub fn strip_root<'a>(candidate: &'a str, root: &str) -> Option<&'a str> {
    let mut rest = candidate.strip_prefix(root)?;
    if !rest.is_empty() && !root.ends_with('/') {
        rest = rest.strip_prefix('/')?;
    }
    let rest = rest.trim_start_matches('/');
    if rest.is_empty() {
        Some(ROOT_PATH)
    } else {
        Some(rest)
    }
}

/// Splits a normalized relative path into `(parent, name)`.
///
/// Top-level entries have `"."` as their parent; the root itself has none.
pub fn split_parent(path: &str) -> Option<(&str, &str)> {
    if path == ROOT_PATH {
        return None;
    }
    match path.rfind('/') {
        Some(split) => Some((&path[..split], &path[split + 1..])),
        None => Some((ROOT_PATH, path)),
    }
}

/// Joins a normalized relative directory and a child name.
pub fn join_relative(directory: &str, name: &str) -> String {
    if directory == ROOT_PATH {
        name.to_string()
    } else {
        format!("{directory}/{name}")
    }
}
