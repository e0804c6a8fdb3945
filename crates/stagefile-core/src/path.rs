//! Virtual path rules.
//!
//! Paths handled by stagefile are plain strings: absolute, slash-separated,
//! with no trailing slash except for the root itself. Everything in this
//! module is pure and total; nothing here touches a store.

/// The root of every virtual tree.
pub const ROOT: &str = "/";

/// Separator between path segments.
pub const SEPARATOR: char = '/';

/// Join a segment onto a base path.
///
/// Leading slashes on `segment` and trailing slashes on `base` are dropped so
/// exactly one separator ends up between them. An empty segment returns
/// `base` unchanged.
pub fn join(base: &str, segment: &str) -> String {
    if segment.is_empty() {
        return base.to_string();
    }

    let segment = segment.trim_start_matches(SEPARATOR);
    if base == ROOT {
        return format!("/{segment}");
    }

    format!("{}/{}", base.trim_end_matches(SEPARATOR), segment)
}

/// Final segment of a path, or an empty string when the path ends in `/`.
pub fn base_name(path: &str) -> &str {
    match path.rfind(SEPARATOR) {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

/// Resolve user input against the current directory.
///
/// Absolute input is returned unchanged; anything else is joined onto
/// `current_dir`.
pub fn resolve(input: &str, current_dir: &str) -> String {
    if is_absolute(input) {
        input.to_string()
    } else {
        join(current_dir, input)
    }
}

/// Whether the path starts at the root.
pub fn is_absolute(path: &str) -> bool {
    path.starts_with(SEPARATOR)
}

/// Collapse empty segments, `.` and `..` into a canonical absolute path.
///
/// `..` never climbs above the root.
pub fn normalize(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split(SEPARATOR) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    if segments.is_empty() {
        ROOT.to_string()
    } else {
        format!("/{}", segments.join("/"))
    }
}

/// Parent directory of a normalized path. The root is its own parent.
pub fn parent(path: &str) -> &str {
    match path.rfind(SEPARATOR) {
        Some(0) | None => ROOT,
        Some(idx) => &path[..idx],
    }
}

/// Check whether `path` is `ancestor` itself or lives somewhere below it.
pub fn is_within(path: &str, ancestor: &str) -> bool {
    if ancestor == ROOT {
        return is_absolute(path);
    }
    match path.strip_prefix(ancestor) {
        Some(rest) => rest.is_empty() || rest.starts_with(SEPARATOR),
        None => false,
    }
}

/// Check whether the path is the root.
pub fn is_root(path: &str) -> bool {
    path == ROOT
}
