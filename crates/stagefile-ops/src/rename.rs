//! Rename target resolution and name validation.

use stagefile_core::path;

use crate::OpsError;

/// Longest name a single path segment may have, in bytes.
pub const MAX_NAME_LEN: usize = 255;

/// Validate a single path segment supplied by the user.
pub fn validate_filename(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("Name cannot be empty".into());
    }

    if name.len() > MAX_NAME_LEN {
        return Err(format!("Name is too long (max {MAX_NAME_LEN} bytes)"));
    }

    for c in [path::SEPARATOR, '\0'] {
        if name.contains(c) {
            return Err(format!("Name cannot contain {c:?}"));
        }
    }

    if name == "." || name == ".." {
        return Err("'.' and '..' are reserved names".into());
    }

    Ok(())
}

/// Trim and validate a name, turning failures into [`OpsError::InvalidName`].
pub fn checked_name(name: &str) -> Result<&str, OpsError> {
    let trimmed = name.trim();
    validate_filename(trimmed).map_err(|reason| OpsError::invalid_name(name, reason))?;
    Ok(trimmed)
}

/// Work out where a rename of `source` should land.
///
/// A plain name stays in the source's parent directory. Input containing a
/// separator is a destination path instead, resolved against `current_dir`
/// unless absolute, which turns the rename into a move.
pub fn rename_target(source: &str, new_name: &str, current_dir: &str) -> Result<String, OpsError> {
    let trimmed = new_name.trim();
    if trimmed.contains(path::SEPARATOR) {
        return Ok(path::normalize(&path::resolve(trimmed, current_dir)));
    }

    let name = checked_name(trimmed)?;
    Ok(path::join(path::parent(source), name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_filename_valid() {
        assert!(validate_filename("test.txt").is_ok());
        assert!(validate_filename("my-file").is_ok());
        assert!(validate_filename(".hidden").is_ok());
        assert!(validate_filename("file with spaces").is_ok());
    }

    #[test]
    fn test_validate_filename_invalid() {
        assert!(validate_filename("").is_err());
        assert!(validate_filename("test/file").is_err());
        assert!(validate_filename("nul\0byte").is_err());
        assert!(validate_filename(".").is_err());
        assert!(validate_filename("..").is_err());
        assert!(validate_filename(&"x".repeat(MAX_NAME_LEN + 1)).is_err());
    }

    #[test]
    fn test_checked_name_trims() {
        assert_eq!(checked_name("  saves  ").unwrap(), "saves");
        assert!(matches!(
            checked_name("   "),
            Err(OpsError::InvalidName { .. })
        ));
    }

    #[test]
    fn test_rename_target_plain_name_stays_in_parent() {
        let target = rename_target("/games/old.srm", "new.srm", "/elsewhere").unwrap();
        assert_eq!(target, "/games/new.srm");
    }

    #[test]
    fn test_rename_target_with_separator_is_a_path() {
        assert_eq!(
            rename_target("/a/x.txt", "sub/y.txt", "/a").unwrap(),
            "/a/sub/y.txt"
        );
        assert_eq!(
            rename_target("/a/x.txt", "/b/y.txt", "/a").unwrap(),
            "/b/y.txt"
        );
        assert_eq!(
            rename_target("/a/x.txt", "../y.txt", "/a/b").unwrap(),
            "/a/y.txt"
        );
    }

    #[test]
    fn test_rename_target_rejects_empty() {
        assert!(rename_target("/a/x.txt", "  ", "/a").is_err());
    }
}
