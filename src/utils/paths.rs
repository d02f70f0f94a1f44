use std::borrow::Cow;
use std::env;
use std::fs::File;
use std::path::{Component, Path};

use anyhow::{Context, Result, bail};

// Maximum size for a source document: 50MB
const MAX_FILE_SIZE_BYTES: u64 = 50 * 1024 * 1024;

/// Derives the docname and filename of a source file from its path relative
/// to the source root
///
/// The docname is the relative path without its extension, the filename the
/// relative path with it; both use `/` separators on every platform.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use doc_search::utils::document_names;
///
/// let (docname, filename) = document_names(Path::new("content/03_basic_grasp.ipynb")).unwrap();
/// assert_eq!(docname, "content/03_basic_grasp");
/// assert_eq!(filename, "content/03_basic_grasp.ipynb");
/// ```
///
/// # Errors
///
/// Returns an error if the path is absolute, contains `..` or is not valid UTF-8.
pub fn document_names(relative: &Path) -> Result<(String, String)> {
    validate_relative_path(relative)?;

    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(
                part.to_str()
                    .with_context(|| format!("Path is not valid UTF-8: {}", relative.display()))?,
            ),
            Component::CurDir => {}
            _ => bail!("Unexpected path component in {}", relative.display()),
        }
    }
    if parts.is_empty() {
        bail!("Empty document path");
    }

    let filename = parts.join("/");
    let docname = match relative.extension().and_then(|e| e.to_str()) {
        Some(ext) => filename[..filename.len() - ext.len() - 1].to_string(),
        None => filename.clone(),
    };
    Ok((docname, filename))
}

/// Validates that a path is relative and doesn't contain path traversal sequences
///
/// # Errors
///
/// Returns an error if:
/// - The path contains '..' components (path traversal)
/// - The path is absolute
pub fn validate_relative_path(path: &Path) -> Result<()> {
    for component in path.components() {
        if component == Component::ParentDir {
            bail!("Path contains '..' component: {}", path.display());
        }
    }

    if path.is_absolute() || path.has_root() {
        bail!("Path must be relative: {}", path.display());
    }

    Ok(())
}

/// Validates that a file's size is within acceptable limits (50MB)
///
/// Takes an open file handle to avoid TOCTOU (time-of-check-time-of-use)
/// race conditions where the file could be modified between the size check
/// and subsequent file operations.
///
/// # Errors
///
/// Returns an error if:
/// - The file metadata cannot be read
/// - The file is larger than 50MB
pub fn validate_file_size(file: &File, path: &Path) -> Result<()> {
    let metadata = file
        .metadata()
        .with_context(|| format!("Failed to read file metadata: {}", path.display()))?;

    let file_size = metadata.len();
    if file_size > MAX_FILE_SIZE_BYTES {
        bail!(
            "File too large: {} ({} bytes, max {} bytes)",
            path.display(),
            file_size,
            MAX_FILE_SIZE_BYTES
        );
    }

    Ok(())
}

/// Formats a path with ~ substitution for the home directory
///
/// # Examples
///
/// ```no_run
/// use std::path::PathBuf;
/// use doc_search::format_path_with_tilde;
///
/// let path = PathBuf::from("/Users/alice/docs/searchindex.js");
/// // Returns "~/docs/searchindex.js" if HOME=/Users/alice
/// let formatted = format_path_with_tilde(&path);
/// ```
pub fn format_path_with_tilde(path: &Path) -> String {
    format_path_with_tilde_internal(path, None)
}

/// Internal helper for path formatting with optional home override (for testing)
pub(crate) fn format_path_with_tilde_internal(path: &Path, home_override: Option<&str>) -> String {
    let home_from_env = env::var("HOME").ok();
    let home = home_override.or(home_from_env.as_deref());

    let path_str = path.to_string_lossy();
    if let Some(home) = home
        && !home.is_empty()
        && path_str.starts_with(home)
    {
        return path_str.replacen(home, "~", 1);
    }

    // Avoid double allocation when converting Cow to String
    match path_str {
        Cow::Borrowed(s) => s.to_string(),
        Cow::Owned(s) => s,
    }
}
