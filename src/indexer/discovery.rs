use std::path::Path;

use anyhow::{Result, bail};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::models::{SourceDocument, SourceKind};
use crate::utils::document_names;

/// Maximum number of source documents (security: prevent resource exhaustion)
pub const MAX_DOCUMENTS: usize = 10_000;

/// Directories that never contain pages: build output and notebook autosaves
const SKIPPED_DIRS: &[&str] = &["_build", ".ipynb_checkpoints"];

/// Find every indexable document under a source directory
///
/// Walks the tree without following symlinks, keeping files with a supported
/// extension (see [`SourceKind::from_extension`]). Hidden entries, `_build`
/// and `.ipynb_checkpoints` directories are not entered.
///
/// # Returns
///
/// Documents sorted by docname. When two files share a docname
/// (`intro.md` and `intro.rst`) the first in file-name order wins and the
/// other is skipped with a warning.
///
/// # Errors
///
/// Returns an error if:
/// - The source directory does not exist or is not a directory
/// - More than [`MAX_DOCUMENTS`] (10 000) documents are found (security: resource exhaustion)
///
/// Unreadable entries and symlinks are logged as warnings and skipped
/// (graceful degradation).
pub fn discover_documents(source_dir: &Path) -> Result<Vec<SourceDocument>> {
    if !source_dir.is_dir() {
        bail!("Source directory not found: {}", source_dir.display());
    }

    let mut documents: Vec<SourceDocument> = Vec::new();

    let walker = WalkDir::new(source_dir)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_excluded(entry));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        // Security: symlinks could point outside the source tree
        if entry.path_is_symlink() {
            warn!("Skipping symlink (not allowed): {}", entry.path().display());
            continue;
        }
        if !entry.file_type().is_file() {
            continue;
        }

        let Some(kind) =
            entry.path().extension().and_then(|e| e.to_str()).and_then(SourceKind::from_extension)
        else {
            continue;
        };

        let relative = match entry.path().strip_prefix(source_dir) {
            Ok(relative) => relative,
            Err(_) => continue,
        };
        let (docname, filename) = match document_names(relative) {
            Ok(names) => names,
            Err(e) => {
                warn!("Skipping {}: {}", entry.path().display(), e);
                continue;
            }
        };

        // Security: Enforce maximum documents limit
        if documents.len() >= MAX_DOCUMENTS {
            bail!(
                "Resource limit exceeded: Found more than {} documents under {}",
                MAX_DOCUMENTS,
                source_dir.display()
            );
        }

        debug!(docname = %docname, "discovered source document");
        documents.push(SourceDocument { docname, filename, path: entry.into_path(), kind });
    }

    // Stable sort keeps file-name order among equal docnames
    documents.sort_by(|a, b| a.docname.cmp(&b.docname));
    documents.dedup_by(|later, first| {
        let duplicate = later.docname == first.docname;
        if duplicate {
            warn!(
                "Skipping {}: docname {} already provided by {}",
                later.filename, first.docname, first.filename
            );
        }
        duplicate
    });

    Ok(documents)
}

fn is_excluded(entry: &DirEntry) -> bool {
    is_excluded_name(&entry.file_name().to_string_lossy(), entry.file_type().is_dir())
}

/// Hidden entries and build output directories are never indexed
pub(crate) fn is_excluded_name(name: &str, is_dir: bool) -> bool {
    name.starts_with('.') || (is_dir && SKIPPED_DIRS.contains(&name))
}
