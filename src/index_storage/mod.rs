//! Persistent index storage
//!
//! Two kinds of files are managed here:
//! - `searchindex.js`: the frozen index, `Search.setIndex({...})` in the
//!   JavaScript-literal dialect implemented by [`jsdump`]
//! - `build-metadata.json`: per-document mtime and size from the last build,
//!   kept in a cache directory and used to decide what an incremental build
//!   must re-parse
//!
//! Default cache location: platform-specific cache directories
//! - macOS: `~/Library/Caches/doc-search/`
//! - Linux: `~/.cache/doc-search/`
//! - Windows: `%LOCALAPPDATA%\doc-search\`

pub mod error;
pub mod jsdump;
pub mod metadata;
pub mod persistence;

pub use error::IndexFormatError;
pub use metadata::{BuildMetadata, SourceFileMetadata};
pub use persistence::{
    decode_index, encode_index, get_cache_dir, load_index, load_metadata, save_index,
    save_metadata,
};
