pub mod paths;
pub mod terminal;

pub use paths::{document_names, format_path_with_tilde, validate_file_size, validate_relative_path};
pub use terminal::sanitize_line;
