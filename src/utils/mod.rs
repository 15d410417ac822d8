//! Shared helpers

pub mod encoding;
pub mod paths;

pub use encoding::{is_binary_file, read_file_safe};
pub use paths::{normalize_path, relative_display};
