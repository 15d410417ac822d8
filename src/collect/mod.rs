//! Context collectors
//!
//! Pure functions over the filesystem that render the markdown documents fed
//! to the prompts. None of them call the model.

pub mod file_category;
pub mod pr;
pub mod repo;

pub use file_category::{collect_file_listing, list_repository_files};
pub use pr::collect_pr_context;
pub use repo::{collect_category_context, collect_structure_context};
