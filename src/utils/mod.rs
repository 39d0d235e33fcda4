//! Utility modules.

pub mod file;
pub mod text;

pub use file::{calculate_checksum, is_pdf_file};
pub use text::{clean_model_output, extract_last_paragraph, has_content, strip_tags};
