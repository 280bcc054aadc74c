//! Export module for the expense tracker
//!
//! CSV is the only export format: spreadsheet-compatible and shareable as a
//! plain `text/csv` file.

pub mod csv;

pub use csv::{encode, export_file_name, write_export, CSV_MIME_TYPE};
