//! File-system collaborators: CSV discovery and table read/write.

pub mod discover;
pub mod table;

pub use discover::find_csv_files;
pub use table::{read_table, write_table, Table};
