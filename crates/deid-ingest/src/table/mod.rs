//! CSV tables: typed reading and generalized writing.

mod reader;
mod writer;

pub use reader::{
    ColumnKind, MAX_CSV_FILE_SIZE, Table, check_file_size, check_file_size_with_limit, read_table,
};
pub use writer::{write_rows, write_table};
