//! CSV reading, tokenizing, and writing.

mod header;
mod parser;
mod reader;
mod writer;

pub use header::HeaderIndex;
pub use parser::{RawRow, parse_csv_line};
pub use reader::{
    CsvSource, MAX_CSV_FILE_SIZE, check_file_size, check_file_size_with_limit, read_csv_text,
    validate_encoding,
};
pub use writer::{export_file_name, write_report_csv, write_report_csv_to};
