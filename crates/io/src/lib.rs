//! `recmatch-io`: reading and writing sources and processed indexes.

pub mod delimited;
pub mod error;
pub mod index_file;

pub use delimited::{
    decode_text, delimiter_for, export_path, export_source, get_format, import_reader,
    import_source, import_str, read_file_as_utf8,
};
pub use error::IoError;
pub use index_file::{load_index, read_index, save_index, write_index, INDEX_FORMAT_VERSION};
