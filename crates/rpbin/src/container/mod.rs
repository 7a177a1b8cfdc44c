//! The bin file container: an ASCII header followed by one gzip stream of
//! concatenated payload records.

mod header;
mod reader;
mod writer;

pub use header::{
    Header, FORMAT_VERSION, HEADER_KEY, MAXVAL_KEY, TOTALRAIN_KEY, VERSION_KEY,
};
pub use reader::{decompress_body, RpBinReader};
pub use writer::RpBinWriter;
