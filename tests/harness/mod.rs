mod chunked_input;
mod suite;

pub use self::chunked_input::{chunk_size, ChunkedInput};
pub use self::suite::get_tests;
