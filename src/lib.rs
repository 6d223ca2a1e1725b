//! # Huffman file compression
//!
//! Text documents are compressed with a static Huffman code built from the symbol
//! frequencies of the whole document.  The compressed file stores the frequency table
//! rather than the tree, the expander rebuilds the identical tree from it.
//!
//! * `huffman` is the entry point, it defines the container format
//! * symbols are unicode scalar values, the input must be UTF-8
//! * everything is buffered, there is no streaming mode
//!
//! Example:
//! ```
//! let compressed = huffcoder::huffman::compress_slice(b"abracadabra",&huffcoder::huffman::STD_OPTIONS).unwrap();
//! let expanded = huffcoder::huffman::expand_slice(&compressed).unwrap();
//! assert_eq!(expanded,b"abracadabra");
//! ```

mod tools;
pub mod huffman;

pub use tools::codebook::Codebook;
pub use tools::frequency::FrequencyTable;
pub use tools::tree::Node;

/// Codec Errors
#[derive(thiserror::Error,Debug)]
pub enum Error {
    #[error("nothing to compress")]
    EmptyInput,
    #[error("frequency table has no symbols")]
    EmptyAlphabet,
    #[error("metadata is not a frequency table: {0}")]
    MetadataParse(#[from] serde_json::Error),
    #[error("stream is too short to hold the padding header")]
    TruncatedStream,
    #[error("padding header {0} is out of range")]
    BadPadding(u8),
    #[error("bit stream ends in the middle of a code")]
    UndecodableStream,
    #[error("expected {expected} symbols, decoded {actual}")]
    LengthMismatch { expected: u64, actual: u64 },
    #[error("symbol {0:?} has no code")]
    UnknownSymbol(char),
    #[error("output {0} would overwrite the input")]
    OutputIsInput(std::path::PathBuf),
    #[error(transparent)]
    Io(#[from] std::io::Error)
}
