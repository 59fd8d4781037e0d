use thiserror::Error;

use crate::bencode::BencodeError;

/// Errors that can occur when loading or interpreting a torrent file.
///
/// Decoding is all-or-nothing: the first violation aborts the build and
/// no partial [`Metainfo`](super::Metainfo) is produced.
#[derive(Debug, Error)]
pub enum MetainfoError {
    /// The torrent file contains invalid bencode.
    #[error("bencode error: {0}")]
    Bencode(#[from] BencodeError),

    /// A required field is missing from the torrent file.
    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// A field has the wrong type or an out-of-domain value.
    #[error("invalid field: {0}")]
    InvalidField(&'static str),

    /// The `pieces` blob is not a whole number of SHA-1 digests.
    #[error("invalid piece data: {len} bytes is not a multiple of 20")]
    InvalidPieceData { len: usize },

    /// A file ends in a piece that has no hash in `pieces`.
    #[error("file {file} ends in piece {end_piece} but only {piece_count} piece hashes exist")]
    PieceCountMismatch {
        file: usize,
        end_piece: u64,
        piece_count: usize,
    },

    /// A file path is absolute, empty, or escapes the torrent root.
    #[error("invalid file path: {0:?}")]
    InvalidPath(String),

    /// The creation date is outside the representable range, both as
    /// seconds and as milliseconds.
    #[error("creation date {0} is out of range")]
    DateRange(i64),

    /// The source is larger than the configured limit.
    #[error("torrent source is {size} bytes, limit is {limit}")]
    TooLarge { size: u64, limit: u64 },

    /// Downloading a remote torrent file failed.
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// An I/O error occurred while reading or writing the torrent file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
