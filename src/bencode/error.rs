use thiserror::Error;

/// Errors produced while decoding or encoding bencode.
///
/// Positions are byte offsets into the input being decoded.
#[derive(Debug, Error)]
pub enum BencodeError {
    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("invalid integer: {0}")]
    InvalidInteger(String),

    #[error("invalid string length at byte {0}")]
    InvalidStringLength(usize),

    #[error("unexpected character {found:?} at byte {pos}")]
    UnexpectedChar { pos: usize, found: char },

    #[error("dictionary key at byte {0} is not a byte string")]
    NonStringKey(usize),

    #[error("expected a dictionary at the top level")]
    NotADictionary,

    #[error("trailing data after value at byte {0}")]
    TrailingData(usize),

    #[error("nesting too deep")]
    NestingTooDeep,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
