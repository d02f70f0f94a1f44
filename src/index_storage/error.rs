use thiserror::Error;

/// Errors raised while decoding or encoding a `searchindex.js` payload
#[derive(Debug, Error)]
pub enum IndexFormatError {
    #[error("unexpected end of input")]
    UnexpectedEnd,

    #[error("unexpected character '{found}' at byte {offset} (expected {expected})")]
    UnexpectedChar { found: char, offset: usize, expected: &'static str },

    #[error("invalid escape sequence at byte {offset}")]
    InvalidEscape { offset: usize },

    #[error("invalid number '{text}' at byte {offset}")]
    InvalidNumber { text: String, offset: usize },

    #[error("unknown identifier '{ident}' at byte {offset}")]
    UnknownIdentifier { ident: String, offset: usize },

    #[error("nesting too deep at byte {offset}")]
    TooDeep { offset: usize },

    #[error("trailing characters at byte {offset}")]
    TrailingCharacters { offset: usize },

    #[error("payload is not wrapped in Search.setIndex(...)")]
    MissingWrapper,

    #[error("index payload has an unexpected shape: {0}")]
    Shape(#[from] serde_json::Error),
}
