mod hex_lines;

pub use hex_lines::HexFileSource;

use thiserror::Error;

/// One raw uplink read from a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UplinkEvent {
    /// 1-based line (or record) number in the input.
    pub line: usize,
    pub port: u32,
    pub payload: Vec<u8>,
}

pub trait UplinkSource {
    fn next_uplink(&mut self) -> Result<Option<UplinkEvent>, SourceError>;
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid uplink on line {line}: {message}")]
    InvalidLine { line: usize, message: String },
}
