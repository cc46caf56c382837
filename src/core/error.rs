//! Error types for the voxmat engine

use std::io;

use thiserror::Error;

/// Main error type for the engine
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    #[error("Scene error: {0}")]
    SceneLoad(#[from] SceneLoadError),

    #[error("Material list error: {0}")]
    Material(#[from] MaterialError),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid scene size {x}x{y}x{z}: each axis must fit in a signed 32-bit integer and the volume in memory")]
    InvalidSize { x: u32, y: u32, z: u32 },

    #[error("No model at index {0}")]
    NoSuchModel(usize),
}

/// Failure while decoding an XRAW model
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("not an XRAW stream (magic {found:?})")]
    UnsupportedFormat { found: Vec<u8> },

    #[error("only unsigned integer channels are supported (encoding {0})")]
    UnsupportedChannelEncoding(u8),

    #[error("only RGBA layout is supported ({0} channels)")]
    UnsupportedChannelLayout(u8),

    #[error("a channel must be 8 bits wide (got {0})")]
    UnsupportedBitDepth(u8),

    #[error("palette indices must be 8 or 16 bits wide (got {0})")]
    UnsupportedIndexWidth(u8),

    #[error("invalid model dimensions {x}x{y}x{z}")]
    InvalidDimensions { x: i32, y: i32, z: i32 },

    #[error("palette index {index} out of range for {palette_len} colors")]
    PaletteIndexOutOfRange { index: u32, palette_len: u32 },

    #[error("stream ended early")]
    Truncated,

    #[error(transparent)]
    Io(io::Error),
}

impl From<io::Error> for ImportError {
    fn from(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            Self::Truncated
        } else {
            Self::Io(e)
        }
    }
}

/// Failure while decoding a `.voxmat` scene or an `.ama` volume
#[derive(Debug, Error)]
pub enum SceneLoadError {
    #[error("unrecognized format: expected {expected:?} tag, found {found:?}")]
    UnrecognizedFormat { expected: &'static str, found: Vec<u8> },

    #[error("invalid {what} dimensions {x}x{y}x{z}")]
    InvalidDimensions { what: &'static str, x: i32, y: i32, z: i32 },

    #[error("invalid model count {0}")]
    InvalidModelCount(i32),

    #[error("invalid model name: {0}")]
    InvalidName(String),

    #[error("stream ended early")]
    Truncated,

    #[error(transparent)]
    Io(io::Error),
}

impl From<io::Error> for SceneLoadError {
    fn from(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            Self::Truncated
        } else {
            Self::Io(e)
        }
    }
}

/// Malformed line in a material list
#[derive(Debug, Error)]
pub enum MaterialError {
    #[error("line {line}: expected `<id>=<name>`, got {text:?}")]
    MalformedLine { line: usize, text: String },

    #[error("line {line}: material id {value:?} is not a positive 16-bit integer")]
    InvalidId { line: usize, value: String },

    #[error("material id {0} is not in the catalog")]
    UnknownId(u16),

    #[error(transparent)]
    Io(#[from] io::Error),
}
