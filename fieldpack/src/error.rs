//! Error types for node text handling and field packing.

use thiserror::Error;

/// Errors produced while parsing node text or loading values out of a node.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NodeError {
    /// A `}` appeared with no open node to close.
    #[error("unexpected '}}' on line {line}")]
    UnexpectedClose { line: usize },
    /// The text ended while a node was still open.
    #[error("node '{name}' is not closed")]
    Unclosed { name: String },
    /// The document holds no top-level node.
    #[error("document contains no nodes")]
    MissingNode,
    /// A required value is absent.
    #[error("missing value '{key}'")]
    MissingValue { key: String },
    /// A value is present but could not be parsed into the requested type.
    #[error("invalid value for '{key}' ({value:?}): {message}")]
    InvalidValue {
        key: String,
        value: String,
        message: String,
    },
}

/// Errors that can occur while packing or unpacking fields.
#[derive(Error, Debug)]
pub enum PackError {
    /// Node text could not be parsed, or a loadable type rejected its node.
    #[error("node error: {0}")]
    Node(#[from] NodeError),
    /// The generic binary encoder or decoder failed.
    #[error("binary format error: {0}")]
    Binary(#[from] bincode::Error),
    /// A node payload was not valid UTF-8.
    #[error("node payload is not UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    /// An offset table entry points outside the buffer or runs backwards.
    #[error("invalid byte range {start}..{end} in buffer of {len} bytes")]
    InvalidRange {
        start: usize,
        end: usize,
        len: usize,
    },
    /// An offset table entry references a field the type does not have.
    #[error("field index {index} out of range ({count} fields)")]
    UnknownField { index: usize, count: usize },
}
