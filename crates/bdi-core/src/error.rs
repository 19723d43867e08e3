//! Error types for graph construction, validation, and serialization

use crate::node::{NodeId, PortIndex};
use crate::types::BdiType;

/// Result type for graph operations
pub type Result<T> = std::result::Result<T, GraphError>;

/// Errors raised by graph mutation, validation, and (de)serialization
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// Referenced node does not exist
    #[error("node {0} not found")]
    NodeNotFound(NodeId),

    /// Output port index past the node's declared outputs
    #[error("node {node} output port {port} out of range ({count} ports declared)")]
    PortOutOfRange { node: NodeId, port: PortIndex, count: usize },

    /// Data input references a node that is not in the graph
    #[error("node {node} input {port} references missing node {target}")]
    DanglingDataInput {
        node: NodeId,
        port: PortIndex,
        target: NodeId,
    },

    /// Control edge endpoint does not exist
    #[error("control edge {from} -> {to} references a missing node")]
    DanglingControlEdge { from: NodeId, to: NodeId },

    /// Control edge present in only one direction
    #[error("asymmetric control edge {from} -> {to}")]
    AsymmetricControlEdge { from: NodeId, to: NodeId },

    /// Same control edge recorded more than once
    #[error("duplicate control edge {from} -> {to}")]
    DuplicateControlEdge { from: NodeId, to: NodeId },

    /// Source output type cannot feed the destination input
    #[error("node {node} input {port}: {src_ty} is not implicitly convertible to {dst_ty}")]
    EdgeTypeMismatch {
        node: NodeId,
        port: PortIndex,
        src_ty: BdiType,
        dst_ty: BdiType,
    },

    /// Payload byte length disagrees with its type tag
    #[error("node {node} payload: {len} bytes does not match {ty} (expected {expected})")]
    InvalidPayload {
        node: NodeId,
        ty: BdiType,
        len: usize,
        expected: usize,
    },

    /// Malformed on-disk bytes
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
}

/// Errors raised while decoding a serialized graph stream
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Stream ended before a field could be read
    #[error("unexpected end of stream at byte {0}")]
    UnexpectedEof(usize),

    /// Stream does not start with the BDI magic
    #[error("bad magic {found:#010x} (expected {expected:#010x})")]
    BadMagic { found: u32, expected: u32 },

    /// The deprecated v1 stream layout (magic 0xDEADBEEF)
    #[error("legacy v1 graph stream is not supported; re-serialize with the v2 writer")]
    LegacyFormat,

    /// Version field names a layout this reader does not know
    #[error("unsupported graph format version {0}")]
    UnsupportedVersion(u16),

    /// Type tag byte outside the closed type enum
    #[error("unknown type tag {0}")]
    UnknownTypeTag(u8),

    /// Opcode outside the closed operation enum
    #[error("unknown opcode {0}")]
    UnknownOpCode(u16),

    /// Name field is not valid UTF-8
    #[error("invalid utf-8 in name field")]
    InvalidName,

    /// JSON tooling surface error
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
