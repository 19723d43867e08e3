//! Error types for VM execution

use bdi_core::{BdiType, GraphError, NodeId, OpCode, PortIndex};

/// Result type for VM operations
pub type Result<T> = std::result::Result<T, VmError>;

/// Errors that can abort an execution run
///
/// No error is locally recovered: the interpreter halts on the first failure
/// and reports it to the caller. Control never continues after an error.
#[derive(Debug, thiserror::Error)]
pub enum VmError {
    /// Structural problem surfaced by the graph layer
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// Control transferred to a node id that is not in the graph
    #[error("control reached node {0}, which is not in the graph")]
    InvalidNode(NodeId),

    /// Operand slot is unbound or its producer has not run
    #[error("node {node}: no value available for input {input}")]
    MissingOperand { node: NodeId, input: PortIndex },

    /// Operand cannot be implicitly converted to what the operation needs
    #[error("node {node}: input {input} has type {actual}, expected {expected}")]
    OperandType {
        node: NodeId,
        input: PortIndex,
        expected: BdiType,
        actual: BdiType,
    },

    /// Operand types do not promote to a common numeric type
    #[error("no numeric promotion for {lhs} and {rhs}")]
    InvalidPromotion { lhs: BdiType, rhs: BdiType },

    /// Operation is defined, but not for these operand types
    #[error("{op} is not defined for {ty}")]
    UnsupportedForType { op: OpCode, ty: BdiType },

    /// Node produced a value its declared output port cannot carry
    #[error("node {node}: result type {actual} incompatible with declared output {declared}")]
    OutputTypeMismatch {
        node: NodeId,
        declared: BdiType,
        actual: BdiType,
    },

    /// Node needs a declared output port it does not have
    #[error("node {node} has no declared output port {port}")]
    MissingOutput { node: NodeId, port: PortIndex },

    #[error("division by zero")]
    DivisionByZero,

    #[error("modulo by zero")]
    ModuloByZero,

    /// Memory access outside the arena
    #[error("memory access out of bounds: address {addr:#x} + len {len} > arena size {capacity}")]
    MemoryOutOfBounds { addr: u64, len: usize, capacity: usize },

    /// Bump allocator exhausted
    #[error("out of memory: requested {requested} bytes, {available} available")]
    OutOfMemory { requested: usize, available: usize },

    /// Opcode reserved in the taxonomy but not implemented by this core
    #[error("unsupported operation: {0}")]
    Unsupported(OpCode),

    /// ASSERT input was false
    #[error("assertion failed at node {node}: {message}")]
    AssertionFailed { node: NodeId, message: String },

    /// VERIFY_PROOF node carries no usable proof tag
    #[error("node {0} has no proof metadata to verify")]
    ProofMissing(NodeId),

    /// SWITCH selector does not name a control successor
    #[error("node {node}: switch selector {index} out of range ({targets} targets)")]
    SwitchOutOfRange { node: NodeId, index: u64, targets: usize },

    /// Execution step limit reached
    #[error("execution step limit of {0} steps exceeded")]
    StepLimitExceeded(usize),
}
