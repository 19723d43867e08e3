//! Graph node structures: port references, port descriptors, and nodes

use crate::op::OpCode;
use crate::payload::TypedPayload;
use crate::types::BdiType;

/// Node identifier, unique within a graph. `0` is the reserved halt/unbound
/// sentinel and is never allocated.
pub type NodeId = u64;

/// Index of an input or output slot on a node
pub type PortIndex = u32;

/// Handle into the metadata side table; `0` means no metadata
pub type MetadataHandle = u64;

/// Logical memory/compute region identifier, opaque to the core
pub type RegionId = u64;

/// Reference to a specific output port of another node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct PortRef {
    pub node: NodeId,
    pub port: PortIndex,
}

impl PortRef {
    /// An input slot with no producer bound yet
    pub const UNBOUND: PortRef = PortRef { node: 0, port: 0 };

    pub const fn new(node: NodeId, port: PortIndex) -> Self {
        Self { node, port }
    }

    pub const fn is_unbound(&self) -> bool {
        self.node == 0
    }
}

/// Describes one output port of a node
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PortInfo {
    pub ty: BdiType,
    /// Optional symbolic name for debugging/introspection
    pub name: String,
}

impl PortInfo {
    pub fn new(ty: BdiType) -> Self {
        Self { ty, name: String::new() }
    }

    pub fn named(ty: BdiType, name: impl Into<String>) -> Self {
        Self { ty, name: name.into() }
    }
}

/// A node in the BDI computation graph
///
/// Data inputs are ordered: the index is the operand slot for the operation.
/// Control output order is semantic (slot 0 = "true"/"target", slot 1 =
/// "false"/"return", op-specific); control input order is not.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub op: OpCode,
    pub data_inputs: Vec<PortRef>,
    pub data_outputs: Vec<PortInfo>,
    pub control_inputs: Vec<NodeId>,
    pub control_outputs: Vec<NodeId>,
    /// Immediate data for constant-like operations
    pub payload: TypedPayload,
    pub metadata: MetadataHandle,
    pub region: RegionId,
}

impl Node {
    pub fn new(id: NodeId, op: OpCode) -> Self {
        Self {
            id,
            op,
            data_inputs: Vec::new(),
            data_outputs: Vec::new(),
            control_inputs: Vec::new(),
            control_outputs: Vec::new(),
            payload: TypedPayload::void(),
            metadata: 0,
            region: 0,
        }
    }

    /// Declared type of an output port (`Unknown` when out of range)
    pub fn output_type(&self, port: PortIndex) -> BdiType {
        self.data_outputs
            .get(port as usize)
            .map(|p| p.ty)
            .unwrap_or(BdiType::Unknown)
    }

    /// Expected type of an input slot
    ///
    /// Input slots are polymorphic at the graph level; per-operation typing
    /// is enforced by the interpreter when operands are resolved.
    pub fn expected_input_type(&self, _input: PortIndex) -> BdiType {
        BdiType::Unknown
    }
}
