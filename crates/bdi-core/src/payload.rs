//! Typed immediate payloads
//!
//! A payload is the `(type tag, bytes)` pair attached to a node for constant
//! data, sizes, and on-disk encoding. Bytes are always in wire order (see
//! [`crate::codec`]).

use crate::types::BdiType;

/// Immediate typed bytes attached to a node
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TypedPayload {
    pub ty: BdiType,
    pub bytes: Vec<u8>,
}

impl TypedPayload {
    pub fn new(ty: BdiType, bytes: Vec<u8>) -> Self {
        Self { ty, bytes }
    }

    /// The empty payload carried by nodes with no immediate data
    pub fn void() -> Self {
        Self {
            ty: BdiType::Void,
            bytes: Vec::new(),
        }
    }

    pub fn is_void(&self) -> bool {
        self.ty == BdiType::Void
    }

    /// A payload is valid when its byte length matches its type's size
    /// (zero for `Void`). `Unknown` payloads are never valid.
    pub fn is_valid(&self) -> bool {
        self.ty != BdiType::Unknown && self.bytes.len() == self.ty.size_bytes()
    }
}
