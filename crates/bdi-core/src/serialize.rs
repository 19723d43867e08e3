//! Graph serialization
//!
//! Two formats are provided:
//! - **Binary**: the canonical little-endian stream (magic `0xBADBEEF1`,
//!   version 2), written field by field through the scalar codec.
//! - **JSON**: a human-readable serde rendering for tooling and debugging.
//!
//! # Binary Layout
//!
//! ```text
//! [magic: u32 = 0xBADBEEF1]
//! [version: u16 = 2]
//! [name_len: u32][name: utf-8 bytes]
//! [node_count: u64]
//! per node:
//!   [id: u64][op: u16][metadata: u64][region: u64]
//!   [payload_ty: u8][payload_len: u64][payload bytes]
//!   [data_input_count: u32]   then (node: u64, port: u32) pairs
//!   [data_output_count: u32]  then per port (ty: u8, name_len: u32, name bytes)
//!   [control_input_count: u32]  then u64 ids
//!   [control_output_count: u32] then u64 ids
//! ```
//!
//! Readers reject unknown magic or version. The deprecated v1 stream (magic
//! `0xDEADBEEF`, payload-last field order, host byte order) is detected and
//! refused with a dedicated diagnostic.

use crate::codec;
use crate::error::{CodecError, Result};
use crate::graph::Graph;
use crate::node::{Node, PortInfo, PortRef};
use crate::op::OpCode;
use crate::types::BdiType;

/// Current stream magic
pub const GRAPH_MAGIC: u32 = 0xBADBEEF1;
/// Current stream version
pub const GRAPH_VERSION: u16 = 2;
/// Deprecated v1 magic, recognized only to produce a precise error
pub const LEGACY_GRAPH_MAGIC: u32 = 0xDEADBEEF;

impl Graph {
    /// Serialize to the canonical binary stream
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        codec::encode_u32(&mut buf, GRAPH_MAGIC);
        codec::encode_u16(&mut buf, GRAPH_VERSION);

        let name = self.name().as_bytes();
        codec::encode_u32(&mut buf, name.len() as u32);
        buf.extend_from_slice(name);

        codec::encode_u64(&mut buf, self.len() as u64);
        for (_, node) in self.iter() {
            encode_node(&mut buf, node);
        }
        buf
    }

    /// Deserialize from the canonical binary stream
    pub fn from_bytes(bytes: &[u8]) -> Result<Graph> {
        let mut off = 0;
        let magic = codec::decode_u32(bytes, &mut off).ok_or(CodecError::UnexpectedEof(off))?;
        if magic != GRAPH_MAGIC {
            if magic == LEGACY_GRAPH_MAGIC {
                return Err(CodecError::LegacyFormat.into());
            }
            return Err(CodecError::BadMagic {
                found: magic,
                expected: GRAPH_MAGIC,
            }
            .into());
        }
        let version = codec::decode_u16(bytes, &mut off).ok_or(CodecError::UnexpectedEof(off))?;
        if version != GRAPH_VERSION {
            return Err(CodecError::UnsupportedVersion(version).into());
        }

        let name = decode_string(bytes, &mut off)?;
        let mut graph = Graph::new(name);

        let node_count = codec::decode_u64(bytes, &mut off).ok_or(CodecError::UnexpectedEof(off))?;
        for _ in 0..node_count {
            let node = decode_node(bytes, &mut off)?;
            graph.restore_node(node);
        }
        Ok(graph)
    }

    /// Pretty-printed JSON rendering for tooling
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| CodecError::Json(e).into())
    }

    /// Parse the JSON rendering back into a graph
    pub fn from_json(json: &str) -> Result<Graph> {
        serde_json::from_str(json).map_err(|e| CodecError::from(e).into())
    }
}

fn encode_node(buf: &mut Vec<u8>, node: &Node) {
    codec::encode_u64(buf, node.id);
    codec::encode_u16(buf, node.op as u16);
    codec::encode_u64(buf, node.metadata);
    codec::encode_u64(buf, node.region);

    codec::encode_u8(buf, node.payload.ty as u8);
    codec::encode_u64(buf, node.payload.bytes.len() as u64);
    buf.extend_from_slice(&node.payload.bytes);

    codec::encode_u32(buf, node.data_inputs.len() as u32);
    for input in &node.data_inputs {
        codec::encode_u64(buf, input.node);
        codec::encode_u32(buf, input.port);
    }

    codec::encode_u32(buf, node.data_outputs.len() as u32);
    for output in &node.data_outputs {
        codec::encode_u8(buf, output.ty as u8);
        let name = output.name.as_bytes();
        codec::encode_u32(buf, name.len() as u32);
        buf.extend_from_slice(name);
    }

    codec::encode_u32(buf, node.control_inputs.len() as u32);
    for &id in &node.control_inputs {
        codec::encode_u64(buf, id);
    }
    codec::encode_u32(buf, node.control_outputs.len() as u32);
    for &id in &node.control_outputs {
        codec::encode_u64(buf, id);
    }
}

fn decode_node(bytes: &[u8], off: &mut usize) -> Result<Node> {
    let id = codec::decode_u64(bytes, off).ok_or(CodecError::UnexpectedEof(*off))?;
    let op_raw = codec::decode_u16(bytes, off).ok_or(CodecError::UnexpectedEof(*off))?;
    let op = OpCode::from_u16(op_raw).ok_or(CodecError::UnknownOpCode(op_raw))?;
    let mut node = Node::new(id, op);

    node.metadata = codec::decode_u64(bytes, off).ok_or(CodecError::UnexpectedEof(*off))?;
    node.region = codec::decode_u64(bytes, off).ok_or(CodecError::UnexpectedEof(*off))?;

    let payload_ty_raw = codec::decode_u8(bytes, off).ok_or(CodecError::UnexpectedEof(*off))?;
    node.payload.ty = BdiType::from_u8(payload_ty_raw).ok_or(CodecError::UnknownTypeTag(payload_ty_raw))?;
    let payload_len = codec::decode_u64(bytes, off).ok_or(CodecError::UnexpectedEof(*off))? as usize;
    node.payload.bytes = take_bytes(bytes, off, payload_len)?.to_vec();

    let input_count = codec::decode_u32(bytes, off).ok_or(CodecError::UnexpectedEof(*off))?;
    for _ in 0..input_count {
        let src = codec::decode_u64(bytes, off).ok_or(CodecError::UnexpectedEof(*off))?;
        let port = codec::decode_u32(bytes, off).ok_or(CodecError::UnexpectedEof(*off))?;
        node.data_inputs.push(PortRef::new(src, port));
    }

    let output_count = codec::decode_u32(bytes, off).ok_or(CodecError::UnexpectedEof(*off))?;
    for _ in 0..output_count {
        let ty_raw = codec::decode_u8(bytes, off).ok_or(CodecError::UnexpectedEof(*off))?;
        let ty = BdiType::from_u8(ty_raw).ok_or(CodecError::UnknownTypeTag(ty_raw))?;
        let name = decode_string(bytes, off)?;
        node.data_outputs.push(PortInfo::named(ty, name));
    }

    let ctl_in_count = codec::decode_u32(bytes, off).ok_or(CodecError::UnexpectedEof(*off))?;
    for _ in 0..ctl_in_count {
        node.control_inputs
            .push(codec::decode_u64(bytes, off).ok_or(CodecError::UnexpectedEof(*off))?);
    }
    let ctl_out_count = codec::decode_u32(bytes, off).ok_or(CodecError::UnexpectedEof(*off))?;
    for _ in 0..ctl_out_count {
        node.control_outputs
            .push(codec::decode_u64(bytes, off).ok_or(CodecError::UnexpectedEof(*off))?);
    }

    Ok(node)
}

fn decode_string(bytes: &[u8], off: &mut usize) -> Result<String> {
    let len = codec::decode_u32(bytes, off).ok_or(CodecError::UnexpectedEof(*off))? as usize;
    let raw = take_bytes(bytes, off, len)?;
    String::from_utf8(raw.to_vec()).map_err(|_| CodecError::InvalidName.into())
}

fn take_bytes<'a>(bytes: &'a [u8], off: &mut usize, len: usize) -> Result<&'a [u8]> {
    let end = off.checked_add(len).ok_or(CodecError::UnexpectedEof(*off))?;
    let slice = bytes.get(*off..end).ok_or(CodecError::UnexpectedEof(*off))?;
    *off = end;
    Ok(slice)
}

// ================================================================================================
// Tests
// ================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GraphError;
    use crate::value::Value;

    fn sample_graph() -> Graph {
        let mut g = Graph::new("roundtrip");
        let a = g.add_node(OpCode::Nop);
        {
            let node = g.node_mut(a).unwrap();
            node.payload = Value::I32(25).to_payload();
            node.data_outputs.push(PortInfo::named(BdiType::I32, "lhs"));
        }
        let b = g.add_node(OpCode::Nop);
        {
            let node = g.node_mut(b).unwrap();
            node.payload = Value::I32(17).to_payload();
            node.data_outputs.push(PortInfo::new(BdiType::I32));
        }
        let add = g.add_node(OpCode::Add);
        {
            let node = g.node_mut(add).unwrap();
            node.data_outputs.push(PortInfo::named(BdiType::I32, "sum"));
            node.metadata = 7;
            node.region = 3;
        }
        let end = g.add_node(OpCode::End);
        g.connect_data(a, 0, add, 0).unwrap();
        g.connect_data(b, 0, add, 1).unwrap();
        g.connect_control(a, b).unwrap();
        g.connect_control(b, add).unwrap();
        g.connect_control(add, end).unwrap();
        g
    }

    #[test]
    fn test_binary_round_trip() {
        // R1: deserialize(serialize(g)) == g
        let g = sample_graph();
        let bytes = g.to_bytes();
        let loaded = Graph::from_bytes(&bytes).unwrap();
        assert_eq!(loaded, g);
        assert!(loaded.validate().is_ok());
        // Fresh ids continue past the highest deserialized id
        assert!(loaded.next_id() > 4);
    }

    #[test]
    fn test_stream_header() {
        let bytes = sample_graph().to_bytes();
        assert_eq!(&bytes[0..4], &GRAPH_MAGIC.to_le_bytes());
        assert_eq!(&bytes[4..6], &GRAPH_VERSION.to_le_bytes());
    }

    #[test]
    fn test_rejects_unknown_magic() {
        let mut bytes = sample_graph().to_bytes();
        bytes[0] ^= 0xFF;
        assert!(matches!(
            Graph::from_bytes(&bytes),
            Err(GraphError::Codec(CodecError::BadMagic { .. }))
        ));
    }

    #[test]
    fn test_rejects_legacy_magic() {
        let mut bytes = Vec::new();
        codec::encode_u32(&mut bytes, LEGACY_GRAPH_MAGIC);
        codec::encode_u16(&mut bytes, 1);
        assert!(matches!(
            Graph::from_bytes(&bytes),
            Err(GraphError::Codec(CodecError::LegacyFormat))
        ));
    }

    #[test]
    fn test_rejects_unknown_version() {
        let mut bytes = sample_graph().to_bytes();
        bytes[4] = 9;
        assert!(matches!(
            Graph::from_bytes(&bytes),
            Err(GraphError::Codec(CodecError::UnsupportedVersion(9)))
        ));
    }

    #[test]
    fn test_rejects_truncated_stream() {
        let bytes = sample_graph().to_bytes();
        let truncated = &bytes[..bytes.len() - 3];
        assert!(matches!(
            Graph::from_bytes(truncated),
            Err(GraphError::Codec(CodecError::UnexpectedEof(_)))
        ));
    }

    #[test]
    fn test_json_round_trip() {
        let g = sample_graph();
        let json = g.to_json().unwrap();
        let loaded = Graph::from_json(&json).unwrap();
        assert_eq!(loaded, g);
    }

    #[test]
    fn test_empty_graph_round_trip() {
        let g = Graph::new("empty");
        let loaded = Graph::from_bytes(&g.to_bytes()).unwrap();
        assert_eq!(loaded, g);
        assert!(loaded.is_empty());
    }
}
