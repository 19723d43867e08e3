//! Graph builder
//!
//! The construction API front-ends drive. A thin, invariant-preserving layer
//! over [`Graph`] and [`MetadataStore`]: debug names become semantic tags,
//! connections delegate to the graph's checked edge operations, and
//! `finalize` validates before surrendering ownership.

use crate::error::Result;
use crate::graph::Graph;
use crate::metadata::{Metadata, MetadataStore};
use crate::node::{MetadataHandle, NodeId, PortIndex, PortInfo};
use crate::op::OpCode;
use crate::payload::TypedPayload;
use crate::types::BdiType;
use tracing::warn;

/// Ergonomic graph construction over a shared metadata store
pub struct GraphBuilder<'m> {
    store: &'m mut MetadataStore,
    graph: Graph,
}

impl<'m> GraphBuilder<'m> {
    pub fn new(store: &'m mut MetadataStore, graph_name: impl Into<String>) -> Self {
        Self {
            store,
            graph: Graph::new(graph_name),
        }
    }

    /// Add a node with no metadata
    pub fn add_node(&mut self, op: OpCode) -> NodeId {
        self.graph.add_node(op)
    }

    /// Add a node whose debug name is recorded as a semantic tag
    pub fn add_node_named(&mut self, op: OpCode, debug_name: impl Into<String>) -> NodeId {
        let id = self.graph.add_node(op);
        let name = debug_name.into();
        if !name.is_empty() {
            let handle = self.store.add(Metadata::semantic("", name));
            self.graph.node_mut(id).expect("freshly added node").metadata = handle;
        }
        id
    }

    /// Set the immediate payload of a node
    pub fn set_payload(&mut self, node: NodeId, payload: TypedPayload) -> bool {
        match self.graph.node_mut(node) {
            Some(n) => {
                n.payload = payload;
                true
            }
            None => false,
        }
    }

    /// Declare (or redeclare) an output port
    pub fn define_output(&mut self, node: NodeId, port: PortIndex, ty: BdiType) -> bool {
        self.define_output_named(node, port, ty, "")
    }

    pub fn define_output_named(&mut self, node: NodeId, port: PortIndex, ty: BdiType, name: &str) -> bool {
        match self.graph.node_mut(node) {
            Some(n) => {
                let idx = port as usize;
                if idx >= n.data_outputs.len() {
                    n.data_outputs.resize(idx + 1, PortInfo::new(BdiType::Unknown));
                }
                n.data_outputs[idx] = PortInfo::named(ty, name);
                true
            }
            None => false,
        }
    }

    /// Connect data flow: `src::src_port -> dst::dst_port`
    pub fn connect_data(&mut self, src: NodeId, src_port: PortIndex, dst: NodeId, dst_port: PortIndex) -> Result<()> {
        self.graph.connect_data(src, src_port, dst, dst_port)
    }

    /// Connect control flow: `src -> dst`
    pub fn connect_control(&mut self, src: NodeId, dst: NodeId) -> Result<()> {
        self.graph.connect_control(src, dst)
    }

    /// Attach or replace a node's metadata entry
    ///
    /// Updates in place when the node already carries a handle; otherwise a
    /// fresh handle is allocated.
    pub fn set_metadata(&mut self, node: NodeId, metadata: Metadata) -> bool {
        let handle = match self.graph.node(node) {
            Some(n) => n.metadata,
            None => return false,
        };
        if handle != 0 {
            self.store.update(handle, metadata)
        } else {
            let fresh = self.store.add(metadata);
            self.graph.node_mut(node).expect("checked above").metadata = fresh;
            true
        }
    }

    pub fn metadata_handle(&self, node: NodeId) -> Option<MetadataHandle> {
        self.graph.node(node).map(|n| n.metadata)
    }

    /// The graph under construction
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Validate and surrender ownership of the built graph
    ///
    /// A validation failure does not block the handoff; the persistent
    /// invalid graph will be rejected again wherever `validate` gates
    /// execution.
    pub fn finalize(self) -> Graph {
        if let Err(e) = self.graph.validate() {
            warn!(graph = self.graph.name(), error = %e, "finalizing graph with validation errors");
        }
        self.graph
    }
}

// ================================================================================================
// Tests
// ================================================================================================
