//! BDI graph IR
//!
//! This crate provides:
//! - **Type System**: scalar type tags, promotion, implicit-conversion rules
//! - **Binary Codec**: fixed little-endian scalar encode/decode
//! - **Value Variant**: the runtime tagged scalar union
//! - **Graph IR**: nodes, typed ports, data/control edges, validation
//! - **Metadata Store**: handle-indexed side table of per-node annotations
//! - **Builder**: invariant-preserving graph construction for front-ends
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                   DSL Front-Ends                         │
//! │             (drive GraphBuilder + MetadataStore)         │
//! └─────────────────────┬───────────────────────────────────┘
//!                       │
//!                       ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │                     Graph IR                             │
//! │  nodes · typed ports · data edges · control edges        │
//! └─────────────────────┬───────────────────────────────────┘
//!                       │
//!         ┌─────────────┼──────────────┐
//!         ▼             ▼              ▼
//!   ┌──────────┐  ┌──────────┐  ┌────────────┐
//!   │  binary  │  │   JSON   │  │   bdi-vm   │
//!   │  stream  │  │ tooling  │  │ (executes) │
//!   └──────────┘  └──────────┘  └────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust
//! use bdi_core::{BdiType, Graph, GraphBuilder, MetadataStore, OpCode, Value};
//!
//! let mut store = MetadataStore::new();
//! let mut builder = GraphBuilder::new(&mut store, "example");
//!
//! let start = builder.add_node(OpCode::Start);
//! let konst = builder.add_node_named(OpCode::Nop, "the answer");
//! builder.set_payload(konst, Value::I32(42).to_payload());
//! builder.define_output(konst, 0, BdiType::I32);
//! let end = builder.add_node(OpCode::End);
//! builder.connect_control(start, konst).unwrap();
//! builder.connect_control(konst, end).unwrap();
//!
//! let graph: Graph = builder.finalize();
//! assert!(graph.validate().is_ok());
//!
//! // Round-trip through the canonical binary stream
//! let bytes = graph.to_bytes();
//! assert_eq!(Graph::from_bytes(&bytes).unwrap(), graph);
//! ```

pub mod builder;
pub mod codec;
pub mod error;
pub mod graph;
pub mod metadata;
pub mod node;
pub mod op;
pub mod payload;
pub mod serialize;
pub mod types;
pub mod value;

// Re-export public API
pub use builder::GraphBuilder;
pub use error::{CodecError, GraphError, Result};
pub use graph::Graph;
pub use metadata::{CacheHint, Metadata, MetadataStore, ProofSystem};
pub use node::{MetadataHandle, Node, NodeId, PortIndex, PortInfo, PortRef, RegionId};
pub use op::{OpCategory, OpCode};
pub use payload::TypedPayload;
pub use serialize::{GRAPH_MAGIC, GRAPH_VERSION, LEGACY_GRAPH_MAGIC};
pub use types::BdiType;
pub use value::{FromValue, Value};
