//! BDI virtual machine
//!
//! Executes graphs built with `bdi-core`:
//! - **Memory Manager**: flat byte arena, bump allocator, bounds-checked I/O
//! - **Execution Context**: per-port value map and call-return stack
//! - **Interpreter**: fetch/decode/execute loop over control edges
//! - **Constant Folding**: graph rewrite reusing the interpreter's scalar
//!   evaluator
//!
//! # Usage
//!
//! ```rust
//! use bdi_core::{BdiType, GraphBuilder, MetadataStore, OpCode, Value};
//! use bdi_vm::Interpreter;
//!
//! let mut store = MetadataStore::new();
//! let mut b = GraphBuilder::new(&mut store, "add");
//!
//! let start = b.add_node(OpCode::Start);
//! let lhs = b.add_node(OpCode::Nop);
//! b.set_payload(lhs, Value::I32(25).to_payload());
//! b.define_output(lhs, 0, BdiType::I32);
//! let rhs = b.add_node(OpCode::Nop);
//! b.set_payload(rhs, Value::I32(17).to_payload());
//! b.define_output(rhs, 0, BdiType::I32);
//! let add = b.add_node(OpCode::Add);
//! b.define_output(add, 0, BdiType::I32);
//! let end = b.add_node(OpCode::End);
//!
//! b.connect_control(start, lhs).unwrap();
//! b.connect_control(lhs, rhs).unwrap();
//! b.connect_control(rhs, add).unwrap();
//! b.connect_control(add, end).unwrap();
//! b.connect_data(lhs, 0, add, 0).unwrap();
//! b.connect_data(rhs, 0, add, 1).unwrap();
//! let graph = b.finalize();
//!
//! let mut vm = Interpreter::new(&store, 1024);
//! vm.execute(&graph, start).unwrap();
//! assert_eq!(vm.context().get_at(add, 0), Some(Value::I32(42)));
//! ```

pub mod context;
pub mod error;
pub mod eval;
pub mod fold;
pub mod interp;
pub mod memory;

// Re-export public API
pub use context::ExecutionContext;
pub use error::{Result, VmError};
pub use fold::ConstantFolder;
pub use interp::{ExecConfig, Interpreter};
pub use memory::{MemoryManager, MemoryRegion};
