//! Execution context
//!
//! The runtime "register file" of a run: one value slot per emitted output
//! port, plus the call-return stack. Owned exclusively by one interpreter
//! instance; not re-entrant.

use bdi_core::{NodeId, PortIndex, PortRef, Value};
use std::collections::HashMap;

/// Per-run port values and call stack
#[derive(Debug, Default)]
pub struct ExecutionContext {
    port_values: HashMap<PortRef, Value>,
    call_stack: Vec<NodeId>,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the value emitted at a port
    pub fn set(&mut self, port: PortRef, value: Value) {
        self.port_values.insert(port, value);
    }

    pub fn set_at(&mut self, node: NodeId, port: PortIndex, value: Value) {
        self.set(PortRef::new(node, port), value);
    }

    /// Retrieve the value last emitted at a port
    pub fn get(&self, port: PortRef) -> Option<Value> {
        self.port_values.get(&port).copied()
    }

    pub fn get_at(&self, node: NodeId, port: PortIndex) -> Option<Value> {
        self.get(PortRef::new(node, port))
    }

    /// Number of populated port slots
    pub fn len(&self) -> usize {
        self.port_values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.port_values.is_empty()
    }

    /// Reset port values and the call stack for a fresh run
    pub fn clear(&mut self) {
        self.port_values.clear();
        self.call_stack.clear();
    }

    // ============================================================================================
    // Call stack
    // ============================================================================================

    pub fn push_call(&mut self, return_node: NodeId) {
        self.call_stack.push(return_node);
    }

    pub fn pop_call(&mut self) -> Option<NodeId> {
        self.call_stack.pop()
    }

    pub fn is_call_stack_empty(&self) -> bool {
        self.call_stack.is_empty()
    }

    pub fn call_depth(&self) -> usize {
        self.call_stack.len()
    }
}
