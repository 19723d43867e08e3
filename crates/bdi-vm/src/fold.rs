//! Constant folding
//!
//! A fixed-point rewrite pass: any side-effect-free node whose data inputs
//! all resolve to constants is evaluated through the shared evaluator and
//! replaced by a constant-payload NOP. Consumers are rewired to the new
//! node, and its control edges take over the old node's position so linear
//! flow around the folded operation is preserved.
//!
//! A node the pass fails to fully evaluate is never mutated.

use crate::eval;
use bdi_core::{Graph, NodeId, OpCode, PortInfo, PortRef, Value};
use std::collections::HashMap;
use tracing::{debug, trace};

/// Upper bound on fixed-point passes over the graph
const MAX_ITER: usize = 10;

/// The constant-folding pass
///
/// `known` caches already-resolved constant outputs for the duration of one
/// `run`, so chains of foldable nodes collapse without re-decoding payloads.
#[derive(Debug, Default)]
pub struct ConstantFolder {
    known: HashMap<PortRef, Value>,
}

impl ConstantFolder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold until no pass makes a change (bounded by `MAX_ITER`);
    /// returns the number of nodes replaced
    pub fn run(&mut self, graph: &mut Graph) -> usize {
        self.known.clear();
        let mut folded = 0;
        for pass in 0..MAX_ITER {
            let mut changed = false;
            for id in graph.node_ids() {
                // The node may have been removed by an earlier fold this pass
                if !graph.contains(id) {
                    continue;
                }
                if let Some(result) = self.try_evaluate(graph, id) {
                    self.replace_with_constant(graph, id, result);
                    folded += 1;
                    changed = true;
                }
            }
            if !changed {
                debug!(passes = pass + 1, folded, "constant folding converged");
                break;
            }
        }
        folded
    }

    /// Evaluate a candidate node if every input resolves to a constant
    ///
    /// Returns `None` (leaving the node untouched) when the operation is
    /// not fold-safe, an input is unknown, or evaluation fails.
    fn try_evaluate(&mut self, graph: &Graph, id: NodeId) -> Option<Value> {
        let node = graph.node(id)?;
        if !node.op.is_fold_safe() || node.data_outputs.is_empty() {
            return None;
        }
        let op = node.op;
        let out_ty = node.output_type(0);

        let mut inputs = Vec::with_capacity(node.data_inputs.len());
        for input in &node.data_inputs {
            if input.is_unbound() {
                return None;
            }
            let value = match self.known.get(input) {
                Some(v) => *v,
                None => {
                    let v = constant_from_node(graph, *input)?;
                    self.known.insert(*input, v);
                    v
                }
            };
            inputs.push(value);
        }

        use OpCode::*;
        match op {
            Add | Sub | Mul | Div | Mod | And | Or | Xor if inputs.len() == 2 => {
                eval::apply_binary(op, inputs[0], inputs[1]).ok()
            }
            Neg | Not | LNot if inputs.len() == 1 => eval::apply_unary(op, inputs[0]).ok(),
            Eq | Ne | Lt | Le | Gt | Ge if inputs.len() == 2 => {
                eval::apply_compare(op, inputs[0], inputs[1]).ok().map(Value::Bool)
            }
            LAnd | LOr | LXor if inputs.len() == 2 => {
                eval::apply_logical(op, inputs[0], inputs[1]).ok().map(Value::Bool)
            }
            Trunc | ExtendSign | ExtendZero | FloatToInt | IntToFloat | Bitcast if inputs.len() == 1 => {
                eval::apply_convert(op, inputs[0], out_ty).ok()
            }
            _ => None,
        }
    }

    /// Replace a fully evaluated node with a constant-payload NOP
    fn replace_with_constant(&mut self, graph: &mut Graph, old: NodeId, k: Value) {
        // 1. Fresh constant node carrying the result
        let port_name = graph
            .node(old)
            .and_then(|n| n.data_outputs.first())
            .map(|p| p.name.clone())
            .unwrap_or_default();
        let konst = graph.add_node(OpCode::Nop);
        {
            let node = graph.node_mut(konst).expect("node just added");
            node.payload = k.to_payload();
            node.data_outputs.push(PortInfo::named(k.ty(), port_name));
        }

        // 2. Rewire every consumer input to the new constant's output 0
        for (_, n) in graph.iter_mut() {
            for input in n.data_inputs.iter_mut() {
                if input.node == old {
                    *input = PortRef::new(konst, 0);
                }
            }
        }

        // 3/4. The constant takes over the old node's control position.
        // Substitution is in place: control output order is semantic
        // (branch slot 0 = true target), so the replacement must keep the
        // old node's slot rather than append at the end.
        let preds = graph.control_predecessors(old).to_vec();
        let succs = graph.control_successors(old).to_vec();
        for &pred in &preds {
            let pred_node = graph.node_mut(pred).expect("predecessor is live");
            for slot in pred_node.control_outputs.iter_mut() {
                if *slot == old {
                    *slot = konst;
                }
            }
        }
        for &succ in &succs {
            let succ_node = graph.node_mut(succ).expect("successor is live");
            for slot in succ_node.control_inputs.iter_mut() {
                if *slot == old {
                    *slot = konst;
                }
            }
        }
        {
            let node = graph.node_mut(konst).expect("node just added");
            node.control_inputs = preds;
            node.control_outputs = succs;
        }

        // 5. Drop the folded node
        graph.remove_node(old);
        self.known.insert(PortRef::new(konst, 0), k);
        trace!(old, konst, value = %k, "folded node to constant");
    }
}

/// A constant provider is a NOP with a valid, non-void payload
fn constant_from_node(graph: &Graph, port: PortRef) -> Option<Value> {
    let node = graph.node(port.node)?;
    if node.op != OpCode::Nop || port.port != 0 {
        return None;
    }
    if !node.payload.is_valid() || node.payload.is_void() {
        return None;
    }
    let v = Value::from_payload(&node.payload);
    (!v.is_void()).then_some(v)
}

// ================================================================================================
// Tests
// ================================================================================================
