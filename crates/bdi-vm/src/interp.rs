//! Interpreter
//!
//! The fetch/decode/execute loop over a BDI graph. Control walks the
//! ordered control edges starting from an entry node; node id `0` is the
//! halt sentinel. Operand values are resolved through the execution
//! context's port-value map, arithmetic dispatches through the shared
//! evaluator, and memory operations go through the arena.
//!
//! Scheduling is single-threaded and step-driven: exactly one active node at
//! a time, no suspension, no retries. Any failure aborts the run; control
//! never continues after an error.

use crate::context::ExecutionContext;
use crate::error::{Result, VmError};
use crate::eval;
use crate::memory::MemoryManager;
use bdi_core::{
    BdiType, FromValue, Graph, Metadata, MetadataStore, Node, NodeId, OpCode, PortIndex, ProofSystem,
    TypedPayload, Value,
};
use tracing::{debug, info, trace, warn};

/// Execution limits
#[derive(Debug, Clone, Copy)]
pub struct ExecConfig {
    /// Safety bound on executed node steps
    pub step_limit: usize,
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self { step_limit: 10_000 }
    }
}

/// A BDI virtual machine instance
///
/// Owns its memory arena and execution context for its whole lifetime; the
/// metadata store is held by shared borrow and never mutated during
/// execution.
pub struct Interpreter<'m> {
    memory: MemoryManager,
    context: ExecutionContext,
    metadata: &'m MetadataStore,
    config: ExecConfig,
}

impl<'m> Interpreter<'m> {
    pub fn new(metadata: &'m MetadataStore, memory_size: usize) -> Self {
        Self::with_config(metadata, memory_size, ExecConfig::default())
    }

    pub fn with_config(metadata: &'m MetadataStore, memory_size: usize, config: ExecConfig) -> Self {
        Self {
            memory: MemoryManager::new(memory_size),
            context: ExecutionContext::new(),
            metadata,
            config,
        }
    }

    pub fn context(&self) -> &ExecutionContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut ExecutionContext {
        &mut self.context
    }

    pub fn memory(&self) -> &MemoryManager {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut MemoryManager {
        &mut self.memory
    }

    /// Run the graph from `entry` until halt, error, or the step limit
    ///
    /// The context is cleared first, so two runs from identical inputs
    /// produce identical terminal context and outcome. Memory writes from a
    /// previous run are not rolled back.
    pub fn execute(&mut self, graph: &Graph, entry: NodeId) -> Result<()> {
        debug!(graph = graph.name(), entry, "execution started");
        self.context.clear();

        let mut current = entry;
        for step in 0..self.config.step_limit {
            if current == 0 {
                debug!(steps = step, "execution halted normally");
                return Ok(());
            }
            let node = graph.node(current).ok_or(VmError::InvalidNode(current))?;
            trace!(node = current, op = %node.op, "executing");
            self.execute_node(node)?;
            current = self.next_of(node)?;
        }
        if current == 0 {
            return Ok(());
        }
        Err(VmError::StepLimitExceeded(self.config.step_limit))
    }

    // ============================================================================================
    // Operand helpers
    // ============================================================================================

    /// Resolve the value at an operand slot
    fn input_value(&self, node: &Node, input: PortIndex) -> Result<Value> {
        let missing = || VmError::MissingOperand { node: node.id, input };
        let port = node
            .data_inputs
            .get(input as usize)
            .copied()
            .filter(|r| !r.is_unbound())
            .ok_or_else(missing)?;
        self.context.get(port).filter(|v| !v.is_void()).ok_or_else(missing)
    }

    /// Resolve an operand and implicitly convert it to a concrete type
    fn input_typed<T: FromValue>(&self, node: &Node, input: PortIndex) -> Result<T> {
        let v = self.input_value(node, input)?;
        v.convert_to::<T>().ok_or(VmError::OperandType {
            node: node.id,
            input,
            expected: T::BDI_TYPE,
            actual: v.ty(),
        })
    }

    /// Resolve an operand as an address word
    fn input_ptr(&self, node: &Node, input: PortIndex) -> Result<u64> {
        let v = self.input_value(node, input)?;
        v.as_ptr_word().ok_or(VmError::OperandType {
            node: node.id,
            input,
            expected: BdiType::Pointer,
            actual: v.ty(),
        })
    }

    /// Store a result, checking it against the declared output type
    fn set_output(&mut self, node: &Node, port: PortIndex, value: Value) -> Result<()> {
        let declared = match node.data_outputs.get(port as usize) {
            Some(info) => info.ty,
            None => return Err(VmError::MissingOutput { node: node.id, port }),
        };
        if declared != BdiType::Unknown && !BdiType::can_implicitly_convert(value.ty(), declared) {
            return Err(VmError::OutputTypeMismatch {
                node: node.id,
                declared,
                actual: value.ty(),
            });
        }
        self.context.set_at(node.id, port, value);
        Ok(())
    }

    // ============================================================================================
    // Dispatch
    // ============================================================================================

    fn execute_node(&mut self, node: &Node) -> Result<()> {
        use OpCode::*;
        match node.op {
            // A constant-payload NOP materializes its payload at output 0;
            // anything else in the meta group is a pure no-op here.
            Nop => {
                if node.payload.is_valid() && !node.payload.is_void() && !node.data_outputs.is_empty() {
                    let v = Value::from_payload(&node.payload);
                    if !v.is_void() {
                        self.context.set_at(node.id, 0, v);
                    }
                }
                Ok(())
            }
            Start | Comment | End => Ok(()),

            Assert => {
                if self.input_typed::<bool>(node, 0)? {
                    return Ok(());
                }
                let message = self
                    .metadata
                    .description(node.metadata)
                    .unwrap_or("assertion failed")
                    .to_string();
                Err(VmError::AssertionFailed { node: node.id, message })
            }
            VerifyProof => match self.metadata.get(node.metadata) {
                Some(Metadata::Proof { system, hash }) if *system != ProofSystem::None && !hash.is_empty() => Ok(()),
                _ => Err(VmError::ProofMissing(node.id)),
            },

            // Binary arithmetic and bitwise: promote, compute, emit at port 0
            Add | Sub | Mul | Div | Mod | And | Or | Xor => {
                let lhs = self.input_value(node, 0)?;
                let rhs = self.input_value(node, 1)?;
                let result = eval::apply_binary(node.op, lhs, rhs)?;
                self.set_output(node, 0, result)
            }
            Neg | Abs | Inc | Dec | Not | LNot | Popcount | Lzcnt | Tzcnt => {
                let v = self.input_value(node, 0)?;
                let result = eval::apply_unary(node.op, v)?;
                self.set_output(node, 0, result)
            }
            Shl | Shr | Ashr | Rol | Ror => {
                let value = self.input_value(node, 0)?;
                let amount = self.input_value(node, 1)?;
                let result = eval::apply_shift(node.op, value, amount)?;
                self.set_output(node, 0, result)
            }
            Fma => {
                let a = self.input_value(node, 0)?;
                let b = self.input_value(node, 1)?;
                let c = self.input_value(node, 2)?;
                let result = eval::apply_fma(a, b, c)?;
                self.set_output(node, 0, result)
            }
            LAnd | LOr | LXor => {
                let lhs = self.input_value(node, 0)?;
                let rhs = self.input_value(node, 1)?;
                let result = eval::apply_logical(node.op, lhs, rhs)?;
                self.set_output(node, 0, Value::Bool(result))
            }
            Eq | Ne | Lt | Le | Gt | Ge => {
                let lhs = self.input_value(node, 0)?;
                let rhs = self.input_value(node, 1)?;
                let result = eval::apply_compare(node.op, lhs, rhs)?;
                self.set_output(node, 0, Value::Bool(result))
            }
            Trunc | ExtendSign | ExtendZero | FloatToInt | IntToFloat | Bitcast => {
                if node.data_outputs.is_empty() {
                    return Err(VmError::MissingOutput { node: node.id, port: 0 });
                }
                let v = self.input_value(node, 0)?;
                let result = eval::apply_convert(node.op, v, node.output_type(0))?;
                self.context.set_at(node.id, 0, result);
                Ok(())
            }

            // Memory
            Load => {
                let ty = match node.data_outputs.first() {
                    Some(info) => info.ty,
                    None => return Err(VmError::MissingOutput { node: node.id, port: 0 }),
                };
                if ty.size_bytes() == 0 {
                    return Err(VmError::UnsupportedForType { op: node.op, ty });
                }
                let addr = self.input_ptr(node, 0)?;
                let mut buf = vec![0u8; ty.size_bytes()];
                self.memory.read(addr, &mut buf)?;
                // The decoded value derives from the declared type itself
                self.context.set_at(node.id, 0, Value::from_payload(&TypedPayload::new(ty, buf)));
                Ok(())
            }
            Store => {
                let addr = self.input_ptr(node, 0)?;
                let value = self.input_value(node, 1)?;
                let payload = value.to_payload();
                self.memory.write(addr, &payload.bytes)
            }
            Alloc => {
                let size = self.input_typed::<u64>(node, 0)?;
                let region = self.memory.allocate(size as usize, false)?;
                let base = self.memory.region(region).expect("region just allocated").base;
                self.set_output(node, 0, Value::Ptr(base))?;
                // Optional second output carries the region id for FREE
                if node.data_outputs.len() > 1 {
                    self.context.set_at(node.id, 1, Value::Ptr(region));
                }
                Ok(())
            }
            Free => {
                let region = self.input_ptr(node, 0)?;
                if !self.memory.free(region) {
                    warn!(node = node.id, region, "free of unknown region ignored");
                }
                Ok(())
            }
            Copy => {
                let dst = self.input_ptr(node, 0)?;
                let src = self.input_ptr(node, 1)?;
                let len = self.input_typed::<u64>(node, 2)?;
                self.memory.copy_within(dst, src, len as usize)
            }
            Set => {
                let addr = self.input_ptr(node, 0)?;
                let value = self.input_typed::<u8>(node, 1)?;
                let len = self.input_typed::<u64>(node, 2)?;
                self.memory.fill(addr, value, len as usize)
            }

            // I/O
            Print => {
                let v = self.input_value(node, 0)?;
                info!(node = node.id, value = %v, "print");
                Ok(())
            }
            ReadPort | WritePort => Err(VmError::Unsupported(node.op)),

            // Control flow executes as a no-op; routing happens in next_of
            Jump | BranchCond | Call | Return | Switch => Ok(()),

            // Reserved concurrency primitives and DSL/ML placeholders
            op if op.is_reserved() => Err(VmError::Unsupported(op)),
            op => Err(VmError::Unsupported(op)),
        }
    }

    /// Determine the successor of an executed node; `0` halts
    fn next_of(&mut self, node: &Node) -> Result<NodeId> {
        let first = || node.control_outputs.first().copied().unwrap_or(0);
        Ok(match node.op {
            OpCode::End => 0,
            OpCode::Jump => first(),
            OpCode::BranchCond => {
                if self.input_typed::<bool>(node, 0)? {
                    first()
                } else {
                    // Single-target branches fall through to the true edge
                    node.control_outputs.get(1).copied().unwrap_or_else(first)
                }
            }
            OpCode::Call => {
                let target = first();
                if target != 0 {
                    let return_to = node.control_outputs.get(1).copied().unwrap_or(0);
                    if return_to == 0 {
                        warn!(node = node.id, "call without explicit return edge");
                    }
                    self.context.push_call(return_to);
                }
                target
            }
            OpCode::Return => self.context.pop_call().unwrap_or(0),
            OpCode::Switch => {
                let v = self.input_value(node, 0)?;
                let selector = match v.cast_numeric(BdiType::U64) {
                    Some(Value::U64(s)) => s,
                    _ => {
                        return Err(VmError::OperandType {
                            node: node.id,
                            input: 0,
                            expected: BdiType::U64,
                            actual: v.ty(),
                        })
                    }
                };
                node.control_outputs
                    .get(selector as usize)
                    .copied()
                    .ok_or(VmError::SwitchOutOfRange {
                        node: node.id,
                        index: selector,
                        targets: node.control_outputs.len(),
                    })?
            }
            _ => match node.control_outputs.len() {
                0 => 0,
                1 => node.control_outputs[0],
                _ => {
                    warn!(node = node.id, "ambiguous control successors; halting");
                    0
                }
            },
        })
    }
}

// ================================================================================================
// Tests
// ================================================================================================
