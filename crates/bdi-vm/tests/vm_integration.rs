//! End-to-end interpreter scenarios over builder-built graphs

use bdi_core::{BdiType, GraphBuilder, MetadataStore, NodeId, OpCode, Value};
use bdi_vm::{Interpreter, VmError};

/// Add a constant-payload NOP and append it to the control chain
fn const_node(b: &mut GraphBuilder<'_>, ctl: &mut NodeId, v: Value) -> NodeId {
    let id = b.add_node(OpCode::Nop);
    b.set_payload(id, v.to_payload());
    b.define_output(id, 0, v.ty());
    b.connect_control(*ctl, id).unwrap();
    *ctl = id;
    id
}

#[test]
fn test_simple_arithmetic() {
    let mut store = MetadataStore::new();
    let mut b = GraphBuilder::new(&mut store, "arith");
    let start = b.add_node(OpCode::Start);
    let mut ctl = start;

    let lhs = const_node(&mut b, &mut ctl, Value::I32(25));
    let rhs = const_node(&mut b, &mut ctl, Value::I32(17));
    let add = b.add_node(OpCode::Add);
    b.define_output(add, 0, BdiType::I32);
    b.connect_control(ctl, add).unwrap();
    b.connect_data(lhs, 0, add, 0).unwrap();
    b.connect_data(rhs, 0, add, 1).unwrap();
    let end = b.add_node(OpCode::End);
    b.connect_control(add, end).unwrap();

    let graph = b.finalize();
    assert!(graph.validate().is_ok());

    let mut vm = Interpreter::new(&store, 1024);
    vm.execute(&graph, start).unwrap();
    assert_eq!(vm.context().get_at(add, 0), Some(Value::I32(42)));
}

#[test]
fn test_division_by_zero_aborts() {
    let mut store = MetadataStore::new();
    let mut b = GraphBuilder::new(&mut store, "div0");
    let start = b.add_node(OpCode::Start);
    let mut ctl = start;

    let lhs = const_node(&mut b, &mut ctl, Value::I32(5));
    let rhs = const_node(&mut b, &mut ctl, Value::I32(0));
    let div = b.add_node(OpCode::Div);
    b.define_output(div, 0, BdiType::I32);
    b.connect_control(ctl, div).unwrap();
    b.connect_data(lhs, 0, div, 0).unwrap();
    b.connect_data(rhs, 0, div, 1).unwrap();
    let end = b.add_node(OpCode::End);
    b.connect_control(div, end).unwrap();

    let graph = b.finalize();
    let mut vm = Interpreter::new(&store, 64);
    assert!(matches!(vm.execute(&graph, start), Err(VmError::DivisionByZero)));
    // The failing node produced nothing
    assert_eq!(vm.context().get_at(div, 0), None);
}

#[test]
fn test_memory_store_load_round_trip() {
    let mut store = MetadataStore::new();
    let mut b = GraphBuilder::new(&mut store, "mem");
    let start = b.add_node(OpCode::Start);
    let mut ctl = start;

    let addr = const_node(&mut b, &mut ctl, Value::Ptr(0));
    let val = const_node(&mut b, &mut ctl, Value::I32(987));

    let store_node = b.add_node(OpCode::Store);
    b.connect_control(ctl, store_node).unwrap();
    b.connect_data(addr, 0, store_node, 0).unwrap();
    b.connect_data(val, 0, store_node, 1).unwrap();

    let load = b.add_node(OpCode::Load);
    b.define_output(load, 0, BdiType::I32);
    b.connect_control(store_node, load).unwrap();
    b.connect_data(addr, 0, load, 0).unwrap();

    let end = b.add_node(OpCode::End);
    b.connect_control(load, end).unwrap();

    let graph = b.finalize();
    assert!(graph.validate().is_ok());

    let mut vm = Interpreter::new(&store, 1024);
    vm.execute(&graph, start).unwrap();
    assert_eq!(vm.context().get_at(load, 0), Some(Value::I32(987)));

    // The bytes really are in the arena, little-endian
    let mut raw = [0u8; 4];
    vm.memory().read(0, &mut raw).unwrap();
    assert_eq!(i32::from_le_bytes(raw), 987);
}

#[test]
fn test_store_out_of_bounds_aborts() {
    let mut store = MetadataStore::new();
    let mut b = GraphBuilder::new(&mut store, "oob");
    let start = b.add_node(OpCode::Start);
    let mut ctl = start;

    let addr = const_node(&mut b, &mut ctl, Value::Ptr(1020));
    let val = const_node(&mut b, &mut ctl, Value::I64(1));
    let store_node = b.add_node(OpCode::Store);
    b.connect_control(ctl, store_node).unwrap();
    b.connect_data(addr, 0, store_node, 0).unwrap();
    b.connect_data(val, 0, store_node, 1).unwrap();

    let graph = b.finalize();
    let mut vm = Interpreter::new(&store, 1024);
    assert!(matches!(
        vm.execute(&graph, start),
        Err(VmError::MemoryOutOfBounds { .. })
    ));
}

/// Build the two-armed branch graph from both polarity tests.
/// True path computes 111 = 100 + 11; false path computes 222 = 250 - 28.
fn branch_graph(
    store: &mut MetadataStore,
    cond: bool,
) -> (bdi_core::Graph, NodeId, NodeId, NodeId) {
    let mut b = GraphBuilder::new(store, "branch");
    let start = b.add_node(OpCode::Start);
    let mut ctl = start;

    let c100 = const_node(&mut b, &mut ctl, Value::I32(100));
    let c11 = const_node(&mut b, &mut ctl, Value::I32(11));
    let c250 = const_node(&mut b, &mut ctl, Value::I32(250));
    let c28 = const_node(&mut b, &mut ctl, Value::I32(28));
    let cond_node = const_node(&mut b, &mut ctl, Value::Bool(cond));

    let branch = b.add_node(OpCode::BranchCond);
    b.connect_control(ctl, branch).unwrap();
    b.connect_data(cond_node, 0, branch, 0).unwrap();

    let true_path = b.add_node(OpCode::Add);
    b.define_output(true_path, 0, BdiType::I32);
    b.connect_data(c100, 0, true_path, 0).unwrap();
    b.connect_data(c11, 0, true_path, 1).unwrap();

    let false_path = b.add_node(OpCode::Sub);
    b.define_output(false_path, 0, BdiType::I32);
    b.connect_data(c250, 0, false_path, 0).unwrap();
    b.connect_data(c28, 0, false_path, 1).unwrap();

    let end = b.add_node(OpCode::End);
    b.connect_control(branch, true_path).unwrap(); // slot 0: true
    b.connect_control(branch, false_path).unwrap(); // slot 1: false
    b.connect_control(true_path, end).unwrap();
    b.connect_control(false_path, end).unwrap();

    (b.finalize(), start, true_path, false_path)
}

#[test]
fn test_branch_takes_true_path() {
    let mut store = MetadataStore::new();
    let (graph, start, tp, fp) = branch_graph(&mut store, true);
    let mut vm = Interpreter::new(&store, 64);
    vm.execute(&graph, start).unwrap();
    assert_eq!(vm.context().get_at(tp, 0), Some(Value::I32(111)));
    assert_eq!(vm.context().get_at(fp, 0), None);
}

#[test]
fn test_branch_takes_false_path() {
    let mut store = MetadataStore::new();
    let (graph, start, tp, fp) = branch_graph(&mut store, false);
    let mut vm = Interpreter::new(&store, 64);
    vm.execute(&graph, start).unwrap();
    assert_eq!(vm.context().get_at(fp, 0), Some(Value::I32(222)));
    assert_eq!(vm.context().get_at(tp, 0), None);
}

#[test]
fn test_bitwise_quartet_u32() {
    let mut store = MetadataStore::new();
    let mut b = GraphBuilder::new(&mut store, "bitwise");
    let start = b.add_node(OpCode::Start);
    let mut ctl = start;

    let a = const_node(&mut b, &mut ctl, Value::U32(0b1010_1010));
    let c = const_node(&mut b, &mut ctl, Value::U32(0b0110_0110));

    let mut binop = |b: &mut GraphBuilder<'_>, ctl: &mut NodeId, op| {
        let id = b.add_node(op);
        b.define_output(id, 0, BdiType::U32);
        b.connect_control(*ctl, id).unwrap();
        b.connect_data(a, 0, id, 0).unwrap();
        b.connect_data(c, 0, id, 1).unwrap();
        *ctl = id;
        id
    };
    let and = binop(&mut b, &mut ctl, OpCode::And);
    let or = binop(&mut b, &mut ctl, OpCode::Or);
    let xor = binop(&mut b, &mut ctl, OpCode::Xor);

    let not = b.add_node(OpCode::Not);
    b.define_output(not, 0, BdiType::U32);
    b.connect_control(ctl, not).unwrap();
    b.connect_data(a, 0, not, 0).unwrap();
    let end = b.add_node(OpCode::End);
    b.connect_control(not, end).unwrap();

    let graph = b.finalize();
    let mut vm = Interpreter::new(&store, 64);
    vm.execute(&graph, start).unwrap();

    assert_eq!(vm.context().get_at(and, 0), Some(Value::U32(0b0010_0010)));
    assert_eq!(vm.context().get_at(or, 0), Some(Value::U32(0b1110_1110)));
    assert_eq!(vm.context().get_at(xor, 0), Some(Value::U32(0b1100_1100)));
    assert_eq!(vm.context().get_at(not, 0), Some(Value::U32(!0b1010_1010u32)));
}

#[test]
fn test_mixed_comparison_with_promotion() {
    let mut store = MetadataStore::new();
    let mut b = GraphBuilder::new(&mut store, "cmp");
    let start = b.add_node(OpCode::Start);
    let mut ctl = start;

    let f5 = const_node(&mut b, &mut ctl, Value::F32(5.0));
    let i6 = const_node(&mut b, &mut ctl, Value::I32(6));
    let i5 = const_node(&mut b, &mut ctl, Value::I32(5));

    let lt = b.add_node(OpCode::Lt);
    b.define_output(lt, 0, BdiType::Bool);
    b.connect_control(ctl, lt).unwrap();
    b.connect_data(f5, 0, lt, 0).unwrap();
    b.connect_data(i6, 0, lt, 1).unwrap();

    let ge = b.add_node(OpCode::Ge);
    b.define_output(ge, 0, BdiType::Bool);
    b.connect_control(lt, ge).unwrap();
    b.connect_data(i5, 0, ge, 0).unwrap();
    b.connect_data(f5, 0, ge, 1).unwrap();

    let end = b.add_node(OpCode::End);
    b.connect_control(ge, end).unwrap();

    let graph = b.finalize();
    let mut vm = Interpreter::new(&store, 64);
    vm.execute(&graph, start).unwrap();

    // CMP_LT(f32 5.0, i32 6) and CMP_GE(i32 5, f32 5.0) both hold
    assert_eq!(vm.context().get_at(lt, 0), Some(Value::Bool(true)));
    assert_eq!(vm.context().get_at(ge, 0), Some(Value::Bool(true)));
}

#[test]
fn test_conversion_chain() {
    let mut store = MetadataStore::new();
    let mut b = GraphBuilder::new(&mut store, "conv");
    let start = b.add_node(OpCode::Start);
    let mut ctl = start;

    let wide = const_node(&mut b, &mut ctl, Value::I64(300));
    let trunc = b.add_node(OpCode::Trunc);
    b.define_output(trunc, 0, BdiType::I8);
    b.connect_control(ctl, trunc).unwrap();
    b.connect_data(wide, 0, trunc, 0).unwrap();

    let tofloat = b.add_node(OpCode::IntToFloat);
    b.define_output(tofloat, 0, BdiType::F64);
    b.connect_control(trunc, tofloat).unwrap();
    b.connect_data(trunc, 0, tofloat, 0).unwrap();

    let end = b.add_node(OpCode::End);
    b.connect_control(tofloat, end).unwrap();

    let graph = b.finalize();
    let mut vm = Interpreter::new(&store, 64);
    vm.execute(&graph, start).unwrap();

    // 300 truncates modularly to 44, then converts exactly
    assert_eq!(vm.context().get_at(trunc, 0), Some(Value::I8(44)));
    assert_eq!(vm.context().get_at(tofloat, 0), Some(Value::F64(44.0)));
}

#[test]
fn test_execution_is_deterministic() {
    let mut store = MetadataStore::new();
    let (graph, start, tp, _fp) = branch_graph(&mut store, true);

    let mut vm = Interpreter::new(&store, 64);
    vm.execute(&graph, start).unwrap();
    let first = vm.context().get_at(tp, 0);
    let first_len = vm.context().len();

    // Same interpreter, same graph, same entry: identical terminal context
    vm.execute(&graph, start).unwrap();
    assert_eq!(vm.context().get_at(tp, 0), first);
    assert_eq!(vm.context().len(), first_len);
}

#[test]
fn test_fma_and_shift_graph() {
    let mut store = MetadataStore::new();
    let mut b = GraphBuilder::new(&mut store, "fma_shift");
    let start = b.add_node(OpCode::Start);
    let mut ctl = start;

    let a = const_node(&mut b, &mut ctl, Value::I32(3));
    let m = const_node(&mut b, &mut ctl, Value::I32(4));
    let c = const_node(&mut b, &mut ctl, Value::I32(5));
    let fma = b.add_node(OpCode::Fma);
    b.define_output(fma, 0, BdiType::I32);
    b.connect_control(ctl, fma).unwrap();
    b.connect_data(a, 0, fma, 0).unwrap();
    b.connect_data(m, 0, fma, 1).unwrap();
    b.connect_data(c, 0, fma, 2).unwrap();

    let amount = b.add_node(OpCode::Nop);
    b.set_payload(amount, Value::U32(2).to_payload());
    b.define_output(amount, 0, BdiType::U32);
    b.connect_control(fma, amount).unwrap();

    let shl = b.add_node(OpCode::Shl);
    b.define_output(shl, 0, BdiType::I32);
    b.connect_control(amount, shl).unwrap();
    b.connect_data(fma, 0, shl, 0).unwrap();
    b.connect_data(amount, 0, shl, 1).unwrap();

    let end = b.add_node(OpCode::End);
    b.connect_control(shl, end).unwrap();

    let graph = b.finalize();
    let mut vm = Interpreter::new(&store, 64);
    vm.execute(&graph, start).unwrap();

    assert_eq!(vm.context().get_at(fma, 0), Some(Value::I32(17)));
    assert_eq!(vm.context().get_at(shl, 0), Some(Value::I32(68)));
}

#[test]
fn test_load_from_preloaded_arena() {
    let mut store = MetadataStore::new();
    let mut b = GraphBuilder::new(&mut store, "preload");
    let start = b.add_node(OpCode::Start);
    let mut ctl = start;
    let addr = const_node(&mut b, &mut ctl, Value::Ptr(4));
    let load = b.add_node(OpCode::Load);
    b.define_output(load, 0, BdiType::F32);
    b.connect_control(ctl, load).unwrap();
    b.connect_data(addr, 0, load, 0).unwrap();
    let end = b.add_node(OpCode::End);
    b.connect_control(load, end).unwrap();
    let graph = b.finalize();

    let mut vm = Interpreter::new(&store, 64);
    let values = [1.0f32, 2.5, -3.0, 4.0];
    vm.memory_mut().write(0, bytemuck::cast_slice(&values)).unwrap();
    vm.execute(&graph, start).unwrap();
    assert_eq!(vm.context().get_at(load, 0), Some(Value::F32(2.5)));
}

#[test]
fn test_copy_and_set_memory_ops() {
    let mut store = MetadataStore::new();
    let mut b = GraphBuilder::new(&mut store, "copyset");
    let start = b.add_node(OpCode::Start);
    let mut ctl = start;

    let src = const_node(&mut b, &mut ctl, Value::Ptr(0));
    let val = const_node(&mut b, &mut ctl, Value::U64(0x0102_0304_0506_0708));
    let dst = const_node(&mut b, &mut ctl, Value::Ptr(16));
    let len = const_node(&mut b, &mut ctl, Value::U64(8));
    let fill = const_node(&mut b, &mut ctl, Value::U8(0xEE));

    let store_node = b.add_node(OpCode::Store);
    b.connect_control(ctl, store_node).unwrap();
    b.connect_data(src, 0, store_node, 0).unwrap();
    b.connect_data(val, 0, store_node, 1).unwrap();

    let copy = b.add_node(OpCode::Copy);
    b.connect_control(store_node, copy).unwrap();
    b.connect_data(dst, 0, copy, 0).unwrap();
    b.connect_data(src, 0, copy, 1).unwrap();
    b.connect_data(len, 0, copy, 2).unwrap();

    let set = b.add_node(OpCode::Set);
    b.connect_control(copy, set).unwrap();
    b.connect_data(src, 0, set, 0).unwrap();
    b.connect_data(fill, 0, set, 1).unwrap();
    b.connect_data(len, 0, set, 2).unwrap();

    let end = b.add_node(OpCode::End);
    b.connect_control(set, end).unwrap();

    let graph = b.finalize();
    let mut vm = Interpreter::new(&store, 64);
    vm.execute(&graph, start).unwrap();

    let mut copied = [0u8; 8];
    vm.memory().read(16, &mut copied).unwrap();
    assert_eq!(u64::from_le_bytes(copied), 0x0102_0304_0506_0708);

    let mut filled = [0u8; 8];
    vm.memory().read(0, &mut filled).unwrap();
    assert_eq!(filled, [0xEE; 8]);
}
