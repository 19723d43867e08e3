//! Builder-to-serializer integration: invariants and round-trip stability

use bdi_core::{
    BdiType, Graph, GraphBuilder, Metadata, MetadataStore, NodeId, OpCode, PortRef, Value,
};

/// A graph touching most field shapes: payloads of several types, named and
/// unnamed ports, metadata handles, regions, branching control flow
fn build_rich_graph(store: &mut MetadataStore) -> (Graph, Vec<NodeId>) {
    let mut b = GraphBuilder::new(store, "rich");
    let start = b.add_node(OpCode::Start);

    let cond = b.add_node_named(OpCode::Nop, "condition input");
    b.set_payload(cond, Value::Bool(true).to_payload());
    b.define_output_named(cond, 0, BdiType::Bool, "cond");

    let f = b.add_node(OpCode::Nop);
    b.set_payload(f, Value::F64(-0.25).to_payload());
    b.define_output(f, 0, BdiType::F64);

    let p = b.add_node(OpCode::Nop);
    b.set_payload(p, Value::Ptr(0x10).to_payload());
    b.define_output(p, 0, BdiType::Pointer);

    let branch = b.add_node(OpCode::BranchCond);
    b.connect_data(cond, 0, branch, 0).unwrap();

    let neg = b.add_node(OpCode::Neg);
    b.define_output(neg, 0, BdiType::F64);
    b.connect_data(f, 0, neg, 0).unwrap();

    let end = b.add_node(OpCode::End);
    b.connect_control(start, cond).unwrap();
    b.connect_control(cond, f).unwrap();
    b.connect_control(f, p).unwrap();
    b.connect_control(p, branch).unwrap();
    b.connect_control(branch, neg).unwrap();
    b.connect_control(branch, end).unwrap();
    b.connect_control(neg, end).unwrap();

    b.set_metadata(
        neg,
        Metadata::HardwareHints {
            cache: bdi_core::CacheHint::L1,
            compute_unit: 2,
            simd_aligned: true,
        },
    );

    let graph = b.finalize();
    (graph, vec![start, cond, f, p, branch, neg, end])
}

#[test]
fn test_builder_graph_satisfies_invariants() {
    let mut store = MetadataStore::new();
    let (graph, ids) = build_rich_graph(&mut store);

    assert!(graph.validate().is_ok());

    // I1: every bound input points at a live node with that output declared
    for (_, node) in graph.iter() {
        for input in &node.data_inputs {
            if input.is_unbound() {
                continue;
            }
            let src = graph.node(input.node).expect("live producer");
            assert!((input.port as usize) < src.data_outputs.len());
        }
    }

    // I2: control edges symmetric, no duplicates
    for (&id, node) in graph.iter() {
        for &succ in &node.control_outputs {
            assert!(graph.node(succ).unwrap().control_inputs.contains(&id));
            assert_eq!(node.control_outputs.iter().filter(|&&s| s == succ).count(), 1);
        }
    }

    // I3: payload length agrees with its type
    for (_, node) in graph.iter() {
        assert!(node.payload.is_void() || node.payload.is_valid());
    }

    // I4: next_id beyond every existing id; ids unique by construction
    let max_id = ids.iter().copied().max().unwrap();
    assert!(graph.next_id() > max_id);
}

#[test]
fn test_binary_round_trip_preserves_everything() {
    let mut store = MetadataStore::new();
    let (graph, ids) = build_rich_graph(&mut store);

    let bytes = graph.to_bytes();
    let loaded = Graph::from_bytes(&bytes).unwrap();
    assert_eq!(loaded, graph);
    assert!(loaded.validate().is_ok());

    // Field-level spot checks on a node with payload, name, and metadata
    let cond = ids[1];
    let node = loaded.node(cond).unwrap();
    assert_eq!(node.op, OpCode::Nop);
    assert_eq!(Value::from_payload(&node.payload), Value::Bool(true));
    assert_eq!(node.data_outputs[0].name, "cond");
    assert_ne!(node.metadata, 0);

    // Serialization is deterministic
    assert_eq!(loaded.to_bytes(), bytes);
}

#[test]
fn test_round_trip_then_extend() {
    let mut store = MetadataStore::new();
    let (graph, _) = build_rich_graph(&mut store);
    let mut loaded = Graph::from_bytes(&graph.to_bytes()).unwrap();

    // A graph rebuilt from disk keeps allocating fresh ids
    let fresh = loaded.add_node(OpCode::Nop);
    assert!(graph.node(fresh).is_none());
    assert!(loaded.node(fresh).is_some());
}

#[test]
fn test_json_matches_binary_content() {
    let mut store = MetadataStore::new();
    let (graph, _) = build_rich_graph(&mut store);

    let from_json = Graph::from_json(&graph.to_json().unwrap()).unwrap();
    let from_bytes = Graph::from_bytes(&graph.to_bytes()).unwrap();
    assert_eq!(from_json, from_bytes);
}

#[test]
fn test_removal_keeps_round_trip_stable() {
    let mut store = MetadataStore::new();
    let (mut graph, ids) = build_rich_graph(&mut store);

    // Drop the NEG node: its consumers' slots unbind, control edges heal
    assert!(graph.remove_node(ids[5]));
    assert!(graph.validate().is_ok());
    let loaded = Graph::from_bytes(&graph.to_bytes()).unwrap();
    assert_eq!(loaded, graph);
    assert!(loaded
        .iter()
        .all(|(_, n)| n.data_inputs.iter().all(|r| r.is_unbound() || loaded.contains(r.node))));
}

#[test]
fn test_unbound_inputs_survive_round_trip() {
    let mut store = MetadataStore::new();
    let mut b = GraphBuilder::new(&mut store, "unbound");
    let src = b.add_node(OpCode::Nop);
    b.set_payload(src, Value::I32(1).to_payload());
    b.define_output(src, 0, BdiType::I32);
    let add = b.add_node(OpCode::Add);
    // Only slot 1 bound; slot 0 stays the unbound sentinel
    b.connect_data(src, 0, add, 1).unwrap();
    let graph = b.finalize();

    let loaded = Graph::from_bytes(&graph.to_bytes()).unwrap();
    let inputs = &loaded.node(add).unwrap().data_inputs;
    assert_eq!(inputs[0], PortRef::UNBOUND);
    assert_eq!(inputs[1], PortRef::new(src, 0));
}
