use serde_json::json;

use refpack_core::{Error, Node, Refs, RefEntry, Location, LocationKind, ValueGraph};

fn entry(location: Location, value: serde_json::Value) -> RefEntry {
    RefEntry {
        location,
        raw: value.to_string().into_bytes(),
        value,
        circular: false,
        reader: None,
        parser: None,
    }
}

#[test]
fn shared_child_expands_to_duplicated_subtrees() {
    let mut graph = ValueGraph::new();
    let shared = graph.alloc(Node::String("same".to_string()));
    let root = graph.alloc(Node::Object(vec![
        ("a".to_string(), shared),
        ("b".to_string(), shared),
    ]));
    graph.set_root(root);

    assert_eq!(graph.to_value().unwrap(), json!({"a": "same", "b": "same"}));
    assert_eq!(graph.node_at("#/a"), graph.node_at("#/b"));
}

#[test]
fn cyclic_graph_cannot_become_a_tree() {
    let mut graph = ValueGraph::new();
    let root = graph.alloc(Node::Null);
    graph.replace(root, Node::Object(vec![("self".to_string(), root)]));
    graph.set_root(root);

    let err = graph.to_value().unwrap_err();
    assert!(matches!(err, Error::CircularReference { .. }));
    assert_eq!(err.to_string(), "Circular $ref pointer found at #/self");
}

#[test]
fn node_at_walks_arrays_and_objects() {
    let mut graph = ValueGraph::new();
    let leaf = graph.alloc(Node::Bool(true));
    let arr = graph.alloc(Node::Array(vec![leaf]));
    let root = graph.alloc(Node::Object(vec![("items".to_string(), arr)]));
    graph.set_root(root);

    assert_eq!(graph.node_at("#/items/0"), Some(leaf));
    assert_eq!(graph.node_at("#"), Some(root));
    assert_eq!(graph.node_at("#/items/1"), None);
    assert_eq!(graph.node_at("#/missing"), None);
}

#[test]
fn unresolved_ref_nodes_serialize_back_to_ref_objects() {
    let mut graph = ValueGraph::new();
    let r = graph.alloc(Node::Ref("#/loop".to_string()));
    let root = graph.alloc(Node::Object(vec![("loop".to_string(), r)]));
    graph.set_root(root);

    assert_eq!(
        graph.to_value().unwrap(),
        json!({"loop": {"$ref": "#/loop"}})
    );
}

#[test]
fn rootless_graph_expands_to_null() {
    let graph = ValueGraph::new();

    assert_eq!(graph.root(), None);
    assert_eq!(graph.node_at("#"), None);
    assert_eq!(graph.node_at("#/a"), None);
    assert_eq!(graph.to_value().unwrap(), json!(null));
}

#[test]
fn registry_keeps_the_first_entry_per_location() {
    let loc = Location::File("/docs/a.json".into());
    let mut refs = Refs::new();
    refs.insert(entry(loc.clone(), json!({"v": 1})));
    refs.insert(entry(loc.clone(), json!({"v": 2})));

    assert_eq!(refs.len(), 1);
    assert_eq!(refs.get(&loc).unwrap().value, json!({"v": 1}));
}

#[test]
fn paths_enumerate_discovery_order_and_filter_by_kind() {
    let mut refs = Refs::new();
    refs.insert(entry(Location::Memory("/work".into()), json!({})));
    refs.insert(entry(Location::File("/docs/b.json".into()), json!({})));
    refs.insert(entry(
        Location::canonicalize("https://example.com/c.json", None).unwrap(),
        json!({}),
    ));

    assert_eq!(
        refs.paths(&[]),
        ["/work", "/docs/b.json", "https://example.com/c.json"]
    );
    assert_eq!(refs.paths(&[LocationKind::File]), ["/docs/b.json"]);
    assert_eq!(refs.paths(&[LocationKind::Url]), ["https://example.com/c.json"]);
}

#[test]
fn mark_circular_flags_run_and_entry_once() {
    let loc = Location::File("/docs/a.json".into());
    let mut refs = Refs::new();
    refs.insert(entry(loc.clone(), json!({})));

    refs.mark_circular(&loc, "/docs/a.json#/self".to_string());
    refs.mark_circular(&loc, "/docs/a.json#/self".to_string());

    assert!(refs.circular);
    assert!(refs.get(&loc).unwrap().circular);
    assert_eq!(refs.circular_refs, ["/docs/a.json#/self"]);
}
