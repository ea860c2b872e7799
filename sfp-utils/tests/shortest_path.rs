use sfp_utils::{Graph, ShortestPath, ShortestPathEngine};

#[test]
fn test_prefers_direct_cheaper_edge() {
    let g = Graph::new(3, &[(0, 1, 10.0), (1, 2, 10.0), (0, 2, 5.0)], true).unwrap();
    let mut engine = ShortestPathEngine::new(3);
    let path = engine.shortest_path(&g, 0, 2);
    assert_eq!(path.cost, 5.0);
    assert_eq!(path.edges, vec![g.get_edge(0, 2).unwrap()]);
}

#[test]
fn test_path_is_ordered_source_to_target() {
    let g = Graph::new(
        5,
        &[(0, 1, 1.0), (1, 2, 1.0), (2, 3, 1.0), (3, 4, 1.0), (0, 4, 10.0)],
        true,
    )
    .unwrap();
    let mut engine = ShortestPathEngine::new(5);
    let path = engine.shortest_path(&g, 0, 4);
    assert_eq!(path.cost, 4.0);
    let nodes: Vec<(usize, usize)> = path
        .edges
        .iter()
        .map(|&i| (g.edge(i).source, g.edge(i).target))
        .collect();
    assert_eq!(nodes, vec![(0, 1), (1, 2), (2, 3), (3, 4)]);

    let back = engine.shortest_path(&g, 4, 0);
    assert_eq!(back.cost, 4.0);
    assert_eq!(g.edge(back.edges[0]).source, 4);
}

#[test]
fn test_skips_inactive_edges() {
    let mut g = Graph::new(3, &[(0, 1, 10.0), (1, 2, 10.0), (0, 2, 5.0)], true).unwrap();
    g.set_edge_status(g.get_edge(0, 2).unwrap(), false);
    let mut engine = ShortestPathEngine::new(3);
    let path = engine.shortest_path(&g, 0, 2);
    assert_eq!(path.cost, 20.0);
    assert_eq!(path.edges.len(), 2);
}

#[test]
fn test_unreachable_sentinel() {
    let mut g = Graph::new(3, &[(0, 1, 1.0), (1, 2, 1.0)], true).unwrap();
    g.set_edge_status(g.get_edge(1, 2).unwrap(), false);
    let mut engine = ShortestPathEngine::new(3);
    let path = engine.shortest_path(&g, 0, 2);
    assert!(!path.is_reachable());
    assert!(path.edges.is_empty());
    assert!(path.cost < 0.0);
    assert_eq!(path, ShortestPath::unreachable());
}

#[test]
fn test_same_source_and_target() {
    let g = Graph::new(2, &[(0, 1, 1.0)], true).unwrap();
    let mut engine = ShortestPathEngine::new(2);
    let path = engine.shortest_path(&g, 1, 1);
    assert!(path.is_reachable());
    assert!(path.edges.is_empty());
    assert_eq!(path.cost, 0.0);
}

#[test]
fn test_engine_reuse_sees_weight_changes() {
    let mut g = Graph::new(3, &[(0, 1, 10.0), (1, 2, 10.0), (0, 2, 5.0)], true).unwrap();
    let mut engine = ShortestPathEngine::new(3);
    assert_eq!(engine.shortest_path(&g, 0, 2).cost, 5.0);
    g.set_edge_weight(g.get_edge(0, 2).unwrap(), 50.0);
    assert_eq!(engine.shortest_path(&g, 0, 2).cost, 20.0);
    g.set_edge_weight(g.get_edge(0, 1).unwrap(), 0.0);
    g.set_edge_weight(g.get_edge(1, 2).unwrap(), 0.0);
    assert_eq!(engine.shortest_path(&g, 0, 2).cost, 0.0);
    // many queries on the same scratch state
    for _ in 0..1000 {
        assert_eq!(engine.shortest_path(&g, 2, 0).edges.len(), 2);
    }
}

#[test]
fn test_infinite_weights_are_reported() {
    let mut g = Graph::new(2, &[(0, 1, 1.0)], true).unwrap();
    g.set_edge_weight(0, f64::INFINITY);
    let mut engine = ShortestPathEngine::new(2);
    let path = engine.shortest_path(&g, 0, 1);
    assert!(path.cost.is_infinite());
}

#[test]
#[should_panic]
fn test_rejects_other_node_count() {
    let g = Graph::new(3, &[(0, 1, 1.0)], true).unwrap();
    let mut engine = ShortestPathEngine::new(4);
    engine.shortest_path(&g, 0, 1);
}
