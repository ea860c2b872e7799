use sfp_utils::Graph;

fn triangle() -> Graph {
    Graph::new(3, &[(0, 1, 10.0), (1, 2, 10.0), (0, 2, 5.0)], true).unwrap()
}

fn active_canonical_weight(g: &Graph) -> f64 {
    g.canonical_edges()
        .filter(|&i| g.edge(i).active)
        .map(|i| g.edge(i).weight)
        .sum()
}

#[test]
fn test_csr_layout() {
    let g = triangle();
    assert_eq!(g.num_nodes(), 3);
    assert_eq!(g.num_edges(), 6);
    assert_eq!(g.ptrs(), &[0, 2, 4, 6]);
    for node in 0..3 {
        for i in g.edge_range(node) {
            assert_eq!(g.edge(i).source, node);
        }
    }
    assert_eq!(g.total_weight(), 25.0);
}

#[test]
fn test_reverse_links() {
    let g = triangle();
    for (i, edge) in g.edges().iter().enumerate() {
        let reverse = edge.reverse.unwrap();
        assert_eq!(g.edge(reverse).reverse, Some(i));
        assert_eq!(g.edge(reverse).source, edge.target);
        assert_eq!(g.edge(reverse).target, edge.source);
        assert_eq!(g.edge(reverse).weight, edge.weight);
    }
}

#[test]
fn test_parallel_edges_have_distinct_twins() {
    let g = Graph::new(2, &[(0, 1, 3.0), (0, 1, 7.0)], true).unwrap();
    let twins: Vec<usize> = g.edge_range(0).map(|i| g.edge(i).reverse.unwrap()).collect();
    assert_ne!(twins[0], twins[1]);
    for i in g.edge_range(0) {
        let reverse = g.edge(i).reverse.unwrap();
        assert_eq!(g.edge(reverse).weight, g.edge(i).weight);
    }
}

#[test]
fn test_canonical_edges() {
    let g = triangle();
    let canonical: Vec<usize> = g.canonical_edges().collect();
    assert_eq!(canonical.len(), 3);
    for i in canonical {
        assert!(g.edge(i).source < g.edge(i).target);
        assert_eq!(g.canonical(g.edge(i).reverse.unwrap()), i);
    }
}

#[test]
fn test_set_edge_status_mirrors_reverse() {
    let mut g = triangle();
    let idx = g.get_edge(0, 1).unwrap();
    let reverse = g.edge(idx).reverse.unwrap();

    g.set_edge_status(idx, false);
    assert!(!g.edge(idx).active);
    assert!(!g.edge(reverse).active);
    assert_eq!(g.total_weight(), active_canonical_weight(&g));
    assert_eq!(g.total_weight(), 15.0);

    // idempotent
    g.set_edge_status(reverse, false);
    assert_eq!(g.total_weight(), 15.0);

    g.set_edge_status(reverse, true);
    assert!(g.edge(idx).active);
    assert!(g.edge(reverse).active);
    assert_eq!(g.total_weight(), active_canonical_weight(&g));
    assert_eq!(g.total_weight(), 25.0);
}

#[test]
fn test_set_all_edges_status() {
    let mut g = triangle();
    g.set_all_edges_status(false);
    assert_eq!(g.total_weight(), 0.0);
    assert!(g.edges().iter().all(|e| !e.active));
    g.set_all_edges_status(true);
    assert_eq!(g.total_weight(), 25.0);
}

#[test]
fn test_set_edge_weight_mirrors_reverse() {
    let mut g = triangle();
    let idx = g.get_edge(2, 1).unwrap();
    g.set_edge_weight(idx, 0.0);
    assert_eq!(g.edge(g.edge(idx).reverse.unwrap()).weight, 0.0);
    assert_eq!(g.total_weight(), 15.0);
}

#[test]
fn test_infinite_weight_round_trip_keeps_total() {
    let mut g = triangle();
    let idx = g.get_edge(0, 1).unwrap();
    g.set_edge_weight(idx, f64::INFINITY);
    assert!(g.total_weight().is_infinite());
    g.set_edge_weight(idx, 10.0);
    assert_eq!(g.total_weight(), 25.0);
    assert_eq!(g.total_weight(), active_canonical_weight(&g));
}

#[test]
fn test_get_edge() {
    let g = triangle();
    let idx = g.get_edge(1, 2).unwrap();
    assert_eq!(g.edge(idx).source, 1);
    assert_eq!(g.edge(idx).target, 2);
    let g = Graph::new(3, &[(0, 1, 1.0)], true).unwrap();
    assert_eq!(g.get_edge(0, 2), None);
}

#[test]
fn test_directed_graph() {
    let g = Graph::new(3, &[(0, 1, 1.0), (1, 2, 1.0)], false).unwrap();
    assert_eq!(g.num_edges(), 2);
    assert!(g.edges().iter().all(|e| e.reverse.is_none()));
    assert!(g.is_reachable(0, 2));
    assert!(!g.is_reachable(2, 0));
    assert!(g.is_connected());
}

#[test]
fn test_reachability_and_connectivity() {
    let mut g = Graph::new(4, &[(0, 1, 1.0), (1, 2, 1.0), (2, 3, 1.0)], true).unwrap();
    assert!(g.is_connected());
    assert!(g.is_reachable(0, 3));
    let idx = g.get_edge(1, 2).unwrap();
    g.set_edge_status(idx, false);
    assert!(!g.is_connected());
    assert!(!g.is_reachable(0, 3));
    assert!(g.is_reachable(3, 2));
}

#[test]
fn test_negative_weights() {
    let g = Graph::new(2, &[(0, 1, -1.0)], true).unwrap();
    assert!(g.has_negative_weights());
    assert!(!triangle().has_negative_weights());
}

#[test]
fn test_invalid_construction() {
    assert!(Graph::new(0, &[(0, 0, 1.0)], true).is_err());
    assert!(Graph::new(3, &[], true).is_err());
    assert!(Graph::new(3, &[(0, 3, 1.0)], true).is_err());
    assert!(Graph::new(3, &[(0, 1, f64::NAN)], true).is_err());
}

#[test]
#[should_panic]
fn test_out_of_range_edge_index() {
    let mut g = triangle();
    g.set_edge_status(6, false);
}

#[test]
fn test_display_lists_active_edges() {
    let mut g = triangle();
    let idx = g.get_edge(0, 2).unwrap();
    g.set_edge_status(idx, false);
    let text = g.to_string();
    assert!(text.contains("Node 0 -> {Target 1, Weight 10};"));
    assert!(!text.contains("Target 2, Weight 5"));
}
