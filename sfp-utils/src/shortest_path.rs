use crate::Graph;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Edge indices from source to target plus their total weight.
///
/// An unreachable target yields an empty path with a negative cost.
#[derive(Debug, Clone, PartialEq)]
pub struct ShortestPath {
    pub edges: Vec<usize>,
    pub cost: f64,
}

impl ShortestPath {
    pub const UNREACHABLE_COST: f64 = -1.0;

    pub fn unreachable() -> Self {
        Self {
            edges: Vec::new(),
            cost: Self::UNREACHABLE_COST,
        }
    }

    pub fn is_reachable(&self) -> bool {
        self.cost >= 0.0
    }
}

#[derive(Debug, Clone, Copy)]
struct HeapEntry {
    dist: f64,
    node: usize,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // reversed: BinaryHeap is a max-heap
        other
            .dist
            .total_cmp(&self.dist)
            .then_with(|| other.node.cmp(&self.node))
    }
}

/// Point-to-point Dijkstra with scratch memory kept between queries.
///
/// `dist[v]` and `parent[v]` are only meaningful when `token[v]` equals the
/// current generation, so a query never pays for clearing arrays it does
/// not touch. One engine serves one node count for its whole life and
/// answers one query at a time.
#[derive(Debug, Clone)]
pub struct ShortestPathEngine {
    num_nodes: usize,
    dist: Vec<f64>,
    // (predecessor node, incoming edge index)
    parent: Vec<(usize, usize)>,
    token: Vec<u32>,
    generation: u32,
    heap: BinaryHeap<HeapEntry>,
}

impl ShortestPathEngine {
    pub fn new(num_nodes: usize) -> Self {
        Self {
            num_nodes,
            dist: vec![0.0; num_nodes],
            parent: vec![(usize::MAX, usize::MAX); num_nodes],
            token: vec![0; num_nodes],
            generation: 0,
            heap: BinaryHeap::new(),
        }
    }

    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    fn next_generation(&mut self) {
        if self.generation == u32::MAX {
            self.token.fill(0);
            self.generation = 0;
        }
        self.generation += 1;
    }

    /// Cheapest path from `source` to `target` over the active edges of
    /// `graph`. Runs in O((V + E) log V).
    pub fn shortest_path(&mut self, graph: &Graph, source: usize, target: usize) -> ShortestPath {
        assert_eq!(
            graph.num_nodes(),
            self.num_nodes,
            "engine sized for {} nodes queried on a graph with {}",
            self.num_nodes,
            graph.num_nodes()
        );
        assert!(
            source < self.num_nodes && target < self.num_nodes,
            "query ({}, {}) outside 0..{}",
            source,
            target,
            self.num_nodes
        );

        self.next_generation();
        let generation = self.generation;
        self.heap.clear();

        self.dist[source] = 0.0;
        self.parent[source] = (usize::MAX, usize::MAX);
        self.token[source] = generation;
        self.heap.push(HeapEntry {
            dist: 0.0,
            node: source,
        });

        let ptrs = graph.ptrs();
        let edges = graph.edges();
        let mut found = false;
        while let Some(HeapEntry { dist: d, node: u }) = self.heap.pop() {
            if d > self.dist[u] {
                continue;
            }
            // only a popped target is final
            if u == target {
                found = true;
                break;
            }
            for i in ptrs[u]..ptrs[u + 1] {
                let edge = &edges[i];
                if !edge.active {
                    continue;
                }
                let v = edge.target;
                let new_dist = d + edge.weight;
                if self.token[v] != generation || new_dist < self.dist[v] {
                    self.token[v] = generation;
                    self.dist[v] = new_dist;
                    self.parent[v] = (u, i);
                    self.heap.push(HeapEntry {
                        dist: new_dist,
                        node: v,
                    });
                }
            }
        }

        if !found {
            return ShortestPath::unreachable();
        }

        let mut path = Vec::new();
        let mut node = target;
        while node != source {
            let (prev, edge_idx) = self.parent[node];
            path.push(edge_idx);
            node = prev;
        }
        path.reverse();
        ShortestPath {
            edges: path,
            cost: self.dist[target],
        }
    }
}
