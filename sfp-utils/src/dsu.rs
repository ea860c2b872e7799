/// Disjoint Set Union with path compression and union by rank.
///
/// Meant to be reset and refilled many times; [`Dsu::reset`] never
/// reallocates.
#[derive(Debug, Clone)]
pub struct Dsu {
    parent: Vec<usize>,
    rank: Vec<u32>,
    components: usize,
}

impl Dsu {
    pub fn new(num_nodes: usize) -> Self {
        let mut dsu = Self {
            parent: vec![0; num_nodes],
            rank: vec![0; num_nodes],
            components: num_nodes,
        };
        dsu.reset();
        dsu
    }

    pub fn reset(&mut self) {
        for (i, p) in self.parent.iter_mut().enumerate() {
            *p = i;
        }
        self.rank.fill(0);
        self.components = self.parent.len();
    }

    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    pub fn components(&self) -> usize {
        self.components
    }

    pub fn find(&mut self, i: usize) -> usize {
        let mut root = i;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut node = i;
        while self.parent[node] != root {
            let next = self.parent[node];
            self.parent[node] = root;
            node = next;
        }
        root
    }

    /// Merges the sets of `a` and `b`. Returns false if they were already
    /// in the same set.
    pub fn unite(&mut self, a: usize, b: usize) -> bool {
        let root_a = self.find(a);
        let root_b = self.find(b);
        if root_a == root_b {
            return false;
        }
        if self.rank[root_a] < self.rank[root_b] {
            self.parent[root_a] = root_b;
        } else {
            // equal ranks: `a`'s root wins
            self.parent[root_b] = root_a;
            if self.rank[root_a] == self.rank[root_b] {
                self.rank[root_a] += 1;
            }
        }
        self.components -= 1;
        true
    }

    pub fn is_connected(&mut self, a: usize, b: usize) -> bool {
        self.find(a) == self.find(b)
    }
}
