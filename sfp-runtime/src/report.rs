use serde::{Deserialize, Serialize};
use sfp_challenges::steiner_forest::SolutionData;
use std::collections::BTreeMap;

/// Outcome of solving one instance file.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct FileStats {
    pub file: String,
    pub num_nodes: usize,
    pub num_terminal_pairs: usize,
    pub cost: f64,
    /// Total weight of the input graph.
    pub graph_weight: f64,
    pub time_ms: f64,
    pub alpha: f64,
    pub solution: SolutionData,
}

impl FileStats {
    /// Share of the graph weight the forest keeps. `0.0` for a weightless graph.
    pub fn ratio(&self) -> f64 {
        if self.graph_weight > 0.0 {
            self.cost / self.graph_weight
        } else {
            0.0
        }
    }

    /// Cheaper wins, equal cost goes to the faster run.
    pub fn is_better_than(&self, other: &FileStats) -> bool {
        self.cost < other.cost || (self.cost == other.cost && self.time_ms < other.time_ms)
    }
}

pub fn markdown_header() -> String {
    [
        "| File | Nodes | Terms | Cost | Ratio | Time (ms) | Best Alpha |",
        "| :--- | :---: | :---: | :---: | :---: | :---: | :---: |",
    ]
    .join("\n")
}

pub fn markdown_row(stats: &FileStats) -> String {
    format!(
        "| {} | {} | {} | {:.2} | {:.4} | {:.2} | {:.1} |",
        stats.file,
        stats.num_nodes,
        stats.num_terminal_pairs,
        stats.cost,
        stats.ratio(),
        stats.time_ms,
        stats.alpha
    )
}

/// Aggregate over a batch of files.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Summary {
    pub source: String,
    pub count: usize,
    pub min_nodes: usize,
    pub max_nodes: usize,
    pub max_ratio: f64,
    pub min_ratio: f64,
    pub best_alpha: f64,
    pub best_alpha_wins: usize,
}

impl Summary {
    /// `None` for an empty batch. The most frequent alpha breaks ties
    /// towards the smaller value; zero ratios are left out of the minimum.
    pub fn from_stats(source: &str, stats: &[FileStats]) -> Option<Self> {
        let first = stats.first()?;
        let mut summary = Summary {
            source: source.to_string(),
            count: stats.len(),
            min_nodes: first.num_nodes,
            max_nodes: first.num_nodes,
            max_ratio: f64::MIN,
            min_ratio: f64::MAX,
            best_alpha: 0.0,
            best_alpha_wins: 0,
        };
        let mut alpha_wins: BTreeMap<i64, usize> = BTreeMap::new();
        for s in stats {
            summary.min_nodes = summary.min_nodes.min(s.num_nodes);
            summary.max_nodes = summary.max_nodes.max(s.num_nodes);
            let ratio = s.ratio();
            summary.max_ratio = summary.max_ratio.max(ratio);
            if ratio > 0.0 {
                summary.min_ratio = summary.min_ratio.min(ratio);
            }
            *alpha_wins.entry((s.alpha * 10.0).round() as i64).or_default() += 1;
        }
        for (&key, &wins) in &alpha_wins {
            if wins > summary.best_alpha_wins {
                summary.best_alpha_wins = wins;
                summary.best_alpha = key as f64 / 10.0;
            }
        }
        Some(summary)
    }

    pub fn to_markdown(&self) -> String {
        [
            "### Summary Report".to_string(),
            "| Source | Count | Nodes | Max Ratio | Min Ratio | Most Freq Alpha |".to_string(),
            "| :--- | :---: | :---: | :---: | :---: | :---: |".to_string(),
            format!(
                "| {} | {} | {}-{} | {:.4} | {:.4} | {:.1} ({} wins) |",
                self.source,
                self.count,
                self.min_nodes,
                self.max_nodes,
                self.max_ratio,
                self.min_ratio,
                self.best_alpha,
                self.best_alpha_wins
            ),
        ]
        .join("\n")
    }
}

/// Full batch output for `--format json`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Report {
    pub files: Vec<FileStats>,
    pub summary: Option<Summary>,
}
