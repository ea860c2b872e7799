use anyhow::{anyhow, Result};
use sfp_challenges::steiner_forest::Instance;
use sfp_utils::dejsonify;
use std::fmt::Write;
use std::fs;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Section {
    None,
    Graph,
    Terminals,
}

/// Parses the STP text format. Node ids are 1-based in the file and 0-based
/// in the returned instance. Unknown tokens are skipped.
pub fn parse(text: &str) -> Result<Instance> {
    let mut tokens = text.split_whitespace();
    let mut section = Section::None;
    let mut instance = Instance::default();

    while let Some(token) = tokens.next() {
        match token {
            "SECTION" => {
                let name = tokens
                    .next()
                    .ok_or_else(|| anyhow!("SECTION without a name"))?;
                section = if name.contains("Graph") {
                    Section::Graph
                } else if name.contains("Terminals") {
                    Section::Terminals
                } else {
                    Section::None
                };
            }
            "END" => section = Section::None,
            "Nodes" if section == Section::Graph => {
                instance.num_nodes = next_value(&mut tokens, "Nodes")?;
            }
            "Edges" if section == Section::Graph => {
                let num_edges: usize = next_value(&mut tokens, "Edges")?;
                instance.edges.reserve(num_edges);
            }
            "E" if section == Section::Graph => {
                let source = next_node(&mut tokens, "E")?;
                let target = next_node(&mut tokens, "E")?;
                let weight: f64 = next_value(&mut tokens, "E")?;
                instance.edges.push((source, target, weight));
            }
            "Terminals" if section == Section::Terminals => {
                let num_pairs: usize = next_value(&mut tokens, "Terminals")?;
                instance.terminal_pairs.reserve(num_pairs);
            }
            "TP" if section == Section::Terminals => {
                let u = next_node(&mut tokens, "TP")?;
                let v = next_node(&mut tokens, "TP")?;
                instance.terminal_pairs.push((u, v));
            }
            _ => {}
        }
    }

    if instance.num_nodes == 0 {
        return Err(anyhow!("Missing or zero Nodes count"));
    }
    if instance.edges.is_empty() {
        return Err(anyhow!("No edges found"));
    }
    Ok(instance)
}

/// Inverse of [`parse`].
pub fn write(instance: &Instance) -> String {
    let mut out = String::new();
    // writing into a String cannot fail
    let _ = writeln!(out, "SECTION Graph");
    let _ = writeln!(out, "Nodes {}", instance.num_nodes);
    let _ = writeln!(out, "Edges {}", instance.edges.len());
    for &(u, v, w) in &instance.edges {
        let _ = writeln!(out, "E {} {} {}", u + 1, v + 1, w);
    }
    let _ = writeln!(out, "END");
    let _ = writeln!(out);
    let _ = writeln!(out, "SECTION Terminals");
    let _ = writeln!(out, "Terminals {}", instance.terminal_pairs.len());
    for &(u, v) in &instance.terminal_pairs {
        let _ = writeln!(out, "TP {} {}", u + 1, v + 1);
    }
    let _ = writeln!(out, "END");
    let _ = writeln!(out);
    let _ = writeln!(out, "EOF");
    out
}

/// Loads a `.stp` or `.json` instance and names it after the file stem.
pub fn load(path: &Path) -> Result<Instance> {
    let text = fs::read_to_string(path)
        .map_err(|e| anyhow!("Failed to read {}: {}", path.display(), e))?;
    let mut instance = match path.extension().and_then(|e| e.to_str()) {
        Some("stp") => parse(&text),
        Some("json") => dejsonify::<Instance>(&text).map_err(|e| anyhow!(e)),
        _ => Err(anyhow!("Unsupported file extension")),
    }
    .map_err(|e| anyhow!("Failed to parse {}: {}", path.display(), e))?;
    if instance.name.is_empty() {
        instance.name = file_name(path);
    }
    Ok(instance)
}

pub fn is_instance_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("stp") | Some("json")
    )
}

pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn next_value<'a, T: FromStr>(tokens: &mut impl Iterator<Item = &'a str>, key: &str) -> Result<T> {
    let token = tokens
        .next()
        .ok_or_else(|| anyhow!("Unexpected end of input after {}", key))?;
    token
        .parse::<T>()
        .map_err(|_| anyhow!("Invalid value '{}' after {}", token, key))
}

fn next_node<'a>(tokens: &mut impl Iterator<Item = &'a str>, key: &str) -> Result<usize> {
    let id: usize = next_value(tokens, key)?;
    id.checked_sub(1)
        .ok_or_else(|| anyhow!("Node ids are 1-based, found 0 after {}", key))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "33D32945 STP File, STP Format Version 1.0

SECTION Comment
Name \"sample\"
END

SECTION Graph
Nodes 4
Edges 3
E 1 2 10
E 2 3 2.5
E 3 4 7
END

SECTION Terminals
Terminals 2
TP 1 3
TP 2 4
END

EOF
";

    #[test]
    fn test_parse_sample() {
        let instance = parse(SAMPLE).unwrap();
        assert_eq!(instance.num_nodes, 4);
        assert_eq!(
            instance.edges,
            vec![(0, 1, 10.0), (1, 2, 2.5), (2, 3, 7.0)]
        );
        assert_eq!(instance.terminal_pairs, vec![(0, 2), (1, 3)]);
    }

    #[test]
    fn test_write_then_parse_matches() {
        let instance = parse(SAMPLE).unwrap();
        let again = parse(&write(&instance)).unwrap();
        assert_eq!(again.num_nodes, instance.num_nodes);
        assert_eq!(again.edges, instance.edges);
        assert_eq!(again.terminal_pairs, instance.terminal_pairs);
    }

    #[test]
    fn test_tokens_outside_sections_are_ignored() {
        let text = "E 9 9 9\nSECTION Graph\nNodes 2\nE 1 2 1\nEND\nTP 1 2\n";
        let instance = parse(text).unwrap();
        assert_eq!(instance.edges, vec![(0, 1, 1.0)]);
        assert!(instance.terminal_pairs.is_empty());
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse("").is_err());
        assert!(parse("SECTION Graph\nNodes 2\nEND\n").is_err());
        assert!(parse("SECTION Graph\nNodes 2\nE 0 1 3\nEND\n").is_err());
        assert!(parse("SECTION Graph\nNodes 2\nE 1 2 heavy\nEND\n").is_err());
        assert!(parse("SECTION Graph\nNodes 2\nE 1 2").is_err());
        assert!(parse("SECTION").is_err());
    }

    #[test]
    fn test_instance_file_filter() {
        assert!(is_instance_file(Path::new("data/b01.stp")));
        assert!(is_instance_file(Path::new("b01.json")));
        assert!(!is_instance_file(Path::new("README.md")));
        assert!(!is_instance_file(Path::new("stp")));
        assert_eq!(file_name(Path::new("data/b01.stp")), "b01.stp");
    }
}
