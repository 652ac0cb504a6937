use std::env;
use std::fs::File;
use std::io::Write;

use markov_core::model::graph::{SENTENCE_ORDER, TransitionGraph};
use markov_core::model::snapshot::GraphSnapshot;

/// Escapes a label for a double-quoted DOT string.
fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Writes the snapshot as a Graphviz digraph.
///
/// One node per registry entry (window keys rendered with their slots
/// joined by `|`), one edge per `(destination, weight)` pair with the
/// weight as the edge label. Works purely from the snapshot, with no
/// knowledge of training or generation.
fn write_dot(snapshot: &GraphSnapshot, out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out, "digraph markov {{")?;
    writeln!(out, "\trankdir=LR;")?;

    for node in &snapshot.nodes {
        let from = escape(&node.key.to_string());
        writeln!(out, "\t\"{from}\";")?;
        for edge in &node.edges {
            let to = escape(&edge.to);
            writeln!(out, "\t\"{from}\" -> \"{to}\" [label=\"{}\"];", edge.weight)?;
        }
    }

    writeln!(out, "}}")
}

/// Trains a graph from a text file and renders it as DOT.
///
/// Usage: `markov-viz <input-file> <order> [output.dot]`
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        return Err("Usage: markov-viz <input-file> <order> [output.dot]".into());
    }

    let order: i32 = args[2].parse()?;
    if order < 1 && order != SENTENCE_ORDER {
        return Err("Order must be greater than zero or -1".into());
    }

    let mut graph = TransitionGraph::new(order);
    graph.train_file(&args[1])?;

    let snapshot = graph.snapshot();
    let output = args.get(3).map(String::as_str).unwrap_or("markov.dot");
    let mut file = File::create(output)?;
    write_dot(&snapshot, &mut file)?;

    println!("Rendered {} nodes to {output}", snapshot.nodes.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dot_output_lists_nodes_and_weighted_edges() {
        let mut graph = TransitionGraph::new(2);
        graph.train_ngram("the quick quick");

        let mut out = Vec::new();
        write_dot(&graph.snapshot(), &mut out).unwrap();
        let dot = String::from_utf8(out).unwrap();

        assert!(dot.starts_with("digraph markov {"));
        assert!(dot.contains("\"the\" -> \"quick\" [label=\"1\"];"));
        assert!(dot.contains("\"quick\" -> \"quick\" [label=\"1\"];"));
        assert!(dot.contains("\"<none>|the\" -> \"quick\""));
        assert!(dot.ends_with("}\n"));
    }

    #[test]
    fn quotes_are_escaped() {
        assert_eq!(escape("say \"hi\""), "say \\\"hi\\\"");
    }
}
