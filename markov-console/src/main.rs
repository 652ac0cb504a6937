use std::io::{self, BufRead, Write};

use markov_core::model::graph::{SENTENCE_ORDER, TransitionGraph};

/// Parses and applies an in-band command, if `input` is one.
///
/// Commands:
/// - `_o <k>`: replace the model with a fresh graph of order `k`
///   (k >= 1, or -1 for sentence mode); previous training is erased
/// - `_t <path>`: bulk train from a text file
///
/// Returns false when `input` is regular chat text.
fn handle_command(graph: &mut TransitionGraph, input: &str) -> bool {
    if let Some(rest) = input.strip_prefix("_o ") {
        match rest.trim().parse::<i32>() {
            Ok(k) if k >= 1 || k == SENTENCE_ORDER => {
                // Whole-model replacement, never an in-place order change
                *graph = TransitionGraph::new(k);
                println!("Model remade with order k={k} (training erased)");
            }
            _ => println!("Order must be greater than zero or -1"),
        }
        return true;
    }

    if let Some(rest) = input.strip_prefix("_t ") {
        match graph.train_file(rest.trim()) {
            Ok(added) => println!("Added {added} nodes"),
            Err(e) => println!("Training failed: {e}"),
        }
        return true;
    }

    false
}

/// Line-driven session: every plain input line trains the model,
/// then the model answers with a generated sequence.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut graph = TransitionGraph::new(2);

    println!("Start typing to train and chat with the bot! Or, press enter to make it generate a sentence.");
    println!("Type _e to exit, _o <k> to remake the model, _t <path> to train from a file");

    let stdin = io::stdin();
    loop {
        print!("You: ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();

        if input == "_e" {
            break;
        }
        if handle_command(&mut graph, input) {
            continue;
        }

        if !input.is_empty() {
            graph.train(input);
        }
        println!("AI: {}", graph.generate(25, None, true));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_command_replaces_the_model() {
        let mut graph = TransitionGraph::new(2);
        graph.train_ngram("one two three");

        assert!(handle_command(&mut graph, "_o -1"));
        assert_eq!(graph.order(), SENTENCE_ORDER);
        assert_eq!(graph.size(), 0);
    }

    #[test]
    fn invalid_order_keeps_the_model() {
        let mut graph = TransitionGraph::new(2);
        graph.train_ngram("one two three");

        assert!(handle_command(&mut graph, "_o 0"));
        assert_eq!(graph.order(), 2);
        assert_eq!(graph.size(), 3);
    }

    #[test]
    fn chat_text_is_not_a_command() {
        let mut graph = TransitionGraph::new(2);
        assert!(!handle_command(&mut graph, "hello there"));
    }
}
