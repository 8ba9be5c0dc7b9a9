//! Builds a small red-black tree, prints it and exports it as Graphviz.
//!
//! Usage: `main [OUTPUT.dot]`, default `halo.dot`.
//! Set `BALANCED_TREE_LOG` to a level (`trace`, `debug`, ...) for more output.

use std::error::Error;

use balanced_tree::RedBlackTree;
use log::{info, LevelFilter};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

fn main() -> Result<(), Box<dyn Error>> {
    let level = std::env::var("BALANCED_TREE_LOG")
        .ok()
        .and_then(|level| level.parse().ok())
        .unwrap_or(LevelFilter::Info);
    TermLogger::init(level, Config::default(), TerminalMode::Mixed, ColorChoice::Auto)?;

    let path = std::env::args().nth(1).unwrap_or_else(|| "halo.dot".to_owned());

    let mut tree = RedBlackTree::new();
    for c in ['h', 'a', 'l', 'o'] {
        tree.insert(c)?;
    }
    tree.check_invariants()?;

    println!("{}", tree.pretty_print());
    tree.export_dot(&path)?;
    info!("wrote {} nodes to {path}", tree.len());

    Ok(())
}
