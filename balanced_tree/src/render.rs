//! Text and Graphviz renderings of a tree.

use core::fmt;
use std::collections::BTreeMap;

use crate::node::{Color, Meta, NodeRef, Side};

/// A rendered subtree. Every line is exactly `width` characters wide and
/// `anchor` is the column of the subtree root's label.
struct Block {
    lines: Vec<String>,
    width: usize,
    anchor: usize,
}

/// Draws the subtree under `root` with box-drawing connectors, one level
/// per two or three lines. Trailing spaces are trimmed. An empty tree
/// renders as an empty string.
///
/// ```text
/// ┌── 20 ─┐
/// │       │
/// 10      30
/// ```
pub fn pretty<T, M, F>(root: Option<NodeRef<'_, T, M>>, label: F) -> String
where
    M: Meta,
    F: Fn(&T) -> String,
{
    let Some(root) = root else {
        return String::new();
    };

    let block = block(root, &label);
    let lines: Vec<&str> = block.lines.iter().map(|line| line.trim_end()).collect();
    lines.join("\n")
}

fn block<T, M, F>(node: NodeRef<'_, T, M>, label: &F) -> Block
where
    M: Meta,
    F: Fn(&T) -> String,
{
    let mut text = label(node.value());
    if text.is_empty() {
        // connectors need at least one column under every label
        text.push(' ');
    }
    let text_width = text.chars().count();
    let left = node.left().map(|left| block(left, label));
    let right = node.right().map(|right| block(right, label));

    if left.is_none() && right.is_none() {
        return Block {
            lines: vec![text],
            width: text_width,
            anchor: 0,
        };
    }

    let mut top = String::new();
    let mut stem = String::new();
    if let Some(l) = &left {
        top.push_str(&" ".repeat(l.anchor));
        top.push('┌');
        top.push_str(&"─".repeat(l.width - l.anchor));
        top.push(' ');

        stem.push_str(&" ".repeat(l.anchor));
        stem.push('│');
        stem.push_str(&" ".repeat(l.width - l.anchor + 1));
    }

    top.push_str(&text);
    stem.push_str(&" ".repeat(text_width));

    if let Some(r) = &right {
        top.push(' ');
        top.push_str(&"─".repeat(r.anchor + 1));
        top.push('┐');
        top.push_str(&" ".repeat(r.width - r.anchor - 1));

        stem.push_str(&" ".repeat(r.anchor + 2));
        stem.push('│');
        stem.push_str(&" ".repeat(r.width - r.anchor - 1));
    }

    let rows = left
        .as_ref()
        .map_or(0, |l| l.lines.len())
        .max(right.as_ref().map_or(0, |r| r.lines.len()));

    let mut lines = Vec::with_capacity(rows + 2);
    lines.push(top);
    lines.push(stem);
    for i in 0..rows {
        let mut line = String::new();
        if let Some(l) = &left {
            pad_into(&mut line, l.lines.get(i), l.width);
            line.push_str("  ");
        }
        line.push_str(&" ".repeat(text_width));
        if let Some(r) = &right {
            line.push_str("  ");
            pad_into(&mut line, r.lines.get(i), r.width);
        }
        lines.push(line);
    }

    let left_width = left.as_ref().map_or(0, |l| l.width + 2);
    let right_width = right.as_ref().map_or(0, |r| r.width + 2);
    Block {
        lines,
        width: left_width + text_width + right_width,
        anchor: left_width,
    }
}

fn pad_into(line: &mut String, text: Option<&String>, width: usize) {
    let text = text.map_or("", String::as_str);
    line.push_str(text);
    line.push_str(&" ".repeat(width - text.chars().count()));
}

/// Writes the subtree under `root` as a Graphviz digraph.
///
/// Red-black nodes are filled with their color, other nodes green. A node
/// with a single child gets an invisible placeholder for the missing one so
/// that the drawing keeps left and right apart. Nodes of equal depth share
/// a rank.
pub fn dot<T, M, W>(root: Option<NodeRef<'_, T, M>>, mut w: W) -> fmt::Result
where
    T: fmt::Display,
    M: Meta,
    W: fmt::Write,
{
    w.write_str("digraph Tree {\n")?;
    w.write_str("    node [shape=circle];\n")?;

    let mut ranks: BTreeMap<usize, Vec<String>> = BTreeMap::new();
    let mut stack: Vec<(NodeRef<'_, T, M>, usize)> = root.map(|root| (root, 0)).into_iter().collect();
    while let Some((node, depth)) = stack.pop() {
        let id = quote(node.value());
        let (fill, font) = match node.color() {
            Some(Color::Red) => ("red", "black"),
            Some(Color::Black) => ("black", "white"),
            None => ("green", "white"),
        };
        writeln!(w, "    {id} [style=filled, fillcolor={fill}, fontcolor={font}];")?;

        for side in [Side::Left, Side::Right] {
            match node.child(side) {
                Some(child) => writeln!(w, "    {id} -> {};", quote(child.value()))?,
                None if !node.is_leaf() => {
                    let nil = format!("\"NIL_{}_{}\"", node.id().index(), side_name(side));
                    writeln!(
                        w,
                        "    {nil} [shape=circle, style=invis, fillcolor=black, width=0.1, height=0.1, label=\"\"];"
                    )?;
                    writeln!(w, "    {id} -> {nil} [style=invis];")?;
                }
                None => {}
            }
        }

        ranks.entry(depth).or_default().push(id);
        stack.extend(node.right().map(|right| (right, depth + 1)));
        stack.extend(node.left().map(|left| (left, depth + 1)));
    }

    for ids in ranks.values() {
        write!(w, "    {{ rank=same;")?;
        for id in ids {
            write!(w, " {id}")?;
        }
        w.write_str(" }\n")?;
    }

    w.write_str("}\n")
}

/// [`fmt::Display`] adapter over [`dot`].
pub struct Dot<'a, T, M> {
    root: Option<NodeRef<'a, T, M>>,
}

impl<'a, T, M> Dot<'a, T, M> {
    pub fn new(root: Option<NodeRef<'a, T, M>>) -> Self {
        Self { root }
    }
}

impl<T, M> fmt::Display for Dot<'_, T, M>
where
    T: fmt::Display,
    M: Meta,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        dot(self.root, f)
    }
}

fn side_name(side: Side) -> &'static str {
    match side {
        Side::Left => "left",
        Side::Right => "right",
    }
}

fn quote<T: fmt::Display + ?Sized>(value: &T) -> String {
    format!("\"{}\"", value.to_string().replace('"', "\\\""))
}
