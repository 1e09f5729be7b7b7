//! Logging and debugging facilities for Trellis.
//!
//! Trellis uses the `tracing` crate for instrumentation. To see logs, install
//! a tracing subscriber in your application:
//!
//! ```ignore
//! tracing_subscriber::fmt::init();
//! ```
//!
//! The [`targets`] constants can be used in filter directives to select
//! individual subsystems, e.g. `trellis=trace,trellis_core::element=off`.

use std::fmt::Write as FmtWrite;

use crate::element::{ElementId, ElementTree};

/// Target names for log filtering.
pub mod targets {
    /// Core crate target.
    pub const CORE: &str = "trellis_core";
    /// Element tree target.
    pub const ELEMENT: &str = "trellis_core::element";
    /// Drag and drop engine target.
    pub const DRAG_DROP: &str = "trellis::widget::drag_drop";
    /// Event dispatch target.
    pub const DISPATCH: &str = "trellis::widget::dispatcher";
}

/// Formats the subtree rooted at `root` as an indented listing of elements,
/// their classes, and text labels.
///
/// Intended for debug logging and test failure output:
///
/// ```text
/// Element(1v1) .tr-DropWidget
///   Element(2v1) .tr-row "alpha"
///   Element(3v1) .tr-row .tr-mod-dropTarget "beta"
/// ```
pub fn format_subtree(tree: &ElementTree, root: ElementId) -> String {
    let mut out = String::new();
    format_node(tree, root, 0, &mut out);
    out
}

fn format_node(tree: &ElementTree, node: ElementId, depth: usize, out: &mut String) {
    if !tree.contains(node) {
        let _ = writeln!(out, "{:indent$}<removed {node:?}>", "", indent = depth * 2);
        return;
    }
    let _ = write!(out, "{:indent$}Element({node:?})", "", indent = depth * 2);
    for class in tree.classes(node) {
        let _ = write!(out, " .{class}");
    }
    if !tree.text(node).is_empty() {
        let _ = write!(out, " {:?}", tree.text(node));
    }
    let _ = writeln!(out);
    for &child in tree.children(node) {
        format_node(tree, child, depth + 1, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_subtree() {
        let mut tree = ElementTree::new();
        let root = tree.create_with_class("tr-DropWidget");
        let row = tree.create_with_class("tr-row");
        tree.append_child(root, row).unwrap();
        tree.set_text(row, "alpha");

        let dump = format_subtree(&tree, root);
        assert!(dump.contains(".tr-DropWidget"));
        assert!(dump.contains(".tr-row"));
        assert!(dump.contains("\"alpha\""));
        assert_eq!(dump.lines().count(), 2);
    }
}
