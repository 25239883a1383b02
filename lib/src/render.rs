use crate::model::Node;
use std::fmt::Write;

/// Render a merged tree as an indented markdown preview.
///
/// Presentation only; the export builder works from the tree itself.
pub fn render_preview(nodes: &[Node]) -> String {
    let mut out = String::new();
    render_nodes(nodes, 0, &mut out);
    out
}

fn render_nodes(nodes: &[Node], depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    for node in nodes {
        match node {
            Node::Folder { title, children } => {
                let _ = writeln!(out, "{indent}- **{title}/**");
                render_nodes(children, depth + 1, out);
            }
            Node::Bookmark { title, url } => {
                let _ = writeln!(out, "{indent}- [{title}]({url})");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_layout() {
        let tree = vec![
            Node::bookmark("A", "https://a.com"),
            Node::folder("Work", vec![Node::bookmark("B", "https://b.com")]),
        ];
        let preview = render_preview(&tree);
        assert_eq!(
            preview,
            "- [A](https://a.com)\n- **Work/**\n  - [B](https://b.com)\n"
        );
    }

    #[test]
    fn test_empty_tree_renders_empty() {
        assert!(render_preview(&[]).is_empty());
    }
}
