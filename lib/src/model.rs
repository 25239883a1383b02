/// A node in a parsed bookmark tree.
///
/// Trees are finite and acyclic (bounded by the nesting of the source
/// export), and child order reflects source export order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Folder { title: String, children: Vec<Node> },
    Bookmark { title: String, url: String },
}

impl Node {
    pub fn folder(title: impl Into<String>, children: Vec<Node>) -> Self {
        Node::Folder {
            title: title.into(),
            children,
        }
    }

    pub fn bookmark(title: impl Into<String>, url: impl Into<String>) -> Self {
        Node::Bookmark {
            title: title.into(),
            url: url.into(),
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, Node::Folder { .. })
    }
}

/// Count folders across the whole tree, nested ones included.
pub fn count_folders(nodes: &[Node]) -> usize {
    nodes
        .iter()
        .map(|node| match node {
            Node::Folder { children, .. } => 1 + count_folders(children),
            Node::Bookmark { .. } => 0,
        })
        .sum()
}

/// Count bookmarks across the whole tree, nested ones included.
pub fn count_bookmarks(nodes: &[Node]) -> usize {
    nodes
        .iter()
        .map(|node| match node {
            Node::Folder { children, .. } => count_bookmarks(children),
            Node::Bookmark { .. } => 1,
        })
        .sum()
}
