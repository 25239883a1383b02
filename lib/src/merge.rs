use crate::model::Node;
use std::collections::HashSet;

/// Merge parsed trees into one, deduplicating bookmarks by URL.
///
/// Top-level sequences are concatenated in input order, then filtered in a
/// single pass: a bookmark is dropped when its URL is empty or was already
/// seen anywhere earlier in file-then-depth-first order (first occurrence
/// wins, across folder and file boundaries). Folders are always kept, even
/// when every child was deduplicated away. Input trees are never mutated
/// and the seen set does not outlive one call.
pub fn merge(trees: &[Vec<Node>]) -> Vec<Node> {
    let mut seen = HashSet::new();
    let mut merged = Vec::new();
    for tree in trees {
        merged.extend(filter_nodes(tree, &mut seen));
    }
    merged
}

fn filter_nodes(nodes: &[Node], seen: &mut HashSet<String>) -> Vec<Node> {
    let mut kept = Vec::new();
    for node in nodes {
        match node {
            Node::Folder { title, children } => {
                kept.push(Node::folder(title.clone(), filter_nodes(children, seen)));
            }
            Node::Bookmark { title, url } => {
                if url.is_empty() || !seen.insert(url.clone()) {
                    continue;
                }
                kept.push(Node::bookmark(title.clone(), url.clone()));
            }
        }
    }
    kept
}
