use crate::error::{MarkvaultError, Result};
use crate::model::Node;
use serde_json::Value;

/// Parse a Chrome bookmark JSON export into a sequence of root-level nodes.
///
/// Chrome writes a top-level `roots` object holding named roots such as
/// `bookmark_bar`, `other` and `synced`; some exports carry the roots map
/// directly at top level, so both shapes are accepted. Every root whose
/// value has a `children` array becomes a top-level folder named after its
/// `name` field, or the root key when the field is absent.
///
/// Non-JSON input, and JSON with no bookmark-shaped root, both fail so the
/// caller can fall back to the HTML parser.
pub fn parse_json(text: &str) -> Result<Vec<Node>> {
    let mut bytes = text.as_bytes().to_vec();
    let doc: Value = simd_json::serde::from_slice(&mut bytes)?;

    let Value::Object(top) = doc else {
        return Err(MarkvaultError::NotBookmarkJson);
    };
    let roots = match top.get("roots") {
        Some(Value::Object(roots)) => roots,
        _ => &top,
    };

    let mut nodes = Vec::new();
    for (key, root) in roots {
        let Some(children) = root.get("children").and_then(Value::as_array) else {
            continue;
        };
        let title = root
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or(key.as_str())
            .to_string();
        nodes.push(Node::folder(title, parse_children(children)));
    }

    if nodes.is_empty() {
        return Err(MarkvaultError::NotBookmarkJson);
    }
    Ok(nodes)
}

fn parse_children(children: &[Value]) -> Vec<Node> {
    let mut nodes = Vec::new();
    for child in children {
        match child.get("type").and_then(Value::as_str) {
            Some("folder") => {
                let title = child
                    .get("name")
                    .and_then(Value::as_str)
                    .unwrap_or("Folder");
                let nested = child
                    .get("children")
                    .and_then(Value::as_array)
                    .map(|grandchildren| parse_children(grandchildren))
                    .unwrap_or_default();
                nodes.push(Node::folder(title, nested));
            }
            Some("url") => {
                let url = child.get("url").and_then(Value::as_str).unwrap_or_default();
                let title = child
                    .get("name")
                    .and_then(Value::as_str)
                    .filter(|name| !name.is_empty())
                    .unwrap_or(url);
                nodes.push(Node::bookmark(title, url));
            }
            // unknown node types are skipped
            _ => {}
        }
    }
    nodes
}
