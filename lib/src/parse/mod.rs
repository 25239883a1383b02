pub mod html;
pub mod json;

pub use html::parse_html;
pub use json::parse_json;

use crate::model::Node;

/// Parse one input file's raw text, sniffing the format from content.
///
/// JSON is attempted first: an HTML export is never valid JSON and fails
/// fast, while a structured JSON export could be mangled by a lenient HTML
/// parse. When both formats fail the file contributes an empty tree; a bad
/// file never aborts the batch.
pub fn parse_any(text: &str) -> Vec<Node> {
    match json::parse_json(text) {
        Ok(nodes) => nodes,
        Err(json_err) => {
            log::debug!("JSON attempt failed ({json_err}), trying HTML");
            match html::parse_html(text) {
                Ok(nodes) => nodes,
                Err(html_err) => {
                    log::debug!("HTML attempt failed ({html_err}), contributing empty tree");
                    Vec::new()
                }
            }
        }
    }
}
