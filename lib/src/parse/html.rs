use crate::error::Result;
use crate::model::Node;

/// A `<DL>` list currently being collected. `title` is set when the list
/// belongs to a folder (it followed an `<H3>` heading), `None` for the
/// document-level list.
struct Frame {
    title: Option<String>,
    children: Vec<Node>,
}

/// Parse a Netscape bookmark file into a sequence of root-level nodes.
///
/// `tl` does not reconstruct the (usually unclosed) `<DT>` nesting of real
/// browser exports reliably, so instead of walking a DOM tree we scan the
/// nodes in document order and keep an explicit stack of open `<DL>` lists:
/// `<H3>` text becomes the pending folder title, `<DL>` opens a list for it,
/// the closing `/DL` pops the list and attaches the folder to its parent.
/// Anchors outside any `<DL>` are ignored; a document with no `<DL>` parses
/// to an empty sequence. Unclosed lists are unwound at end of input so
/// malformed markup degrades to partial output rather than an error.
pub fn parse_html(text: &str) -> Result<Vec<Node>> {
    let dom = tl::parse(text, tl::ParserOptions::default())?;
    let parser = dom.parser();

    let mut roots: Vec<Node> = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();
    let mut pending_folder: Option<String> = None;

    for node in dom.nodes() {
        let Some(tag) = node.as_tag() else { continue };

        match tag.name().as_utf8_str().as_ref() {
            // H3 carries the title of the folder whose <DL> follows
            "H3" | "h3" => {
                flush_pending(&mut pending_folder, &mut stack);
                let title = tag.inner_text(parser).trim().to_string();
                pending_folder = Some(if title.is_empty() {
                    "Folder".to_string()
                } else {
                    title
                });
            }
            "DL" | "dl" => {
                stack.push(Frame {
                    title: pending_folder.take(),
                    children: Vec::new(),
                });
            }
            // closing tag: the list is complete
            "/DL" | "/dl" => {
                flush_pending(&mut pending_folder, &mut stack);
                if let Some(frame) = stack.pop() {
                    attach(frame, &mut stack, &mut roots);
                }
            }
            "A" | "a" => {
                flush_pending(&mut pending_folder, &mut stack);
                let Some(frame) = stack.last_mut() else {
                    continue;
                };

                // href may be absent or empty; such nodes are still
                // produced and filtered out by the merge pass
                let url = tag
                    .attributes()
                    .get("HREF")
                    .or_else(|| tag.attributes().get("href"))
                    .flatten()
                    .map(|h| h.as_utf8_str().to_string())
                    .unwrap_or_default();

                let text = tag.inner_text(parser).trim().to_string();
                let title = if text.is_empty() { url.clone() } else { text };

                frame.children.push(Node::bookmark(title, url));
            }
            _ => {}
        }
    }

    // Malformed input: unwind whatever is still open
    flush_pending(&mut pending_folder, &mut stack);
    while let Some(frame) = stack.pop() {
        attach(frame, &mut stack, &mut roots);
    }

    Ok(roots)
}

/// An `<H3>` whose `<DL>` never showed up is an empty folder.
fn flush_pending(pending: &mut Option<String>, stack: &mut Vec<Frame>) {
    if let Some(title) = pending.take() {
        // headings outside any list are dropped
        if let Some(frame) = stack.last_mut() {
            frame.children.push(Node::folder(title, Vec::new()));
        }
    }
}

fn attach(frame: Frame, stack: &mut Vec<Frame>, roots: &mut Vec<Node>) {
    match frame.title {
        Some(title) => {
            let folder = Node::folder(title, frame.children);
            match stack.last_mut() {
                Some(parent) => parent.children.push(folder),
                None => roots.push(folder),
            }
        }
        // document-level list (or a stray untitled one): hoist children
        None => match stack.last_mut() {
            Some(parent) => parent.children.extend(frame.children),
            None => roots.extend(frame.children),
        },
    }
}
