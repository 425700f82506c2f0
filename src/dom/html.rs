//! HTML serialization of a [`Document`] subtree.

use crate::dom::node::{Document, NodeId, NodeKind};

/// Elements serialized without a closing tag.
const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "input", "link", "meta"];

/// Serialize `id` and its descendants (`outerHTML`; for the document node,
/// the whole tree).
pub fn to_html(doc: &Document, id: NodeId) -> String {
    let mut out = String::new();
    write_node(doc, id, &mut out);
    out
}

fn write_node(doc: &Document, id: NodeId, out: &mut String) {
    match doc.kind(id) {
        Some(NodeKind::Document) => {
            out.push_str("<!DOCTYPE html>");
            for &child in doc.children(id) {
                write_node(doc, child, out);
            }
        }
        Some(NodeKind::Text) => {
            let text = doc.text(id).unwrap_or_default();
            // <style>/<script> bodies are raw text.
            let raw = doc
                .parent(id)
                .and_then(|p| doc.tag_name(p))
                .is_some_and(|t| t == "style" || t == "script");
            if raw {
                out.push_str(text);
            } else {
                escape_into(text, false, out);
            }
        }
        Some(NodeKind::Element) => {
            let tag = doc.tag_name(id).unwrap_or_default();
            out.push('<');
            out.push_str(tag);
            for (name, value) in doc.attributes(id) {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                escape_into(value, true, out);
                out.push('"');
            }
            out.push('>');
            if VOID_ELEMENTS.contains(&tag) {
                return;
            }
            for &child in doc.children(id) {
                write_node(doc, child, out);
            }
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
        None => {}
    }
}

fn escape_into(text: &str, attribute: bool, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_nested_elements_and_attributes() {
        let mut doc = Document::new(Some("zh-CN"));
        let p = doc.append_element(doc.body(), "p").unwrap();
        doc.set_attribute(p, "title", "a \"b\" & c").unwrap();
        doc.append_text(p, "1 < 2").unwrap();
        doc.append_element(p, "br").unwrap();

        assert_eq!(
            to_html(&doc, p),
            "<p title=\"a &quot;b&quot; &amp; c\">1 &lt; 2<br></p>"
        );
    }

    #[test]
    fn style_text_is_not_escaped() {
        let mut doc = Document::new(None);
        let style = doc.add_style("a > b { }").unwrap();
        assert_eq!(to_html(&doc, style), "<style>a > b { }</style>");
    }

    #[test]
    fn whole_document() {
        let doc = Document::new(Some("zh-Hans"));
        assert_eq!(
            to_html(&doc, doc.root()),
            "<!DOCTYPE html><html lang=\"zh-Hans\"><head></head><body></body></html>"
        );
    }
}
