//! Arena-backed document tree.
//!
//! [`Document`] owns every node in a flat `Vec`; a [`NodeId`] is an index into
//! it.  Nodes are never freed, so a `NodeId` held by the annotation queue stays
//! valid even after the host removes the node from the tree; it simply becomes
//! detached ([`Document::is_connected`] returns `false`).
//!
//! Every structural change made through the public API appends a
//! [`MutationRecord`] that the mutation watcher drains with
//! [`Document::take_records`].

use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::dom::mutation::MutationRecord;

// ---------------------------------------------------------------------------
// NodeId / NodeKind
// ---------------------------------------------------------------------------

/// Handle to a node inside one [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// The three node types the annotator distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Element,
    Text,
}

// ---------------------------------------------------------------------------
// DomError
// ---------------------------------------------------------------------------

/// Errors raised by tree operations, named after the DOM exceptions they
/// stand in for.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    /// The id does not belong to this document.
    #[error("unknown node {0:?}")]
    UnknownNode(NodeId),

    /// A text-only operation was applied to a non-text node.
    #[error("node {0:?} is not a text node")]
    NotText(NodeId),

    /// An attribute operation was applied to a non-element node.
    #[error("node {0:?} is not an element")]
    NotElement(NodeId),

    /// The insertion would put a node somewhere it cannot live (under a text
    /// node, the document node as a child, or a node inside itself).
    #[error("cannot insert {node:?} under {parent:?}")]
    HierarchyRequest { parent: NodeId, node: NodeId },

    /// The reference / removed node is not a child of the given parent.
    #[error("{child:?} is not a child of {parent:?}")]
    NotFound { parent: NodeId, child: NodeId },

    /// `split_text` offset past the end of the text or inside a character.
    #[error("offset {offset} is not a valid split point in {node:?}")]
    IndexSize { node: NodeId, offset: usize },
}

// ---------------------------------------------------------------------------
// Node storage
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum NodeData {
    Document,
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    data: NodeData,
}

impl Node {
    fn new(data: NodeData) -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            data,
        }
    }
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// A host document: `#document > html > (head, body)` plus whatever the host
/// builds under them.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    html: NodeId,
    head: NodeId,
    body: NodeId,
    url: String,
    records: Vec<MutationRecord>,
}

/// Document handle shared between the host and the annotation session.
///
/// Lock it for one event or timer turn at a time; never hold it across an
/// `.await`.
pub type SharedDocument = Arc<Mutex<Document>>;

impl Document {
    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    /// Create an empty document.  `lang` becomes the `lang` attribute of the
    /// `<html>` element.
    pub fn new(lang: Option<&str>) -> Self {
        let mut doc = Self {
            nodes: vec![Node::new(NodeData::Document)],
            root: NodeId(0),
            html: NodeId(0),
            head: NodeId(0),
            body: NodeId(0),
            url: "about:blank".into(),
            records: Vec::new(),
        };

        let html = doc.create_element("html");
        let head = doc.create_element("head");
        let body = doc.create_element("body");
        doc.link(doc.root, html, 0);
        doc.link(html, head, 0);
        doc.link(html, body, 1);
        if let Some(lang) = lang {
            doc.set_attr_unchecked(html, "lang", lang);
        }

        doc.html = html;
        doc.head = head;
        doc.body = body;
        doc
    }

    /// Set the document URL reported in resolver log lines.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Wrap the document in a [`SharedDocument`].
    pub fn into_shared(self) -> SharedDocument {
        Arc::new(Mutex::new(self))
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeData::Element {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
        })
    }

    pub fn create_text_node(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeData::Text(text.into()))
    }

    /// Create an element and append it to `parent`.
    pub fn append_element(&mut self, parent: NodeId, tag: &str) -> Result<NodeId, DomError> {
        let id = self.create_element(tag);
        self.append_child(parent, id)?;
        Ok(id)
    }

    /// Create a text node and append it to `parent`.
    pub fn append_text(
        &mut self,
        parent: NodeId,
        text: impl Into<String>,
    ) -> Result<NodeId, DomError> {
        let id = self.create_text_node(text);
        self.append_child(parent, id)?;
        Ok(id)
    }

    // -----------------------------------------------------------------------
    // Well-known nodes
    // -----------------------------------------------------------------------

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn document_element(&self) -> NodeId {
        self.html
    }

    pub fn head(&self) -> NodeId {
        self.head
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Declared language of the document element, if any.
    pub fn lang(&self) -> Option<&str> {
        self.attribute(self.html, "lang")
    }

    // -----------------------------------------------------------------------
    // Node queries
    // -----------------------------------------------------------------------

    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.node(id).map(|n| match n.data {
            NodeData::Document => NodeKind::Document,
            NodeData::Element { .. } => NodeKind::Element,
            NodeData::Text(_) => NodeKind::Text,
        })
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.kind(id) == Some(NodeKind::Element)
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        self.kind(id) == Some(NodeKind::Text)
    }

    /// Lower-case tag name of an element.
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        match &self.node(id)?.data {
            NodeData::Element { tag, .. } => Some(tag),
            _ => None,
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let siblings = self.children(parent);
        let pos = siblings.iter().position(|&c| c == id)?;
        siblings.get(pos + 1).copied()
    }

    /// The `nodeValue` of a text node; `None` for every other kind.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.node(id)?.data {
            NodeData::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Concatenated text of `id` and all its descendants.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            if let Some(text) = self.text(cur) {
                out.push_str(text);
            }
            stack.extend(self.children(cur).iter().rev());
        }
        out
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        match &self.node(id)?.data {
            NodeData::Element { attrs, .. } => attrs
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    /// Attributes of an element in insertion order.
    pub fn attributes(&self, id: NodeId) -> &[(String, String)] {
        match self.node(id).map(|n| &n.data) {
            Some(NodeData::Element { attrs, .. }) => attrs.as_slice(),
            _ => &[],
        }
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.attribute(id, "class")
            .is_some_and(|list| list.split_ascii_whitespace().any(|c| c == class))
    }

    /// Inclusive descendant check, like `Node.contains`.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cur = Some(node);
        while let Some(id) = cur {
            if id == ancestor {
                return true;
            }
            cur = self.parent(id);
        }
        false
    }

    /// `true` while `id` is attached to the document tree.
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.contains(self.root, id)
    }

    /// Whether `id` is editable, like `HTMLElement.isContentEditable`.
    ///
    /// The nearest `contenteditable` attribute wins: `""`, `"true"` and
    /// `"plaintext-only"` make the subtree editable, `"false"` turns it off,
    /// anything else inherits from the parent.
    pub fn is_content_editable(&self, id: NodeId) -> bool {
        let mut cur = Some(id);
        while let Some(node) = cur {
            if let Some(value) = self.attribute(node, "contenteditable") {
                match value.to_ascii_lowercase().as_str() {
                    "" | "true" | "plaintext-only" => return true,
                    "false" => return false,
                    _ => {}
                }
            }
            cur = self.parent(node);
        }
        false
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    pub fn set_text(&mut self, id: NodeId, value: impl Into<String>) -> Result<(), DomError> {
        match &mut self.node_mut(id)?.data {
            NodeData::Text(text) => {
                *text = value.into();
                Ok(())
            }
            _ => Err(DomError::NotText(id)),
        }
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        if !self.is_element(id) {
            self.node(id).ok_or(DomError::UnknownNode(id))?;
            return Err(DomError::NotElement(id));
        }
        self.set_attr_unchecked(id, name, value);
        Ok(())
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` under `parent` before `reference` (or last when
    /// `reference` is `None`), moving it out of its previous parent first.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<(), DomError> {
        let parent_kind = self.kind(parent).ok_or(DomError::UnknownNode(parent))?;
        let child_kind = self.kind(child).ok_or(DomError::UnknownNode(child))?;
        if parent_kind == NodeKind::Text
            || child_kind == NodeKind::Document
            || self.contains(child, parent)
        {
            return Err(DomError::HierarchyRequest {
                parent,
                node: child,
            });
        }

        let mut reference = reference;
        if let Some(r) = reference {
            if self.parent(r) != Some(parent) {
                return Err(DomError::NotFound { parent, child: r });
            }
            if r == child {
                reference = self.next_sibling(child);
            }
        }

        if let Some(old_parent) = self.parent(child) {
            self.unlink(old_parent, child);
            self.records.push(MutationRecord::removed(old_parent, child));
        }

        let index = match reference {
            Some(r) => self
                .children(parent)
                .iter()
                .position(|&c| c == r)
                .unwrap_or(self.children(parent).len()),
            None => self.children(parent).len(),
        };
        self.link(parent, child, index);
        self.records.push(MutationRecord::added(parent, child));
        Ok(())
    }

    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.node(parent).ok_or(DomError::UnknownNode(parent))?;
        if self.parent(child) != Some(parent) {
            return Err(DomError::NotFound { parent, child });
        }
        self.unlink(parent, child);
        self.records.push(MutationRecord::removed(parent, child));
        Ok(())
    }

    /// Split a text node at byte `offset`, like `Text.splitText`.
    ///
    /// The original node keeps `text[..offset]`; a new text node holding
    /// `text[offset..]` is inserted right after it (when it has a parent) and
    /// returned.
    pub fn split_text(&mut self, id: NodeId, offset: usize) -> Result<NodeId, DomError> {
        let tail = match &mut self.node_mut(id)?.data {
            NodeData::Text(text) => {
                if offset > text.len() || !text.is_char_boundary(offset) {
                    return Err(DomError::IndexSize { node: id, offset });
                }
                text.split_off(offset)
            }
            _ => return Err(DomError::NotText(id)),
        };

        let new_node = self.create_text_node(tail);
        if let Some(parent) = self.parent(id) {
            let index = self
                .children(parent)
                .iter()
                .position(|&c| c == id)
                .map_or(self.children(parent).len(), |p| p + 1);
            self.link(parent, new_node, index);
            self.records.push(MutationRecord::added(parent, new_node));
        }
        Ok(new_node)
    }

    /// Register a global style rule as a `<style>` element in `<head>`.
    pub fn add_style(&mut self, css: &str) -> Result<NodeId, DomError> {
        let style = self.create_element("style");
        let text = self.create_text_node(css);
        self.link(style, text, 0);
        self.append_child(self.head, style)?;
        Ok(style)
    }

    /// Text of every `<style>` element directly under `<head>`.
    pub fn styles(&self) -> Vec<String> {
        self.children(self.head)
            .iter()
            .filter(|&&c| self.tag_name(c) == Some("style"))
            .map(|&c| self.text_content(c))
            .collect()
    }

    /// Drain the mutation records accumulated since the last call.
    pub fn take_records(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.records)
    }

    pub fn has_pending_records(&self) -> bool {
        !self.records.is_empty()
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, DomError> {
        self.nodes.get_mut(id.0).ok_or(DomError::UnknownNode(id))
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        self.nodes.push(Node::new(data));
        NodeId(self.nodes.len() - 1)
    }

    fn link(&mut self, parent: NodeId, child: NodeId, index: usize) {
        self.nodes[parent.0].children.insert(index, child);
        self.nodes[child.0].parent = Some(parent);
    }

    fn unlink(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[parent.0].children.retain(|&c| c != child);
        self.nodes[child.0].parent = None;
    }

    fn set_attr_unchecked(&mut self, id: NodeId, name: &str, value: &str) {
        if let NodeData::Element { attrs, .. } = &mut self.nodes[id.0].data {
            match attrs.iter_mut().find(|(k, _)| k == name) {
                Some(slot) => slot.1 = value.to_string(),
                None => attrs.push((name.to_string(), value.to_string())),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_document_has_html_head_body() {
        let doc = Document::new(Some("zh-CN"));
        assert_eq!(doc.tag_name(doc.document_element()), Some("html"));
        assert_eq!(doc.children(doc.document_element()), &[doc.head(), doc.body()]);
        assert_eq!(doc.lang(), Some("zh-CN"));
        assert!(!doc.has_pending_records());
    }

    #[test]
    fn document_without_lang() {
        let doc = Document::new(None);
        assert_eq!(doc.lang(), None);
    }

    #[test]
    fn split_text_inserts_tail_after_original() {
        let mut doc = Document::new(None);
        let p = doc.append_element(doc.body(), "p").unwrap();
        let text = doc.append_text(p, "abc你好").unwrap();
        doc.take_records();

        let tail = doc.split_text(text, 3).unwrap();
        assert_eq!(doc.text(text), Some("abc"));
        assert_eq!(doc.text(tail), Some("你好"));
        assert_eq!(doc.children(p), &[text, tail]);

        let records = doc.take_records();
        assert_eq!(records, vec![MutationRecord::added(p, tail)]);
    }

    #[test]
    fn split_text_rejects_offset_inside_character() {
        let mut doc = Document::new(None);
        let text = doc.append_text(doc.body(), "你好").unwrap();
        assert_eq!(
            doc.split_text(text, 1),
            Err(DomError::IndexSize { node: text, offset: 1 })
        );
        assert_eq!(
            doc.split_text(text, 99),
            Err(DomError::IndexSize { node: text, offset: 99 })
        );
    }

    #[test]
    fn split_text_on_element_fails() {
        let mut doc = Document::new(None);
        let body = doc.body();
        assert_eq!(doc.split_text(body, 0), Err(DomError::NotText(body)));
    }

    #[test]
    fn insert_before_places_node_before_reference() {
        let mut doc = Document::new(None);
        let a = doc.append_text(doc.body(), "a").unwrap();
        let c = doc.append_text(doc.body(), "c").unwrap();
        let b = doc.create_text_node("b");
        doc.insert_before(doc.body(), b, Some(c)).unwrap();
        assert_eq!(doc.children(doc.body()), &[a, b, c]);
        assert_eq!(doc.text_content(doc.body()), "abc");
    }

    #[test]
    fn insert_before_rejects_foreign_reference() {
        let mut doc = Document::new(None);
        let p = doc.append_element(doc.body(), "p").unwrap();
        let stray = doc.create_text_node("x");
        let new = doc.create_text_node("y");
        assert_eq!(
            doc.insert_before(p, new, Some(stray)),
            Err(DomError::NotFound { parent: p, child: stray })
        );
    }

    #[test]
    fn insert_into_own_descendant_is_rejected() {
        let mut doc = Document::new(None);
        let outer = doc.append_element(doc.body(), "div").unwrap();
        let inner = doc.append_element(outer, "div").unwrap();
        assert_eq!(
            doc.append_child(inner, outer),
            Err(DomError::HierarchyRequest { parent: inner, node: outer })
        );
    }

    #[test]
    fn moving_a_node_records_removal_and_addition() {
        let mut doc = Document::new(None);
        let a = doc.append_element(doc.body(), "div").unwrap();
        let b = doc.append_element(doc.body(), "div").unwrap();
        let t = doc.append_text(a, "x").unwrap();
        doc.take_records();

        doc.append_child(b, t).unwrap();
        let records = doc.take_records();
        assert_eq!(
            records,
            vec![MutationRecord::removed(a, t), MutationRecord::added(b, t)]
        );
        assert!(doc.children(a).is_empty());
    }

    #[test]
    fn removed_node_is_detached_but_still_readable() {
        let mut doc = Document::new(None);
        let p = doc.append_element(doc.body(), "p").unwrap();
        let t = doc.append_text(p, "你好").unwrap();
        doc.remove_child(doc.body(), p).unwrap();

        assert!(!doc.is_connected(p));
        assert!(!doc.is_connected(t));
        assert_eq!(doc.parent(p), None);
        assert_eq!(doc.text(t), Some("你好"));
    }

    #[test]
    fn content_editable_is_inherited_and_overridable() {
        let mut doc = Document::new(None);
        let editor = doc.append_element(doc.body(), "div").unwrap();
        doc.set_attribute(editor, "contenteditable", "").unwrap();
        let inner = doc.append_element(editor, "span").unwrap();
        let locked = doc.append_element(editor, "span").unwrap();
        doc.set_attribute(locked, "contenteditable", "false").unwrap();
        let bogus = doc.append_element(editor, "span").unwrap();
        doc.set_attribute(bogus, "contenteditable", "maybe").unwrap();

        assert!(doc.is_content_editable(editor));
        assert!(doc.is_content_editable(inner));
        assert!(!doc.is_content_editable(locked));
        assert!(doc.is_content_editable(bogus));
        assert!(!doc.is_content_editable(doc.body()));
    }

    #[test]
    fn set_attribute_overwrites_and_classes_match() {
        let mut doc = Document::new(None);
        let rt = doc.append_element(doc.body(), "rt").unwrap();
        doc.set_attribute(rt, "class", "a hanzi-ruby-rt").unwrap();
        doc.set_attribute(rt, "data-rt", "x").unwrap();
        doc.set_attribute(rt, "data-rt", "y").unwrap();
        assert!(doc.has_class(rt, "hanzi-ruby-rt"));
        assert!(!doc.has_class(rt, "hanzi"));
        assert_eq!(doc.attribute(rt, "data-rt"), Some("y"));
        assert_eq!(doc.attributes(rt).len(), 2);
    }

    #[test]
    fn set_attribute_on_text_fails() {
        let mut doc = Document::new(None);
        let t = doc.append_text(doc.body(), "x").unwrap();
        assert_eq!(doc.set_attribute(t, "a", "b"), Err(DomError::NotElement(t)));
    }

    #[test]
    fn add_style_registers_rule_in_head() {
        let mut doc = Document::new(None);
        doc.add_style("rt::before { content: attr(data-rt); }").unwrap();
        assert_eq!(doc.styles(), vec!["rt::before { content: attr(data-rt); }"]);
        assert!(doc.has_pending_records());
    }
}
