//! DOM scanner: wraps every run in a ruby placeholder.
//!
//! ```text
//! <p>说你好world</p>
//!   ──scan──▶
//! <p><ruby>说你好<rt class="hanzi-ruby-rt"></rt></ruby>world</p>
//!                          └── slot, registered in the AnnotationQueue
//! ```
//!
//! Traversal uses an explicit stack, so sibling order is not significant.
//! Excluded subtrees (existing placeholders, scripts, form controls and
//! editable regions) are never entered.

use crate::annotate::queue::AnnotationQueue;
use crate::annotate::runs::find_run;
use crate::dom::{Document, DomError, NodeId, NodeKind};

/// Class carried by every annotation slot.
pub const SLOT_CLASS: &str = "hanzi-ruby-rt";

/// Attribute that receives the transcription.
pub const SLOT_ATTRIBUTE: &str = "data-rt";

/// Global style rule rendering a slot's transcription.
pub const SLOT_STYLE: &str = "rt.hanzi-ruby-rt::before { content: attr(data-rt); }";

/// Elements whose subtree is never scanned.
const EXCLUDED_TAGS: &[&str] = &["ruby", "script", "select", "textarea", "input"];

// ---------------------------------------------------------------------------
// Traversal
// ---------------------------------------------------------------------------

/// Scan the subtree rooted at `root`, annotating every run found.
///
/// Returns the number of placeholders inserted.  The scan stops early,
/// without error, when the node being visited has been detached or `root`
/// is no longer inside `<body>`.
pub fn scan(doc: &mut Document, queue: &mut AnnotationQueue, root: NodeId) -> usize {
    if inside_excluded(doc, root) {
        return 0;
    }

    let body = doc.body();
    let mut inserted = 0;
    let mut stack = vec![root];

    while let Some(current) = stack.pop() {
        if doc.parent(current).is_none() || !doc.contains(body, root) {
            log::trace!("scan: {current:?} detached, stopping");
            return inserted;
        }

        match doc.kind(current) {
            Some(NodeKind::Element) => {
                if is_excluded(doc, current) {
                    continue;
                }
                stack.extend_from_slice(doc.children(current));
            }
            Some(NodeKind::Text) => match annotate_text(doc, queue, current) {
                Ok(n) => inserted += n,
                Err(e) => log::warn!("scan: could not annotate {current:?}: {e}"),
            },
            _ => {}
        }
    }

    inserted
}

/// `true` for elements the scanner must not enter.
pub fn is_excluded(doc: &Document, element: NodeId) -> bool {
    doc.tag_name(element)
        .is_some_and(|tag| EXCLUDED_TAGS.contains(&tag))
        || doc.is_content_editable(element)
}

/// Whether `node` sits inside an excluded element or an editable region.
///
/// Keeps a scan started directly on placeholder content (e.g. the text
/// node inside a `<ruby>`) from nesting a second placeholder.
fn inside_excluded(doc: &Document, node: NodeId) -> bool {
    let mut current = doc.parent(node);
    while let Some(id) = current {
        if doc
            .tag_name(id)
            .is_some_and(|tag| EXCLUDED_TAGS.contains(&tag))
        {
            return true;
        }
        current = doc.parent(id);
    }
    doc.is_content_editable(node)
}

// ---------------------------------------------------------------------------
// Splitting
// ---------------------------------------------------------------------------

/// Split `text_node` around each run it contains, splicing a placeholder in
/// place of every run.
///
/// Works left to right on the remainder: split at the run start, insert the
/// placeholder before the tail, strip the run off the tail, repeat.
pub fn annotate_text(
    doc: &mut Document,
    queue: &mut AnnotationQueue,
    text_node: NodeId,
) -> Result<usize, DomError> {
    let mut current = text_node;
    let mut inserted = 0;

    loop {
        let Some(text) = doc.text(current) else { break };
        let Some(range) = find_run(text) else { break };
        let run = text[range.clone()].to_string();
        let Some(parent) = doc.parent(current) else { break };

        let rest = doc.split_text(current, range.start)?;
        let slot = insert_placeholder(doc, parent, rest, &run)?;
        queue.register(&run, slot);

        let remainder = doc
            .text(rest)
            .and_then(|t| t.get(run.len()..))
            .unwrap_or_default()
            .to_string();
        doc.set_text(rest, remainder)?;

        inserted += 1;
        current = rest;
    }

    Ok(inserted)
}

/// Build `<ruby>run<rt class="hanzi-ruby-rt"></rt></ruby>` before `before`
/// and return the `<rt>` slot.
fn insert_placeholder(
    doc: &mut Document,
    parent: NodeId,
    before: NodeId,
    run: &str,
) -> Result<NodeId, DomError> {
    let ruby = doc.create_element("ruby");
    doc.append_text(ruby, run)?;
    let slot = doc.append_element(ruby, "rt")?;
    doc.set_attribute(slot, "class", SLOT_CLASS)?;
    doc.insert_before(parent, ruby, Some(before))?;
    Ok(slot)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate::runs::runs;
    use crate::dom::to_html;

    fn doc_with_paragraph(text: &str) -> (Document, NodeId) {
        let mut doc = Document::new(Some("zh-CN"));
        let p = doc.append_element(doc.body(), "p").unwrap();
        doc.append_text(p, text).unwrap();
        (doc, p)
    }

    fn placeholders(doc: &Document, root: NodeId) -> Vec<String> {
        let mut found = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if doc.tag_name(id) == Some("ruby") {
                found.push(doc.text_content(id));
            }
            stack.extend(doc.children(id).iter().rev());
        }
        found
    }

    #[test]
    fn wraps_leading_run_and_keeps_latin_text() {
        let (mut doc, p) = doc_with_paragraph("你好world");
        let mut queue = AnnotationQueue::new();

        let body = doc.body();
        assert_eq!(scan(&mut doc, &mut queue, body), 1);
        assert_eq!(
            to_html(&doc, p),
            "<p><ruby>你好<rt class=\"hanzi-ruby-rt\"></rt></ruby>world</p>"
        );
        assert_eq!(queue.runs(), vec!["你好"]);
    }

    #[test]
    fn every_run_gets_exactly_one_placeholder() {
        let text = "我说：你好，world！再见。";
        let (mut doc, p) = doc_with_paragraph(text);
        let mut queue = AnnotationQueue::new();

        let body = doc.body();
        scan(&mut doc, &mut queue, body);

        let expected: Vec<&str> = runs(text).collect();
        assert_eq!(placeholders(&doc, p), expected);
        // Visible text is unchanged apart from the (empty) slots.
        assert_eq!(doc.text_content(p), text);
        assert_eq!(queue.pending_slots(), expected.len());
    }

    #[test]
    fn adjacent_runs_separated_by_kana_stay_separate() {
        let (mut doc, p) = doc_with_paragraph("漢字かな漢字");
        let mut queue = AnnotationQueue::new();

        let body = doc.body();
        assert_eq!(scan(&mut doc, &mut queue, body), 2);
        assert_eq!(placeholders(&doc, p), vec!["漢字", "漢字"]);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.slots("漢字").len(), 2);
    }

    #[test]
    fn rescanning_is_idempotent() {
        let (mut doc, p) = doc_with_paragraph("中文和English混合");
        let mut queue = AnnotationQueue::new();

        let body = doc.body();
        scan(&mut doc, &mut queue, body);
        let first = to_html(&doc, p);

        assert_eq!(scan(&mut doc, &mut queue, body), 0);
        assert_eq!(to_html(&doc, p), first);

        // Scanning a placeholder or its inner text directly is also a no-op.
        let ruby = doc.children(p)[1];
        assert_eq!(doc.tag_name(ruby), Some("ruby"));
        let inner_text = doc.children(ruby)[0];
        assert_eq!(scan(&mut doc, &mut queue, ruby), 0);
        assert_eq!(scan(&mut doc, &mut queue, inner_text), 0);
        assert_eq!(to_html(&doc, p), first);
        assert_eq!(queue.pending_slots(), 2);
    }

    #[test]
    fn excluded_elements_are_skipped() {
        let mut doc = Document::new(Some("zh-CN"));
        let body = doc.body();
        for tag in ["script", "textarea", "select", "input"] {
            let el = doc.append_element(body, tag).unwrap();
            doc.append_text(el, "不要").unwrap();
        }
        let editable = doc.append_element(body, "div").unwrap();
        doc.set_attribute(editable, "contenteditable", "true").unwrap();
        let inner = doc.append_element(editable, "span").unwrap();
        doc.append_text(inner, "编辑").unwrap();

        let mut queue = AnnotationQueue::new();
        assert_eq!(scan(&mut doc, &mut queue, body), 0);
        assert!(queue.is_empty());

        // Text added later inside the editable region is also left alone.
        let typed = doc.append_text(inner, "输入").unwrap();
        assert_eq!(scan(&mut doc, &mut queue, typed), 0);
    }

    #[test]
    fn scanning_a_text_node_root() {
        let (mut doc, p) = doc_with_paragraph("abc");
        let added = doc.append_text(p, "新内容").unwrap();
        let mut queue = AnnotationQueue::new();

        assert_eq!(scan(&mut doc, &mut queue, added), 1);
        assert_eq!(queue.runs(), vec!["新内容"]);
    }

    #[test]
    fn detached_root_aborts_silently() {
        let (mut doc, p) = doc_with_paragraph("你好");
        doc.remove_child(doc.body(), p).unwrap();
        let mut queue = AnnotationQueue::new();

        assert_eq!(scan(&mut doc, &mut queue, p), 0);
        assert!(queue.is_empty());
        assert_eq!(doc.children(p).len(), 1);
    }

    #[test]
    fn nodes_outside_body_are_not_scanned() {
        let mut doc = Document::new(Some("zh-CN"));
        let title = doc.append_element(doc.head(), "title").unwrap();
        doc.append_text(title, "标题").unwrap();
        let mut queue = AnnotationQueue::new();

        assert_eq!(scan(&mut doc, &mut queue, title), 0);
        assert!(queue.is_empty());
    }

    #[test]
    fn nested_markup_is_traversed() {
        let mut doc = Document::new(Some("zh-CN"));
        let div = doc.append_element(doc.body(), "div").unwrap();
        let a = doc.append_element(div, "a").unwrap();
        doc.append_text(a, "链接").unwrap();
        let em = doc.append_element(div, "em").unwrap();
        doc.append_text(em, "强调").unwrap();
        let mut queue = AnnotationQueue::new();

        let body = doc.body();
        assert_eq!(scan(&mut doc, &mut queue, body), 2);
        let mut queued = queue.runs();
        queued.sort();
        let mut expected = vec!["强调".to_string(), "链接".to_string()];
        expected.sort();
        assert_eq!(queued, expected);
    }
}
