//! Thin helpers over the `kuchikiki` DOM shared by the structural extractor,
//! the homepage resolver, and the normalizer.
//!
//! Every document is parsed into its own owned tree, edited in place, and
//! serialized back out. Nothing is shared between documents.

use html5ever::{QualName, local_name, namespace_url, ns};
use kuchikiki::NodeRef;
use kuchikiki::traits::*;

/// Parse a full document.
pub fn parse(html: &str) -> NodeRef {
    kuchikiki::parse_html().one(html)
}

/// Parse markup as if it sat inside `<body>`.
///
/// Leading comments and `<style>`, `<link>`, `<meta>` or `<script>` stay in
/// the fragment instead of moving to the document or `<head>`. The nodes end
/// up under a bare `<html>` root, see [`fragment_html`].
pub fn parse_fragment(html: &str) -> NodeRef {
    let context = QualName::new(None, ns!(html), local_name!("body"));
    kuchikiki::parse_fragment(context, Vec::new()).one(html)
}

/// All elements under `root` matching `selector`, collected up front so the
/// caller can detach or replace them while walking the list.
///
/// Selectors in this crate are string literals; an unparsable one yields no
/// matches rather than an error.
pub fn select_all(root: &NodeRef, selector: &str) -> Vec<NodeRef> {
    match root.select(selector) {
        Ok(matches) => matches.map(|m| m.as_node().clone()).collect(),
        Err(()) => Vec::new(),
    }
}

/// First element under `root` matching `selector`, in document order.
pub fn select_first(root: &NodeRef, selector: &str) -> Option<NodeRef> {
    root.select_first(selector)
        .ok()
        .map(|m| m.as_node().clone())
}

/// Element text with surrounding whitespace trimmed.
pub fn trimmed_text(node: &NodeRef) -> String {
    node.text_contents().trim().to_string()
}

pub fn attr(node: &NodeRef, name: &str) -> Option<String> {
    node.as_element()
        .and_then(|el| el.attributes.borrow().get(name).map(str::to_string))
}

pub fn set_attr(node: &NodeRef, name: &str, value: &str) {
    if let Some(el) = node.as_element() {
        el.attributes.borrow_mut().insert(name, value.to_string());
    }
}

/// Whether `node` is a `<tag>` element.
pub fn is_tag(node: &NodeRef, tag: &str) -> bool {
    node.as_element()
        .is_some_and(|el| el.name.local.as_ref() == tag)
}

pub fn has_class(node: &NodeRef, class: &str) -> bool {
    attr(node, "class").is_some_and(|c| c.split_whitespace().any(|c| c == class))
}

/// Serialize a node including its own tag.
pub fn outer_html(node: &NodeRef) -> String {
    node.to_string()
}

/// Serialize the children of a node, without the node's own tag.
pub fn inner_html(node: &NodeRef) -> String {
    node.children().map(|child| child.to_string()).collect()
}

/// Serialize a tree built by [`parse_fragment`] back to a fragment.
pub fn fragment_html(fragment: &NodeRef) -> String {
    select_first(fragment, "html")
        .map(|root| inner_html(&root))
        .unwrap_or_default()
}

/// Build a detached, empty element.
///
/// Goes through the parser so the element carries the HTML namespace that
/// the serializer expects.
pub fn new_element(tag: &str) -> Option<NodeRef> {
    let document = parse_fragment(&format!("<{tag}></{tag}>"));
    let element = select_first(&document, tag)?;
    element.detach();
    Some(element)
}

/// Replace `node` with its children.
pub fn unwrap(node: &NodeRef) {
    let children: Vec<NodeRef> = node.children().collect();
    for child in children {
        node.insert_before(child);
    }
    node.detach();
}
