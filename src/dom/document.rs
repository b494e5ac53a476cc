//! Arena-backed HTML document.
//!
//! A deliberately small DOM: elements with attributes, text or raw inner
//! markup, and children. It implements [`WidgetDom`] so the widget can paint
//! the first page on the server, and it is what the widget tests assert on.

use std::cell::RefCell;
use std::collections::BTreeMap;

use super::{
    ATTR_I18N_PLACEHOLDER, ATTR_I18N_TEXT, DelegatedTarget, EXAMPLE_BUTTON_CLASS,
    EXAMPLES_CONTAINER_ID, INPUT_ID, MESSAGES_ID, MessageElement, WidgetDom, escape_html,
};

/// Index of an element in its [`Document`].
pub type NodeId = usize;

const VOID_ELEMENTS: &[&str] = &["input", "meta", "link", "br", "img"];

#[derive(Debug, Clone, Default)]
struct Element {
    tag: String,
    attributes: BTreeMap<String, String>,
    text: String,
    inner_html: Option<String>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
    scroll_top: usize,
}

#[derive(Debug)]
struct Tree {
    nodes: Vec<Option<Element>>,
}

impl Tree {
    fn get(&self, id: NodeId) -> Option<&Element> {
        self.nodes.get(id).and_then(Option::as_ref)
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        self.nodes.get_mut(id).and_then(Option::as_mut)
    }

    /// Attached elements in document order.
    fn walk(&self, from: NodeId, out: &mut Vec<NodeId>) {
        if let Some(el) = self.get(from) {
            out.push(from);
            for &child in &el.children {
                self.walk(child, out);
            }
        }
    }

    fn drop_subtree(&mut self, id: NodeId) {
        let children = self.get(id).map(|el| el.children.clone()).unwrap_or_default();
        for child in children {
            self.drop_subtree(child);
        }
        if let Some(slot) = self.nodes.get_mut(id) {
            *slot = None;
        }
    }
}

/// In-memory HTML document rooted at an `<html>` element.
#[derive(Debug)]
pub struct Document {
    tree: RefCell<Tree>,
    head: NodeId,
    body: NodeId,
}

/// Root element id.
const ROOT: NodeId = 0;

impl Document {
    /// Empty document with `<head>` and `<body>`.
    pub fn new() -> Self {
        let mut tree = Tree {
            nodes: vec![Some(Element {
                tag: "html".to_string(),
                ..Element::default()
            })],
        };
        let mut push = |tag: &str| {
            let id = tree.nodes.len();
            tree.nodes.push(Some(Element {
                tag: tag.to_string(),
                parent: Some(ROOT),
                ..Element::default()
            }));
            if let Some(root) = tree.get_mut(ROOT) {
                root.children.push(id);
            }
            id
        };
        let head = push("head");
        let body = push("body");
        Self {
            tree: RefCell::new(tree),
            head,
            body,
        }
    }

    pub fn root(&self) -> NodeId {
        ROOT
    }

    pub fn head(&self) -> NodeId {
        self.head
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    /// Create a `<tag>` element as the last child of `parent`.
    pub fn append_element(&self, parent: NodeId, tag: &str) -> NodeId {
        let mut tree = self.tree.borrow_mut();
        let id = tree.nodes.len();
        tree.nodes.push(Some(Element {
            tag: tag.to_string(),
            parent: Some(parent),
            ..Element::default()
        }));
        if let Some(p) = tree.get_mut(parent) {
            p.children.push(id);
        }
        id
    }

    pub fn set_attribute(&self, node: NodeId, name: &str, value: &str) {
        if let Some(el) = self.tree.borrow_mut().get_mut(node) {
            el.attributes.insert(name.to_string(), value.to_string());
        }
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.tree
            .borrow()
            .get(node)
            .and_then(|el| el.attributes.get(name).cloned())
    }

    /// Replace the element's content with escaped text.
    pub fn set_text(&self, node: NodeId, text: &str) {
        let removed = {
            let mut tree = self.tree.borrow_mut();
            let Some(el) = tree.get_mut(node) else {
                return;
            };
            el.text = text.to_string();
            el.inner_html = None;
            std::mem::take(&mut el.children)
        };
        let mut tree = self.tree.borrow_mut();
        for child in removed {
            tree.drop_subtree(child);
        }
    }

    /// Replace the element's content with raw markup.
    pub fn set_inner_html(&self, node: NodeId, html: &str) {
        self.set_text(node, "");
        if let Some(el) = self.tree.borrow_mut().get_mut(node) {
            el.inner_html = Some(html.to_string());
        }
    }

    /// Text set with [`Document::set_text`] followed by that of the children.
    pub fn text_content(&self, node: NodeId) -> String {
        let tree = self.tree.borrow();
        let mut order = Vec::new();
        tree.walk(node, &mut order);
        order
            .into_iter()
            .filter_map(|id| tree.get(id).map(|el| el.text.clone()))
            .collect()
    }

    pub fn inner_html(&self, node: NodeId) -> Option<String> {
        self.tree.borrow().get(node).and_then(|el| el.inner_html.clone())
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.tree
            .borrow()
            .get(node)
            .map(|el| el.children.clone())
            .unwrap_or_default()
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.tree.borrow().get(node).and_then(|el| el.parent)
    }

    pub fn tag(&self, node: NodeId) -> Option<String> {
        self.tree.borrow().get(node).map(|el| el.tag.clone())
    }

    /// First attached element with the given `id` attribute.
    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.find(|el| el.attributes.get("id").is_some_and(|v| v == id))
            .first()
            .copied()
    }

    /// Attached elements carrying `name`, in document order.
    pub fn elements_with_attribute(&self, name: &str) -> Vec<NodeId> {
        self.find(|el| el.attributes.contains_key(name))
    }

    /// Attached elements whose class list contains `class`, in document order.
    pub fn elements_with_class(&self, class: &str) -> Vec<NodeId> {
        self.find(|el| {
            el.attributes
                .get("class")
                .is_some_and(|list| list.split_whitespace().any(|c| c == class))
        })
    }

    fn find(&self, pred: impl Fn(&Element) -> bool) -> Vec<NodeId> {
        let tree = self.tree.borrow();
        let mut order = Vec::new();
        tree.walk(ROOT, &mut order);
        order
            .into_iter()
            .filter(|&id| tree.get(id).is_some_and(&pred))
            .collect()
    }

    /// Detach and drop `node` with its subtree.
    pub fn remove(&self, node: NodeId) {
        if node == ROOT {
            return;
        }
        let mut tree = self.tree.borrow_mut();
        let parent = tree.get(node).and_then(|el| el.parent);
        if let Some(p) = parent.and_then(|p| tree.get_mut(p)) {
            p.children.retain(|&c| c != node);
        }
        tree.drop_subtree(node);
    }

    pub fn clear_children(&self, node: NodeId) {
        for child in self.children(node) {
            self.remove(child);
        }
    }

    /// Scroll offset, measured in child elements.
    pub fn scroll_top(&self, node: NodeId) -> usize {
        self.tree.borrow().get(node).map_or(0, |el| el.scroll_top)
    }

    pub fn scroll_height(&self, node: NodeId) -> usize {
        self.tree.borrow().get(node).map_or(0, |el| el.children.len())
    }

    /// Handle for event delegation.
    pub fn node(&self, id: NodeId) -> NodeRef<'_> {
        NodeRef { doc: self, id }
    }

    /// Serialize the whole document, doctype included.
    pub fn render(&self) -> String {
        let tree = self.tree.borrow();
        let mut out = String::from("<!DOCTYPE html>\n");
        render_node(&tree, ROOT, &mut out);
        out
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

fn render_node(tree: &Tree, id: NodeId, out: &mut String) {
    let Some(el) = tree.get(id) else {
        return;
    };
    out.push('<');
    out.push_str(&el.tag);
    for (name, value) in &el.attributes {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&escape_html(value));
        out.push('"');
    }
    out.push('>');
    if VOID_ELEMENTS.contains(&el.tag.as_str()) {
        return;
    }
    out.push_str(&escape_html(&el.text));
    if let Some(html) = &el.inner_html {
        out.push_str(html);
    }
    for &child in &el.children {
        render_node(tree, child, out);
    }
    out.push_str("</");
    out.push_str(&el.tag);
    out.push('>');
}

impl WidgetDom for Document {
    fn set_document_language(&self, tag: &str) {
        self.set_attribute(ROOT, "lang", tag);
    }

    fn localize_text(&self, lookup: &dyn Fn(&str) -> Option<String>) {
        for node in self.elements_with_attribute(ATTR_I18N_TEXT) {
            if let Some(text) = self
                .attribute(node, ATTR_I18N_TEXT)
                .and_then(|key| lookup(&key))
            {
                self.set_text(node, &text);
            }
        }
    }

    fn localize_placeholders(&self, lookup: &dyn Fn(&str) -> Option<String>) {
        for node in self.elements_with_attribute(ATTR_I18N_PLACEHOLDER) {
            if let Some(text) = self
                .attribute(node, ATTR_I18N_PLACEHOLDER)
                .and_then(|key| lookup(&key))
            {
                self.set_attribute(node, "placeholder", &text);
            }
        }
    }

    fn replace_example_questions(&self, questions: &[String]) {
        let Some(container) = self.element_by_id(EXAMPLES_CONTAINER_ID) else {
            tracing::warn!(id = EXAMPLES_CONTAINER_ID, "Example container missing");
            return;
        };
        self.clear_children(container);
        for question in questions {
            let button = self.append_element(container, "button");
            self.set_attribute(button, "type", "button");
            self.set_attribute(button, "class", EXAMPLE_BUTTON_CLASS);
            self.set_text(button, question);
        }
    }

    fn append_message(&self, message: &MessageElement) {
        let Some(container) = self.element_by_id(MESSAGES_ID) else {
            tracing::warn!(id = MESSAGES_ID, "Transcript container missing");
            return;
        };
        let node = self.append_element(container, "div");
        self.set_attribute(node, "class", &message.classes.join(" "));
        if let Some(id) = &message.id {
            self.set_attribute(node, "id", id);
        }
        self.set_inner_html(node, &message.html);
    }

    fn remove_message(&self, id: &str) -> bool {
        match self.element_by_id(id) {
            Some(node) => {
                self.remove(node);
                true
            }
            None => false,
        }
    }

    fn scroll_transcript_to_bottom(&self) {
        if let Some(container) = self.element_by_id(MESSAGES_ID) {
            let height = self.scroll_height(container);
            if let Some(el) = self.tree.borrow_mut().get_mut(container) {
                el.scroll_top = height;
            }
        }
    }

    fn input_value(&self) -> String {
        self.element_by_id(INPUT_ID)
            .and_then(|input| self.attribute(input, "value"))
            .unwrap_or_default()
    }

    fn clear_input(&self) {
        if let Some(input) = self.element_by_id(INPUT_ID) {
            self.set_attribute(input, "value", "");
        }
    }
}

/// A [`Document`] element as an event target.
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    doc: &'a Document,
    id: NodeId,
}

impl NodeRef<'_> {
    pub fn node_id(&self) -> NodeId {
        self.id
    }
}

impl DelegatedTarget for NodeRef<'_> {
    fn attribute(&self, name: &str) -> Option<String> {
        self.doc.attribute(self.id, name)
    }

    fn text(&self) -> String {
        self.doc.text_content(self.id)
    }

    fn parent(&self) -> Option<Self> {
        self.doc.parent(self.id).map(|id| NodeRef { doc: self.doc, id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_escapes_text_and_attributes() {
        let doc = Document::new();
        let p = doc.append_element(doc.body(), "p");
        doc.set_attribute(p, "title", r#"say "hi""#);
        doc.set_text(p, "1 < 2 & 3");
        let input = doc.append_element(doc.body(), "input");
        doc.set_attribute(input, "id", "q");

        let html = doc.render();
        assert!(html.starts_with("<!DOCTYPE html>\n<html>"));
        assert!(html.contains(r#"<p title="say &quot;hi&quot;">1 &lt; 2 &amp; 3</p>"#));
        assert!(html.contains(r#"<input id="q"></body>"#));
    }

    #[test]
    fn test_inner_html_is_raw() {
        let doc = Document::new();
        let div = doc.append_element(doc.body(), "div");
        doc.set_inner_html(div, "<a href=\"x\">x</a>");
        assert!(doc.render().contains("<div><a href=\"x\">x</a></div>"));
    }

    #[test]
    fn test_remove_detaches_subtree() {
        let doc = Document::new();
        let outer = doc.append_element(doc.body(), "div");
        doc.set_attribute(outer, "id", "outer");
        let inner = doc.append_element(outer, "span");
        doc.set_attribute(inner, "id", "inner");

        doc.remove(outer);
        assert!(doc.element_by_id("outer").is_none());
        assert!(doc.element_by_id("inner").is_none());
        assert!(doc.children(doc.body()).is_empty());
    }

    #[test]
    fn test_set_text_replaces_children() {
        let doc = Document::new();
        let div = doc.append_element(doc.body(), "div");
        let child = doc.append_element(div, "b");
        doc.set_attribute(child, "id", "child");
        doc.set_text(div, "plain");

        assert!(doc.element_by_id("child").is_none());
        assert_eq!(doc.text_content(div), "plain");
    }

    #[test]
    fn test_queries_follow_document_order() {
        let doc = Document::new();
        let a = doc.append_element(doc.body(), "div");
        doc.set_attribute(a, ATTR_I18N_TEXT, "a");
        let b = doc.append_element(a, "span");
        doc.set_attribute(b, ATTR_I18N_TEXT, "b");
        let c = doc.append_element(doc.body(), "p");
        doc.set_attribute(c, ATTR_I18N_TEXT, "c");

        assert_eq!(doc.elements_with_attribute(ATTR_I18N_TEXT), vec![a, b, c]);
    }

    #[test]
    fn test_input_value_round_trip() {
        let doc = Document::new();
        assert_eq!(doc.input_value(), "");
        let input = doc.append_element(doc.body(), "input");
        doc.set_attribute(input, "id", INPUT_ID);
        doc.set_attribute(input, "value", "hello");
        assert_eq!(doc.input_value(), "hello");
        doc.clear_input();
        assert_eq!(doc.input_value(), "");
    }
}
