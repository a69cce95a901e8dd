//! Owned, mutable HTML tree.
//!
//! Nodes live in an arena and are addressed by [`NodeId`] handles, so the
//! tree builder can freely re-parent, wrap and discard nodes while walking
//! the structure. Freed slots are recycled, which keeps repeated patches of
//! the composite document from growing the arena.
//!
//! - `parse` - converter output to `Dom` (through `tl`)
//! - `render` - `Dom` back to HTML text
//!
//! Attribute values are kept in their serialized (escaped) form: values read
//! from parsed markup are stored verbatim, values written through
//! [`Dom::set_attr`] are escaped on the way in.

mod parse;
mod render;

use crate::utils::html::escape_attr;
#[cfg(test)]
use crate::utils::html::unescape;

/// Handle to a node inside one [`Dom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
enum NodeKind {
    /// Fragment root; serializes its children only.
    Root,
    Element {
        tag: String,
        attrs: Vec<(String, Option<String>)>,
    },
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena-backed HTML fragment.
#[derive(Debug, Clone)]
pub struct Dom {
    nodes: Vec<Option<NodeData>>,
    free: Vec<u32>,
    root: NodeId,
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

impl Dom {
    /// Empty fragment containing only the root.
    pub fn new() -> Self {
        let root = NodeData {
            kind: NodeKind::Root,
            parent: None,
            children: Vec::new(),
        };
        Self {
            nodes: vec![Some(root)],
            free: Vec::new(),
            root: NodeId(0),
        }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of live nodes, root included.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    // ========================================================================
    // Allocation
    // ========================================================================

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let data = NodeData {
            kind,
            parent: None,
            children: Vec::new(),
        };
        match self.free.pop() {
            Some(slot) => {
                self.nodes[slot as usize] = Some(data);
                NodeId(slot)
            }
            None => {
                let id = NodeId(self.nodes.len() as u32);
                self.nodes.push(Some(data));
                id
            }
        }
    }

    fn node(&self, id: NodeId) -> &NodeData {
        match self.nodes.get(id.index()) {
            Some(Some(node)) => node,
            _ => panic!("dom node {id:?} used after free"),
        }
    }

    fn node_mut(&mut self, id: NodeId) -> &mut NodeData {
        match self.nodes.get_mut(id.index()) {
            Some(Some(node)) => node,
            _ => panic!("dom node {id:?} used after free"),
        }
    }

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(NodeKind::Element {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
        })
    }

    /// Create a detached text node. `text` is stored as markup (not escaped).
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.alloc(NodeKind::Text(text.to_owned()))
    }

    fn create_comment(&mut self, text: &str) -> NodeId {
        self.alloc(NodeKind::Comment(text.to_owned()))
    }

    // ========================================================================
    // Restructuring
    // ========================================================================

    /// Append `child` as the last child of `parent`, detaching it first.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        debug_assert_ne!(parent, child);
        self.detach(child);
        self.node_mut(child).parent = Some(parent);
        self.node_mut(parent).children.push(child);
    }

    /// Replace the children of `parent` with `children`.
    ///
    /// Previous children are detached but stay allocated; pair with
    /// [`Dom::remove`] to free them.
    pub fn set_children(&mut self, parent: NodeId, children: Vec<NodeId>) {
        let old = std::mem::take(&mut self.node_mut(parent).children);
        for id in old {
            self.node_mut(id).parent = None;
        }
        for child in children {
            self.append(parent, child);
        }
    }

    /// Unlink a node from its parent. The subtree stays allocated.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.node_mut(id).parent.take() {
            self.node_mut(parent).children.retain(|&c| c != id);
        }
    }

    /// Detach a node and free its whole subtree.
    pub fn remove(&mut self, id: NodeId) {
        debug_assert_ne!(id, self.root, "cannot remove the fragment root");
        self.detach(id);
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes[current.index()].take() {
                stack.extend(node.children);
                self.free.push(current.0);
            }
        }
    }

    /// Free every child of `parent`.
    pub fn clear_children(&mut self, parent: NodeId) {
        for child in self.node(parent).children.clone() {
            self.remove(child);
        }
    }

    /// Deep-copy `id` from `src` into this arena. The copy is detached.
    ///
    /// Importing a fragment root yields a `<div>` wrapping its children; use
    /// [`Dom::import_children`] to copy them without a wrapper.
    pub fn import(&mut self, src: &Dom, id: NodeId) -> NodeId {
        let data = src.node(id);
        let copy = match &data.kind {
            NodeKind::Root => self.create_element("div"),
            kind => self.alloc(kind.clone()),
        };
        for &child in &data.children {
            let child_copy = self.import(src, child);
            self.append(copy, child_copy);
        }
        copy
    }

    /// Deep-copy every child of `src`'s root under `parent`.
    pub fn import_children(&mut self, parent: NodeId, src: &Dom) {
        for &child in src.children(src.root()) {
            let copy = self.import(src, child);
            self.append(parent, copy);
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    #[inline]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    #[cfg(test)]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Tag name for elements, `None` for text, comments and the root.
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).kind {
            NodeKind::Element { tag, .. } => Some(tag),
            _ => None,
        }
    }

    /// Raw markup of a text node.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).kind {
            NodeKind::Text(text) => Some(text),
            _ => None,
        }
    }

    /// True for text nodes that only hold whitespace.
    pub fn is_blank_text(&self, id: NodeId) -> bool {
        self.text(id).is_some_and(|t| t.trim().is_empty())
    }

    /// Attribute value in serialized form. Boolean attributes read as `""`.
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        match &self.node(id).kind {
            NodeKind::Element { attrs, .. } => attrs
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_deref().unwrap_or("")),
            _ => None,
        }
    }

    /// Set (or replace) an attribute; `value` is escaped.
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        let escaped = escape_attr(value).into_owned();
        self.set_attr_raw(id, name, escaped);
    }

    fn set_attr_raw(&mut self, id: NodeId, name: &str, value: String) {
        if let NodeKind::Element { attrs, .. } = &mut self.node_mut(id).kind {
            match attrs.iter_mut().find(|(key, _)| key == name) {
                Some(slot) => slot.1 = Some(value),
                None => attrs.push((name.to_owned(), Some(value))),
            }
        }
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.attr(id, "class")
            .is_some_and(|classes| classes.split_ascii_whitespace().any(|c| c == class))
    }

    /// Append a class unless it is already present.
    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if self.has_class(id, class) {
            return;
        }
        let value = match self.attr(id, "class") {
            Some(existing) if !existing.trim().is_empty() => format!("{existing} {class}"),
            _ => class.to_owned(),
        };
        self.set_attr(id, "class", &value);
    }

    /// All descendants of `id` (excluding `id`) in document order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).iter().rev());
        }
        out
    }

    /// First descendant element with the given tag, in document order.
    pub fn find_tag(&self, from: NodeId, tag: &str) -> Option<NodeId> {
        self.descendants(from)
            .into_iter()
            .find(|&id| self.tag(id) == Some(tag))
    }

    /// Descendant elements carrying `class`, in document order.
    #[cfg(test)]
    pub fn select_class(&self, from: NodeId, class: &str) -> Vec<NodeId> {
        self.descendants(from)
            .into_iter()
            .filter(|&id| self.has_class(id, class))
            .collect()
    }

    /// Concatenated text of the subtree, entities decoded.
    #[cfg(test)]
    pub fn text_content(&self, id: NodeId) -> String {
        let mut raw = String::new();
        if let Some(text) = self.text(id) {
            raw.push_str(text);
        }
        for node in self.descendants(id) {
            if let Some(text) = self.text(node) {
                raw.push_str(text);
            }
        }
        unescape(&raw).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_serialize() {
        let html = r#"<h1 id="t">Title</h1><p>a &amp; b<br></p>"#;
        let dom = Dom::parse_fragment(html);
        assert_eq!(dom.children(dom.root()).len(), 2);
        assert_eq!(dom.to_html(), html);
    }

    #[test]
    fn test_tag_is_lowercase() {
        let dom = Dom::parse_fragment("<H2>x</H2>");
        let h2 = dom.children(dom.root())[0];
        assert_eq!(dom.tag(h2), Some("h2"));
    }

    #[test]
    fn test_text_content_decodes_entities() {
        let dom = Dom::parse_fragment("<p>a &lt; <em>b</em></p>");
        let p = dom.children(dom.root())[0];
        assert_eq!(dom.text_content(p), "a < b");
    }

    #[test]
    fn test_set_attr_escapes() {
        let mut dom = Dom::new();
        let div = dom.create_element("div");
        dom.append(dom.root(), div);
        dom.set_attr(div, "title", "a \"b\" & c");
        assert_eq!(dom.to_html(), r#"<div title="a &quot;b&quot; &amp; c"></div>"#);
    }

    #[test]
    fn test_add_class() {
        let mut dom = Dom::parse_fragment(r#"<div class="a"></div>"#);
        let div = dom.children(dom.root())[0];
        dom.add_class(div, "b");
        dom.add_class(div, "a");
        assert_eq!(dom.attr(div, "class"), Some("a b"));
        assert!(dom.has_class(div, "b"));
    }

    #[test]
    fn test_append_reparents() {
        let mut dom = Dom::parse_fragment("<div></div><p>x</p>");
        let root = dom.root();
        let (div, p) = (dom.children(root)[0], dom.children(root)[1]);
        dom.append(div, p);
        assert_eq!(dom.children(root), &[div]);
        assert_eq!(dom.parent(p), Some(div));
        assert_eq!(dom.to_html(), "<div><p>x</p></div>");
    }

    #[test]
    fn test_remove_recycles_slots() {
        let mut dom = Dom::parse_fragment("<div><p>x</p><p>y</p></div>");
        let before = dom.len();
        let div = dom.children(dom.root())[0];
        dom.remove(div);
        assert_eq!(dom.len(), 1);

        let other = Dom::parse_fragment("<div><p>x</p><p>y</p></div>");
        dom.import_children(dom.root(), &other);
        assert_eq!(dom.len(), before);
        assert_eq!(dom.nodes.len(), before);
    }

    #[test]
    fn test_find_and_select() {
        let dom = Dom::parse_fragment(
            r#"<html><body><main><div class="x">1</div><div class="y x">2</div></main></body></html>"#,
        );
        let main = dom.find_tag(dom.root(), "main").unwrap();
        let xs = dom.select_class(main, "x");
        assert_eq!(xs.len(), 2);
        assert_eq!(dom.text_content(xs[1]), "2");
    }

    #[test]
    fn test_void_element_has_no_closing_tag() {
        let mut dom = Dom::new();
        let hr = dom.create_element("hr");
        dom.append(dom.root(), hr);
        assert_eq!(dom.to_html(), "<hr>");
    }
}
