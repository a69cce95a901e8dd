//! [`Dom`] to HTML text.

use super::{Dom, NodeId, NodeKind};
use crate::utils::html::is_void_element;

impl Dom {
    /// Serialize the whole fragment (children of the root).
    pub fn to_html(&self) -> String {
        self.outer_html(self.root())
    }

    /// Serialize a node including its own tag.
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_node(id, &mut out);
        out
    }

    /// Serialize only the children of a node.
    #[cfg(test)]
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children(id) {
            self.write_node(child, &mut out);
        }
        out
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        let node = self.node(id);
        match &node.kind {
            NodeKind::Root => {
                for &child in &node.children {
                    self.write_node(child, out);
                }
            }
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Comment(text) if text.starts_with("<!--") => out.push_str(text),
            NodeKind::Comment(text) => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
            NodeKind::Element { tag, attrs } => {
                out.push('<');
                out.push_str(tag);
                for (key, value) in attrs {
                    out.push(' ');
                    out.push_str(key);
                    if let Some(value) = value {
                        // Parsed values may hold a bare `"` when the source
                        // used single quotes.
                        let quote = if value.contains('"') { '\'' } else { '"' };
                        out.push('=');
                        out.push(quote);
                        out.push_str(value);
                        out.push(quote);
                    }
                }
                out.push('>');

                if is_void_element(tag) {
                    return;
                }

                for &child in &node.children {
                    self.write_node(child, out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }
}
