//! Converter output to [`Dom`] via `tl`.

use super::{Dom, NodeId};

impl Dom {
    /// Parse an HTML fragment; top-level nodes become children of the root.
    ///
    /// `tl` only rejects inputs larger than `u32::MAX` bytes; such input is
    /// kept as a single raw text node.
    pub fn parse_fragment(html: &str) -> Self {
        let mut dom = Self::new();
        let root = dom.root();

        let Ok(vdom) = tl::parse(html, tl::ParserOptions::default()) else {
            let text = dom.create_text(html);
            dom.append(root, text);
            return dom;
        };

        let parser = vdom.parser();
        for handle in vdom.children() {
            if let Some(id) = dom.import_tl(*handle, parser) {
                dom.append(root, id);
            }
        }
        dom
    }

    fn import_tl(&mut self, handle: tl::NodeHandle, parser: &tl::Parser) -> Option<NodeId> {
        let node = handle.get(parser)?;

        match node {
            tl::Node::Tag(tag) => {
                let id = self.create_element(&tag.name().as_utf8_str());
                for (key, value) in tag.attributes().iter() {
                    let key: &str = key.as_ref();
                    let value = value.map(|v| v.to_string());
                    self.push_parsed_attr(id, key, value);
                }
                for child in tag.children().top().iter() {
                    if let Some(child_id) = self.import_tl(*child, parser) {
                        self.append(id, child_id);
                    }
                }
                Some(id)
            }
            tl::Node::Raw(bytes) => Some(self.create_text(&bytes.as_utf8_str())),
            tl::Node::Comment(bytes) => Some(self.create_comment(&bytes.as_utf8_str())),
        }
    }

    fn push_parsed_attr(&mut self, id: NodeId, key: &str, value: Option<String>) {
        if let super::NodeKind::Element { attrs, .. } = &mut self.node_mut(id).kind {
            attrs.push((key.to_ascii_lowercase(), value));
        }
    }
}
