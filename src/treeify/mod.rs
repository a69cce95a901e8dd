//! Section tree reconstruction.
//!
//! Converter output is flat: headings and paragraphs are siblings. This
//! module regroups one fragment into nested section nodes whose depth is
//! relative to the enclosing section, so an `<h3>` directly under an `<h1>`
//! sits at depth 1.
//!
//! ```text
//! <h1>T</h1>                 <div class="node node-depth-0" id="node-…">
//! <h2>S</h2>          ->       <div class="node-head"><h1>T</h1></div>
//! <p>x</p>                     <div class="node-body"> …depth 1… </div>
//!                            </div>
//! ```
//!
//! # Algorithm
//!
//! For a container at depth `d`, each heading owns the siblings that follow
//! it up to the next heading of equal or higher priority. Lower-priority
//! headings inside that run are resolved by recursing into the body at
//! `d + 1`. Content with no governing heading becomes headless nodes.
//! Ids are `node-` plus a blake3 fingerprint of the node's HTML, taken once
//! its nested sections are in place.

mod rank;
#[cfg(test)]
mod tests;

pub use rank::HeadKind;

use crate::dom::{Dom, NodeId};
use crate::error::TreeError;
use crate::utils::hash;
use rustc_hash::{FxHashMap, FxHashSet};

/// One section node produced by [`treeify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionNode {
    pub node: NodeId,
    pub depth: usize,
    /// `node-xxxxxxxx`
    pub id: String,
    pub headless: bool,
    pub leaf: bool,
}

/// Every section node of one fragment, in document order.
#[derive(Debug, Clone, Default)]
pub struct SectionTree {
    pub nodes: Vec<SectionNode>,
}

impl SectionTree {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SectionNode> {
        self.nodes.iter()
    }

    /// Nodes at exactly `depth`.
    #[cfg(test)]
    pub fn at_depth(&self, depth: usize) -> impl Iterator<Item = &SectionNode> {
        self.nodes.iter().filter(move |n| n.depth == depth)
    }
}

/// Restructure the children of `container` into section nodes.
pub fn treeify(dom: &mut Dom, container: NodeId) -> Result<SectionTree, TreeError> {
    let marked = dom
        .descendants(container)
        .into_iter()
        .filter(|&id| dom.tag(id).is_some_and(|tag| HeadKind::from_tag(tag).is_some()))
        .collect();

    let mut builder = Builder {
        dom,
        marked,
        sections: FxHashMap::default(),
    };
    builder.build(container, 0)?;
    Ok(builder.finish(container))
}

struct Meta {
    depth: usize,
    id: String,
    headless: bool,
}

struct Builder<'a> {
    dom: &'a mut Dom,
    /// Heading-like elements, collected once before restructuring.
    marked: FxHashSet<NodeId>,
    sections: FxHashMap<NodeId, Meta>,
}

impl Builder<'_> {
    fn build(&mut self, container: NodeId, depth: usize) -> Result<(), TreeError> {
        let children: Vec<NodeId> = self
            .dom
            .children(container)
            .iter()
            .copied()
            .filter(|&id| !self.dom.is_blank_text(id))
            .collect();

        let ranks = children
            .iter()
            .map(|&id| self.rank_of(id))
            .collect::<Result<Vec<_>, _>>()?;

        let Some(first) = ranks.iter().position(Option::is_some) else {
            let nodes = children
                .into_iter()
                .map(|child| self.headless(vec![child], depth))
                .collect();
            self.replace_children(container, nodes);
            return Ok(());
        };

        let mut nodes = Vec::new();
        if first > 0 {
            nodes.push(self.headless(children[..first].to_vec(), depth));
        }

        let mut cursor = first;
        while let Some(Some(rank)) = ranks.get(cursor).copied() {
            let next = ranks[cursor + 1..]
                .iter()
                .position(|r| r.is_some_and(|r| r <= rank))
                .map_or(children.len(), |offset| cursor + 1 + offset);

            let body = children[cursor + 1..next].to_vec();
            nodes.push(self.section(children[cursor], body, depth)?);
            cursor = next;
        }

        self.replace_children(container, nodes);
        Ok(())
    }

    /// Rank of a marked element, `None` for ordinary content.
    fn rank_of(&self, id: NodeId) -> Result<Option<u8>, TreeError> {
        if !self.marked.contains(&id) {
            return Ok(None);
        }
        let tag = self.dom.tag(id).unwrap_or_default();
        HeadKind::from_tag(tag)
            .map(|kind| Some(kind.rank()))
            .ok_or_else(|| TreeError::UnknownRank { tag: tag.to_owned() })
    }

    fn replace_children(&mut self, container: NodeId, nodes: Vec<NodeId>) {
        // Blank text that was skipped is still attached; free it.
        for stale in self.dom.children(container).to_vec() {
            if self.dom.is_blank_text(stale) {
                self.dom.remove(stale);
            }
        }
        self.dom.set_children(container, nodes);
    }

    /// Canonical node shell: `div.node > (div.node-head, div.node-body)`.
    fn shell(&mut self, head: NodeId, body: Vec<NodeId>, depth: usize) -> (NodeId, NodeId) {
        let node = self.dom.create_element("div");
        self.dom.set_attr(node, "class", &format!("node node-depth-{depth}"));

        let head_wrap = self.dom.create_element("div");
        self.dom.set_attr(head_wrap, "class", "node-head");
        self.dom.append(head_wrap, head);

        let body_wrap = self.dom.create_element("div");
        self.dom.set_attr(body_wrap, "class", "node-body");
        if body.is_empty() {
            let placeholder = self.dom.create_element("div");
            let space = self.dom.create_text(" ");
            self.dom.append(placeholder, space);
            self.dom.append(body_wrap, placeholder);
        }
        for child in body {
            self.dom.append(body_wrap, child);
        }

        self.dom.append(node, head_wrap);
        self.dom.append(node, body_wrap);
        (node, body_wrap)
    }

    fn section(&mut self, head: NodeId, body: Vec<NodeId>, depth: usize) -> Result<NodeId, TreeError> {
        let list = match body.as_slice() {
            [only] if matches!(self.dom.tag(*only), Some("ul" | "ol")) => Some(*only),
            _ => None,
        };
        let recurse = list.is_none() && !body.is_empty();
        let (node, body_wrap) = self.shell(head, body, depth);

        if let Some(list) = list {
            self.list_items(list, depth + 1);
        } else if recurse {
            self.build(body_wrap, depth + 1)?;
        }

        self.register(node, depth, false);
        Ok(node)
    }

    fn headless(&mut self, body: Vec<NodeId>, depth: usize) -> NodeId {
        let head = self.dom.create_element("div");
        let (node, _) = self.shell(head, body, depth);
        self.dom.add_class(node, "headless");
        self.register(node, depth, true);
        node
    }

    /// Promote each `<li>` of a section's only list to a node.
    fn list_items(&mut self, list: NodeId, depth: usize) {
        let items: Vec<NodeId> = self
            .dom
            .children(list)
            .iter()
            .copied()
            .filter(|&id| self.dom.tag(id) == Some("li"))
            .collect();

        for item in items {
            let children = self.dom.children(item).to_vec();
            // Items opening with an element are kept opaque.
            if let Some((&first, rest)) = children.split_first()
                && self.dom.text(first).is_some()
            {
                let head = self.dom.create_element("span");
                self.dom.set_attr(head, "class", "node-head");
                self.dom.append(head, first);

                let body = self.dom.create_element("div");
                self.dom.set_attr(body, "class", "node-body");
                for &child in rest {
                    self.dom.append(body, child);
                }
                self.dom.set_children(item, vec![head, body]);
            }

            self.dom
                .set_attr(item, "class", &format!("node node-depth-{depth}"));
            self.register(item, depth, false);
        }
    }

    fn register(&mut self, node: NodeId, depth: usize, headless: bool) {
        let id = format!("node-{}", hash::fingerprint(&self.dom.outer_html(node)));
        self.dom.set_attr(node, "id", &id);
        self.sections.insert(node, Meta { depth, id, headless });
    }

    /// Mark leaves and list the nodes in document order.
    fn finish(mut self, container: NodeId) -> SectionTree {
        let order: Vec<NodeId> = self
            .dom
            .descendants(container)
            .into_iter()
            .filter(|id| self.sections.contains_key(id))
            .collect();

        let mut nodes = Vec::with_capacity(order.len());
        for node in order {
            let leaf = !self
                .dom
                .descendants(node)
                .iter()
                .any(|id| self.sections.contains_key(id));
            if leaf {
                self.dom.add_class(node, "node-leaf");
            }
            if let Some(meta) = self.sections.remove(&node) {
                nodes.push(SectionNode {
                    node,
                    depth: meta.depth,
                    id: meta.id,
                    headless: meta.headless,
                    leaf,
                });
            }
        }
        SectionTree { nodes }
    }
}
