use super::*;

fn build(html: &str) -> (Dom, SectionTree) {
    let mut dom = Dom::parse_fragment(html);
    let root = dom.root();
    let tree = treeify(&mut dom, root).unwrap();
    (dom, tree)
}

fn head_text(dom: &Dom, node: &SectionNode) -> String {
    let head = dom.children(node.node)[0];
    dom.text_content(head).trim().to_string()
}

fn body_text(dom: &Dom, node: &SectionNode) -> String {
    let body = dom.children(node.node)[1];
    dom.text_content(body).trim().to_string()
}

fn is_inside(dom: &Dom, inner: NodeId, outer: NodeId) -> bool {
    let mut current = dom.parent(inner);
    while let Some(id) = current {
        if id == outer {
            return true;
        }
        current = dom.parent(id);
    }
    false
}

fn depth_counts(tree: &SectionTree) -> Vec<usize> {
    let max = tree.iter().map(|n| n.depth).max().unwrap_or(0);
    (0..=max).map(|d| tree.at_depth(d).count()).collect()
}

// ============================================================================
// Heading structure
// ============================================================================

#[test]
fn test_h1_p() {
    let (dom, tree) = build("<h1 id=\"h1\">H1</h1>\n<p>Hello World</p>\n");

    assert_eq!(tree.len(), 2);
    assert_eq!(depth_counts(&tree), vec![1, 1]);

    let top = &tree.nodes[0];
    let para = &tree.nodes[1];
    assert_eq!(head_text(&dom, top), "H1");
    assert_eq!(body_text(&dom, para), "Hello World");
    assert!(para.headless);
    assert!(is_inside(&dom, para.node, top.node));
}

#[test]
fn test_h2_p_p() {
    let (dom, tree) = build("<h2>H2</h2>\n<p>Hello World</p>\n<p>Goodbye World</p>\n");

    assert_eq!(tree.len(), 3);
    assert_eq!(depth_counts(&tree), vec![1, 2]);

    let children: Vec<_> = tree.at_depth(1).collect();
    assert_eq!(head_text(&dom, &tree.nodes[0]), "H2");
    assert_eq!(body_text(&dom, children[0]), "Hello World");
    assert_eq!(body_text(&dom, children[1]), "Goodbye World");
    assert!(children.iter().all(|n| n.headless));
}

#[test]
fn test_h1_h1() {
    let (dom, tree) = build("<h1>H1a</h1>\n<h1>H1b</h1>\n");

    assert_eq!(tree.len(), 2);
    assert_eq!(depth_counts(&tree), vec![2]);
    assert_eq!(head_text(&dom, &tree.nodes[0]), "H1a");
    assert_eq!(head_text(&dom, &tree.nodes[1]), "H1b");

    assert_eq!(dom.select_class(dom.root(), "node-body").len(), 2);
    let body = dom.children(tree.nodes[0].node)[1];
    assert_eq!(dom.inner_html(body), "<div> </div>");
}

#[test]
fn test_h1_p_h1() {
    let (dom, tree) = build("<h1>H1a</h1>\n<p>Hello World</p>\n<h1>H1b</h1>\n");

    assert_eq!(tree.len(), 3);
    assert_eq!(depth_counts(&tree), vec![2, 1]);

    let top: Vec<_> = tree.at_depth(0).collect();
    assert_eq!(head_text(&dom, top[0]), "H1a");
    assert_eq!(head_text(&dom, top[1]), "H1b");

    let para = tree.at_depth(1).next().unwrap();
    assert_eq!(body_text(&dom, para), "Hello World");
    assert!(is_inside(&dom, para.node, top[0].node));
}

#[test]
fn test_h1_p_p_h2_leading_run_is_one_node() {
    let (dom, tree) = build(
        "<h1>H1</h1>\n<p>Hello World</p>\n<p>Goodbye World</p>\n<h2>H2</h2>\n",
    );

    assert_eq!(tree.len(), 3);
    assert_eq!(depth_counts(&tree), vec![1, 2]);

    let children: Vec<_> = tree.at_depth(1).collect();
    assert!(children[0].headless);
    let body = dom.children(children[0].node)[1];
    let paragraphs: Vec<_> = dom
        .children(body)
        .iter()
        .map(|&p| dom.text_content(p))
        .collect();
    assert_eq!(paragraphs, vec!["Hello World", "Goodbye World"]);
    assert_eq!(head_text(&dom, children[1]), "H2");
}

#[test]
fn test_h1_h2() {
    let (dom, tree) = build("<h1>H1</h1>\n<h2>H2</h2>\n");

    assert_eq!(tree.len(), 2);
    assert_eq!(depth_counts(&tree), vec![1, 1]);
    assert_eq!(head_text(&dom, &tree.nodes[0]), "H1");
    assert_eq!(head_text(&dom, &tree.nodes[1]), "H2");
    assert!(is_inside(&dom, tree.nodes[1].node, tree.nodes[0].node));
}

#[test]
fn test_h1_p_h2_p() {
    let (dom, tree) = build(
        "<h1>H1</h1>\n<p>Hello World</p>\n<h2>H2</h2>\n<p>Goodbye World</p>",
    );

    assert_eq!(tree.len(), 4);
    assert_eq!(depth_counts(&tree), vec![1, 2, 1]);

    let mid: Vec<_> = tree.at_depth(1).collect();
    assert_eq!(body_text(&dom, mid[0]), "Hello World");
    assert_eq!(head_text(&dom, mid[1]), "H2");

    let deep = tree.at_depth(2).next().unwrap();
    assert_eq!(body_text(&dom, deep), "Goodbye World");
    assert!(is_inside(&dom, deep.node, mid[1].node));
}

#[test]
fn test_h1_h3_depth_is_relative() {
    let (dom, tree) = build("<h1>H1</h1>\n<h3>H3</h3>\n");

    assert_eq!(depth_counts(&tree), vec![1, 1]);
    assert_eq!(head_text(&dom, &tree.nodes[1]), "H3");
}

#[test]
fn test_h2_h3_h6() {
    let (dom, tree) = build("<h2>H2</h2>\n<h3>H3</h3>\n<h6>H6</h6>\n");

    assert_eq!(depth_counts(&tree), vec![1, 1, 1]);
    let heads: Vec<_> = tree.iter().map(|n| head_text(&dom, n)).collect();
    assert_eq!(heads, vec!["H2", "H3", "H6"]);
    assert!(is_inside(&dom, tree.nodes[2].node, tree.nodes[1].node));
    assert!(is_inside(&dom, tree.nodes[1].node, tree.nodes[0].node));
}

#[test]
fn test_h1_h3_h2_h3() {
    let (dom, tree) = build(
        "<h1>H1</h1>\n<h3>H3 depth 1</h3>\n<h2>H2</h2>\n<h3>H3 depth 2</h3>\n",
    );

    assert_eq!(tree.len(), 4);
    assert_eq!(depth_counts(&tree), vec![1, 2, 1]);

    let mid: Vec<_> = tree.at_depth(1).collect();
    assert_eq!(head_text(&dom, mid[0]), "H3 depth 1");
    assert_eq!(head_text(&dom, mid[1]), "H2");

    let deep = tree.at_depth(2).next().unwrap();
    assert_eq!(head_text(&dom, deep), "H3 depth 2");
    assert!(is_inside(&dom, deep.node, mid[1].node));
}

#[test]
fn test_hr_has_lowest_priority() {
    let (dom, tree) = build("<h2>A</h2>\n<p>x</p>\n<hr>\n<p>y</p>\n");

    assert_eq!(depth_counts(&tree), vec![1, 2, 1]);
    let hr_node = tree.at_depth(1).nth(1).unwrap();
    assert!(!hr_node.headless);
    let head = dom.children(hr_node.node)[0];
    assert_eq!(dom.inner_html(head), "<hr>");
}

#[test]
fn test_no_headings_all_headless() {
    let (dom, tree) = build("<p>a</p>\n<p>b</p>\n");

    assert_eq!(tree.len(), 2);
    assert!(tree.iter().all(|n| n.headless && n.leaf && n.depth == 0));
    let head = dom.children(tree.nodes[0].node)[0];
    assert_eq!(dom.inner_html(head), "<div></div>");
}

#[test]
fn test_blank_text_is_pruned() {
    let (dom, _) = build("<h1>A</h1>\n\n<p>x</p>\n");
    assert!(dom.children(dom.root()).iter().all(|&id| dom.tag(id).is_some()));
}

// ============================================================================
// Lists
// ============================================================================

#[test]
fn test_list_items_become_nodes() {
    let (dom, tree) = build(
        "<h1>L</h1>\n<ul>\n<li>one <em>x</em></li>\n<li>two</li>\n</ul>\n",
    );

    assert_eq!(depth_counts(&tree), vec![1, 2]);
    let items: Vec<_> = tree.at_depth(1).collect();
    assert!(items.iter().all(|n| dom.tag(n.node) == Some("li") && n.leaf));

    let head = dom.children(items[0].node)[0];
    assert_eq!(dom.tag(head), Some("span"));
    assert!(dom.has_class(head, "node-head"));
    assert_eq!(dom.text_content(head), "one ");
    assert_eq!(body_text(&dom, items[0]), "x");
    assert!(dom.has_class(items[1].node, "node-depth-1"));
}

#[test]
fn test_list_item_starting_with_element_is_opaque() {
    let (dom, tree) = build("<h1>L</h1>\n<ol><li><p>para</p></li></ol>\n");

    let item = tree.at_depth(1).next().unwrap();
    assert_eq!(dom.tag(item.node), Some("li"));
    assert!(item.leaf);
    assert!(item.id.starts_with("node-"));
    assert_eq!(dom.inner_html(item.node), "<p>para</p>");
}

#[test]
fn test_list_among_other_content_is_not_promoted() {
    let (dom, tree) = build("<h1>L</h1>\n<p>intro</p>\n<ul><li>a</li></ul>\n");

    assert_eq!(depth_counts(&tree), vec![1, 2]);
    assert!(tree.at_depth(1).all(|n| n.headless));
    assert!(dom.select_class(dom.root(), "node").iter().all(|&id| dom.tag(id) == Some("div")));
}

// ============================================================================
// Leaves and ids
// ============================================================================

#[test]
fn test_leaf_marking() {
    let (dom, tree) = build("<h1>H1</h1>\n<p>Hello</p>\n");

    assert!(!tree.nodes[0].leaf);
    assert!(tree.nodes[1].leaf);
    assert!(!dom.has_class(tree.nodes[0].node, "node-leaf"));
    assert!(dom.has_class(tree.nodes[1].node, "node-leaf"));
}

#[test]
fn test_id_format() {
    let (dom, tree) = build("<h1>H1</h1>\n<p>Hello</p>\n");

    for node in tree.iter() {
        assert_eq!(node.id.len(), "node-".len() + 8);
        assert!(node.id.starts_with("node-"));
        assert_eq!(dom.attr(node.node, "id"), Some(node.id.as_str()));
    }
}

#[test]
fn test_ids_are_deterministic() {
    let html = "<h1>A</h1>\n<p>x</p>\n<h2>B</h2>\n<p>y</p>\n";
    let (_, first) = build(html);
    let (_, second) = build(html);

    let ids = |t: &SectionTree| t.iter().map(|n| n.id.clone()).collect::<Vec<_>>();
    assert_eq!(ids(&first), ids(&second));
}

#[test]
fn test_editing_one_section_keeps_sibling_ids() {
    let (_, before) = build("<h1>A</h1>\n<p>x</p>\n<h1>B</h1>\n<p>y</p>\n");
    let (_, after) = build("<h1>A</h1>\n<p>x</p>\n<h1>B</h1>\n<p>z</p>\n");

    let top = |t: &SectionTree| t.at_depth(0).map(|n| n.id.clone()).collect::<Vec<_>>();
    let (before, after) = (top(&before), top(&after));
    assert_eq!(before[0], after[0]);
    assert_ne!(before[1], after[1]);
}

#[test]
fn test_canonical_shape() {
    let (dom, tree) = build("<h1>T</h1>\n<p>x</p>\n");
    let top = &tree.nodes[0];

    assert_eq!(dom.tag(top.node), Some("div"));
    assert_eq!(dom.attr(top.node, "class"), Some("node node-depth-0"));
    let parts = dom.children(top.node);
    assert_eq!(parts.len(), 2);
    assert!(dom.has_class(parts[0], "node-head"));
    assert!(dom.has_class(parts[1], "node-body"));
    assert_eq!(
        dom.attr(tree.nodes[1].node, "class"),
        Some("node node-depth-1 headless node-leaf")
    );
}
