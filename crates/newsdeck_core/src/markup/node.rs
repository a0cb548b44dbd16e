//! Arena-backed tree for the trusted markup held by an editing surface.
//!
//! # Responsibility
//! - Parse surface markup into a navigable node tree and serialize it back.
//! - Provide the structural edits the formatting commands are built from:
//!   boundary splitting, range extraction, fragment insertion, element
//!   unwrap.
//!
//! # Invariants
//! - Parsing is total: unrecognized input degrades to literal text, stray
//!   close tags are ignored, unclosed elements close at end of input.
//! - Serialization is deterministic; markup produced by the serializer
//!   re-parses and re-serializes byte-identically.
//! - Comments stay opaque text so the column sentinel survives a tree pass.

use once_cell::sync::Lazy;
use regex::Regex;

/// Index of a node inside its owning [`MarkupDocument`].
pub type NodeId = usize;

/// The synthetic root node present in every document.
pub const ROOT: NodeId = 0;

/// Tags serialized without a closing pair.
const VOID_TAGS: &[&str] = &["br", "hr", "img"];

static TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^<(/?)([a-zA-Z][a-zA-Z0-9-]*)((?:\s+[a-zA-Z][a-zA-Z0-9-]*="[^"]*")*)\s*(/?)>"#)
        .expect("valid tag regex")
});
static ATTR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"([a-zA-Z][a-zA-Z0-9-]*)="([^"]*)""#).expect("valid attr regex"));
static COMMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^<!--.*?-->").expect("valid comment regex"));

/// Node payload: an element with ordered attributes, or a text run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// A position inside the tree, in the style of an editing caret.
///
/// For text nodes `offset` is a byte offset into the text (clamped to a
/// character boundary by consumers); for elements it is a child index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caret {
    pub node: NodeId,
    pub offset: usize,
}

impl Caret {
    pub fn new(node: NodeId, offset: usize) -> Self {
        Self { node, offset }
    }
}

/// One surface's markup as a navigable tree.
#[derive(Debug, Clone)]
pub struct MarkupDocument {
    nodes: Vec<NodeData>,
}

impl Default for MarkupDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkupDocument {
    /// Creates an empty document holding only the root.
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeData {
                kind: NodeKind::Element {
                    tag: String::new(),
                    attrs: Vec::new(),
                },
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// Parses markup into a tree. Total: every string yields a document.
    pub fn parse(input: &str) -> Self {
        let mut doc = Self::new();
        let mut stack: Vec<NodeId> = vec![ROOT];
        let mut pending_text = String::new();
        let mut rest = input;

        while !rest.is_empty() {
            let Some(lt) = rest.find('<') else {
                pending_text.push_str(rest);
                break;
            };
            pending_text.push_str(&rest[..lt]);
            rest = &rest[lt..];

            if let Some(found) = COMMENT_RE.find(rest) {
                // Comments stay literal text; the storage sentinel is one.
                pending_text.push_str(found.as_str());
                rest = &rest[found.end()..];
                continue;
            }

            if let Some(caps) = TAG_RE.captures(rest) {
                let consumed = caps.get(0).map_or(0, |m| m.end());
                let closing = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
                let tag = caps
                    .get(2)
                    .map_or(String::new(), |m| m.as_str().to_ascii_lowercase());
                let attr_src = caps.get(3).map_or("", |m| m.as_str());
                let self_closed = caps.get(4).is_some_and(|m| !m.as_str().is_empty());

                doc.flush_text(&stack, &mut pending_text);

                if closing {
                    if let Some(pos) = stack
                        .iter()
                        .rposition(|&id| doc.tag(id) == Some(tag.as_str()))
                    {
                        if pos > 0 {
                            stack.truncate(pos);
                        }
                    }
                } else {
                    let attrs = ATTR_RE
                        .captures_iter(attr_src)
                        .map(|attr| {
                            (
                                attr.get(1).map_or(String::new(), |m| m.as_str().to_string()),
                                attr.get(2).map_or(String::new(), |m| m.as_str().to_string()),
                            )
                        })
                        .collect();
                    let parent = *stack.last().unwrap_or(&ROOT);
                    let element = doc.push_node(
                        NodeKind::Element {
                            tag: tag.clone(),
                            attrs,
                        },
                        Some(parent),
                    );
                    doc.nodes[parent].children.push(element);
                    if !self_closed && !VOID_TAGS.contains(&tag.as_str()) {
                        stack.push(element);
                    }
                }

                rest = &rest[consumed..];
                continue;
            }

            // A '<' that opens nothing is literal text.
            pending_text.push('<');
            rest = &rest[1..];
        }

        doc.flush_text(&stack, &mut pending_text);
        doc
    }

    /// Serializes the whole document back to markup.
    pub fn to_markup(&self) -> String {
        self.fragment_markup(&self.nodes[ROOT].children)
    }

    /// Serializes an arbitrary list of nodes, in order.
    pub fn fragment_markup(&self, nodes: &[NodeId]) -> String {
        let mut out = String::new();
        for &id in nodes {
            self.write_node(id, &mut out);
        }
        out
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id].kind
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].children
    }

    /// Element tag name; `None` for text nodes, `Some("")` for the root.
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id].kind {
            NodeKind::Element { tag, .. } => Some(tag.as_str()),
            NodeKind::Text(_) => None,
        }
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id].kind {
            NodeKind::Text(text) => Some(text.as_str()),
            NodeKind::Element { .. } => None,
        }
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        match &self.nodes[id].kind {
            NodeKind::Element { attrs, .. } => attrs
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str()),
            NodeKind::Text(_) => None,
        }
    }

    /// Creates a detached text node.
    pub fn new_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push_node(NodeKind::Text(text.into()), None)
    }

    /// Creates a detached element node.
    pub fn new_element(&mut self, tag: &str, attrs: Vec<(String, String)>) -> NodeId {
        self.push_node(
            NodeKind::Element {
                tag: tag.to_ascii_lowercase(),
                attrs,
            },
            None,
        )
    }

    /// Appends a detached node as the last child of `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
    }

    /// Position of `id` in its parent's child list.
    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.nodes[id].parent?;
        self.nodes[parent].children.iter().position(|&c| c == id)
    }

    /// Nearest ancestor-or-self element carrying `name="value"`.
    ///
    /// A text start node is resolved to its parent element first, matching
    /// how a selection start container is inspected.
    pub fn closest_with_attr(&self, from: NodeId, name: &str, value: &str) -> Option<NodeId> {
        let mut cursor = match &self.nodes[from].kind {
            NodeKind::Text(_) => self.nodes[from].parent,
            NodeKind::Element { .. } => Some(from),
        };
        while let Some(id) = cursor {
            if self.attr(id, name) == Some(value) {
                return Some(id);
            }
            cursor = self.nodes[id].parent;
        }
        None
    }

    /// Nearest ancestor-or-self element with the given tag.
    pub fn closest_with_tag(&self, from: NodeId, tag: &str) -> Option<NodeId> {
        let mut cursor = match &self.nodes[from].kind {
            NodeKind::Text(_) => self.nodes[from].parent,
            NodeKind::Element { .. } => Some(from),
        };
        while let Some(id) = cursor {
            if id != ROOT && self.tag(id) == Some(tag) {
                return Some(id);
            }
            cursor = self.nodes[id].parent;
        }
        None
    }

    /// Splices an element's children into its parent at the element's
    /// position and drops the element. Returns the parent.
    pub fn unwrap_element(&mut self, id: NodeId) -> NodeId {
        let Some(parent) = self.nodes[id].parent else {
            return ROOT;
        };
        let Some(index) = self.index_in_parent(id) else {
            return parent;
        };
        let grandchildren = std::mem::take(&mut self.nodes[id].children);
        self.nodes[parent].children.remove(index);
        for (slot, &child) in grandchildren.iter().enumerate() {
            self.nodes[child].parent = Some(parent);
            self.nodes[parent].children.insert(index + slot, child);
        }
        self.nodes[id].parent = None;
        parent
    }

    /// Detaches the content covered by `start..end` and returns it along
    /// with the collapsed caret at the extraction point.
    ///
    /// Endpoints inside text nodes split the text first. Endpoints under
    /// different parents are normalized up to children of the deepest
    /// common ancestor, so a partially covered element is extracted whole.
    /// `start` must not come after `end` in document order.
    pub fn extract_range(&mut self, start: Caret, end: Caret) -> (Vec<NodeId>, Caret) {
        // End first: splitting the start text node shifts later siblings,
        // corrected below; the reverse order would invalidate text offsets.
        let (end_container, mut end_index) = self.boundary(end);
        let (start_container, start_index, start_split) = self.boundary_tracking_split(start);
        if start_container == end_container && start_split && start_index <= end_index {
            end_index += 1;
        }

        let (container, from, to) = if start_container == end_container {
            (start_container, start_index, end_index)
        } else {
            let start_chain = self.ancestor_chain(start_container);
            let end_chain = self.ancestor_chain(end_container);
            let common = start_chain
                .iter()
                .copied()
                .find(|id| end_chain.contains(id))
                .unwrap_or(ROOT);
            let from = if start_container == common {
                start_index
            } else {
                self.chain_child_index(&start_chain, common).unwrap_or(0)
            };
            let to = if end_container == common {
                end_index
            } else {
                self.chain_child_index(&end_chain, common)
                    .map_or(self.nodes[common].children.len(), |i| i + 1)
            };
            (common, from, to)
        };

        let to = to.min(self.nodes[container].children.len());
        if from >= to {
            return (Vec::new(), Caret::new(container, from.min(to)));
        }
        let extracted: Vec<NodeId> = self.nodes[container].children.drain(from..to).collect();
        for &id in &extracted {
            self.nodes[id].parent = None;
        }
        (extracted, Caret::new(container, from))
    }

    /// Inserts detached nodes at a caret position. Returns the caret
    /// immediately after the inserted run.
    pub fn insert_fragment(&mut self, at: Caret, nodes: &[NodeId]) -> Caret {
        let (container, index) = self.boundary(at);
        for (slot, &id) in nodes.iter().enumerate() {
            self.nodes[id].parent = Some(container);
            self.nodes[container].children.insert(index + slot, id);
        }
        Caret::new(container, index + nodes.len())
    }

    /// Detaches and returns all children of a node, in order.
    pub fn take_children(&mut self, id: NodeId) -> Vec<NodeId> {
        let children = std::mem::take(&mut self.nodes[id].children);
        for &child in &children {
            self.nodes[child].parent = None;
        }
        children
    }

    /// Splits a text node at a byte offset, returning the tail node.
    /// Non-text nodes and boundary offsets return the node unchanged.
    pub fn split_text(&mut self, id: NodeId, offset: usize) -> NodeId {
        let tail_text = match &mut self.nodes[id].kind {
            NodeKind::Text(text) => {
                let mut cut = offset.min(text.len());
                while cut > 0 && !text.is_char_boundary(cut) {
                    cut -= 1;
                }
                if cut == 0 || cut == text.len() {
                    return id;
                }
                text.split_off(cut)
            }
            NodeKind::Element { .. } => return id,
        };
        let parent = self.nodes[id].parent;
        let tail = self.push_node(NodeKind::Text(tail_text), parent);
        if let Some(parent) = parent {
            if let Some(index) = self.index_in_parent(id) {
                self.nodes[parent].children.insert(index + 1, tail);
            }
        }
        tail
    }

    fn push_node(&mut self, kind: NodeKind, parent: Option<NodeId>) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(NodeData {
            kind,
            parent,
            children: Vec::new(),
        });
        id
    }

    fn flush_text(&mut self, stack: &[NodeId], pending: &mut String) {
        if pending.is_empty() {
            return;
        }
        let parent = *stack.last().unwrap_or(&ROOT);
        let text = self.push_node(NodeKind::Text(std::mem::take(pending)), Some(parent));
        self.nodes[parent].children.push(text);
    }

    /// Resolves a caret to `(container, child_index)` among siblings.
    fn boundary(&mut self, caret: Caret) -> (NodeId, usize) {
        let (container, index, _) = self.boundary_tracking_split(caret);
        (container, index)
    }

    fn boundary_tracking_split(&mut self, caret: Caret) -> (NodeId, usize, bool) {
        let text_len = match &self.nodes[caret.node].kind {
            NodeKind::Element { .. } => None,
            NodeKind::Text(text) => Some(text.len()),
        };
        let Some(len) = text_len else {
            let index = caret.offset.min(self.nodes[caret.node].children.len());
            return (caret.node, index, false);
        };

        let parent = self.nodes[caret.node].parent.unwrap_or(ROOT);
        let index = self.index_in_parent(caret.node).unwrap_or(0);
        if caret.offset == 0 {
            (parent, index, false)
        } else if caret.offset >= len {
            (parent, index + 1, false)
        } else {
            let before = self.nodes.len();
            self.split_text(caret.node, caret.offset);
            (parent, index + 1, self.nodes.len() > before)
        }
    }

    /// `[id, parent, grandparent, .., ROOT]`.
    fn ancestor_chain(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = vec![id];
        let mut cursor = self.nodes[id].parent;
        while let Some(node) = cursor {
            chain.push(node);
            cursor = self.nodes[node].parent;
        }
        chain
    }

    /// Index (in `ancestor`'s child list) of the chain node just below
    /// `ancestor`.
    fn chain_child_index(&self, chain: &[NodeId], ancestor: NodeId) -> Option<usize> {
        let at = chain.iter().position(|&id| id == ancestor)?;
        if at == 0 {
            return None;
        }
        self.index_in_parent(chain[at - 1])
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        match &self.nodes[id].kind {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Element { tag, attrs } => {
                out.push('<');
                out.push_str(tag);
                for (key, value) in attrs {
                    out.push_str(&format!(" {key}=\"{value}\""));
                }
                if VOID_TAGS.contains(&tag.as_str()) {
                    out.push_str("/>");
                } else {
                    out.push('>');
                    for &child in &self.nodes[id].children {
                        self.write_node(child, out);
                    }
                    out.push_str("</");
                    out.push_str(tag);
                    out.push('>');
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Caret, MarkupDocument, NodeKind, ROOT};

    #[test]
    fn serializer_output_round_trips_byte_identically() {
        let source = r#"a<span data-emphasis="1" style="font-weight:700">b</span>c<br/>d"#;
        let doc = MarkupDocument::parse(source);
        assert_eq!(doc.to_markup(), source);
        assert_eq!(MarkupDocument::parse(&doc.to_markup()).to_markup(), source);
    }

    #[test]
    fn parse_is_total_over_junk_input() {
        for junk in ["a < b", "</nope>text", "<open>never closed", "<!-- lone", "<>"] {
            let doc = MarkupDocument::parse(junk);
            assert!(!doc.to_markup().is_empty(), "junk {junk:?} lost content");
        }
    }

    #[test]
    fn unclosed_element_closes_at_end_of_input() {
        let doc = MarkupDocument::parse("<ul><li>one");
        assert_eq!(doc.to_markup(), "<ul><li>one</li></ul>");
    }

    #[test]
    fn comments_stay_opaque_text() {
        let source = "left<br/><!--COLUMN_SPLIT-->right";
        assert_eq!(MarkupDocument::parse(source).to_markup(), source);
    }

    #[test]
    fn unwrap_splices_children_in_place() {
        let mut doc = MarkupDocument::parse(r#"a<span data-x="1">b<br/>c</span>d"#);
        let span = doc.children(ROOT)[1];
        let parent = doc.unwrap_element(span);
        assert_eq!(parent, ROOT);
        assert_eq!(doc.to_markup(), "ab<br/>cd");
    }

    #[test]
    fn extract_within_one_text_node_splits_both_ends() {
        let mut doc = MarkupDocument::parse("hello world");
        let text = doc.children(ROOT)[0];
        let (fragment, at) = doc.extract_range(Caret::new(text, 6), Caret::new(text, 11));
        assert_eq!(doc.fragment_markup(&fragment), "world");
        assert_eq!(doc.to_markup(), "hello ");
        assert_eq!(at.node, ROOT);
        assert_eq!(at.offset, 1);
    }

    #[test]
    fn extract_across_siblings_takes_the_covered_run() {
        let mut doc = MarkupDocument::parse("one<br/>two");
        let first = doc.children(ROOT)[0];
        let last = doc.children(ROOT)[2];
        let (fragment, _) = doc.extract_range(Caret::new(first, 1), Caret::new(last, 2));
        assert_eq!(doc.fragment_markup(&fragment), "ne<br/>tw");
        assert_eq!(doc.to_markup(), "oo");
    }

    #[test]
    fn extract_across_parents_takes_partial_elements_whole() {
        let mut doc = MarkupDocument::parse("<span>ab</span><span>cd</span>");
        let left_text = doc.children(doc.children(ROOT)[0])[0];
        let right_text = doc.children(doc.children(ROOT)[1])[0];
        let (fragment, _) = doc.extract_range(Caret::new(left_text, 1), Caret::new(right_text, 1));
        assert_eq!(doc.fragment_markup(&fragment), "<span>ab</span><span>cd</span>");
        assert_eq!(doc.to_markup(), "");
    }

    #[test]
    fn insert_fragment_lands_at_the_caret() {
        let mut doc = MarkupDocument::parse("ac");
        let text = doc.children(ROOT)[0];
        let b = doc.new_text("b");
        let after = doc.insert_fragment(Caret::new(text, 1), &[b]);
        assert_eq!(doc.to_markup(), "abc");
        assert_eq!(after.offset, 2);
    }

    #[test]
    fn split_text_keeps_char_boundaries() {
        let mut doc = MarkupDocument::parse("héllo");
        let text = doc.children(ROOT)[0];
        // offset 2 falls inside the two-byte 'é'; the split rounds down
        let tail = doc.split_text(text, 2);
        assert!(matches!(doc.kind(tail), NodeKind::Text(t) if t.starts_with('é')));
        assert_eq!(doc.to_markup(), "héllo");
    }
}
