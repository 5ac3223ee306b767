//! # Editable Surface
//!
//! The live, mutable tree that mirrors the document value while an editor is
//! mounted. Nodes live in an arena and are addressed by [`NodeId`].
//!
//! Restructuring operations *move* nodes instead of re-creating them, so a
//! [`Position`] inside a text node stays meaningful across list splits,
//! wrapping and unwrapping. Detached nodes remain in the arena but are no
//! longer reachable from the root; positions inside them are invalid.
//!
//! A wholesale [`Surface::replace_content`] starts a new arena and bumps the
//! [`Surface::generation`], which is how selection snapshots know they are
//! stale.

pub mod position;

use std::cmp::Ordering;

pub use position::{Position, SurfaceRange};

use crate::markup::{self, style::StyleDecls};

/// Handle to a node in a [`Surface`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

/// Payload of a surface node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Root,
    Element(Element),
    Text(String),
}

/// An element with a lowercase tag name and ordered attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
}

const VOID_TAGS: &[&str] = &["br", "img", "hr", "input", "wbr", "meta", "link"];

const BLOCK_TAGS: &[&str] = &[
    "p",
    "div",
    "li",
    "ul",
    "ol",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "blockquote",
    "pre",
    "table",
    "tr",
    "td",
    "th",
    "section",
    "article",
    "hr",
];

/// Elements that only carry inline presentation and can be split or lifted.
const INLINE_FORMAT_TAGS: &[&str] = &[
    "span", "b", "strong", "i", "em", "u", "font", "s", "strike", "sub", "sup",
];

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            attrs: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name.to_string(), value)),
        }
    }

    pub fn remove_attr(&mut self, name: &str) -> bool {
        let before = self.attrs.len();
        self.attrs.retain(|(n, _)| n != name);
        self.attrs.len() != before
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|c| c.split_ascii_whitespace().any(|c| c == class))
    }

    pub fn style(&self) -> StyleDecls {
        StyleDecls::parse(self.attr("style").unwrap_or_default())
    }

    pub fn style_prop(&self, prop: &str) -> Option<String> {
        self.style().get(prop).map(str::to_string)
    }

    pub fn set_style_prop(&mut self, prop: &str, value: &str) {
        let mut style = self.style();
        style.set(prop, value);
        self.set_attr("style", style.to_string());
    }

    /// Removes a style property, dropping the `style` attribute once empty.
    pub fn remove_style_prop(&mut self, prop: &str) -> bool {
        let mut style = self.style();
        if !style.remove(prop) {
            return false;
        }
        if style.is_empty() {
            self.remove_attr("style");
        } else {
            self.set_attr("style", style.to_string());
        }
        true
    }

    pub fn is_void(&self) -> bool {
        VOID_TAGS.contains(&self.tag.as_str())
    }

    pub fn is_block(&self) -> bool {
        BLOCK_TAGS.contains(&self.tag.as_str())
    }

    pub fn is_list(&self) -> bool {
        self.tag == "ul" || self.tag == "ol"
    }

    pub fn is_inline_format(&self) -> bool {
        INLINE_FORMAT_TAGS.contains(&self.tag.as_str())
    }

    /// Decoration and embedded objects opt out of text editing.
    pub fn is_non_editable(&self) -> bool {
        self.attr("contenteditable") == Some("false")
    }
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena-backed editable tree.
#[derive(Debug, Clone)]
pub struct Surface {
    nodes: Vec<Node>,
    root: NodeId,
    generation: u64,
}

impl Default for Surface {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface {
    /// Create an empty surface (a bare root).
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Root,
                parent: None,
                children: Vec::new(),
            }],
            root: NodeId(0),
            generation: 0,
        }
    }

    /// Build a surface from markup.
    pub fn from_markup(markup: &str) -> Self {
        let mut surface = Self::new();
        markup::parse_into(&mut surface, markup);
        surface
    }

    /// Replace the entire content, invalidating every outstanding position.
    pub fn replace_content(&mut self, markup: &str) {
        let generation = self.generation + 1;
        *self = Self::from_markup(markup);
        self.generation = generation;
    }

    /// Serialize the live content back into markup.
    pub fn to_markup(&self) -> String {
        markup::serialize(self)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.nodes.get(id.0)?.kind {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes.get_mut(id.0)?.kind {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.nodes.get(id.0)?.kind {
            NodeKind::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn text_mut(&mut self, id: NodeId) -> Option<&mut String> {
        match &mut self.nodes.get_mut(id.0)?.kind {
            NodeKind::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        self.text(id).is_some()
    }

    /// True for elements matching `pred`.
    pub fn element_is(&self, id: NodeId, pred: impl Fn(&Element) -> bool) -> bool {
        self.element(id).is_some_and(pred)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0)?.parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&c| c == id)
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let idx = self.index_in_parent(id)?;
        self.children(parent).get(idx + 1).copied()
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let idx = self.index_in_parent(id)?;
        idx.checked_sub(1)
            .and_then(|i| self.children(parent).get(i).copied())
    }

    /// Whether the node is reachable from the root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        if id.0 >= self.nodes.len() {
            return false;
        }
        let mut current = id;
        loop {
            if current == self.root {
                return true;
            }
            match self.nodes[current.0].parent {
                Some(p) => current = p,
                None => return false,
            }
        }
    }

    /// Length in offset units: bytes for text, child count otherwise.
    pub fn node_len(&self, id: NodeId) -> usize {
        match &self.nodes[id.0].kind {
            NodeKind::Text(t) => t.len(),
            _ => self.nodes[id.0].children.len(),
        }
    }

    pub fn create_element(&mut self, element: Element) -> NodeId {
        self.push(NodeKind::Element(element))
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeKind::Text(text.into()))
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Copy an element without its children. The copy starts detached.
    pub fn shallow_clone(&mut self, id: NodeId) -> NodeId {
        let kind = self.nodes[id.0].kind.clone();
        self.push(kind)
    }

    /// Remove a node from its parent. The subtree stays intact.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|&c| c != id);
        }
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        let len = self.children(parent).len();
        self.insert_child(parent, len, child);
    }

    /// Insert `child` at `index` of `parent`, moving it out of any previous
    /// parent first. `index` is interpreted before the move.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
        let mut index = index;
        if self.nodes[child.0].parent == Some(parent)
            && let Some(old) = self.index_in_parent(child)
            && old < index
        {
            index -= 1;
        }
        self.detach(child);
        let children = &mut self.nodes[parent.0].children;
        let index = index.min(children.len());
        children.insert(index, child);
        self.nodes[child.0].parent = Some(parent);
    }

    pub fn insert_before(&mut self, reference: NodeId, node: NodeId) {
        if let (Some(parent), Some(idx)) = (self.parent(reference), self.index_in_parent(reference))
        {
            self.insert_child(parent, idx, node);
        }
    }

    pub fn insert_after(&mut self, reference: NodeId, node: NodeId) {
        if let (Some(parent), Some(idx)) = (self.parent(reference), self.index_in_parent(reference))
        {
            self.insert_child(parent, idx + 1, node);
        }
    }

    /// Move all children of `from` to the end of `to`.
    pub fn move_children(&mut self, from: NodeId, to: NodeId) {
        for child in self.children(from).to_vec() {
            self.append_child(to, child);
        }
    }

    /// Replace `el` by its children, in place.
    pub fn unwrap(&mut self, el: NodeId) {
        let Some(parent) = self.parent(el) else {
            return;
        };
        let Some(mut idx) = self.index_in_parent(el) else {
            return;
        };
        for child in self.children(el).to_vec() {
            idx += 1;
            self.insert_child(parent, idx, child);
        }
        self.detach(el);
    }

    /// Put `node` where `wrapper` is and move `node` into it.
    pub fn wrap(&mut self, node: NodeId, wrapper: NodeId) {
        self.insert_before(node, wrapper);
        self.append_child(wrapper, node);
    }

    /// Split a text node at a byte offset; the tail becomes a new sibling.
    ///
    /// Returns `None` when the offset is at either edge or not a char boundary.
    pub fn split_text(&mut self, id: NodeId, offset: usize) -> Option<NodeId> {
        let text = self.text(id)?;
        if offset == 0 || offset >= text.len() || !text.is_char_boundary(offset) {
            return None;
        }
        let tail = text[offset..].to_string();
        if let Some(t) = self.text_mut(id) {
            t.truncate(offset);
        }
        let right = self.create_text(tail);
        self.insert_after(id, right);
        Some(right)
    }

    /// Insert `node` at a boundary point, splitting a text node if needed.
    pub fn insert_at(&mut self, pos: Position, node: NodeId) {
        if let Some(text) = self.text(pos.node) {
            let len = text.len();
            if pos.offset == 0 {
                self.insert_before(pos.node, node);
            } else if pos.offset >= len {
                self.insert_after(pos.node, node);
            } else if self.split_text(pos.node, pos.offset).is_some() {
                self.insert_after(pos.node, node);
            }
        } else {
            self.insert_child(pos.node, pos.offset, node);
        }
    }

    /// Strict ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&n| self.parent(n))
    }

    /// Nearest node (including `id`) whose element matches `pred`.
    pub fn closest(&self, id: NodeId, pred: impl Fn(&Element) -> bool) -> Option<NodeId> {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find(|&n| self.element(n).is_some_and(&pred))
    }

    /// Pre-order descendants of `id`, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(n) = stack.pop() {
            out.push(n);
            stack.extend(self.children(n).iter().rev().copied());
        }
        out
    }

    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(t) = self.text(id) {
            return t.to_string();
        }
        self.descendants(id)
            .into_iter()
            .filter_map(|n| self.text(n))
            .collect()
    }

    /// Child indices from the root down to `id`; `None` once detached.
    pub fn path(&self, id: NodeId) -> Option<Vec<usize>> {
        let mut path = Vec::new();
        let mut current = id;
        while current != self.root {
            let parent = self.nodes.get(current.0)?.parent?;
            path.push(self.children(parent).iter().position(|&c| c == current)?);
            current = parent;
        }
        path.reverse();
        Some(path)
    }

    fn position_key(&self, pos: Position) -> Option<Vec<usize>> {
        let mut key = self.path(pos.node)?;
        key.push(pos.offset);
        Some(key)
    }

    /// Document-order comparison of two boundary points.
    pub fn compare_positions(&self, a: Position, b: Position) -> Option<Ordering> {
        Some(self.position_key(a)?.cmp(&self.position_key(b)?))
    }

    /// Attached, and the offset lands on a valid boundary.
    pub fn is_valid_position(&self, pos: Position) -> bool {
        if !self.is_attached(pos.node) {
            return false;
        }
        match self.text(pos.node) {
            Some(t) => pos.offset <= t.len() && t.is_char_boundary(pos.offset),
            None => pos.offset <= self.children(pos.node).len(),
        }
    }

    /// Whether a node overlaps the range, DOM `intersectsNode` style.
    pub fn intersects_node(&self, range: &SurfaceRange, node: NodeId) -> bool {
        if node == self.root {
            return true;
        }
        let (Some(parent), Some(idx)) = (self.parent(node), self.index_in_parent(node)) else {
            return false;
        };
        let before = Position::new(parent, idx);
        let after = Position::new(parent, idx + 1);
        matches!(
            self.compare_positions(range.start, after),
            Some(Ordering::Less)
        ) && matches!(
            self.compare_positions(range.end, before),
            Some(Ordering::Greater)
        )
    }

    /// Return the range with `start <= end`.
    pub fn ordered(&self, range: SurfaceRange) -> SurfaceRange {
        match self.compare_positions(range.start, range.end) {
            Some(Ordering::Greater) => SurfaceRange::new(range.end, range.start),
            _ => range,
        }
    }

    /// Number of list elements enclosing `id` (including `id` itself).
    pub fn list_depth(&self, id: NodeId) -> usize {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .filter(|&n| self.element_is(n, Element::is_list))
            .count()
    }
}
