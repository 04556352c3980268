//! Mutable game tree
//!
//! [`GameCollection`] stores every node in an arena addressed by [`NodeId`].
//! Each node keeps its raw properties, its ordered children and the id of its
//! parent (roots have none). Ids are handed out in construction order and are
//! never reused, so an id held across edits either still names the same node
//! or names nothing.
//!
//! # Guarantees
//! - Every node has at most one parent and there are no cycles
//! - After any structural edit, `number` is the node's pre-order position
//!   over all roots, starting at 0
//! - Property edits never renumber
//!
//! Subtrees leave and enter the arena as detached [`Node`] values, which is
//! also the form used for building trees by hand and for structural equality.

use std::collections::HashMap;
use std::marker::PhantomData;

use crate::ast::{self, ComposedValue, GameTree, Property, Sequence};
use crate::config::ParserConfig;
use crate::game::Game;
use crate::normalizer::serialize_canonical;
use crate::parser;
use crate::schema::{Definition, PropertyValue};
use crate::Result;

/// Stable handle to a node inside a [`GameCollection`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

// ── Detached nodes ────────────────────────────────────────

/// An owned subtree with no collection attached.
///
/// Properties are raw and unchecked. Two nodes are equal when their
/// properties and children are equal, recursively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Node {
    pub properties: Vec<Property>,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`add_property`](Self::add_property)
    pub fn with<V: PropertyValue>(mut self, definition: &Definition<V>, value: V) -> Self {
        self.add_property(definition, value);
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Typed value of a property on this node; detached nodes do not inherit
    pub fn property_value<V: PropertyValue>(&self, definition: &Definition<V>) -> Option<V> {
        find(&self.properties, definition.name()).and_then(|p| V::from_values(&p.values))
    }

    pub fn has<V>(&self, definition: &Definition<V>) -> bool {
        find(&self.properties, definition.name()).is_some()
    }

    pub fn add_property<V: PropertyValue>(&mut self, definition: &Definition<V>, value: V) {
        set_values(&mut self.properties, definition.name(), value.to_values());
    }

    pub fn remove_property<V>(&mut self, definition: &Definition<V>) {
        self.properties.retain(|p| p.identifier != definition.name());
    }

    /// Nodes in this subtree, this one included
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            count += 1;
            pending.extend(node.children.iter());
        }
        count
    }
}

fn find<'p>(properties: &'p [Property], identifier: &str) -> Option<&'p Property> {
    properties.iter().find(|p| p.identifier == identifier)
}

/// Replace in place when present, otherwise append
fn set_values(properties: &mut Vec<Property>, identifier: &str, values: Vec<ComposedValue>) {
    match properties.iter_mut().find(|p| p.identifier == identifier) {
        Some(existing) => existing.values = values,
        None => properties.push(Property::new(identifier, values)),
    }
}

// ── Arena ─────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct Slot {
    properties: Vec<Property>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
    number: usize,
}

/// Top-level container of a game record: the roots and every node below them
pub struct GameCollection<G: Game> {
    slots: Vec<Option<Slot>>,
    roots: Vec<NodeId>,
    _game: PhantomData<G>,
}

impl<G: Game> GameCollection<G> {
    pub fn new() -> Self {
        GameCollection {
            slots: Vec::new(),
            roots: Vec::new(),
            _game: PhantomData,
        }
    }

    /// Parse `text` with `G`'s schema and build the tree
    pub fn from_sgf(text: &str) -> Result<Self> {
        Self::from_sgf_with_config(text, &ParserConfig::default())
    }

    pub fn from_sgf_with_config(text: &str, config: &ParserConfig) -> Result<Self> {
        let syntax = parser::parse_text_with_config(text, &G::schema(), config)?;
        Ok(Self::from_syntax(&syntax))
    }

    /// Build from detached root nodes
    pub fn from_roots(roots: impl IntoIterator<Item = Node>) -> Self {
        let mut collection = Self::new();
        for root in roots {
            let id = collection.attach(root, None);
            collection.roots.push(id);
        }
        collection.renumber();
        collection
    }

    /// Build from a syntax tree; each sequence becomes a chain of single children
    pub fn from_syntax(syntax: &ast::Collection) -> Self {
        let mut collection = Self::new();
        for tree in &syntax.game_trees {
            let tops = collection.attach_game_tree(tree, None);
            collection.roots.extend(tops);
        }
        collection.renumber();
        collection
    }

    /// Convert back to a syntax tree, collapsing single-child chains into one sequence
    pub fn to_syntax(&self) -> ast::Collection {
        ast::Collection::new(self.roots.iter().map(|&id| self.game_tree(id)).collect())
    }

    /// Canonical text form
    pub fn to_sgf(&self) -> String {
        serialize_canonical(&self.to_syntax())
    }

    // ── Navigation ─────────────────────────────────────────

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn node(&self, id: NodeId) -> Option<NodeRef<'_, G>> {
        self.slot(id).map(|_| NodeRef {
            collection: self,
            id,
        })
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.slot(id).is_some()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slot(id)?.parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.slot(id).map_or(&[], |slot| slot.children.as_slice())
    }

    pub fn properties(&self, id: NodeId) -> &[Property] {
        self.slot(id).map_or(&[], |slot| slot.properties.as_slice())
    }

    /// Pre-order position of the node in the whole collection
    pub fn number(&self, id: NodeId) -> Option<usize> {
        self.slot(id).map(|slot| slot.number)
    }

    /// Live nodes
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// All node ids in pre-order (the order of their numbers)
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut order = Vec::new();
        for &root in &self.roots {
            self.collect_preorder(root, &mut order);
        }
        order
    }

    // ── Properties ─────────────────────────────────────────

    /// Typed value of a property; inheritable properties fall back to the
    /// nearest ancestor that has them.
    pub fn property_value<V: PropertyValue>(
        &self,
        id: NodeId,
        definition: &Definition<V>,
    ) -> Option<V> {
        let mut current = self.slot(id)?;
        loop {
            if let Some(property) = find(&current.properties, definition.name()) {
                return V::from_values(&property.values);
            }
            if !definition.inherits() {
                return None;
            }
            current = self.slot(current.parent?)?;
        }
    }

    /// Presence on this node only, ignoring inheritance
    pub fn has<V>(&self, id: NodeId, definition: &Definition<V>) -> bool {
        self.slot(id)
            .map_or(false, |slot| find(&slot.properties, definition.name()).is_some())
    }

    /// Set a property, replacing an existing one in place. Returns false for a stale id.
    pub fn add_property<V: PropertyValue>(
        &mut self,
        id: NodeId,
        definition: &Definition<V>,
        value: V,
    ) -> bool {
        match self.slot_mut(id) {
            Some(slot) => {
                set_values(&mut slot.properties, definition.name(), value.to_values());
                true
            }
            None => false,
        }
    }

    /// Set a raw property without type checking
    pub fn add_raw_property(&mut self, id: NodeId, property: Property) -> bool {
        match self.slot_mut(id) {
            Some(slot) => {
                set_values(&mut slot.properties, &property.identifier, property.values);
                true
            }
            None => false,
        }
    }

    pub fn remove_property<V>(&mut self, id: NodeId, definition: &Definition<V>) {
        if let Some(slot) = self.slot_mut(id) {
            slot.properties.retain(|p| p.identifier != definition.name());
        }
    }

    // ── Structure ──────────────────────────────────────────

    pub fn push_root(&mut self, node: Node) -> NodeId {
        let id = self.attach(node, None);
        self.roots.push(id);
        self.renumber();
        id
    }

    pub fn append_child(&mut self, parent: NodeId, node: Node) -> Option<NodeId> {
        let index = self.slot(parent)?.children.len();
        self.insert_child(parent, index, node)
    }

    /// Insert at `index` among `parent`'s children; `None` if the parent is
    /// gone or the index is past the end.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, node: Node) -> Option<NodeId> {
        if index > self.slot(parent)?.children.len() {
            return None;
        }
        let id = self.attach(node, Some(parent));
        self.slot_mut(parent)?.children.insert(index, id);
        self.renumber();
        Some(id)
    }

    pub fn remove_child(&mut self, parent: NodeId, index: usize) -> Option<Node> {
        let id = *self.slot(parent)?.children.get(index)?;
        self.remove(id)
    }

    /// Swap the child at `index` for `node`; returns the new id and the old subtree
    pub fn replace_child(
        &mut self,
        parent: NodeId,
        index: usize,
        node: Node,
    ) -> Option<(NodeId, Node)> {
        let old = *self.slot(parent)?.children.get(index)?;
        let new = self.attach(node, Some(parent));
        if let Some(slot) = self.slot_mut(parent) {
            slot.children[index] = new;
        }
        let removed = self.take_subtree(old);
        self.renumber();
        removed.map(|node| (new, node))
    }

    /// Detach a node (root or not) and return its subtree
    pub fn remove(&mut self, id: NodeId) -> Option<Node> {
        match self.slot(id)?.parent {
            Some(parent) => {
                if let Some(slot) = self.slot_mut(parent) {
                    slot.children.retain(|&child| child != id);
                }
            }
            None => self.roots.retain(|&root| root != id),
        }
        let removed = self.take_subtree(id);
        self.renumber();
        removed
    }

    /// Deep copy of a subtree, detached from this collection
    pub fn copy(&self, id: NodeId) -> Option<Node> {
        let mut order = Vec::new();
        self.collect_preorder(id, &mut order);
        build_detached(&order, id, |node| {
            let slot = self.slot(node)?;
            Some((slot.properties.clone(), slot.children.clone()))
        })
    }

    // ── Internals ──────────────────────────────────────────

    fn slot(&self, id: NodeId) -> Option<&Slot> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    fn slot_mut(&mut self, id: NodeId) -> Option<&mut Slot> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    fn allocate(&mut self) -> NodeId {
        self.slots.push(None);
        NodeId(self.slots.len() - 1)
    }

    /// Move a detached subtree into the arena; does not link or renumber
    fn attach(&mut self, node: Node, parent: Option<NodeId>) -> NodeId {
        let top = self.allocate();
        let mut pending = vec![(node, top, parent)];
        while let Some((node, id, parent)) = pending.pop() {
            let Node {
                properties,
                children,
            } = node;
            let mut child_ids = Vec::with_capacity(children.len());
            for child in children {
                let child_id = self.allocate();
                child_ids.push(child_id);
                pending.push((child, child_id, Some(id)));
            }
            self.slots[id.0] = Some(Slot {
                properties,
                children: child_ids,
                parent,
                number: 0,
            });
        }
        top
    }

    fn attach_game_tree(&mut self, tree: &GameTree, parent: Option<NodeId>) -> Vec<NodeId> {
        let mut tops = Vec::new();
        let mut last = parent;
        for node in &tree.sequence.nodes {
            let id = self.allocate();
            self.slots[id.0] = Some(Slot {
                properties: node.properties.clone(),
                children: Vec::new(),
                parent: last,
                number: 0,
            });
            match last.and_then(|p| self.slot_mut(p)) {
                Some(slot) => slot.children.push(id),
                None => tops.push(id),
            }
            last = Some(id);
        }
        for variation in &tree.game_trees {
            tops.extend(self.attach_game_tree(variation, last));
        }
        tops
    }

    fn take_subtree(&mut self, id: NodeId) -> Option<Node> {
        let mut order = Vec::new();
        self.collect_preorder(id, &mut order);
        let slots = &mut self.slots;
        build_detached(&order, id, |node| {
            let slot = slots.get_mut(node.0)?.take()?;
            Some((slot.properties, slot.children))
        })
    }

    fn collect_preorder(&self, start: NodeId, order: &mut Vec<NodeId>) {
        let mut pending = vec![start];
        while let Some(id) = pending.pop() {
            if let Some(slot) = self.slot(id) {
                order.push(id);
                pending.extend(slot.children.iter().rev());
            }
        }
    }

    /// Pre-order renumbering of every node, run after each structural edit
    fn renumber(&mut self) {
        let order = self.preorder();
        for (number, id) in order.iter().enumerate() {
            if let Some(slot) = self.slot_mut(*id) {
                slot.number = number;
            }
        }
        log::trace!("renumbered {} nodes", order.len());
    }

    fn game_tree(&self, start: NodeId) -> GameTree {
        let mut nodes = Vec::new();
        let mut current = start;
        while let Some(slot) = self.slot(current) {
            nodes.push(ast::Node {
                properties: slot.properties.clone(),
            });
            match slot.children.as_slice() {
                [only] => current = *only,
                children => {
                    let variations = children.iter().map(|&c| self.game_tree(c)).collect();
                    return GameTree::new(Sequence { nodes }, variations);
                }
            }
        }
        GameTree::new(Sequence { nodes }, Vec::new())
    }

    fn subtree_eq(&self, a: NodeId, other: &Self, b: NodeId) -> bool {
        let mut pending = vec![(a, b)];
        while let Some((a, b)) = pending.pop() {
            let (Some(left), Some(right)) = (self.slot(a), other.slot(b)) else {
                return false;
            };
            if left.properties != right.properties || left.children.len() != right.children.len() {
                return false;
            }
            pending.extend(left.children.iter().copied().zip(right.children.iter().copied()));
        }
        true
    }
}

/// Rebuild a nested [`Node`] bottom-up without recursion; `order` is the
/// subtree of `id` in pre-order, so children are always built before parents.
fn build_detached<S>(order: &[NodeId], id: NodeId, mut take: S) -> Option<Node>
where
    S: FnMut(NodeId) -> Option<(Vec<Property>, Vec<NodeId>)>,
{
    let mut built: HashMap<NodeId, Node> = HashMap::with_capacity(order.len());
    for &node in order.iter().rev() {
        let (properties, child_ids) = take(node)?;
        let children = child_ids
            .iter()
            .map(|child| built.remove(child))
            .collect::<Option<Vec<_>>>()?;
        built.insert(
            node,
            Node {
                properties,
                children,
            },
        );
    }
    built.remove(&id)
}

impl<G: Game> Default for GameCollection<G> {
    fn default() -> Self {
        Self::new()
    }
}

/// Deep copy with fresh, compact ids
impl<G: Game> Clone for GameCollection<G> {
    fn clone(&self) -> Self {
        Self::from_roots(self.roots.iter().filter_map(|&id| self.copy(id)))
    }
}

/// Structural equality: same roots, properties and children, ids ignored
impl<G: Game> PartialEq for GameCollection<G> {
    fn eq(&self, other: &Self) -> bool {
        self.roots.len() == other.roots.len()
            && self
                .roots
                .iter()
                .zip(&other.roots)
                .all(|(&a, &b)| self.subtree_eq(a, other, b))
    }
}

impl<G: Game> std::fmt::Debug for GameCollection<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("GameCollection")
            .field("game", &G::NAME)
            .field("roots", &self.roots)
            .field("nodes", &self.len())
            .finish()
    }
}

// ── Handles ───────────────────────────────────────────────

/// Read-only view of one node
pub struct NodeRef<'a, G: Game> {
    collection: &'a GameCollection<G>,
    id: NodeId,
}

impl<'a, G: Game> Clone for NodeRef<'a, G> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, G: Game> Copy for NodeRef<'a, G> {}

impl<'a, G: Game> NodeRef<'a, G> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn number(&self) -> usize {
        self.collection.number(self.id).unwrap_or_default()
    }

    pub fn parent(&self) -> Option<NodeRef<'a, G>> {
        self.collection.node(self.collection.parent(self.id)?)
    }

    pub fn children(&self) -> impl Iterator<Item = NodeRef<'a, G>> + 'a {
        let collection = self.collection;
        collection
            .children(self.id)
            .iter()
            .filter_map(move |&id| collection.node(id))
    }

    pub fn properties(&self) -> &'a [Property] {
        self.collection.properties(self.id)
    }

    pub fn property_value<V: PropertyValue>(&self, definition: &Definition<V>) -> Option<V> {
        self.collection.property_value(self.id, definition)
    }

    pub fn has<V>(&self, definition: &Definition<V>) -> bool {
        self.collection.has(self.id, definition)
    }

    pub fn copy(&self) -> Option<Node> {
        self.collection.copy(self.id)
    }
}
