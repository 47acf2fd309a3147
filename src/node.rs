// Author: Dustin Pilgrim
// License: MIT

use std::any::Any;
use std::sync::Arc;

use crate::value::{Format, Value, ValueKind};

/// Handle to a setting inside its owning [`Tree`](crate::Tree).
///
/// Handles are plain indices. Once the setting is removed the handle goes
/// stale and every lookup through it reports `NotFound`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: usize,
    generation: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Payload {
    Scalar(Value),
    Children(Vec<NodeId>),
}

/// Caller data attached to a setting. Never written to the store.
pub type Hook = Arc<dyn Any + Send + Sync>;

/// A single setting: a kind, an optional name and either a scalar value or
/// an ordered list of children.
#[derive(Debug, Clone)]
pub struct Node {
    kind: ValueKind,
    name: Option<String>,
    payload: Payload,
    parent: Option<NodeId>,
    format: Format,
    source_line: usize,
    source_file: Option<Arc<str>>,
    hook: Option<Hook>,
}

impl Node {
    pub(crate) fn scalar(name: Option<String>, value: Value) -> Self {
        Node {
            kind: value.kind(),
            name,
            payload: Payload::Scalar(value),
            parent: None,
            format: Format::Default,
            source_line: 0,
            source_file: None,
            hook: None,
        }
    }

    pub(crate) fn container(name: Option<String>, kind: ValueKind) -> Self {
        Node {
            kind,
            name,
            payload: Payload::Children(Vec::new()),
            parent: None,
            format: Format::Default,
            source_line: 0,
            source_file: None,
            hook: None,
        }
    }

    pub(crate) fn with_source(mut self, line: usize, file: Option<Arc<str>>) -> Self {
        self.source_line = line;
        self.source_file = file;
        self
    }

    pub(crate) fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub(crate) fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    /// `None` for the root and for array/list elements.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The scalar payload, `None` for containers.
    pub fn value(&self) -> Option<&Value> {
        match &self.payload {
            Payload::Scalar(v) => Some(v),
            Payload::Children(_) => None,
        }
    }

    /// Children in append order. Empty for scalars.
    pub fn children(&self) -> &[NodeId] {
        match &self.payload {
            Payload::Children(c) => c,
            Payload::Scalar(_) => &[],
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn source_line(&self) -> usize {
        self.source_line
    }

    pub fn source_file(&self) -> Option<&str> {
        self.source_file.as_deref()
    }

    pub fn hook(&self) -> Option<&(dyn Any + Send + Sync)> {
        self.hook.as_deref()
    }

    pub(crate) fn set_hook(&mut self, hook: Option<Hook>) {
        self.hook = hook;
    }

    pub(crate) fn set_format(&mut self, format: Format) {
        self.format = format;
    }

    pub(crate) fn replace_value(&mut self, value: Value) {
        self.payload = Payload::Scalar(value);
    }

    pub(crate) fn children_mut(&mut self) -> Option<&mut Vec<NodeId>> {
        match &mut self.payload {
            Payload::Children(c) => Some(c),
            Payload::Scalar(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Slot storage for every node of one tree.
#[derive(Debug, Clone, Default)]
pub(crate) struct Arena {
    slots: Vec<Slot>,
    free: Vec<usize>,
}

impl Arena {
    pub(crate) fn insert(&mut self, node: Node) -> NodeId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index];
            slot.node = Some(node);
            return NodeId { index, generation: slot.generation };
        }

        self.slots.push(Slot { generation: 0, node: Some(node) });
        NodeId { index: self.slots.len() - 1, generation: 0 }
    }

    pub(crate) fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots
            .get(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    /// Insert `node` as the last child of `parent`.
    pub(crate) fn attach(&mut self, parent: NodeId, mut node: Node) -> Option<NodeId> {
        self.get(parent)?;
        node.parent = Some(parent);
        let id = self.insert(node);
        match self.get_mut(parent).and_then(Node::children_mut) {
            Some(children) => {
                children.push(id);
                Some(id)
            }
            None => {
                self.free_subtree(id);
                None
            }
        }
    }

    /// Unlink `id` from its parent and free it together with its descendants.
    pub(crate) fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.get(id).and_then(Node::parent) {
            if let Some(children) = self.get_mut(parent).and_then(Node::children_mut) {
                children.retain(|child| *child != id);
            }
        }
        self.free_subtree(id);
    }

    fn free_subtree(&mut self, id: NodeId) {
        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            let Some(slot) = self
                .slots
                .get_mut(next.index)
                .filter(|slot| slot.generation == next.generation)
            else {
                continue;
            };
            if let Some(node) = slot.node.take() {
                pending.extend_from_slice(node.children());
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(next.index);
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }
}
