use std::any::Any;
use std::sync::Arc;

use super::lookup::is_valid_name;
use super::*;
use crate::node::Hook;
use crate::value::{ScalarType, Value};

impl Tree {
    /// Overwrite the scalar value of `node`, then persist.
    ///
    /// Fails with `TypeMismatch` before touching anything if `kind`, the
    /// node's kind and the value's kind disagree. If the write-back fails
    /// the new value stays in memory and the I/O error is returned.
    pub fn set(&mut self, node: NodeId, kind: ValueKind, value: Value) -> Result<()> {
        let result = self.write_scalar(node, kind, value);
        self.track(result)?;
        self.persist_after_mutation()
    }

    pub fn set_as<T: ScalarType>(&mut self, node: NodeId, value: T) -> Result<()> {
        self.set(node, T::KIND, value.into())
    }

    /// Overwrite element `index` of a list or array, then persist.
    ///
    /// An out-of-range index fails without mutating or persisting.
    pub fn set_element(&mut self, node: NodeId, index: usize, kind: ValueKind, value: Value) -> Result<NodeId> {
        let result = self
            .positional_child(node, index)
            .and_then(|element| self.write_scalar(element, kind, value).map(|()| element));
        let element = self.track(result)?;
        self.persist_after_mutation()?;
        Ok(element)
    }

    /// Append a scalar child and persist.
    ///
    /// `name` is required and must be unique for groups; lists and arrays
    /// ignore it. Arrays only take values of the kind they already hold.
    /// If the write-back fails the child is removed again, so the call is
    /// all-or-nothing.
    pub fn add(&mut self, parent: NodeId, name: &str, kind: ValueKind, value: Value) -> Result<NodeId> {
        let result = self.check_scalar_add(parent, kind, &value).and_then(|()| {
            let node = Node::scalar(None, value);
            self.attach_child(parent, name, node)
        });
        let child = self.track(result)?;

        if let Err(e) = self.persist_after_mutation() {
            self.arena.detach(child);
            return Err(e);
        }
        Ok(child)
    }

    /// Append an empty group, list or array. Nothing is persisted until the
    /// next scalar mutation or an explicit `persist`.
    pub fn add_container(&mut self, parent: NodeId, name: &str, kind: ValueKind) -> Result<NodeId> {
        let result = if kind.is_container() {
            self.check_container_add(parent)
                .and_then(|()| self.attach_child(parent, name, Node::container(None, kind)))
        } else {
            Err(ArborError::mismatch(ValueKind::Group, kind))
        };
        self.track(result)
    }

    /// Detach and free the member of group `node` called `name`.
    pub fn remove(&mut self, node: NodeId, name: &str) -> Result<()> {
        let result = self.node_ref(node).and_then(|group| {
            if group.kind() != ValueKind::Group {
                return Err(ArborError::mismatch(ValueKind::Group, group.kind()));
            }
            self.find_member(node, name).ok_or_else(|| ArborError::not_found(name))
        });
        let child = self.track(result)?;
        self.arena.detach(child);
        self.mark_dirty();
        Ok(())
    }

    /// Detach and free the child at `index`. Later siblings shift down so
    /// positions stay contiguous.
    pub fn remove_element(&mut self, node: NodeId, index: usize) -> Result<()> {
        let result = self.node_ref(node).and_then(|container| {
            if !container.kind().is_container() {
                return Err(ArborError::mismatch(ValueKind::List, container.kind()));
            }
            let len = container.children().len();
            container
                .children()
                .get(index)
                .copied()
                .ok_or(ArborError::IndexOutOfRange { index, len })
        });
        let child = self.track(result)?;
        self.arena.detach(child);
        self.mark_dirty();
        Ok(())
    }

    /// Change how an integer setting is written.
    pub fn set_format(&mut self, node: NodeId, format: Format) -> Result<()> {
        let result = self.node_ref(node).map(|_| ());
        self.track(result)?;
        if let Some(n) = self.arena.get_mut(node) {
            n.set_format(format);
        }
        Ok(())
    }

    /// Attach caller data to `node`, replacing any previous hook. Hooks live
    /// in memory only and never trigger a write-back.
    pub fn set_hook<T: Any + Send + Sync>(&mut self, node: NodeId, data: T) -> Result<()> {
        let hook: Hook = Arc::new(data);
        self.replace_hook(node, Some(hook))
    }

    pub fn clear_hook(&mut self, node: NodeId) -> Result<()> {
        self.replace_hook(node, None)
    }

    fn replace_hook(&mut self, node: NodeId, hook: Option<Hook>) -> Result<()> {
        let result = self.node_ref(node).map(|_| ());
        self.track(result)?;
        if let Some(n) = self.arena.get_mut(node) {
            n.set_hook(hook);
        }
        Ok(())
    }

    fn write_scalar(&mut self, node: NodeId, kind: ValueKind, value: Value) -> Result<()> {
        let current = self.node_ref(node)?.kind();
        if current != kind || !current.is_scalar() {
            return Err(ArborError::mismatch(kind, current));
        }
        if value.kind() != kind {
            return Err(ArborError::mismatch(kind, value.kind()));
        }
        check_representable(&value)?;

        if let Some(n) = self.arena.get_mut(node) {
            n.replace_value(value);
        }
        Ok(())
    }

    fn check_scalar_add(&self, parent: NodeId, kind: ValueKind, value: &Value) -> Result<()> {
        if !kind.is_scalar() {
            return Err(ArborError::mismatch(value.kind(), kind));
        }
        if value.kind() != kind {
            return Err(ArborError::mismatch(kind, value.kind()));
        }
        check_representable(value)?;

        let container = self.node_ref(parent)?;
        match container.kind() {
            ValueKind::Group | ValueKind::List => Ok(()),
            ValueKind::Array => {
                let existing = container
                    .children()
                    .first()
                    .and_then(|first| self.arena.get(*first))
                    .map(Node::kind);
                match existing {
                    Some(element_kind) if element_kind != kind => Err(ArborError::mismatch(element_kind, kind)),
                    _ => Ok(()),
                }
            }
            other => Err(ArborError::mismatch(ValueKind::Group, other)),
        }
    }

    fn check_container_add(&self, parent: NodeId) -> Result<()> {
        let container = self.node_ref(parent)?;
        match container.kind() {
            ValueKind::Group | ValueKind::List => Ok(()),
            // Arrays hold scalars only.
            ValueKind::Array => Err(ArborError::mismatch(ValueKind::List, ValueKind::Array)),
            other => Err(ArborError::mismatch(ValueKind::Group, other)),
        }
    }

    /// Name the node for its parent and attach it as the last child.
    fn attach_child(&mut self, parent: NodeId, name: &str, node: Node) -> Result<NodeId> {
        let parent_kind = self.node_ref(parent)?.kind();
        let node = if parent_kind == ValueKind::Group {
            if !is_valid_name(name) {
                return Err(ArborError::InvalidName { name: name.to_string() });
            }
            if self.find_member(parent, name).is_some() {
                return Err(ArborError::DuplicateName { name: name.to_string() });
            }
            node.named(name)
        } else {
            node
        };

        self.arena
            .attach(parent, node)
            .ok_or_else(|| ArborError::mismatch(ValueKind::Group, parent_kind))
    }

    fn mark_dirty(&mut self) {
        if let Some(tx) = &mut self.transaction {
            tx.dirty = true;
        }
    }
}

/// NaN and infinities have no literal form, so they could never be read back.
fn check_representable(value: &Value) -> Result<()> {
    match value {
        Value::Float64(x) if !x.is_finite() => Err(ArborError::InvalidValue {
            message: format!("float {} cannot be stored", x),
        }),
        _ => Ok(()),
    }
}
