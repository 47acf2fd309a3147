use std::any::Any;

use super::*;
use crate::value::{ScalarType, Value};

impl Tree {
    /// Read the scalar value of `node` as `kind`.
    ///
    /// Kinds must match exactly unless [`Options::AUTO_CONVERT`] is set, in
    /// which case numeric values convert where [`Value::convert`] allows.
    pub fn get(&self, node: NodeId, kind: ValueKind) -> Result<Value> {
        self.track(self.read_scalar(node, kind))
    }

    /// Typed convenience over [`get`](Self::get).
    ///
    /// # Examples
    /// ```
    /// # use arbor_cfg::Tree;
    /// let mut tree = Tree::new();
    /// tree.load_from_text("port = 8080;").unwrap();
    /// let port = tree.lookup("port").unwrap();
    /// assert_eq!(tree.get_as::<i32>(port).unwrap(), 8080);
    /// assert!(tree.get_as::<i64>(port).is_err());
    /// ```
    pub fn get_as<T: ScalarType>(&self, node: NodeId) -> Result<T> {
        self.get(node, T::KIND).and_then(T::try_from)
    }

    /// Resolve `path` relative to `node` and read the result as `kind`.
    pub fn lookup_typed(&self, node: NodeId, path: &str, kind: ValueKind) -> Result<Value> {
        self.track(
            self.resolve(node, path)
                .and_then(|found| self.read_scalar(found, kind)),
        )
    }

    pub fn lookup_as<T: ScalarType>(&self, node: NodeId, path: &str) -> Result<T> {
        self.lookup_typed(node, path, T::KIND).and_then(T::try_from)
    }

    /// Resolve `path` from the root and read the result as `kind`.
    pub fn lookup_value(&self, path: &str, kind: ValueKind) -> Result<Value> {
        let root = self.root()?;
        self.lookup_typed(root, path, kind)
    }

    /// The element at `index` of a list or array.
    pub fn element_at(&self, node: NodeId, index: usize) -> Result<NodeId> {
        self.track(self.positional_child(node, index))
    }

    pub fn get_element(&self, node: NodeId, index: usize, kind: ValueKind) -> Result<Value> {
        self.track(
            self.positional_child(node, index)
                .and_then(|element| self.read_scalar(element, kind)),
        )
    }

    pub fn element_as<T: ScalarType>(&self, node: NodeId, index: usize) -> Result<T> {
        self.get_element(node, index, T::KIND).and_then(T::try_from)
    }

    /// Position of `node` among its siblings. `None` for the root and for
    /// named group members.
    pub fn index_of(&self, node: NodeId) -> Result<Option<usize>> {
        let parent = match self.node(node)?.parent() {
            Some(parent) => self.node(parent)?,
            None => return Ok(None),
        };
        if !parent.kind().is_positional() {
            return Ok(None);
        }
        Ok(parent.children().iter().position(|child| *child == node))
    }

    /// Number of children. Scalars report 0.
    pub fn length(&self, node: NodeId) -> Result<usize> {
        Ok(self.node(node)?.children().len())
    }

    pub fn parent_of(&self, node: NodeId) -> Result<Option<NodeId>> {
        Ok(self.node(node)?.parent())
    }

    pub fn is_root(&self, node: NodeId) -> Result<bool> {
        Ok(self.node(node)?.parent().is_none())
    }

    pub fn name_of(&self, node: NodeId) -> Result<Option<&str>> {
        Ok(self.node(node)?.name())
    }

    pub fn kind_of(&self, node: NodeId) -> Result<ValueKind> {
        Ok(self.node(node)?.kind())
    }

    /// The children of `node` in order.
    pub fn children(&self, node: NodeId) -> Result<&[NodeId]> {
        Ok(self.node(node)?.children())
    }

    pub fn format_of(&self, node: NodeId) -> Result<Format> {
        Ok(self.node(node)?.format())
    }

    /// The hook attached to `node`, if there is one and it is a `T`.
    pub fn hook<T: Any + Send + Sync>(&self, node: NodeId) -> Result<Option<&T>> {
        Ok(self.node(node)?.hook().and_then(|hook| hook.downcast_ref::<T>()))
    }

    pub(crate) fn read_scalar(&self, node: NodeId, kind: ValueKind) -> Result<Value> {
        let n = self.node_ref(node)?;
        let Some(value) = n.value() else {
            return Err(ArborError::mismatch(kind, n.kind()));
        };

        if value.kind() == kind {
            return Ok(value.clone());
        }
        if self.settings.options.contains(Options::AUTO_CONVERT) {
            if let Some(converted) = value.convert(kind) {
                return Ok(converted);
            }
        }
        Err(ArborError::mismatch(kind, value.kind()))
    }

    /// Child `index` of a list or array. Groups and scalars are refused.
    pub(crate) fn positional_child(&self, node: NodeId, index: usize) -> Result<NodeId> {
        let container = self.node_ref(node)?;
        if !container.kind().is_positional() {
            return Err(ArborError::mismatch(ValueKind::List, container.kind()));
        }
        container
            .children()
            .get(index)
            .copied()
            .ok_or(ArborError::IndexOutOfRange {
                index,
                len: container.children().len(),
            })
    }
}
