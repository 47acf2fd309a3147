use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use super::*;

/// One path segment: an optional member name and an optional `[index]`.
static SEGMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z*][-A-Za-z0-9_*]*)?(?:\[(\d+)\])?$").expect("segment pattern is valid")
});

static NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z*][-A-Za-z0-9_*]*$").expect("name pattern is valid"));

pub(crate) fn is_valid_name(name: &str) -> bool {
    NAME.is_match(name)
}

#[derive(Debug, PartialEq)]
enum Step<'p> {
    Member(&'p str),
    Element(usize),
}

/// Split `general.access.users.[0]` (or `users[0]`) into steps. `None` if
/// any segment is malformed.
fn parse_path(path: &str) -> Option<Vec<Step<'_>>> {
    let mut steps = Vec::new();
    for segment in path.split('.') {
        let caps = SEGMENT.captures(segment)?;
        let name = caps.get(1).map(|m| m.as_str());
        let index = match caps.get(2) {
            Some(m) => Some(m.as_str().parse::<usize>().ok()?),
            None => None,
        };
        match (name, index) {
            (None, None) => return None,
            (Some(n), None) => steps.push(Step::Member(n)),
            (None, Some(i)) => steps.push(Step::Element(i)),
            (Some(n), Some(i)) => {
                steps.push(Step::Member(n));
                steps.push(Step::Element(i));
            }
        }
    }
    Some(steps)
}

impl Tree {
    /// Resolve a dot-separated path from the root.
    ///
    /// Missing names, out-of-range indices and indexing into scalars all
    /// report `NotFound`. The empty path resolves to the root.
    ///
    /// # Example
    /// ```
    /// # use arbor_cfg::Tree;
    /// let mut tree = Tree::new();
    /// tree.load_from_text("general : { users = [ \"alice\", \"bob\" ]; };").unwrap();
    /// let first = tree.lookup("general.users.[0]").unwrap();
    /// assert_eq!(tree.get_as::<String>(first).unwrap(), "alice");
    /// ```
    pub fn lookup(&self, path: &str) -> Result<NodeId> {
        let root = self.root()?;
        self.lookup_from(root, path)
    }

    /// Resolve `path` relative to `node`.
    pub fn lookup_from(&self, node: NodeId, path: &str) -> Result<NodeId> {
        self.track(self.resolve(node, path))
    }

    /// The member of group `node` called `name`.
    pub fn member(&self, node: NodeId, name: &str) -> Result<NodeId> {
        self.track(self.find_member(node, name).ok_or_else(|| ArborError::not_found(name)))
    }

    /// Read-only access to a node.
    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.track(self.node_ref(id))
    }

    pub(crate) fn node_ref(&self, id: NodeId) -> Result<&Node> {
        self.arena.get(id).ok_or_else(|| ArborError::not_found("<removed setting>"))
    }

    pub(crate) fn resolve(&self, start: NodeId, path: &str) -> Result<NodeId> {
        self.node_ref(start)?;
        if path.is_empty() {
            return Ok(start);
        }

        let not_found = || ArborError::not_found(path);
        let steps = parse_path(path).ok_or_else(not_found)?;

        let mut current = start;
        for step in steps {
            current = match step {
                Step::Member(name) => self.find_member(current, name),
                Step::Element(index) => self.find_element(current, index),
            }
            .ok_or_else(not_found)?;
        }

        trace!(path, "resolved setting");
        Ok(current)
    }

    pub(crate) fn find_member(&self, node: NodeId, name: &str) -> Option<NodeId> {
        let group = self.arena.get(node)?;
        if group.kind() != ValueKind::Group {
            return None;
        }
        group
            .children()
            .iter()
            .copied()
            .find(|child| self.arena.get(*child).and_then(Node::name) == Some(name))
    }

    fn find_element(&self, node: NodeId, index: usize) -> Option<NodeId> {
        self.arena.get(node)?.children().get(index).copied()
    }
}

#[cfg(test)]
mod path_tests {
    use super::*;

    #[test]
    fn test_parse_path_forms() {
        assert_eq!(
            parse_path("general.access.users.[2]"),
            Some(vec![
                Step::Member("general"),
                Step::Member("access"),
                Step::Member("users"),
                Step::Element(2),
            ])
        );
        assert_eq!(parse_path("users[0]"), Some(vec![Step::Member("users"), Step::Element(0)]));
        assert_eq!(parse_path("a..b"), None);
        assert_eq!(parse_path("a.[-1]"), None);
        assert_eq!(parse_path("9lives"), None);
    }

    #[test]
    fn test_name_validation() {
        assert!(is_valid_name("port"));
        assert!(is_valid_name("*glob-name_2"));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("2fast"));
        assert!(!is_valid_name("has space"));
    }
}
