// Author: Dustin Pilgrim
// License: MIT

use serde_json::{json, Map, Value as Json};

use crate::error::Result;
use crate::node::NodeId;
use crate::tree::Tree;
use crate::value::{Value, ValueKind};

/// Export a loaded tree to pretty-printed JSON.
///
/// Conversion rules:
/// - Groups become objects and keep their member order
/// - Arrays and lists become JSON arrays
/// - Integers, floats, strings and booleans map directly
///
/// # Examples
/// ```
/// use arbor_cfg::{Tree, export};
///
/// let mut tree = Tree::new();
/// tree.load_from_text("server : { port = 8080; hosts = [ \"a\", \"b\" ]; };").unwrap();
/// let json = export::export_json(&tree).unwrap();
/// assert!(json.contains("\"port\": 8080"));
/// ```
///
/// # Errors
/// Returns `NotLoaded` if nothing has been loaded into the tree yet.
pub fn export_json(tree: &Tree) -> Result<String> {
    let root = tree.root()?;
    let value = node_to_json(tree, root);
    serde_json::to_string_pretty(&value).map_err(|e| crate::ArborError::IoFailure {
        path: String::new(),
        message: e.to_string(),
    })
}

fn node_to_json(tree: &Tree, id: NodeId) -> Json {
    let Ok(node) = tree.node(id) else {
        return Json::Null;
    };

    match node.kind() {
        ValueKind::Group => {
            let mut object = Map::new();
            for child in node.children() {
                if let Ok(member) = tree.node(*child) {
                    let key = member.name().unwrap_or_default().to_string();
                    object.insert(key, node_to_json(tree, *child));
                }
            }
            Json::Object(object)
        }
        ValueKind::Array | ValueKind::List => {
            Json::Array(node.children().iter().map(|child| node_to_json(tree, *child)).collect())
        }
        _ => match node.value() {
            Some(Value::Int32(n)) => json!(n),
            Some(Value::Int64(n)) => json!(n),
            Some(Value::Float64(x)) => json!(x),
            Some(Value::Bool(b)) => json!(b),
            Some(Value::String(s)) => json!(s),
            None => Json::Null,
        },
    }
}
