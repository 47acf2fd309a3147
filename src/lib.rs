// Author: Dustin Pilgrim
// License: MIT

//! Hierarchical, typed configuration trees in the libconfig text format.
//!
//! A [`Tree`] is loaded from text or a file, navigated with dotted paths
//! such as `general.access.users.[0]`, and mutated in place. Mutations
//! that change a scalar write the whole tree back to its backing file.
//!
//! ```
//! use arbor_cfg::{Tree, ValueKind};
//!
//! let mut tree = Tree::new();
//! tree.load_from_text("general : { port = 8080; };").unwrap();
//! let port = tree.lookup("general.port").unwrap();
//! assert_eq!(tree.kind_of(port).unwrap(), ValueKind::Int32);
//! assert_eq!(tree.get_as::<i32>(port).unwrap(), 8080);
//! ```

pub mod ast;
pub mod error;
pub mod export;
mod guard;
pub mod lexer;
pub mod node;
pub mod options;
pub mod parser;
pub mod tree;
pub mod value;
mod writer;

pub use error::{ArborError, ErrorInfo, ErrorKind, Result};
pub use node::{Hook, Node, NodeId};
pub use options::{Options, TreeSettings};
pub use tree::Tree;
pub use value::{Format, ScalarType, Value, ValueKind};
