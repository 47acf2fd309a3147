// Author: Dustin Pilgrim
// License: MIT

use std::fmt::Write;

use crate::node::{Node, NodeId};
use crate::options::{Options, TreeSettings};
use crate::tree::Tree;
use crate::value::{Format, Value, ValueKind};

/// Render every member of `root` in the textual configuration format.
pub(crate) fn write_tree(tree: &Tree, root: NodeId) -> String {
    let mut writer = Writer {
        tree,
        settings: tree.settings(),
        out: String::new(),
    };
    if let Some(node) = tree.arena().get(root) {
        for child in node.children() {
            writer.write_setting(*child, 0);
        }
    }
    writer.out
}

struct Writer<'t> {
    tree: &'t Tree,
    settings: &'t TreeSettings,
    out: String,
}

impl Writer<'_> {
    fn has(&self, option: Options) -> bool {
        self.settings.options.contains(option)
    }

    fn indent(&mut self, depth: usize) {
        for _ in 0..depth {
            match self.settings.tab_width {
                0 => self.out.push('\t'),
                width => self.out.extend(std::iter::repeat_n(' ', usize::from(width))),
            }
        }
    }

    fn write_setting(&mut self, id: NodeId, depth: usize) {
        let Some(node) = self.tree.arena().get(id) else {
            return;
        };

        self.indent(depth);
        if let Some(name) = node.name() {
            self.out.push_str(name);
            let colon = if node.kind() == ValueKind::Group {
                self.has(Options::COLON_FOR_GROUPS)
            } else {
                self.has(Options::COLON_FOR_SCALARS)
            };
            self.out.push_str(if colon { " :" } else { " =" });
        }

        if node.kind() == ValueKind::Group && self.has(Options::BRACE_ON_NEW_LINE) {
            self.out.push('\n');
            self.indent(depth);
        } else {
            self.out.push(' ');
        }

        self.write_value(node, depth);
        if self.has(Options::SEMICOLON_SEPARATORS) {
            self.out.push(';');
        }
        self.out.push('\n');
    }

    fn write_value(&mut self, node: &Node, depth: usize) {
        match node.kind() {
            ValueKind::Group => {
                self.out.push_str("{\n");
                for child in node.children() {
                    self.write_setting(*child, depth + 1);
                }
                self.indent(depth);
                self.out.push('}');
            }
            ValueKind::Array => self.write_elements(node, '[', ']', depth),
            ValueKind::List => self.write_elements(node, '(', ')', depth),
            _ => {
                if let Some(value) = node.value() {
                    let format = match node.format() {
                        Format::Hex => Format::Hex,
                        Format::Default => self.settings.default_format,
                    };
                    write_scalar(&mut self.out, value, format);
                }
            }
        }
    }

    fn write_elements(&mut self, node: &Node, open: char, close: char, depth: usize) {
        self.out.push(open);
        self.out.push(' ');
        for (i, child) in node.children().iter().enumerate() {
            let Some(element) = self.tree.arena().get(*child) else {
                continue;
            };
            if i > 0 {
                self.out.push_str(", ");
            }
            self.write_value(element, depth);
        }
        if !node.children().is_empty() {
            self.out.push(' ');
        }
        self.out.push(close);
    }
}

fn write_scalar(out: &mut String, value: &Value, format: Format) {
    // Writing to a String cannot fail.
    let _ = match (value, format) {
        (Value::Int32(n), Format::Hex) => write!(out, "0x{:X}", *n as u32),
        (Value::Int64(n), Format::Hex) => write!(out, "0x{:X}L", *n as u64),
        (Value::Int32(n), Format::Default) => write!(out, "{}", n),
        (Value::Int64(n), Format::Default) => write!(out, "{}L", n),
        (Value::Float64(x), _) => write!(out, "{:?}", x),
        (Value::Bool(b), _) => write!(out, "{}", b),
        (Value::String(s), _) => {
            write_string(out, s);
            Ok(())
        }
    };
}

fn write_string(out: &mut String, s: &str) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\u{0C}' => out.push_str("\\f"),
            c if (c as u32) < 0x20 => {
                let _ = write!(out, "\\x{:02X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
}
