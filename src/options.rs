// Author: Dustin Pilgrim
// License: MIT

use std::ops::{BitAnd, BitOr, BitOrAssign};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::value::Format;

/// Parsing and formatting flags for a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Options(u32);

impl Options {
    pub const NONE: Options = Options(0);
    /// Relax scalar type matching on read (see [`Value::convert`](crate::Value::convert)).
    pub const AUTO_CONVERT: Options = Options(0x01);
    /// Accept `;` as a setting terminator and emit it when writing.
    pub const SEMICOLON_SEPARATORS: Options = Options(0x02);
    /// Accept and emit `:` instead of `=` before groups.
    pub const COLON_FOR_GROUPS: Options = Options(0x04);
    /// Accept and emit `:` instead of `=` before everything that is not a group.
    pub const COLON_FOR_SCALARS: Options = Options(0x08);
    /// Emit a group's opening brace on its own line.
    pub const BRACE_ON_NEW_LINE: Options = Options(0x10);

    const ALL: u32 = 0x1F;

    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Unknown bits are dropped.
    pub const fn from_bits_truncate(bits: u32) -> Self {
        Options(bits & Self::ALL)
    }

    pub const fn contains(self, other: Options) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Options) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Options) {
        self.0 &= !other.0;
    }
}

impl Default for Options {
    fn default() -> Self {
        Options::SEMICOLON_SEPARATORS | Options::COLON_FOR_GROUPS | Options::BRACE_ON_NEW_LINE
    }
}

impl BitOr for Options {
    type Output = Options;

    fn bitor(self, rhs: Options) -> Options {
        Options(self.0 | rhs.0)
    }
}

impl BitOrAssign for Options {
    fn bitor_assign(&mut self, rhs: Options) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for Options {
    type Output = Options;

    fn bitand(self, rhs: Options) -> Options {
        Options(self.0 & rhs.0)
    }
}

/// Per-tree configuration, serializable so host applications can carry it
/// in their own config files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeSettings {
    pub options: Options,
    pub default_format: Format,
    /// Spaces per indentation level, 0–15. Zero indents with a tab.
    pub tab_width: u8,
    /// Directory `@include` directives resolve against.
    pub include_dir: Option<PathBuf>,
}

impl Default for TreeSettings {
    fn default() -> Self {
        TreeSettings {
            options: Options::default(),
            default_format: Format::Default,
            tab_width: 2,
            include_dir: None,
        }
    }
}
