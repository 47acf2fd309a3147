use std::sync::Arc;

use crate::value::{Format, Value};

/// One parsed setting. Array and list elements carry no name.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingDecl {
    pub name: Option<String>,
    pub value: ValueDecl,
    pub line: usize,
    pub file: Option<Arc<str>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValueDecl {
    Scalar(Value, Format),
    Array(Vec<SettingDecl>),
    List(Vec<SettingDecl>),
    Group(Vec<SettingDecl>),
}

/// The top-level settings of a source, in order. The root acts as a group.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub settings: Vec<SettingDecl>,
}

impl SettingDecl {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}
