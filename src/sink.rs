//! Named output values published by event calculators
//!
//! Calculators hand every output field to a sink by name. The host decides
//! what to do with them (tree branches, JSON records...). Setting a name
//! twice overwrites the previous value.

use crate::numeric::Float;

use serde::Serialize;

use std::collections::BTreeMap;

/// Value of a published output field
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Boolean tag
    Bool(bool),

    /// Integer scalar
    Int(i32),

    /// Integer array
    Ints(Vec<i32>),

    /// Floating-point array
    Floats(Vec<Float>),
}
//
impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}
//
impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}
//
impl From<Vec<i32>> for Value {
    fn from(value: Vec<i32>) -> Self {
        Self::Ints(value)
    }
}
//
impl From<Vec<Float>> for Value {
    fn from(value: Vec<Float>) -> Self {
        Self::Floats(value)
    }
}

/// Destination of named output values
pub trait OutputSink {
    /// Publish a value under a name, replacing any previous value
    fn set_value(&mut self, name: &str, value: Value);
}

/// Map-backed output sink holding the values published for one event
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EventContent(BTreeMap<String, Value>);
//
impl EventContent {
    /// Start with no value
    pub fn new() -> Self {
        Self::default()
    }

    /// Value published under a name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Boolean published under a name
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.get(name)? {
            Value::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Integer published under a name
    pub fn get_int(&self, name: &str) -> Option<i32> {
        match self.get(name)? {
            Value::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Integer array published under a name
    pub fn get_ints(&self, name: &str) -> Option<&[i32]> {
        match self.get(name)? {
            Value::Ints(values) => Some(values),
            _ => None,
        }
    }

    /// Floating-point array published under a name
    pub fn get_floats(&self, name: &str) -> Option<&[Float]> {
        match self.get(name)? {
            Value::Floats(values) => Some(values),
            _ => None,
        }
    }

    /// Iterate over the published names, in lexicographic order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Number of published values
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Truth that nothing was published
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
//
impl OutputSink for EventContent {
    fn set_value(&mut self, name: &str, value: Value) {
        self.0.insert(name.to_owned(), value);
    }
}
