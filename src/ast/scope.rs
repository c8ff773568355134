use crate::kernel::Number;
use std::collections::HashMap;

/// Variable bindings visible to one evaluation.
///
/// A scope belongs to a single top-level call; summations bind their loop
/// variable here and restore the previous binding before they return.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    bindings: HashMap<String, Number>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Number> {
        self.bindings.get(name)
    }

    /// Binds `name`, returning the value it shadowed.
    pub fn set(&mut self, name: impl Into<String>, value: Number) -> Option<Number> {
        self.bindings.insert(name.into(), value)
    }

    /// Puts back what [`Scope::set`] returned.
    pub fn restore(&mut self, name: &str, previous: Option<Number>) {
        match previous {
            Some(value) => {
                self.bindings.insert(name.to_string(), value);
            }
            None => {
                self.bindings.remove(name);
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
