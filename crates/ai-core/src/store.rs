use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::Condition;

/// Mapping from condition name to boolean value.
///
/// Used both as an agent's belief set and, during planning, as the hypothesized state along a
/// candidate branch. Iteration is in name order so anything derived from a store is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct ConditionStore {
    values: BTreeMap<String, bool>,
}

impl ConditionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: bool) {
        self.values.insert(name.into(), value);
    }

    /// Value of `name`, or `false` when it was never set.
    pub fn get(&self, name: &str) -> bool {
        self.value(name).unwrap_or(false)
    }

    /// Value of `name`, distinguishing "never set" from `false`.
    pub fn value(&self, name: &str) -> Option<bool> {
        self.values.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<bool> {
        self.values.remove(name)
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> + '_ {
        self.values.iter().map(|(name, value)| (name.as_str(), *value))
    }

    /// True only when the condition's name is present with the same value.
    pub fn satisfies(&self, condition: &Condition) -> bool {
        self.value(condition.name()) == Some(condition.value())
    }

    pub fn apply(&mut self, conditions: &[Condition]) {
        for condition in conditions {
            self.set(condition.name(), condition.value());
        }
    }
}

impl FromIterator<Condition> for ConditionStore {
    fn from_iter<I: IntoIterator<Item = Condition>>(iter: I) -> Self {
        let mut store = Self::new();
        for condition in iter {
            store.set(condition.name(), condition.value());
        }
        store
    }
}
