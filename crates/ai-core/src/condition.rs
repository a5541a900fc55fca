use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A named boolean fact about the world or the agent.
///
/// Two conditions are equal when both the name and the value match. A condition never changes
/// after construction; use [`Condition::negated`] to get the opposite fact.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Condition {
    name: String,
    value: bool,
}

impl Condition {
    pub fn new(name: impl Into<String>, value: bool) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> bool {
        self.value
    }

    pub fn negated(&self) -> Self {
        Self {
            name: self.name.clone(),
            value: !self.value,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}
