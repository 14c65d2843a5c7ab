//! Global string interning for token text.
//!
//! Operator, indentation and newline texts repeat heavily across a source
//! file; interning keeps one allocation per distinct text.

use std::collections::HashSet;
use std::ops::Deref;
use std::sync::{Arc, Mutex};

use lazy_static::lazy_static;

lazy_static! {
    static ref POOL: Mutex<HashSet<Arc<str>>> = Mutex::new(HashSet::new());
}

/// A reference-counted, interned string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InternedString(Arc<str>);

impl InternedString {
    /// Intern `s`, returning a handle to the pooled copy.
    pub fn new(s: &str) -> Self {
        let mut pool = match POOL.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(existing) = pool.get(s) {
            return InternedString(Arc::clone(existing));
        }
        let arc: Arc<str> = Arc::from(s);
        pool.insert(Arc::clone(&arc));
        InternedString(arc)
    }

    /// Get the string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True if the text is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Character count of the text.
    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }
}

impl Deref for InternedString {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for InternedString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for InternedString {
    fn from(s: String) -> Self {
        Self::new(&s)
    }
}

impl PartialEq<str> for InternedString {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for InternedString {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl std::fmt::Display for InternedString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for InternedString {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for InternedString {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(InternedString::new(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_reuses_the_pooled_copy() {
        let a = InternedString::new("**");
        let b = InternedString::new("**");
        assert!(Arc::ptr_eq(&a.0, &b.0));

        let c = InternedString::new("//");
        assert!(!Arc::ptr_eq(&a.0, &c.0));
    }

    #[test]
    fn compares_against_plain_strs() {
        let s = InternedString::from("print");
        assert_eq!(s, "print");
        assert_eq!(s.char_len(), 5);
        assert!(!s.is_empty());
    }
}
