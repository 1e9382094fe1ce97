//! Pair key normalization.
//!
//! Two parent refs collapse into one order-independent `CrossKey`:
//! each ref is trimmed, lowercased and has whitespace runs replaced by `_`,
//! then the pair is sorted by byte order and joined with [`KEY_SEPARATOR`].
//! Nothing here depends on hashing seeds or addresses, so keys are stable
//! across process restarts and safe to persist.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{KEY_SEPARATOR, MAX_PARENT_REF_LEN, WHITESPACE_REPLACEMENT};
use crate::errors::{CrossError, CrossOutcome};

/// Opaque identifier for a breeding parent strain, as supplied by callers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParentRef(String);

impl ParentRef {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Canonical form used inside a `CrossKey`.
    pub fn canonical(&self) -> CrossOutcome<String> {
        canonicalize(&self.0)
    }
}

impl AsRef<str> for ParentRef {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ParentRef {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ParentRef {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for ParentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Canonical identity of an unordered parent pair.
///
/// `CrossKey(a, b) == CrossKey(b, a)`; `CrossKey(a, a)` is a self-cross.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CrossKey(String);

impl CrossKey {
    /// The full key string, e.g. `"blue-dream x og-kush"`.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The two canonical parent refs, in key order.
    pub fn parents(&self) -> (&str, &str) {
        match self.0.split_once(KEY_SEPARATOR) {
            Some((first, second)) => (first, second),
            // Unreachable for keys built by `normalize_key`.
            None => (self.0.as_str(), self.0.as_str()),
        }
    }

    /// Whether both parents are the same strain.
    pub fn is_self_cross(&self) -> bool {
        let (first, second) = self.parents();
        first == second
    }

    /// Whether `parent` (raw or canonical) is one of this key's parents.
    pub fn involves(&self, parent: &str) -> bool {
        match canonicalize(parent) {
            Ok(canonical) => {
                let (first, second) = self.parents();
                first == canonical || second == canonical
            }
            Err(_) => false,
        }
    }
}

impl fmt::Display for CrossKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Build the canonical key for a parent pair.
///
/// Fails with `InvalidInput` when either ref is empty, too long, or
/// contains control characters.
pub fn normalize_key(parent_a: impl AsRef<str>, parent_b: impl AsRef<str>) -> CrossOutcome<CrossKey> {
    let a = canonicalize(parent_a.as_ref())?;
    let b = canonicalize(parent_b.as_ref())?;
    let (first, second) = if a <= b { (a, b) } else { (b, a) };
    Ok(CrossKey(format!("{first}{KEY_SEPARATOR}{second}")))
}

fn canonicalize(raw: &str) -> CrossOutcome<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CrossError::invalid_input("parent reference is empty"));
    }
    let len = trimmed.chars().count();
    if len > MAX_PARENT_REF_LEN {
        return Err(CrossError::invalid_input(format!(
            "parent reference is {len} chars, max is {MAX_PARENT_REF_LEN}"
        )));
    }
    if trimmed.chars().any(char::is_control) {
        return Err(CrossError::invalid_input(format!(
            "parent reference {trimmed:?} contains control characters"
        )));
    }

    let lowered = trimmed.to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    for (i, word) in lowered.split_whitespace().enumerate() {
        if i > 0 {
            out.push(WHITESPACE_REPLACEMENT);
        }
        out.push_str(word);
    }
    Ok(out)
}
