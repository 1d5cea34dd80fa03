//! Named script registry for guest-side evaluation.
//!
//! Callables cannot cross the frame messaging boundary, so custom test logic
//! is supplied at registration time instead of at call time: the test author
//! registers a named script against the page builder, keeps the returned
//! [`ScriptKey`], and invokes it later through `Page::eval`. Only the key's
//! wire name travels over the channel; the guest looks the script up in its
//! own copy of the registry and runs it against the live document.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use rustc_hash::FxHashMap;
use serde_json::Value;

use crate::dom::Document;
use crate::error::Result;

// ============================================================================
// Types
// ============================================================================

/// A registered script: arbitrary logic run against the guest document.
///
/// Scripts run synchronously while the document lock is held and return a
/// JSON value sent back through the reply envelope.
pub type ScriptFn = Box<dyn Fn(&mut Document) -> Result<Value> + Send + Sync>;

// ============================================================================
// ScriptKey
// ============================================================================

/// Handle to a registered script.
///
/// The only part of a script that crosses the messaging boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScriptKey(String);

impl ScriptKey {
    /// Returns the wire name of the script.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScriptKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ============================================================================
// ScriptRegistry
// ============================================================================

/// Registry of named scripts available to a page's `eval` operation.
#[derive(Default)]
pub struct ScriptRegistry {
    scripts: FxHashMap<String, ScriptFn>,
}

impl ScriptRegistry {
    /// Creates an empty registry.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a script under `name`, returning its key.
    ///
    /// Registering a second script under the same name replaces the first.
    pub fn register<F>(&mut self, name: impl Into<String>, script: F) -> ScriptKey
    where
        F: Fn(&mut Document) -> Result<Value> + Send + Sync + 'static,
    {
        let name = name.into();
        self.scripts.insert(name.clone(), Box::new(script));
        ScriptKey(name)
    }

    /// Looks up a script by wire name.
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ScriptFn> {
        self.scripts.get(name)
    }

    /// Returns `true` if a script is registered under `name`.
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.scripts.contains_key(name)
    }

    /// Returns the number of registered scripts.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    /// Returns `true` if no scripts are registered.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }
}

impl fmt::Debug for ScriptRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptRegistry")
            .field("scripts", &self.scripts.keys().collect::<Vec<_>>())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_get() {
        let mut registry = ScriptRegistry::new();
        let key = registry.register("sum", |_| Ok(Value::from(1 + 2 + 3)));

        assert_eq!(key.name(), "sum");
        assert!(registry.contains("sum"));
        assert_eq!(registry.len(), 1);

        let script = registry.get("sum").expect("registered");
        let mut document = Document::blank();
        assert_eq!(script(&mut document).expect("runs"), Value::from(6));
    }

    #[test]
    fn test_missing_script() {
        let registry = ScriptRegistry::new();
        assert!(registry.get("missing").is_none());
        assert!(!registry.contains("missing"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_reregister_replaces() {
        let mut registry = ScriptRegistry::new();
        registry.register("answer", |_| Ok(Value::from(1)));
        registry.register("answer", |_| Ok(Value::from(42)));

        let mut document = Document::blank();
        let script = registry.get("answer").expect("registered");
        assert_eq!(script(&mut document).expect("runs"), Value::from(42));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_script_can_mutate_document() {
        let mut registry = ScriptRegistry::new();
        registry.register("mark", |document| {
            let body = Document::parse_selector("body")?;
            Ok(Value::from(document.set_attribute(&body, "data-marked", "1")))
        });

        let mut document = Document::blank();
        let script = registry.get("mark").expect("registered");
        assert_eq!(script(&mut document).expect("runs"), Value::from(1u64));

        let body = Document::parse_selector("body").expect("valid");
        assert_eq!(document.get_attribute(&body, "data-marked").as_deref(), Some("1"));
    }
}
