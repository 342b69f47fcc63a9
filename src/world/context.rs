//! Pluggable context providers.
//!
//! Providers feed the world key/value context at the top of each tick:
//! OS metrics, viewport data, chat input, or anything else the host wants the
//! population to react to. The core performs no I/O of its own; it only
//! polls whatever providers the shell registered. Keys are
//! dot-delimited strings, values are JSON scalars, unknown keys are
//! preserved for rule evaluation.

use std::collections::BTreeMap;

use thiserror::Error;

/// Error a provider may return; the kernel skips the provider for the
/// tick and keeps its previous values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("context provider failed: {reason}")]
pub struct ContextError {
    /// Why the provider could not produce context.
    pub reason: String,
}

impl ContextError {
    /// Creates an error with a reason.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        ContextError {
            reason: reason.into(),
        }
    }
}

/// A source of key/value context polled each tick.
pub trait ContextProvider {
    /// Stable provider name, used in logs.
    fn name(&self) -> &str;

    /// Produces the provider's current key/value pairs.
    ///
    /// # Errors
    ///
    /// On error the kernel logs and skips the provider this tick.
    fn get_context(&mut self) -> Result<BTreeMap<String, serde_json::Value>, ContextError>;
}

/// A provider backed by a plain map, for hosts and tests.
///
/// # Examples
///
/// ```
/// use vivarium::world::context::{ContextProvider, StaticContextProvider};
///
/// let mut provider = StaticContextProvider::new("chat");
/// provider.set("user.message", serde_json::json!("hello"));
/// let values = provider.get_context().unwrap();
/// assert_eq!(values["user.message"], serde_json::json!("hello"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticContextProvider {
    name: String,
    values: BTreeMap<String, serde_json::Value>,
}

impl StaticContextProvider {
    /// Creates an empty provider with a name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        StaticContextProvider {
            name: name.into(),
            values: BTreeMap::new(),
        }
    }

    /// Sets a value the next poll will report.
    pub fn set(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.values.insert(key.into(), value);
    }

    /// Removes a key.
    pub fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }
}

impl ContextProvider for StaticContextProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_context(&mut self) -> Result<BTreeMap<String, serde_json::Value>, ContextError> {
        Ok(self.values.clone())
    }
}

/// A provider that always fails. Exercises the skip-on-error path.
#[derive(Debug, Clone, Default)]
pub struct FailingContextProvider;

impl ContextProvider for FailingContextProvider {
    fn name(&self) -> &str {
        "failing"
    }

    fn get_context(&mut self) -> Result<BTreeMap<String, serde_json::Value>, ContextError> {
        Err(ContextError::new("always fails"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_provider_reports_values() {
        let mut provider = StaticContextProvider::new("os");
        provider.set("cpu.usage", serde_json::json!(12.5));
        provider.set("battery.level", serde_json::json!(0.8));

        let values = provider.get_context().unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(values["cpu.usage"], serde_json::json!(12.5));
    }

    #[test]
    fn static_provider_remove() {
        let mut provider = StaticContextProvider::new("os");
        provider.set("k", serde_json::json!(1));
        provider.remove("k");
        assert!(provider.get_context().unwrap().is_empty());
    }

    #[test]
    fn failing_provider_errors() {
        let mut provider = FailingContextProvider;
        assert!(provider.get_context().is_err());
        assert_eq!(provider.name(), "failing");
    }
}
