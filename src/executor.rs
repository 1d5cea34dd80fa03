//! Guest-side DOM action executor.
//!
//! [`PageExecutor`] implements the five remote operations against the frame's
//! document. The four DOM operations are each an application of the attempt
//! loop to a document query and a success predicate: "element not yet
//! present" and "attribute not yet applied" are transient conditions, polled
//! every 200ms within the call's timeout budget. `eval` is the exception: it
//! runs a registered script once, synchronously, with no retry.
//!
//! Polling operations resolve with their last observed result on timeout
//! rather than an error; see [`crate::retry`].

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::Value;
use tracing::debug;

use crate::dom::Document;
use crate::error::{Error, Result};
use crate::protocol::Procedure;
use crate::retry::{ATTEMPT_INTERVAL, DEFAULT_OPERATION_TIMEOUT, run_attempts};
use crate::scripts::ScriptRegistry;

// ============================================================================
// PageExecutor
// ============================================================================

/// Executes remote operations against a frame's document.
///
/// The document lock is held per attempt, not across the inter-attempt sleep,
/// so a mutation dispatched while an existence poll is pending can satisfy
/// that poll.
pub struct PageExecutor {
    document: Arc<Mutex<Document>>,
    scripts: Arc<ScriptRegistry>,
}

impl Clone for PageExecutor {
    fn clone(&self) -> Self {
        Self {
            document: Arc::clone(&self.document),
            scripts: Arc::clone(&self.scripts),
        }
    }
}

impl PageExecutor {
    /// Creates an executor over a shared document and script registry.
    #[inline]
    #[must_use]
    pub fn new(document: Arc<Mutex<Document>>, scripts: Arc<ScriptRegistry>) -> Self {
        Self { document, scripts }
    }

    /// Counts elements matching `selector`, polling until at least one exists.
    ///
    /// Resolves with the final count, which may still be 0 after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SelectorParse`] if the selector is invalid.
    pub async fn check_existence(&self, selector: &str, timeout: Duration) -> Result<u64> {
        let parsed = Document::parse_selector(selector)?;
        debug!(selector, timeout_ms = timeout.as_millis() as u64, "checkExistence");

        let document = Arc::clone(&self.document);
        let count = run_attempts(
            move || document.lock().count_matching(&parsed),
            |count| *count > 0,
            ATTEMPT_INTERVAL,
            timeout,
        )
        .await;

        Ok(count)
    }

    /// Sets `attribute` to `value` on every element matching `selector`,
    /// polling until at least one element is mutated.
    ///
    /// Resolves with the number of elements mutated on the final attempt.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SelectorParse`] if the selector is invalid.
    pub async fn set_attribute(
        &self,
        selector: &str,
        attribute: &str,
        value: &str,
        timeout: Duration,
    ) -> Result<u64> {
        let parsed = Document::parse_selector(selector)?;
        debug!(selector, attribute, timeout_ms = timeout.as_millis() as u64, "setAttribute");

        let document = Arc::clone(&self.document);
        let count = run_attempts(
            move || document.lock().set_attribute(&parsed, attribute, value),
            |count| *count > 0,
            ATTEMPT_INTERVAL,
            timeout,
        )
        .await;

        Ok(count)
    }

    /// Reads `attribute` from the first element matching `selector`, polling
    /// until a value is present.
    ///
    /// Resolves with `None` when, even on the final attempt, no element
    /// matched or the attribute was absent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SelectorParse`] if the selector is invalid.
    pub async fn get_attribute(
        &self,
        selector: &str,
        attribute: &str,
        timeout: Duration,
    ) -> Result<Option<String>> {
        let parsed = Document::parse_selector(selector)?;
        debug!(selector, attribute, timeout_ms = timeout.as_millis() as u64, "getAttribute");

        let document = Arc::clone(&self.document);
        let value = run_attempts(
            move || document.lock().get_attribute(&parsed, attribute),
            |value| value.is_some(),
            ATTEMPT_INTERVAL,
            timeout,
        )
        .await;

        Ok(value)
    }

    /// Removes `attribute` from every element matching `selector`, polling
    /// until at least one element is affected.
    ///
    /// Resolves with the number of elements affected on the final attempt.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SelectorParse`] if the selector is invalid.
    pub async fn remove_attribute(
        &self,
        selector: &str,
        attribute: &str,
        timeout: Duration,
    ) -> Result<u64> {
        let parsed = Document::parse_selector(selector)?;
        debug!(selector, attribute, timeout_ms = timeout.as_millis() as u64, "removeAttribute");

        let document = Arc::clone(&self.document);
        let count = run_attempts(
            move || document.lock().remove_attribute(&parsed, attribute),
            |count| *count > 0,
            ATTEMPT_INTERVAL,
            timeout,
        )
        .await;

        Ok(count)
    }

    /// Runs the script registered under `key` against the document.
    ///
    /// Not retried; any script error propagates as a failed call.
    ///
    /// # Errors
    ///
    /// - [`Error::ScriptNotFound`] if no script is registered under `key`
    /// - whatever error the script itself returns
    pub fn eval(&self, key: &str) -> Result<Value> {
        let script = self
            .scripts
            .get(key)
            .ok_or_else(|| Error::script_not_found(key))?;
        debug!(key, "eval");

        let mut document = self.document.lock();
        script(&mut document)
    }
}

// ============================================================================
// Wire Dispatch
// ============================================================================

impl PageExecutor {
    /// Dispatches a decoded call payload to the matching operation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] when the argument list does not
    /// match the procedure's signature, plus whatever the operation returns.
    pub async fn dispatch(&self, procedure: Procedure, arguments: &[Value]) -> Result<Value> {
        match procedure {
            Procedure::CheckExistence => {
                let selector = required_str(arguments, 0, "selector")?;
                let timeout = optional_timeout(arguments, 1)?;
                self.check_existence(selector, timeout).await.map(Value::from)
            }
            Procedure::SetAttribute => {
                let selector = required_str(arguments, 0, "selector")?;
                let attribute = required_str(arguments, 1, "attribute")?;
                let value = required_str(arguments, 2, "value")?;
                let timeout = optional_timeout(arguments, 3)?;
                self.set_attribute(selector, attribute, value, timeout)
                    .await
                    .map(Value::from)
            }
            Procedure::GetAttribute => {
                let selector = required_str(arguments, 0, "selector")?;
                let attribute = required_str(arguments, 1, "attribute")?;
                let timeout = optional_timeout(arguments, 2)?;
                let value = self.get_attribute(selector, attribute, timeout).await?;
                Ok(value.map_or(Value::Null, Value::from))
            }
            Procedure::RemoveAttribute => {
                let selector = required_str(arguments, 0, "selector")?;
                let attribute = required_str(arguments, 1, "attribute")?;
                let timeout = optional_timeout(arguments, 2)?;
                self.remove_attribute(selector, attribute, timeout)
                    .await
                    .map(Value::from)
            }
            Procedure::Eval => {
                let key = required_str(arguments, 0, "script key")?;
                self.eval(key)
            }
        }
    }
}

// ============================================================================
// Argument Helpers
// ============================================================================

fn required_str<'a>(arguments: &'a [Value], index: usize, name: &str) -> Result<&'a str> {
    arguments
        .get(index)
        .and_then(Value::as_str)
        .ok_or_else(|| Error::invalid_argument(format!("argument {index} ({name}) must be a string")))
}

fn optional_timeout(arguments: &[Value], index: usize) -> Result<Duration> {
    match arguments.get(index) {
        None | Some(Value::Null) => Ok(DEFAULT_OPERATION_TIMEOUT),
        Some(value) => value.as_u64().map(Duration::from_millis).ok_or_else(|| {
            Error::invalid_argument(format!(
                "argument {index} (timeout) must be a non-negative integer"
            ))
        }),
    }
}

// ============================================================================
// Tests
// ============================================================================
