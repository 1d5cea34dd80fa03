//! Host-side page handle.

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::frame::{Frame, Viewport};
use crate::protocol::Procedure;
use crate::retry::DEFAULT_OPERATION_TIMEOUT;
use crate::rpc::RpcClient;
use crate::scripts::ScriptKey;

use super::builder::PageBuilder;

// ============================================================================
// Page
// ============================================================================

/// Remote-controlled page.
///
/// Every operation is forwarded over the frame link and executed against the
/// guest's document; the polling operations re-check until they succeed or
/// their per-operation timeout elapses, then report the last observation
/// without erroring. After [`Page::destroy`] all operations fail with
/// [`Error::PageDestroyed`].
#[derive(Debug)]
pub struct Page {
    frame: Frame,
    client: RpcClient,
    destroyed: bool,
}

impl Page {
    /// Starts building a page.
    #[inline]
    #[must_use]
    pub fn builder() -> PageBuilder {
        PageBuilder::new()
    }

    /// Wraps an attached frame and its connected client.
    #[inline]
    pub(crate) fn connect(frame: Frame, client: RpcClient) -> Self {
        Self {
            frame,
            client,
            destroyed: false,
        }
    }

    /// Returns the location the page was navigated to.
    #[inline]
    #[must_use]
    pub fn location(&self) -> &str {
        self.frame.location()
    }

    /// Returns the frame's viewport.
    #[inline]
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.frame.viewport()
    }

    /// Returns `true` once the page has been destroyed.
    #[inline]
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    fn ensure_live(&self) -> Result<()> {
        if self.destroyed {
            return Err(Error::PageDestroyed);
        }
        Ok(())
    }
}

// ============================================================================
// Operations
// ============================================================================

impl Page {
    /// Counts the elements matching `selector`, polling with the default
    /// operation timeout.
    ///
    /// # Errors
    ///
    /// Fails when the selector is invalid, the page is destroyed or the link
    /// is down.
    pub async fn check_existence(&self, selector: &str) -> Result<u64> {
        self.check_existence_timeout(selector, DEFAULT_OPERATION_TIMEOUT)
            .await
    }

    /// Counts the elements matching `selector` with an explicit timeout.
    ///
    /// # Errors
    ///
    /// Fails when the selector is invalid, the page is destroyed or the link
    /// is down.
    pub async fn check_existence_timeout(&self, selector: &str, timeout: Duration) -> Result<u64> {
        self.ensure_live()?;
        let value = self
            .client
            .call(
                Procedure::CheckExistence,
                vec![Value::from(selector), timeout_argument(timeout)],
            )
            .await?;
        expect_count(value)
    }

    /// Sets `attribute` to `value` on every element matching `selector`,
    /// polling with the default operation timeout. Returns the number of
    /// elements touched.
    ///
    /// # Errors
    ///
    /// Fails when the selector is invalid, the page is destroyed or the link
    /// is down.
    pub async fn set_attribute(&self, selector: &str, attribute: &str, value: &str) -> Result<u64> {
        self.set_attribute_timeout(selector, attribute, value, DEFAULT_OPERATION_TIMEOUT)
            .await
    }

    /// Sets `attribute` on every match with an explicit timeout.
    ///
    /// # Errors
    ///
    /// Fails when the selector is invalid, the page is destroyed or the link
    /// is down.
    pub async fn set_attribute_timeout(
        &self,
        selector: &str,
        attribute: &str,
        value: &str,
        timeout: Duration,
    ) -> Result<u64> {
        self.ensure_live()?;
        let reply = self
            .client
            .call(
                Procedure::SetAttribute,
                vec![
                    Value::from(selector),
                    Value::from(attribute),
                    Value::from(value),
                    timeout_argument(timeout),
                ],
            )
            .await?;
        expect_count(reply)
    }

    /// Reads `attribute` from the first element matching `selector`, polling
    /// with the default operation timeout. `None` when no element matched or
    /// the attribute is absent.
    ///
    /// # Errors
    ///
    /// Fails when the selector is invalid, the page is destroyed or the link
    /// is down.
    pub async fn get_attribute(&self, selector: &str, attribute: &str) -> Result<Option<String>> {
        self.get_attribute_timeout(selector, attribute, DEFAULT_OPERATION_TIMEOUT)
            .await
    }

    /// Reads `attribute` from the first match with an explicit timeout.
    ///
    /// # Errors
    ///
    /// Fails when the selector is invalid, the page is destroyed or the link
    /// is down.
    pub async fn get_attribute_timeout(
        &self,
        selector: &str,
        attribute: &str,
        timeout: Duration,
    ) -> Result<Option<String>> {
        self.ensure_live()?;
        let value = self
            .client
            .call(
                Procedure::GetAttribute,
                vec![
                    Value::from(selector),
                    Value::from(attribute),
                    timeout_argument(timeout),
                ],
            )
            .await?;

        match value {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s)),
            other => Err(Error::rpc(format!(
                "getAttribute returned an unexpected value: {other}"
            ))),
        }
    }

    /// Removes `attribute` from every element matching `selector`, polling
    /// with the default operation timeout. Returns the number of elements
    /// touched.
    ///
    /// # Errors
    ///
    /// Fails when the selector is invalid, the page is destroyed or the link
    /// is down.
    pub async fn remove_attribute(&self, selector: &str, attribute: &str) -> Result<u64> {
        self.remove_attribute_timeout(selector, attribute, DEFAULT_OPERATION_TIMEOUT)
            .await
    }

    /// Removes `attribute` from every match with an explicit timeout.
    ///
    /// # Errors
    ///
    /// Fails when the selector is invalid, the page is destroyed or the link
    /// is down.
    pub async fn remove_attribute_timeout(
        &self,
        selector: &str,
        attribute: &str,
        timeout: Duration,
    ) -> Result<u64> {
        self.ensure_live()?;
        let reply = self
            .client
            .call(
                Procedure::RemoveAttribute,
                vec![
                    Value::from(selector),
                    Value::from(attribute),
                    timeout_argument(timeout),
                ],
            )
            .await?;
        expect_count(reply)
    }

    /// Evaluates the registered script behind `key` against the guest's
    /// document and returns its result.
    ///
    /// # Errors
    ///
    /// Fails when the key is not registered on this page's guest, the script
    /// itself fails, the page is destroyed or the link is down.
    pub async fn eval(&self, key: &ScriptKey) -> Result<Value> {
        self.ensure_live()?;
        self.client
            .call(Procedure::Eval, vec![Value::from(key.name())])
            .await
    }

    /// Destroys the page, detaching its frame and failing all pending and
    /// future calls. Safe to call more than once.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;

        debug!(location = %self.frame.location(), "Destroying page");
        self.client.shutdown();
        self.frame.detach();
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn timeout_argument(timeout: Duration) -> Value {
    Value::from(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX))
}

fn expect_count(value: Value) -> Result<u64> {
    value
        .as_u64()
        .ok_or_else(|| Error::rpc(format!("expected an element count, got: {value}")))
}
