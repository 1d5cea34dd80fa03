//! Call request and reply envelopes.
//!
//! # Format
//!
//! Request:
//! ```json
//! {
//!   "channel": "page-remote/...",
//!   "callId": "uuid",
//!   "procedure": "setAttribute",
//!   "arguments": ["body", "data-x", "v", 10000]
//! }
//! ```
//!
//! Reply (success or error, never both):
//! ```json
//! { "channel": "page-remote/...", "callId": "uuid", "result": 1 }
//! { "channel": "page-remote/...", "callId": "uuid", "error": "..." }
//! ```

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::identifiers::{CallId, ChannelId};

use super::Procedure;

// ============================================================================
// CallRequest
// ============================================================================

/// A call from the host-side client to the guest-side server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallRequest {
    /// Logical bus tag; traffic tagged with another channel is ignored.
    pub channel: ChannelId,

    /// Correlation id pairing this call with its eventual reply.
    #[serde(rename = "callId")]
    pub call_id: CallId,

    /// The operation to invoke.
    pub procedure: Procedure,

    /// Ordered argument list.
    pub arguments: Vec<Value>,
}

impl CallRequest {
    /// Creates a new request with an auto-generated call id.
    #[inline]
    #[must_use]
    pub fn new(channel: ChannelId, procedure: Procedure, arguments: Vec<Value>) -> Self {
        Self {
            channel,
            call_id: CallId::generate(),
            procedure,
            arguments,
        }
    }
}

// ============================================================================
// CallReply
// ============================================================================

/// A reply from the guest-side server to the host-side client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallReply {
    /// Logical bus tag, echoed from the request.
    pub channel: ChannelId,

    /// Matches the originating request's call id.
    #[serde(rename = "callId")]
    pub call_id: CallId,

    /// Result value (if the call succeeded).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    /// Error message (if the call failed).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CallReply {
    /// Creates a success reply.
    #[inline]
    #[must_use]
    pub fn success(channel: ChannelId, call_id: CallId, result: Value) -> Self {
        Self {
            channel,
            call_id,
            result: Some(result),
            error: None,
        }
    }

    /// Creates an error reply.
    #[inline]
    #[must_use]
    pub fn failure(channel: ChannelId, call_id: CallId, message: impl Into<String>) -> Self {
        Self {
            channel,
            call_id,
            result: None,
            error: Some(message.into()),
        }
    }

    /// Returns `true` if this is a success reply.
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Extracts the result value, returning an error if the reply was one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Rpc`] carrying the guest's error message.
    pub fn into_result(self) -> Result<Value> {
        match self.error {
            None => Ok(self.result.unwrap_or(Value::Null)),
            Some(message) => Err(Error::rpc(message)),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
