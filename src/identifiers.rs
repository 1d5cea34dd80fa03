//! Type-safe identifiers for calls and channels.
//!
//! Newtype wrappers prevent mixing incompatible identifiers at compile time:
//!
//! - [`CallId`] - correlation id pairing a call with its reply
//! - [`ChannelId`] - logical bus tag distinguishing this page's traffic

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Constants
// ============================================================================

/// Well-known channel tag for callers that wire a single page per link.
const SHARED_CHANNEL: &str = "page-remote end-to-end testing";

// ============================================================================
// CallId
// ============================================================================

/// Correlation identifier, unique per in-flight call.
///
/// Created by the client, echoed back by the guest in the reply envelope.
/// Replies are matched to pending calls by this id, never by arrival order,
/// so calls may complete out of order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallId(Uuid);

impl CallId {
    /// Generates a new random call id.
    #[inline]
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ============================================================================
// ChannelId
// ============================================================================

/// Logical bus identifier multiplexed over the frame link.
///
/// Both the host-side client and the guest-side server are constructed with
/// the same channel value and ignore traffic tagged with any other. Each page
/// gets its own generated channel by default so independent instances coexist;
/// [`ChannelId::shared`] provides the well-known constant for single-instance
/// wiring.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(String);

impl ChannelId {
    /// Creates a channel id from an explicit value.
    #[inline]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Generates a fresh channel id, unique per page.
    #[inline]
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("page-remote/{}", Uuid::new_v4()))
    }

    /// Returns the well-known shared channel tag.
    #[inline]
    #[must_use]
    pub fn shared() -> Self {
        Self(SHARED_CHANNEL.to_string())
    }

    /// Returns the channel tag as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_id_unique() {
        assert_ne!(CallId::generate(), CallId::generate());
    }

    #[test]
    fn test_call_id_serde_transparent() {
        let id = CallId::generate();
        let json = serde_json::to_string(&id).expect("serialize");
        let back: CallId = serde_json::from_str(&json).expect("parse");
        assert_eq!(id, back);
        assert!(json.starts_with('"'));
    }

    #[test]
    fn test_channel_id_generate_unique() {
        assert_ne!(ChannelId::generate(), ChannelId::generate());
    }

    #[test]
    fn test_channel_id_shared_stable() {
        assert_eq!(ChannelId::shared(), ChannelId::shared());
        assert_eq!(ChannelId::shared().as_str(), SHARED_CHANNEL);
    }

    #[test]
    fn test_channel_id_explicit() {
        let channel = ChannelId::new("suite-42");
        assert_eq!(channel.as_str(), "suite-42");
        assert_eq!(channel.to_string(), "suite-42");
    }
}
