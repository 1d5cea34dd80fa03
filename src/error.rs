//! Error types for page-remote.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use page_remote::{Page, Result};
//!
//! async fn example(page: &Page) -> Result<()> {
//!     let count = page.check_existence("#submit").await?;
//!     assert!(count > 0);
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`] |
//! | Navigation | [`Error::NavigationFailed`], [`Error::NavigationTimeout`], [`Error::SiteLoad`] |
//! | Lifecycle | [`Error::PageDestroyed`] |
//! | Remote call | [`Error::Rpc`], [`Error::InvalidArgument`], [`Error::SelectorParse`] |
//! | Scripts | [`Error::ScriptNotFound`], [`Error::Script`] |
//! | Transport | [`Error::ChannelClosed`], [`Error::Json`] |
//!
//! The bounded-retry DOM operations deliberately do **not** report a timeout
//! error: they resolve with the last observed result and leave failure
//! detection to the caller (see [`crate::retry::run_attempts`]).

// ============================================================================
// Imports
// ============================================================================

use std::result::Result as StdResult;

use thiserror::Error;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Each variant includes relevant context for debugging.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when page options are invalid. Raised synchronously, before
    /// any frame is attached.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    // ========================================================================
    // Navigation Errors
    // ========================================================================
    /// Frame navigation failed.
    ///
    /// Returned when the guest document fails to load, for a reported or
    /// unknown reason.
    #[error("Navigation to {location} failed: {message}")]
    NavigationFailed {
        /// Location that failed to load.
        location: String,
        /// Underlying reason, or "navigation failed for unknown reason".
        message: String,
    },

    /// Frame navigation timed out.
    ///
    /// Distinct from [`Error::NavigationFailed`] so callers can tell a slow
    /// page from a broken one.
    #[error("The navigation to {location} timed out after {timeout_ms} milliseconds")]
    NavigationTimeout {
        /// Location whose navigation timed out.
        location: String,
        /// Configured navigation timeout in milliseconds.
        timeout_ms: u64,
    },

    /// Guest unreachable after the load signal fired.
    #[error("The {location} site failed to load")]
    SiteLoad {
        /// Location that was being loaded.
        location: String,
    },

    // ========================================================================
    // Lifecycle Errors
    // ========================================================================
    /// Operation invoked on a destroyed page.
    ///
    /// Every proxy operation fails with this after `destroy()`.
    #[error("Page has been destroyed")]
    PageDestroyed,

    // ========================================================================
    // Remote Call Errors
    // ========================================================================
    /// Invalid argument in a call payload.
    ///
    /// Returned when the guest receives a malformed argument list.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument.
        message: String,
    },

    /// CSS selector failed to parse.
    #[error("Invalid CSS selector: {selector}")]
    SelectorParse {
        /// The rejected selector.
        selector: String,
    },

    /// Remote call failed in the guest context.
    ///
    /// Carries the error message surfaced through the reply envelope.
    #[error("Remote call failed: {message}")]
    Rpc {
        /// Error message from the guest.
        message: String,
    },

    // ========================================================================
    // Script Errors
    // ========================================================================
    /// No script registered under the given key.
    #[error("No script registered under key: {name}")]
    ScriptNotFound {
        /// The unknown script key.
        name: String,
    },

    /// Registered script failed while executing.
    #[error("Script error: {message}")]
    Script {
        /// Error message from the script.
        message: String,
    },

    // ========================================================================
    // Transport Errors
    // ========================================================================
    /// Frame link closed with calls in flight.
    #[error("Channel closed")]
    ChannelClosed,

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a navigation failure error.
    #[inline]
    pub fn navigation_failed(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NavigationFailed {
            location: location.into(),
            message: message.into(),
        }
    }

    /// Creates a navigation timeout error.
    #[inline]
    pub fn navigation_timeout(location: impl Into<String>, timeout_ms: u64) -> Self {
        Self::NavigationTimeout {
            location: location.into(),
            timeout_ms,
        }
    }

    /// Creates a site load error.
    #[inline]
    pub fn site_load(location: impl Into<String>) -> Self {
        Self::SiteLoad {
            location: location.into(),
        }
    }

    /// Creates an invalid argument error.
    #[inline]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates a selector parse error.
    #[inline]
    pub fn selector_parse(selector: impl Into<String>) -> Self {
        Self::SelectorParse {
            selector: selector.into(),
        }
    }

    /// Creates a remote call error.
    #[inline]
    pub fn rpc(message: impl Into<String>) -> Self {
        Self::Rpc {
            message: message.into(),
        }
    }

    /// Creates a script not found error.
    #[inline]
    pub fn script_not_found(name: impl Into<String>) -> Self {
        Self::ScriptNotFound { name: name.into() }
    }

    /// Creates a script execution error.
    #[inline]
    pub fn script(message: impl Into<String>) -> Self {
        Self::Script {
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a navigation timeout.
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::NavigationTimeout { .. })
    }

    /// Returns `true` if this is a navigation error (failure or timeout).
    #[inline]
    #[must_use]
    pub fn is_navigation_error(&self) -> bool {
        matches!(
            self,
            Self::NavigationFailed { .. } | Self::NavigationTimeout { .. } | Self::SiteLoad { .. }
        )
    }

    /// Returns `true` if this is a configuration error.
    #[inline]
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::Config { .. })
    }

    /// Returns `true` if this is a script error.
    #[inline]
    #[must_use]
    pub fn is_script_error(&self) -> bool {
        matches!(self, Self::ScriptNotFound { .. } | Self::Script { .. })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::navigation_timeout("fixtures/index.html", 10_000);
        assert_eq!(
            err.to_string(),
            "The navigation to fixtures/index.html timed out after 10000 milliseconds"
        );
    }

    #[test]
    fn test_config_error() {
        let err = Error::config("viewport_width must be a positive integer");
        assert_eq!(
            err.to_string(),
            "Configuration error: viewport_width must be a positive integer"
        );
        assert!(err.is_config_error());
    }

    #[test]
    fn test_is_timeout() {
        let timeout_err = Error::navigation_timeout("a.html", 5000);
        let other_err = Error::navigation_failed("a.html", "connection refused");

        assert!(timeout_err.is_timeout());
        assert!(!other_err.is_timeout());
    }

    #[test]
    fn test_is_navigation_error() {
        let failed = Error::navigation_failed("a.html", "no such site");
        let timed_out = Error::navigation_timeout("a.html", 1000);
        let site_load = Error::site_load("a.html");
        let other = Error::config("test");

        assert!(failed.is_navigation_error());
        assert!(timed_out.is_navigation_error());
        assert!(site_load.is_navigation_error());
        assert!(!other.is_navigation_error());
    }

    #[test]
    fn test_is_script_error() {
        assert!(Error::script_not_found("missing").is_script_error());
        assert!(Error::script("boom").is_script_error());
        assert!(!Error::PageDestroyed.is_script_error());
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<String>("invalid").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }
}
