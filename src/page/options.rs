//! Page configuration options.

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use crate::error::{Error, Result};
use crate::frame::Viewport;

// ============================================================================
// PageOptions
// ============================================================================

/// Configuration for a page frame.
///
/// All three values must be strictly positive. The unsigned integer fields
/// already rule out negative or fractional values at the type level; zero is
/// rejected by [`PageOptions::validate`] before any frame is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageOptions {
    /// Frame width in pixels.
    pub viewport_width: u32,

    /// Frame height in pixels.
    pub viewport_height: u32,

    /// Budget for the navigation race, in milliseconds.
    pub navigation_timeout_ms: u64,
}

// ============================================================================
// Constructors
// ============================================================================

impl PageOptions {
    /// Creates options from explicit values.
    #[inline]
    #[must_use]
    pub const fn new(viewport_width: u32, viewport_height: u32, navigation_timeout_ms: u64) -> Self {
        Self {
            viewport_width,
            viewport_height,
            navigation_timeout_ms,
        }
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl PageOptions {
    /// Sets the viewport dimensions in pixels.
    #[inline]
    #[must_use]
    pub const fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Sets the navigation timeout in milliseconds.
    #[inline]
    #[must_use]
    pub const fn with_navigation_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.navigation_timeout_ms = timeout_ms;
        self
    }
}

// ============================================================================
// Validation & Conversion
// ============================================================================

impl PageOptions {
    /// Validates the options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the offending option when any value
    /// is zero.
    pub fn validate(&self) -> Result<()> {
        if self.viewport_width == 0 {
            return Err(Error::config(format!(
                "the viewport_width option must be a positive integer, {} was provided",
                self.viewport_width
            )));
        }
        if self.viewport_height == 0 {
            return Err(Error::config(format!(
                "the viewport_height option must be a positive integer, {} was provided",
                self.viewport_height
            )));
        }
        if self.navigation_timeout_ms == 0 {
            return Err(Error::config(format!(
                "the navigation_timeout_ms option must be a positive integer, {} was provided",
                self.navigation_timeout_ms
            )));
        }
        Ok(())
    }

    /// Returns the navigation timeout as a [`Duration`].
    #[inline]
    #[must_use]
    pub const fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    /// Returns the viewport dimensions.
    #[inline]
    #[must_use]
    pub const fn viewport(&self) -> Viewport {
        Viewport {
            width: self.viewport_width,
            height: self.viewport_height,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    #[test]
    fn test_valid_options() {
        let options = PageOptions::new(320, 560, 10_000);
        assert!(options.validate().is_ok());
        assert_eq!(options.navigation_timeout(), Duration::from_millis(10_000));
        assert_eq!(
            options.viewport(),
            Viewport {
                width: 320,
                height: 560
            }
        );
    }

    #[test]
    fn test_zero_width_rejected() {
        let err = PageOptions::new(0, 560, 10_000).validate().unwrap_err();
        assert!(err.is_config_error());
        assert!(err.to_string().contains("viewport_width"));
    }

    #[test]
    fn test_zero_height_rejected() {
        let err = PageOptions::new(320, 0, 10_000).validate().unwrap_err();
        assert!(err.is_config_error());
        assert!(err.to_string().contains("viewport_height"));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = PageOptions::new(320, 560, 0).validate().unwrap_err();
        assert!(err.is_config_error());
        assert!(err.to_string().contains("navigation_timeout_ms"));
    }

    #[test]
    fn test_builder_chain() {
        let options = PageOptions::new(1, 1, 1)
            .with_viewport(1920, 1080)
            .with_navigation_timeout_ms(5_000);

        assert_eq!(options.viewport_width, 1920);
        assert_eq!(options.viewport_height, 1080);
        assert_eq!(options.navigation_timeout_ms, 5_000);
    }

    proptest! {
        #[test]
        fn prop_validation_accepts_exactly_positive_triples(
            width in 0u32..10_000,
            height in 0u32..10_000,
            timeout_ms in 0u64..100_000,
        ) {
            let options = PageOptions::new(width, height, timeout_ms);
            let valid = width > 0 && height > 0 && timeout_ms > 0;
            prop_assert_eq!(options.validate().is_ok(), valid);
        }
    }
}
