//! Procedure names exposed over the frame link.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Procedure
// ============================================================================

/// The operations a guest frame serves.
///
/// This enum is the statically declared contract shared by the client and the
/// server: the set of remote operations is enforced by the type system rather
/// than discovered at runtime, and an envelope naming anything else fails to
/// deserialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Procedure {
    /// Count elements matching a selector, polling until at least one exists.
    CheckExistence,
    /// Set an attribute on every matching element.
    SetAttribute,
    /// Read an attribute from the first matching element.
    GetAttribute,
    /// Remove an attribute from every matching element.
    RemoveAttribute,
    /// Run a registered script against the guest document. Not retried.
    Eval,
}

impl Procedure {
    /// All procedures, in wire order.
    pub const ALL: [Procedure; 5] = [
        Procedure::CheckExistence,
        Procedure::SetAttribute,
        Procedure::GetAttribute,
        Procedure::RemoveAttribute,
        Procedure::Eval,
    ];

    /// Returns the wire name of the procedure.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Procedure::CheckExistence => "checkExistence",
            Procedure::SetAttribute => "setAttribute",
            Procedure::GetAttribute => "getAttribute",
            Procedure::RemoveAttribute => "removeAttribute",
            Procedure::Eval => "eval",
        }
    }
}

impl fmt::Display for Procedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names() {
        for procedure in Procedure::ALL {
            let json = serde_json::to_string(&procedure).expect("serialize");
            assert_eq!(json, format!("\"{}\"", procedure.name()));
        }
    }

    #[test]
    fn test_roundtrip() {
        for procedure in Procedure::ALL {
            let json = serde_json::to_string(&procedure).expect("serialize");
            let back: Procedure = serde_json::from_str(&json).expect("parse");
            assert_eq!(back, procedure);
        }
    }

    #[test]
    fn test_unknown_procedure_rejected() {
        assert!(serde_json::from_str::<Procedure>("\"launchMissiles\"").is_err());
    }
}
