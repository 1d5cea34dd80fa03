//! Wire message types for the frame link.
//!
//! The contract between the host-side client and the guest-side server is
//! fixed at compile time: [`Procedure`] enumerates exactly the supported
//! operations, and [`CallRequest`]/[`CallReply`] are the JSON envelopes
//! carrying the channel tag, the correlation id and the payload.

// ============================================================================
// Submodules
// ============================================================================

mod call;
mod procedure;

// ============================================================================
// Re-exports
// ============================================================================

pub use call::{CallReply, CallRequest};
pub use procedure::Procedure;
