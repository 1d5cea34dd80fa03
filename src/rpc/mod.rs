//! Correlated request/response layer over the frame link.
//!
//! The link itself is a pair of in-process channels carrying serialized JSON
//! envelopes, which is the whole point: nothing that cannot survive
//! serialization crosses the frame boundary.
//!
//! - [`RpcClient`] (host side) assigns each call a correlation id, sends the
//!   envelope, and matches the reply back to the pending call by that id,
//!   never by arrival order.
//! - [`RpcServer`] (guest side) filters traffic by channel tag and dispatches
//!   each call as its own task, so calls may complete out of order.

// ============================================================================
// Submodules
// ============================================================================

mod client;
mod server;

// ============================================================================
// Re-exports
// ============================================================================

pub use client::RpcClient;
pub use server::RpcServer;
