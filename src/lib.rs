//! Page Remote - In-process remote control for guest document frames.
//!
//! This library drives a sandboxed guest page from a host test, over an
//! in-process message link carrying serialized call envelopes.
//!
//! # Architecture
//!
//! The crate follows a host-guest model:
//!
//! - **Host End**: Owns the [`Page`] handle, sends call envelopes, correlates
//!   replies by call id
//! - **Guest End**: Owns the document exclusively, executes polled DOM
//!   operations, emits reply envelopes
//!
//! Key design principles:
//!
//! - Each [`Page`] owns: a guest task + a channel tag + an RPC client
//! - Polled operations re-check until success or a soft timeout, then report
//!   the last observation without erroring
//! - Custom logic crosses the boundary by name only, through a
//!   [`ScriptRegistry`] installed at build time
//! - Replies may arrive out of order; the call id keeps them attributable
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use page_remote::{create_page, PageOptions, Result, StaticSiteLoader};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let loader = Arc::new(
//!         StaticSiteLoader::new()
//!             .with_site("fixture.html", r#"<body><div class="a-class"></div></body>"#),
//!     );
//!
//!     // Validate options, attach the frame, race navigation, connect.
//!     let options = PageOptions::new(320, 560, 10_000);
//!     let mut page = create_page("fixture.html", options, loader).await?;
//!
//!     // Poll the guest document until the selector matches (or times out).
//!     let count = page.check_existence(".a-class").await?;
//!     println!("matches: {count}");
//!
//!     page.destroy();
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`dom`] | Guest document: parsing, selectors, attribute edits |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`executor`] | Guest-side polled operation executor |
//! | [`frame`] | Frame attachment, guest task and site loaders |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`page`] | Page lifecycle: options, builder, host handle |
//! | [`protocol`] | Call envelope types (internal contract) |
//! | [`retry`] | Bounded re-attempt combinator |
//! | [`rpc`] | Host client and guest server loops |
//! | [`scripts`] | Named script registry for guest evaluation |

// ============================================================================
// Modules
// ============================================================================

/// Guest document handling.
///
/// Parsing, selector compilation and attribute edits over the guest's HTML.
pub mod dom;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Guest-side operation executor.
///
/// Runs each procedure against the document under the bounded re-attempt
/// policy.
pub mod executor;

/// Frame attachment and site loaders.
///
/// A [`Frame`] is the host-side handle to one guest task; [`SiteLoader`]
/// implementations resolve locations to HTML.
pub mod frame;

/// Type-safe identifiers for calls and channels.
///
/// Newtype wrappers prevent mixing incompatible IDs at compile time.
pub mod identifiers;

/// Page lifecycle and host handle.
///
/// Use [`Page::builder()`] or [`create_page`] to attach and connect a page.
pub mod page;

/// Call envelope types.
///
/// The serialized request/reply contract between host and guest.
pub mod protocol;

/// Bounded re-attempt combinator.
///
/// One polling loop shared by every DOM operation.
pub mod retry;

/// RPC client and server loops.
///
/// Host-side correlation and guest-side dispatch over the frame link.
pub mod rpc;

/// Named script registry.
///
/// Custom logic registered up front and invoked by key through
/// [`Page::eval`].
pub mod scripts;

// ============================================================================
// Re-exports
// ============================================================================

// Page types
pub use page::{Page, PageBuilder, PageOptions, create_page};

// Frame types
pub use frame::{FileSiteLoader, Frame, SiteLoader, StaticSiteLoader, Viewport};

// Document types
pub use dom::Document;

// Script types
pub use scripts::{ScriptKey, ScriptRegistry};

// Protocol types
pub use protocol::{CallReply, CallRequest, Procedure};

// Retry policy
pub use retry::{ATTEMPT_INTERVAL, DEFAULT_OPERATION_TIMEOUT, run_attempts};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::{CallId, ChannelId};
