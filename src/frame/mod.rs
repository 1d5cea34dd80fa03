//! Isolated sub-document container.
//!
//! A [`Frame`] is the host-side handle to one guest: a borderless, sized
//! container whose document is loaded by a [`SiteLoader`] and served over an
//! in-process link of serialized envelopes. The guest runs as its own task
//! and owns the document exclusively; the host never touches it directly.
//!
//! Attachment wiring:
//!
//! - request stream (host → guest): carries [`CallRequest`] envelopes
//! - reply stream (guest → host): carries [`CallReply`] envelopes
//! - load signal: one-shot navigation outcome, raced against the creator's
//!   timeout
//!
//! Closing the request stream is the detach: the guest resets its document
//! to [`Document::blank`] and stops serving.
//!
//! [`CallRequest`]: crate::protocol::CallRequest
//! [`CallReply`]: crate::protocol::CallReply

// ============================================================================
// Submodules
// ============================================================================

mod loader;

pub use loader::{FileSiteLoader, SiteLoader, StaticSiteLoader};

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::dom::Document;
use crate::error::Result;
use crate::executor::PageExecutor;
use crate::identifiers::ChannelId;
use crate::rpc::RpcServer;
use crate::scripts::ScriptRegistry;

// ============================================================================
// Viewport
// ============================================================================

/// Frame dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

// ============================================================================
// FrameHandles
// ============================================================================

/// Everything `Frame::attach` hands back to the lifecycle manager.
pub(crate) struct FrameHandles {
    /// The frame itself.
    pub frame: Frame,
    /// Host end of the request stream, for the client event loop.
    pub request_tx: mpsc::UnboundedSender<String>,
    /// Host end of the reply stream, for the client event loop.
    pub reply_rx: mpsc::UnboundedReceiver<String>,
    /// Navigation outcome signal.
    pub load_rx: oneshot::Receiver<Result<()>>,
}

// ============================================================================
// Frame
// ============================================================================

/// Host-side handle to an attached guest frame.
#[derive(Debug)]
pub struct Frame {
    location: String,
    viewport: Viewport,
    /// Dropped on detach; together with the client's copy this closes the
    /// guest's request stream.
    request_tx: Option<mpsc::UnboundedSender<String>>,
}

impl Frame {
    /// Attaches a new frame and starts loading `location` in its guest task.
    ///
    /// Returns immediately; the navigation outcome arrives on the load
    /// signal in the returned handles.
    pub(crate) fn attach(
        location: &str,
        viewport: Viewport,
        channel: ChannelId,
        loader: Arc<dyn SiteLoader>,
        scripts: Arc<ScriptRegistry>,
    ) -> FrameHandles {
        let (request_tx, request_rx) = mpsc::unbounded_channel();
        let (reply_tx, reply_rx) = mpsc::unbounded_channel();
        let (load_tx, load_rx) = oneshot::channel();

        debug!(
            location,
            width = viewport.width,
            height = viewport.height,
            channel = %channel,
            "Attaching frame"
        );

        tokio::spawn(run_guest(
            location.to_string(),
            channel,
            loader,
            scripts,
            request_rx,
            reply_tx,
            load_tx,
        ));

        let frame = Frame {
            location: location.to_string(),
            viewport,
            request_tx: Some(request_tx.clone()),
        };

        FrameHandles {
            frame,
            request_tx,
            reply_rx,
            load_rx,
        }
    }

    /// Returns the location this frame was navigated to.
    #[inline]
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Returns the frame's viewport.
    #[inline]
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Returns `true` while the frame is attached.
    #[inline]
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.request_tx.as_ref().is_some_and(|tx| !tx.is_closed())
    }

    /// Detaches the frame, releasing its half of the request stream.
    pub(crate) fn detach(&mut self) {
        if self.request_tx.take().is_some() {
            debug!(location = %self.location, "Frame detached");
        }
    }
}

// ============================================================================
// Guest Task
// ============================================================================

/// The guest side of a frame: load the document, signal the outcome, serve
/// calls until detached, then reset to a blank document.
async fn run_guest(
    location: String,
    channel: ChannelId,
    loader: Arc<dyn SiteLoader>,
    scripts: Arc<ScriptRegistry>,
    request_rx: mpsc::UnboundedReceiver<String>,
    reply_tx: mpsc::UnboundedSender<String>,
    load_tx: oneshot::Sender<Result<()>>,
) {
    let html = match loader.load(&location).await {
        Ok(html) => html,
        Err(e) => {
            warn!(location = %location, error = %e, "Guest navigation failed");
            let _ = load_tx.send(Err(e));
            return;
        }
    };

    let document = Arc::new(Mutex::new(Document::parse(&html)));

    if load_tx.send(Ok(())).is_err() {
        // The creator stopped waiting (navigation timeout already fired).
        debug!(location = %location, "Load signal dropped, guest exiting");
        return;
    }

    let executor = PageExecutor::new(Arc::clone(&document), scripts);
    let server = RpcServer::new(channel, executor, reply_tx);
    server.serve(request_rx).await;

    // Detached: release the loaded page.
    *document.lock() = Document::blank();
    debug!(location = %location, "Guest reset to blank document");
}

// ============================================================================
// Tests
// ============================================================================
