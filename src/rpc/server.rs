//! Guest-side RPC server loop.

// ============================================================================
// Imports
// ============================================================================

use serde_json::{from_str, to_string};
use tokio::sync::mpsc;
use tracing::{debug, error, trace, warn};

use crate::executor::PageExecutor;
use crate::identifiers::ChannelId;
use crate::protocol::{CallReply, CallRequest};

// ============================================================================
// RpcServer
// ============================================================================

/// Server end of the frame link, bound to one channel tag and one executor.
///
/// Each accepted call is dispatched as its own task so a slow polling
/// operation never blocks later traffic; replies therefore may leave in a
/// different order than their requests arrived. The originating call id in
/// each reply is what keeps them attributable.
pub struct RpcServer {
    channel: ChannelId,
    executor: PageExecutor,
    reply_tx: mpsc::UnboundedSender<String>,
}

impl RpcServer {
    /// Creates a server bound to a channel, executor and reply stream.
    #[inline]
    #[must_use]
    pub(crate) fn new(
        channel: ChannelId,
        executor: PageExecutor,
        reply_tx: mpsc::UnboundedSender<String>,
    ) -> Self {
        Self {
            channel,
            executor,
            reply_tx,
        }
    }

    /// Serves requests until the incoming stream closes.
    pub(crate) async fn serve(self, mut requests: mpsc::UnboundedReceiver<String>) {
        while let Some(text) = requests.recv().await {
            self.accept(&text);
        }
        debug!(channel = %self.channel, "Request stream closed");
    }

    /// Parses one envelope and dispatches it.
    fn accept(&self, text: &str) {
        let request = match from_str::<CallRequest>(text) {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "Failed to parse incoming request");
                return;
            }
        };

        if request.channel != self.channel {
            trace!(channel = %request.channel, "Ignoring request for foreign channel");
            return;
        }

        let executor = self.executor.clone();
        let reply_tx = self.reply_tx.clone();
        let channel = self.channel.clone();

        tokio::spawn(async move {
            let call_id = request.call_id;
            debug!(%call_id, procedure = %request.procedure, "Dispatching call");

            let reply = match executor.dispatch(request.procedure, &request.arguments).await {
                Ok(value) => CallReply::success(channel, call_id, value),
                Err(e) => CallReply::failure(channel, call_id, e.to_string()),
            };

            match to_string(&reply) {
                // The host may already be gone; a dead reply stream is fine.
                Ok(json) => {
                    let _ = reply_tx.send(json);
                }
                Err(e) => error!(%call_id, error = %e, "Failed to serialize reply"),
            }
        });
    }
}

// ============================================================================
// Tests
// ============================================================================
