//! Host-side RPC client and its event loop.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde_json::{Value, from_str, to_string};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::identifiers::{CallId, ChannelId};
use crate::protocol::{CallReply, CallRequest, Procedure};

// ============================================================================
// Constants
// ============================================================================

/// Maximum in-flight calls before rejecting new ones.
const MAX_PENDING_CALLS: usize = 100;

// ============================================================================
// Types
// ============================================================================

/// Map of call ids to reply channels.
type CorrelationMap = FxHashMap<CallId, oneshot::Sender<Result<Value>>>;

// ============================================================================
// ClientCommand
// ============================================================================

/// Internal commands for the event loop.
enum ClientCommand {
    /// Send a call and route the reply.
    Call {
        request: CallRequest,
        reply_tx: oneshot::Sender<Result<Value>>,
    },
    /// Shutdown the client.
    Shutdown,
}

// ============================================================================
// RpcClient
// ============================================================================

/// Client end of the frame link, bound to one channel tag.
///
/// Spawns an internal event loop task that serializes outgoing calls and
/// correlates incoming replies. Calls are dispatched in issuance order but
/// may complete out of order; each pending call is resolved by its own
/// correlation entry.
#[derive(Debug)]
pub struct RpcClient {
    /// Channel tag this client sends and accepts.
    channel: ChannelId,
    /// Commands to the event loop.
    command_tx: mpsc::UnboundedSender<ClientCommand>,
    /// Correlation map (shared with the event loop).
    correlation: Arc<Mutex<CorrelationMap>>,
}

impl RpcClient {
    /// Creates a client over the host ends of a frame link.
    ///
    /// Spawns the event loop task internally. Dropping `outgoing` (which the
    /// event loop owns) is what tells the guest the frame was detached.
    pub(crate) fn new(
        channel: ChannelId,
        outgoing: mpsc::UnboundedSender<String>,
        incoming: mpsc::UnboundedReceiver<String>,
    ) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let correlation = Arc::new(Mutex::new(CorrelationMap::default()));

        tokio::spawn(Self::run_event_loop(
            channel.clone(),
            outgoing,
            incoming,
            command_rx,
            Arc::clone(&correlation),
        ));

        Self {
            channel,
            command_tx,
            correlation,
        }
    }

    /// Sends a call and waits for its reply.
    ///
    /// No timeout is applied to the round trip beyond the life of the link
    /// itself; the guest's own operation budget bounds the wait.
    ///
    /// # Errors
    ///
    /// - [`Error::ChannelClosed`] if the link is down
    /// - [`Error::Rpc`] if the guest reports a failure, or if too many calls
    ///   are already pending
    pub async fn call(&self, procedure: Procedure, arguments: Vec<Value>) -> Result<Value> {
        {
            let correlation = self.correlation.lock();
            if correlation.len() >= MAX_PENDING_CALLS {
                warn!(
                    pending = correlation.len(),
                    max = MAX_PENDING_CALLS,
                    "Too many pending calls"
                );
                return Err(Error::rpc(format!(
                    "too many pending calls: {}/{}",
                    correlation.len(),
                    MAX_PENDING_CALLS
                )));
            }
        }

        let request = CallRequest::new(self.channel.clone(), procedure, arguments);
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(ClientCommand::Call { request, reply_tx })
            .map_err(|_| Error::ChannelClosed)?;

        reply_rx.await.map_err(|_| Error::ChannelClosed)?
    }

    /// Returns the number of in-flight calls.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.correlation.lock().len()
    }

    /// Shuts the client down, closing the outgoing half of the link.
    pub fn shutdown(&self) {
        let _ = self.command_tx.send(ClientCommand::Shutdown);
    }

    /// Event loop multiplexing outgoing calls and incoming replies.
    async fn run_event_loop(
        channel: ChannelId,
        outgoing: mpsc::UnboundedSender<String>,
        mut incoming: mpsc::UnboundedReceiver<String>,
        mut command_rx: mpsc::UnboundedReceiver<ClientCommand>,
        correlation: Arc<Mutex<CorrelationMap>>,
    ) {
        loop {
            tokio::select! {
                message = incoming.recv() => {
                    match message {
                        Some(text) => Self::handle_incoming(&channel, &text, &correlation),
                        None => {
                            debug!("Frame link closed by guest");
                            break;
                        }
                    }
                }

                command = command_rx.recv() => {
                    match command {
                        Some(ClientCommand::Call { request, reply_tx }) => {
                            Self::handle_call(request, reply_tx, &outgoing, &correlation);
                        }

                        Some(ClientCommand::Shutdown) => {
                            debug!("Shutdown command received");
                            break;
                        }

                        None => {
                            debug!("Command channel closed");
                            break;
                        }
                    }
                }
            }
        }

        // Dropping `outgoing` here closes the guest's request stream.
        Self::fail_pending_calls(&correlation);

        debug!("Client event loop terminated");
    }

    /// Handles an incoming reply envelope.
    fn handle_incoming(channel: &ChannelId, text: &str, correlation: &Arc<Mutex<CorrelationMap>>) {
        let reply = match from_str::<CallReply>(text) {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "Failed to parse incoming reply");
                return;
            }
        };

        if reply.channel != *channel {
            trace!(channel = %reply.channel, "Ignoring reply for foreign channel");
            return;
        }

        let tx = correlation.lock().remove(&reply.call_id);
        if let Some(tx) = tx {
            let _ = tx.send(reply.into_result());
        } else {
            warn!(call_id = %reply.call_id, "Reply for unknown call");
        }
    }

    /// Handles an outgoing call command.
    fn handle_call(
        request: CallRequest,
        reply_tx: oneshot::Sender<Result<Value>>,
        outgoing: &mpsc::UnboundedSender<String>,
        correlation: &Arc<Mutex<CorrelationMap>>,
    ) {
        let call_id = request.call_id;

        let json = match to_string(&request) {
            Ok(json) => json,
            Err(e) => {
                let _ = reply_tx.send(Err(Error::Json(e)));
                return;
            }
        };

        // Store the correlation before sending.
        correlation.lock().insert(call_id, reply_tx);

        if outgoing.send(json).is_err()
            && let Some(tx) = correlation.lock().remove(&call_id)
        {
            let _ = tx.send(Err(Error::ChannelClosed));
        }

        trace!(%call_id, procedure = %request.procedure, "Call sent");
    }

    /// Fails all pending calls with a channel-closed error.
    fn fail_pending_calls(correlation: &Arc<Mutex<CorrelationMap>>) {
        let pending: Vec<_> = correlation.lock().drain().collect();
        let count = pending.len();

        for (_, tx) in pending {
            let _ = tx.send(Err(Error::ChannelClosed));
        }

        if count > 0 {
            debug!(count, "Failed pending calls on shutdown");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// A hand-rolled guest end: collects requests and lets the test reply in
    /// any order it likes.
    struct FakeGuest {
        request_rx: mpsc::UnboundedReceiver<String>,
        reply_tx: mpsc::UnboundedSender<String>,
    }

    fn client_with_fake_guest(channel: ChannelId) -> (RpcClient, FakeGuest) {
        let (request_tx, request_rx) = mpsc::unbounded_channel();
        let (reply_tx, reply_rx) = mpsc::unbounded_channel();
        let client = RpcClient::new(channel, request_tx, reply_rx);
        (
            client,
            FakeGuest {
                request_rx,
                reply_tx,
            },
        )
    }

    impl FakeGuest {
        async fn next_request(&mut self) -> CallRequest {
            let text = self.request_rx.recv().await.expect("request");
            from_str(&text).expect("valid request envelope")
        }

        fn reply(&self, reply: &CallReply) {
            self.reply_tx
                .send(to_string(reply).expect("serialize"))
                .expect("link open");
        }
    }

    #[tokio::test]
    async fn test_call_round_trip() {
        let channel = ChannelId::new("t");
        let (client, mut guest) = client_with_fake_guest(channel.clone());

        let responder = tokio::spawn(async move {
            let request = guest.next_request().await;
            assert_eq!(request.procedure, Procedure::CheckExistence);
            guest.reply(&CallReply::success(
                request.channel,
                request.call_id,
                Value::from(1u64),
            ));
        });

        let result = client
            .call(Procedure::CheckExistence, vec![Value::from("body")])
            .await
            .expect("reply");
        assert_eq!(result, Value::from(1u64));
        responder.await.expect("responder");
    }

    #[tokio::test]
    async fn test_out_of_order_replies_correlate() {
        let channel = ChannelId::new("t");
        let (client, mut guest) = client_with_fake_guest(channel.clone());

        let responder = tokio::spawn(async move {
            let first = guest.next_request().await;
            let second = guest.next_request().await;
            // Answer in reverse order.
            guest.reply(&CallReply::success(
                second.channel.clone(),
                second.call_id,
                Value::from(2u64),
            ));
            guest.reply(&CallReply::success(
                first.channel.clone(),
                first.call_id,
                Value::from(1u64),
            ));
        });

        let (first, second) = tokio::join!(
            client.call(Procedure::CheckExistence, vec![Value::from("body")]),
            client.call(Procedure::CheckExistence, vec![Value::from("div")]),
        );

        assert_eq!(first.expect("first reply"), Value::from(1u64));
        assert_eq!(second.expect("second reply"), Value::from(2u64));
        responder.await.expect("responder");
    }

    #[tokio::test]
    async fn test_error_reply_surfaces() {
        let channel = ChannelId::new("t");
        let (client, mut guest) = client_with_fake_guest(channel.clone());

        let responder = tokio::spawn(async move {
            let request = guest.next_request().await;
            guest.reply(&CallReply::failure(
                request.channel,
                request.call_id,
                "No script registered under key: nope",
            ));
        });

        let err = client
            .call(Procedure::Eval, vec![Value::from("nope")])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Rpc { .. }));
        responder.await.expect("responder");
    }

    #[tokio::test]
    async fn test_foreign_channel_reply_ignored() {
        let channel = ChannelId::new("mine");
        let (client, mut guest) = client_with_fake_guest(channel.clone());

        let responder = tokio::spawn(async move {
            let request = guest.next_request().await;
            // A reply on another channel must not resolve the call.
            guest.reply(&CallReply::success(
                ChannelId::new("theirs"),
                request.call_id,
                Value::from(99u64),
            ));
            guest.reply(&CallReply::success(
                request.channel,
                request.call_id,
                Value::from(1u64),
            ));
        });

        let result = client
            .call(Procedure::CheckExistence, vec![Value::from("body")])
            .await
            .expect("reply");
        assert_eq!(result, Value::from(1u64));
        responder.await.expect("responder");
    }

    #[tokio::test]
    async fn test_pending_calls_fail_when_guest_drops() {
        let channel = ChannelId::new("t");
        let (client, guest) = client_with_fake_guest(channel);

        let pending = tokio::spawn(async move {
            client
                .call(Procedure::CheckExistence, vec![Value::from("body")])
                .await
        });

        // Give the call a chance to land in the correlation map, then drop
        // both guest ends.
        tokio::task::yield_now().await;
        drop(guest);

        let err = pending.await.expect("task").unwrap_err();
        assert!(matches!(err, Error::ChannelClosed));
    }

    #[tokio::test]
    async fn test_call_after_shutdown_fails() {
        let channel = ChannelId::new("t");
        let (client, _guest) = client_with_fake_guest(channel);

        client.shutdown();
        tokio::task::yield_now().await;

        let err = client
            .call(Procedure::CheckExistence, vec![Value::from("body")])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ChannelClosed));
    }
}
