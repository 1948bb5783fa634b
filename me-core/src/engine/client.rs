//! Client library operations (spec.md §6): `init`, `close`, `send`,
//! `receive`, bound to a `Channels` value rather than a named OS queue.

use super::codec;
use super::dispatcher::Channels;
use super::error::TransportError;
use super::types::Message;

pub struct ClientContext {
    outgoing: crossbeam::channel::Sender<Vec<u8>>,
    incoming: crossbeam::channel::Receiver<Vec<u8>>,
}

impl ClientContext {
    /// `init() → ClientContext`. Connecting to an in-process `Channels`
    /// value always succeeds; a client bound to a real OS-queue transport
    /// would surface "engine not running" here instead.
    pub fn connect(channels: &Channels) -> Self {
        Self {
            outgoing: channels.request_tx.clone(),
            incoming: channels.response_rx.clone(),
        }
    }

    pub fn send(&self, msg: &Message) -> Result<(), TransportError> {
        self.outgoing
            .send(codec::encode(msg))
            .map_err(|_| TransportError::Closed)
    }

    pub fn receive(&self) -> Result<Message, TransportError> {
        let raw = self.incoming.recv().map_err(|_| TransportError::Closed)?;
        codec::decode(&raw).ok_or(TransportError::Malformed)
    }

    /// No explicit teardown is needed for an in-process channel; provided
    /// for API parity with spec.md §6's `close(ctx)`.
    pub fn close(self) {}
}
