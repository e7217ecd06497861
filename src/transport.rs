// ABOUTME: Transport channel contract sitting between the session core and the wire
// ABOUTME: Delivers decoded PDUs as a sequential event stream and accepts PDUs to send

use std::future::Future;
use std::io;

use tokio::sync::mpsc;

use crate::datatypes::Pdu;

/// One event on the transport's sequential stream.
///
/// Events arrive in the order the underlying connection produced them;
/// the session never reorders or batches them.
#[derive(Debug)]
pub enum TransportEvent {
    /// The connection to the SMSC is established.
    Connected,
    /// A decoded PDU arrived from the peer.
    Pdu(Pdu),
    /// The connection failed. A `Closed` event follows once the stream
    /// is torn down.
    Error(io::Error),
    /// The connection is gone; no further events will arrive.
    Closed,
}

/// The byte-stream collaborator the session drives.
///
/// An implementation owns the actual connection and its PDU codec: it
/// decodes inbound traffic into [`TransportEvent`]s and encodes the PDUs
/// handed to [`send`](Transport::send). A production implementation wraps
/// a TCP stream with an SMPP framer; [`channel`] provides an in-memory
/// pair for tests and local tooling.
///
/// Methods return `Send` futures so a session driver task can own the
/// transport on a multi-threaded runtime.
pub trait Transport: Send + 'static {
    /// Hand one PDU to the peer.
    fn send(&mut self, pdu: Pdu) -> impl Future<Output = io::Result<()>> + Send;

    /// Next event from the peer. Returns `None` once the stream has
    /// closed and drained.
    ///
    /// The session driver polls this concurrently with its command
    /// queue, so the returned future must be cancel-safe: dropping it
    /// before completion must not lose an event.
    fn recv(&mut self) -> impl Future<Output = Option<TransportEvent>> + Send;

    /// Tear down the underlying connection. Idempotent.
    fn close(&mut self) -> impl Future<Output = ()> + Send;
}

/// Create a connected in-memory transport pair.
///
/// The [`ChannelTransport`] half is given to the session; the
/// [`TransportPeer`] half plays the SMSC: it observes every PDU the
/// session sends and scripts the events the session receives. Event
/// ordering is preserved by the underlying channels.
pub fn channel(capacity: usize) -> (ChannelTransport, TransportPeer) {
    let (event_tx, event_rx) = mpsc::channel(capacity);
    let (pdu_tx, pdu_rx) = mpsc::channel(capacity);
    (
        ChannelTransport {
            events: event_rx,
            outbound: pdu_tx,
        },
        TransportPeer {
            events: event_tx,
            outbound: pdu_rx,
        },
    )
}

/// In-memory [`Transport`] backed by bounded channels.
#[derive(Debug)]
pub struct ChannelTransport {
    events: mpsc::Receiver<TransportEvent>,
    outbound: mpsc::Sender<Pdu>,
}

impl Transport for ChannelTransport {
    async fn send(&mut self, pdu: Pdu) -> io::Result<()> {
        self.outbound
            .send(pdu)
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "transport peer hung up"))
    }

    async fn recv(&mut self) -> Option<TransportEvent> {
        self.events.recv().await
    }

    async fn close(&mut self) {
        self.events.close();
    }
}

/// The far side of a [`channel`] transport pair.
#[derive(Debug)]
pub struct TransportPeer {
    events: mpsc::Sender<TransportEvent>,
    outbound: mpsc::Receiver<Pdu>,
}

impl TransportPeer {
    /// Script one event for the session. Returns `false` if the session
    /// side is gone.
    pub async fn emit(&self, event: TransportEvent) -> bool {
        self.events.send(event).await.is_ok()
    }

    /// Signal that the connection is up.
    pub async fn connected(&self) -> bool {
        self.emit(TransportEvent::Connected).await
    }

    /// Deliver a decoded PDU to the session.
    pub async fn deliver(&self, pdu: Pdu) -> bool {
        self.emit(TransportEvent::Pdu(pdu)).await
    }

    /// Signal that the connection is gone.
    pub async fn closed(&self) -> bool {
        self.emit(TransportEvent::Closed).await
    }

    /// Next PDU the session handed to the transport, `None` once the
    /// session side has shut down.
    pub async fn sent(&mut self) -> Option<Pdu> {
        self.outbound.recv().await
    }

    /// Non-blocking variant of [`sent`](Self::sent).
    pub fn try_sent(&mut self) -> Option<Pdu> {
        self.outbound.try_recv().ok()
    }
}
