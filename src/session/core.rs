// ABOUTME: Session state machine: connection lifecycle, bind, correlated requests and dispatch
// ABOUTME: A driver task owns the transport; callers suspend on per-sequence oneshot completions

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{interval, timeout, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::datatypes::{
    Address, BindTransceiver, CommandStatus, DeliverSmResp, EnquireLink, EnquireLinkResp,
    GenericNack, Pdu, SarInfo, SubmitSm, SubmitSmResp, Unbind, ESM_CLASS_UDHI,
};
use crate::session::config::SessionConfig;
use crate::session::delivery::{DeliveryObserver, DeliveryReport};
use crate::session::error::{SmppError, SmppResult};
use crate::session::keepalive::{KeepAliveState, KeepAliveStatus};
use crate::session::segment::{segment, MessagePart};
use crate::session::state::SessionState;
use crate::session::types::SmsMessage;
use crate::transport::{Transport, TransportEvent};

/// Largest sequence number the protocol allows; the counter wraps back
/// to 1 past this point.
const SEQUENCE_MAX: u32 = 0x7FFF_FFFF;

/// Process-wide monotonically increasing sequence allocator.
#[derive(Debug)]
pub(crate) struct SequenceCounter(AtomicU32);

impl SequenceCounter {
    pub(crate) fn new() -> Self {
        Self(AtomicU32::new(0))
    }

    pub(crate) fn next(&self) -> u32 {
        let prev = self
            .0
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| {
                Some(if n >= SEQUENCE_MAX { 1 } else { n + 1 })
            })
            .unwrap_or(SEQUENCE_MAX); // closure never returns None
        if prev >= SEQUENCE_MAX {
            1
        } else {
            prev + 1
        }
    }
}

/// Lock that shrugs off poisoning; session state stays usable even if a
/// panic unwound through a critical section.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

enum Command {
    Send(Pdu),
    Close,
}

struct SessionInner {
    config: SessionConfig,
    state: Mutex<SessionState>,
    /// Outstanding requests keyed by sequence number. Entries are
    /// consumed exactly once: by the matching response, the caller's
    /// timeout sweep, or the close drain.
    pending: Mutex<HashMap<u32, oneshot::Sender<SmppResult<Pdu>>>>,
    sequence: SequenceCounter,
    commands: mpsc::Sender<Command>,
    observer: Mutex<Option<Arc<DeliveryObserver>>>,
    keep_alive: Mutex<KeepAliveState>,
}

impl SessionInner {
    fn state(&self) -> SessionState {
        *lock(&self.state)
    }

    fn set_state(&self, next: SessionState) {
        let mut state = lock(&self.state);
        if state.is_terminal() {
            return;
        }
        debug!(from = %*state, to = %next, "session state");
        *state = next;
    }

    /// First terminal state wins; later transitions are ignored.
    fn set_terminal(&self, terminal: SessionState) {
        self.set_state(terminal);
    }

    /// Register a pending entry, hand the PDU to the driver, and suspend
    /// until the correlated response or the deadline.
    async fn request(&self, pdu: Pdu, deadline: Duration) -> SmppResult<Pdu> {
        let seq = pdu.sequence_number();
        let (tx, rx) = oneshot::channel();
        lock(&self.pending).insert(seq, tx);

        if self.commands.send(Command::Send(pdu)).await.is_err() {
            lock(&self.pending).remove(&seq);
            return Err(SmppError::SessionClosed);
        }

        match timeout(deadline, rx).await {
            Ok(Ok(result)) => result,
            // the driver dropped the entry while tearing down
            Ok(Err(_)) => Err(SmppError::SessionClosed),
            Err(_) => {
                lock(&self.pending).remove(&seq);
                Err(SmppError::Timeout)
            }
        }
    }

    async fn probe(&self) -> SmppResult<()> {
        let pdu = Pdu::EnquireLink(EnquireLink {
            sequence_number: self.sequence.next(),
        });
        self.request(pdu, self.config.keep_alive.timeout)
            .await
            .map(|_| ())
    }

    fn fail_all_pending(&self) {
        let drained: Vec<_> = lock(&self.pending).drain().collect();
        if !drained.is_empty() {
            debug!(count = drained.len(), "failing outstanding requests");
        }
        for (_, tx) in drained {
            let _ = tx.send(Err(SmppError::SessionClosed));
        }
    }
}

struct Driver<T: Transport> {
    transport: T,
    inner: Arc<SessionInner>,
    commands: mpsc::Receiver<Command>,
    connected: Option<oneshot::Sender<()>>,
}

impl<T: Transport> Driver<T> {
    async fn run(mut self) {
        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(Command::Send(pdu)) => {
                        debug!(pdu = pdu.name(), seq = pdu.sequence_number(), "sending");
                        if let Err(err) = self.transport.send(pdu).await {
                            error!(error = %err, "transport write failed");
                            return self.shutdown(SessionState::Failed).await;
                        }
                    }
                    Some(Command::Close) | None => {
                        return self.shutdown(SessionState::Closed).await;
                    }
                },
                event = self.transport.recv() => match event {
                    Some(TransportEvent::Connected) => {
                        if self.inner.state() == SessionState::Connecting {
                            self.inner.set_state(SessionState::Connected);
                        }
                        if let Some(tx) = self.connected.take() {
                            let _ = tx.send(());
                        }
                    }
                    Some(TransportEvent::Pdu(pdu)) => self.dispatch(pdu).await,
                    Some(TransportEvent::Error(err)) => {
                        error!(error = %err, "transport error");
                        return self.shutdown(SessionState::Failed).await;
                    }
                    Some(TransportEvent::Closed) | None => {
                        return self.shutdown(SessionState::Closed).await;
                    }
                },
            }
        }
    }

    /// Route one inbound PDU: responses resolve their pending entry,
    /// unsolicited requests are answered on the spot.
    async fn dispatch(&mut self, pdu: Pdu) {
        debug!(pdu = pdu.name(), seq = pdu.sequence_number(), "received");

        if pdu.is_response() {
            let waiter = lock(&self.inner.pending).remove(&pdu.sequence_number());
            match waiter {
                Some(tx) => {
                    let result = match pdu.command_status() {
                        Some(status) if !status.is_ok() => {
                            Err(SmppError::RequestRejected(status))
                        }
                        _ => Ok(pdu),
                    };
                    let _ = tx.send(result);
                }
                None => warn!(
                    pdu = pdu.name(),
                    seq = pdu.sequence_number(),
                    "response with no matching request"
                ),
            }
            return;
        }

        match pdu {
            // Pure responder: answered in any state, never correlated.
            Pdu::EnquireLink(req) => {
                self.reply(Pdu::EnquireLinkResp(EnquireLinkResp {
                    sequence_number: req.sequence_number,
                }))
                .await;
            }
            Pdu::DeliverSm(delivery) => {
                // Ack first; the observer cannot suppress it.
                self.reply(Pdu::DeliverSmResp(DeliverSmResp {
                    sequence_number: delivery.sequence_number,
                    command_status: CommandStatus::Ok,
                }))
                .await;

                let observer = lock(&self.inner.observer).clone();
                match observer {
                    Some(observer) => {
                        let report = DeliveryReport::from_pdu(&delivery);
                        let outcome = std::panic::catch_unwind(
                            std::panic::AssertUnwindSafe(|| observer(report)),
                        );
                        if outcome.is_err() {
                            warn!(
                                seq = delivery.sequence_number,
                                "delivery report observer panicked"
                            );
                        }
                    }
                    None => debug!(
                        seq = delivery.sequence_number,
                        "delivery report received with no observer registered"
                    ),
                }
            }
            other => {
                warn!(pdu = other.name(), "unsolicited request, answering generic_nack");
                self.reply(Pdu::GenericNack(GenericNack {
                    sequence_number: other.sequence_number(),
                    command_status: CommandStatus::InvalidCommandId,
                }))
                .await;
            }
        }
    }

    async fn reply(&mut self, pdu: Pdu) {
        // A write failure here will also surface as an Error/Closed event
        // on the next recv, which tears the session down.
        if let Err(err) = self.transport.send(pdu).await {
            error!(error = %err, "transport write failed");
        }
    }

    async fn shutdown(mut self, terminal: SessionState) {
        self.inner.set_terminal(terminal);
        self.transport.close().await;
        self.inner.fail_all_pending();
        lock(&self.inner.keep_alive).running = false;
        // a connect() still waiting observes the dropped sender
        drop(self.connected.take());
        debug!(state = %terminal, "session driver stopped");
    }
}

/// One SMPP transceiver session over a [`Transport`].
///
/// The session owns a driver task that reads the transport's event
/// stream sequentially; callers suspend on correlated responses and may
/// keep any number of requests in flight at once. All methods take
/// `&self`, so the session can be shared behind an [`Arc`].
pub struct Session {
    inner: Arc<SessionInner>,
    driver: Mutex<Option<JoinHandle<()>>>,
    monitor: Mutex<Option<JoinHandle<()>>>,
}

impl Session {
    /// Establish a session over `transport`.
    ///
    /// Spawns the driver task and waits for the transport's `Connected`
    /// event, up to `config.connect_timeout`. On timeout the transport is
    /// torn down and the session is left in the failed state.
    pub async fn connect<T: Transport>(config: SessionConfig, transport: T) -> SmppResult<Self> {
        info!(endpoint = %config.endpoint(), "connecting");

        let connect_timeout = config.connect_timeout;
        let (command_tx, command_rx) = mpsc::channel(64);
        let (connected_tx, connected_rx) = oneshot::channel();

        let inner = Arc::new(SessionInner {
            config,
            state: Mutex::new(SessionState::Connecting),
            pending: Mutex::new(HashMap::new()),
            sequence: SequenceCounter::new(),
            commands: command_tx,
            observer: Mutex::new(None),
            keep_alive: Mutex::new(KeepAliveState::default()),
        });

        let driver = Driver {
            transport,
            inner: Arc::clone(&inner),
            commands: command_rx,
            connected: Some(connected_tx),
        };
        let handle = tokio::spawn(driver.run());

        let session = Session {
            inner,
            driver: Mutex::new(Some(handle)),
            monitor: Mutex::new(None),
        };

        match timeout(connect_timeout, connected_rx).await {
            Ok(Ok(())) => {
                info!("transport connected");
                Ok(session)
            }
            Ok(Err(_)) => {
                // the driver shut down before the connection came up
                session.inner.set_terminal(SessionState::Failed);
                Err(SmppError::SessionClosed)
            }
            Err(_) => {
                session.inner.set_terminal(SessionState::Failed);
                session.close().await;
                Err(SmppError::ConnectionTimeout)
            }
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.inner.state()
    }

    /// Bind as transceiver with the configured credentials.
    ///
    /// Valid only in the connected state. A response with a non-zero
    /// status fails with [`SmppError::BindRejected`] and leaves the
    /// session failed. On success the keepalive monitor starts
    /// automatically when enabled.
    pub async fn bind(&self) -> SmppResult<()> {
        {
            let mut state = lock(&self.inner.state);
            match *state {
                SessionState::Connected => *state = SessionState::Binding,
                SessionState::Closed | SessionState::Failed => {
                    return Err(SmppError::SessionClosed)
                }
                actual => {
                    return Err(SmppError::InvalidState {
                        expected: "connected",
                        actual,
                    })
                }
            }
        }

        let credentials = &self.inner.config.credentials;
        let pdu = Pdu::BindTransceiver(BindTransceiver {
            sequence_number: self.inner.sequence.next(),
            system_id: credentials.system_id.clone(),
            password: credentials.password.clone(),
            system_type: credentials.system_type.clone().unwrap_or_default(),
            interface_version: credentials.interface_version,
        });

        let deadline = self.inner.config.request_timeout;
        match self.inner.request(pdu, deadline).await {
            Ok(Pdu::BindTransceiverResp(resp)) => {
                info!(smsc = %resp.system_id, "bound as transceiver");
                self.inner.set_state(SessionState::Bound);
                self.start_keep_alive();
                Ok(())
            }
            Ok(other) => {
                self.inner.set_terminal(SessionState::Failed);
                Err(SmppError::UnexpectedPdu {
                    expected: "bind_transceiver_resp",
                    actual: other.name(),
                })
            }
            Err(SmppError::RequestRejected(status)) => {
                self.inner.set_terminal(SessionState::Failed);
                Err(SmppError::BindRejected(status))
            }
            Err(err) => {
                self.inner.set_terminal(SessionState::Failed);
                Err(err)
            }
        }
    }

    /// Submit one PDU and suspend until its correlated response.
    ///
    /// Valid only while bound. The sequence number is allocated here;
    /// any value in `submit.sequence_number` is overwritten. Concurrent
    /// submits are fine: each outstanding request is keyed by its own
    /// sequence number.
    pub async fn submit(&self, mut submit: SubmitSm) -> SmppResult<SubmitSmResp> {
        self.require_bound()?;
        submit.sequence_number = self.inner.sequence.next();
        let pdu = Pdu::SubmitSm(Box::new(submit));
        let deadline = self.inner.config.request_timeout;
        match self.inner.request(pdu, deadline).await? {
            Pdu::SubmitSmResp(resp) => Ok(resp),
            other => Err(SmppError::UnexpectedPdu {
                expected: "submit_sm_resp",
                actual: other.name(),
            }),
        }
    }

    /// Send a logical message, segmenting transparently.
    ///
    /// Text within the per-encoding part budget goes out as a single
    /// submit; longer text is split and the parts are submitted
    /// sequentially, each tagged with the shared reference number.
    /// Returns one SMSC message id per accepted part. A failure mid-way
    /// aborts the remaining parts and surfaces
    /// [`SmppError::PartialSend`] naming the parts that were accepted.
    pub async fn send_sms(&self, message: &SmsMessage) -> SmppResult<Vec<String>> {
        self.require_bound()?;

        let limit = self.inner.config.limits.limit_for(message.options.data_coding);
        if message.text.chars().count() <= limit {
            let resp = self.submit(build_submit(message, None)).await?;
            return Ok(vec![resp.message_id]);
        }

        let parts = segment(&message.text, limit)?;
        let total = parts.len();
        info!(to = %message.to, parts = total, "segmenting long message");

        let mut sent = Vec::with_capacity(total);
        for part in &parts {
            match self.submit(build_submit(message, Some(part))).await {
                Ok(resp) => {
                    debug!(part = part.seq, total, "message part accepted");
                    sent.push(resp.message_id);
                }
                Err(err) => {
                    return Err(SmppError::PartialSend {
                        sent,
                        total,
                        source: Box::new(err),
                    })
                }
            }
        }
        Ok(sent)
    }

    /// Issue one liveness probe and wait for the reply.
    pub async fn enquire_link(&self) -> SmppResult<()> {
        self.require_bound()?;
        self.inner.probe().await
    }

    /// Keepalive health snapshot.
    pub fn keep_alive_status(&self) -> KeepAliveStatus {
        lock(&self.inner.keep_alive).status()
    }

    /// Register the observer invoked for each inbound delivery report.
    ///
    /// The protocol acknowledgment is issued before the observer runs; a
    /// panicking observer is logged and does not disturb the session.
    pub fn on_delivery_report<F>(&self, observer: F)
    where
        F: Fn(DeliveryReport) + Send + Sync + 'static,
    {
        *lock(&self.inner.observer) = Some(Arc::new(observer));
    }

    /// Gracefully terminate the bound session.
    ///
    /// Correlated like any request; the state moves to unbinding and
    /// stays there until [`close`](Self::close) completes the teardown.
    pub async fn unbind(&self) -> SmppResult<()> {
        {
            let mut state = lock(&self.inner.state);
            match *state {
                SessionState::Bound => *state = SessionState::Unbinding,
                SessionState::Closed | SessionState::Failed => {
                    return Err(SmppError::SessionClosed)
                }
                actual => {
                    return Err(SmppError::InvalidState {
                        expected: "bound",
                        actual,
                    })
                }
            }
        }
        self.stop_keep_alive();

        let pdu = Pdu::Unbind(Unbind {
            sequence_number: self.inner.sequence.next(),
        });
        let deadline = self.inner.config.request_timeout;
        self.inner.request(pdu, deadline).await.map(|_| ())
    }

    /// Tear the transport down unconditionally.
    ///
    /// Transitions to closed and fails every outstanding request with
    /// [`SmppError::SessionClosed`]. Safe to call more than once.
    pub async fn close(&self) {
        self.stop_keep_alive();
        let _ = self.inner.commands.send(Command::Close).await;
        let handle = lock(&self.driver).take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
        // covers the case where the driver was already gone
        self.inner.set_terminal(SessionState::Closed);
        self.inner.fail_all_pending();
    }

    /// Ordered teardown: unbind if bound (best effort, bounded by the
    /// request timeout), then close.
    pub async fn shutdown(&self) {
        if self.inner.state().is_bound() {
            if let Err(err) = self.unbind().await {
                warn!(error = %err, "unbind during shutdown failed");
            }
        }
        self.close().await;
    }

    fn require_bound(&self) -> SmppResult<()> {
        match self.inner.state() {
            SessionState::Bound => Ok(()),
            SessionState::Closed | SessionState::Failed => Err(SmppError::SessionClosed),
            _ => Err(SmppError::NotBound),
        }
    }

    fn start_keep_alive(&self) {
        let config = self.inner.config.keep_alive.clone();
        if !config.enabled {
            return;
        }
        lock(&self.inner.keep_alive).running = true;

        let weak = Arc::downgrade(&self.inner);
        let handle = tokio::spawn(async move {
            let mut ticker = interval(config.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // the first tick completes immediately; probing starts one
            // full interval after bind
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(inner) = weak.upgrade() else { break };
                if !inner.state().is_bound() {
                    break;
                }
                if lock(&inner.keep_alive).is_failed(config.max_failures) {
                    warn!("keepalive failure ceiling reached, probing stopped");
                    lock(&inner.keep_alive).running = false;
                    break;
                }
                lock(&inner.keep_alive).on_ping_sent();
                match inner.probe().await {
                    Ok(()) => lock(&inner.keep_alive).on_ping_success(),
                    Err(err) => {
                        debug!(error = %err, "keepalive probe failed");
                        lock(&inner.keep_alive).on_ping_failure();
                    }
                }
            }
        });

        if let Some(previous) = lock(&self.monitor).replace(handle) {
            previous.abort();
        }
    }

    fn stop_keep_alive(&self) {
        if let Some(handle) = lock(&self.monitor).take() {
            handle.abort();
        }
        lock(&self.inner.keep_alive).running = false;
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        // best-effort: let the driver wind down if the caller never
        // closed explicitly
        let _ = self.inner.commands.try_send(Command::Close);
        if let Some(handle) = lock(&self.monitor).take() {
            handle.abort();
        }
    }
}

/// Translate the high-level message (plus an optional segment) into the
/// submit_sm the session puts on the wire.
fn build_submit(message: &SmsMessage, part: Option<&MessagePart>) -> SubmitSm {
    let options = &message.options;
    let mut esm_class = options.esm_class();
    let (text, sar) = match part {
        Some(part) => {
            esm_class |= ESM_CLASS_UDHI;
            (
                part.text.clone(),
                Some(SarInfo {
                    ref_num: part.ref_num,
                    total_segments: part.total,
                    segment_seqnum: part.seq,
                }),
            )
        }
        None => (message.text.clone(), None),
    };

    SubmitSm {
        sequence_number: 0, // allocated at submit time
        source: Address::new(message.from.as_str(), options.source_ton, options.source_npi),
        dest: Address::new(message.to.as_str(), options.dest_ton, options.dest_npi),
        esm_class,
        priority_flag: options.priority,
        validity_period: options.validity_period.clone(),
        registered_delivery: options.registered_delivery,
        data_coding: options.data_coding,
        short_message: text,
        sar,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_numbers_increase_and_wrap() {
        let counter = SequenceCounter::new();
        assert_eq!(counter.next(), 1);
        assert_eq!(counter.next(), 2);

        counter.0.store(SEQUENCE_MAX - 1, Ordering::Relaxed);
        assert_eq!(counter.next(), SEQUENCE_MAX);
        // wraps within the protocol range, never to zero
        assert_eq!(counter.next(), 1);
    }

    #[test]
    fn build_submit_sets_segment_fields() {
        let message = SmsMessage::new("100", "200", "hello");
        let part = MessagePart {
            ref_num: 7,
            total: 3,
            seq: 2,
            text: "ell".to_string(),
        };

        let plain = build_submit(&message, None);
        assert_eq!(plain.esm_class & ESM_CLASS_UDHI, 0);
        assert!(plain.sar.is_none());
        assert_eq!(plain.short_message, "hello");

        let segmented = build_submit(&message, Some(&part));
        assert_eq!(segmented.esm_class & ESM_CLASS_UDHI, ESM_CLASS_UDHI);
        assert_eq!(
            segmented.sar,
            Some(SarInfo {
                ref_num: 7,
                total_segments: 3,
                segment_seqnum: 2
            })
        );
        assert_eq!(segmented.short_message, "ell");
    }
}
