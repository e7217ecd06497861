// ABOUTME: Inbound delivery receipt handling: parsed report type and observer plumbing
// ABOUTME: The protocol-level acknowledgment is issued by dispatch before the observer runs

use crate::datatypes::DeliverSm;

/// A parsed delivery notification surfaced to the registered observer.
///
/// Reports arrive unsolicited on the session's event stream and are
/// acknowledged at the protocol level before this value is handed out;
/// the observer cannot suppress the acknowledgment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Sequence number of the inbound deliver_sm
    pub sequence_number: u32,
    /// Address the receipt concerns (the original destination)
    pub source_addr: String,
    /// Address the receipt was routed to (the original source)
    pub destination_addr: String,
    /// Receipt text, lossily decoded from the raw payload
    pub text: String,
    /// Message id of the submit this receipt finalizes, when the SMSC
    /// carries it as a separate field
    pub receipted_message_id: Option<String>,
}

impl DeliveryReport {
    pub(crate) fn from_pdu(pdu: &DeliverSm) -> Self {
        Self {
            sequence_number: pdu.sequence_number,
            source_addr: pdu.source.addr.clone(),
            destination_addr: pdu.dest.addr.clone(),
            text: String::from_utf8_lossy(&pdu.short_message).into_owned(),
            receipted_message_id: pdu.receipted_message_id.clone(),
        }
    }
}

/// Caller-supplied observer invoked once per delivery report.
pub type DeliveryObserver = dyn Fn(DeliveryReport) + Send + Sync;
