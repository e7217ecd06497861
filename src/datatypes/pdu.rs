// ABOUTME: Decoded PDU model exchanged between the session core and the transport layer
// ABOUTME: Carries the fields the session logic needs; wire framing and TLV encoding live below the transport

use bytes::Bytes;
use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::datatypes::{Address, CommandStatus, DataCoding};

/// esm_class bit for a flash (immediately displayed) message.
pub const ESM_CLASS_FLASH: u8 = 0x10;

/// esm_class UDH-indicator bit, set on every part of a segmented message.
pub const ESM_CLASS_UDHI: u8 = 0x40;

/// SMPP interface version advertised during bind (Section 5.2.4).
#[derive(TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InterfaceVersion {
    SmppV33 = 0x33,
    SmppV34 = 0x34,
}

impl Default for InterfaceVersion {
    fn default() -> Self {
        InterfaceVersion::SmppV34
    }
}

/// bind_transceiver request (Section 4.1.5). The session always binds as
/// transceiver: it both submits messages and receives delivery receipts on
/// the same connection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BindTransceiver {
    pub sequence_number: u32,
    pub system_id: String,
    pub password: String,
    pub system_type: String,
    pub interface_version: InterfaceVersion,
}

/// bind_transceiver_resp (Section 4.1.6).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BindTransceiverResp {
    pub sequence_number: u32,
    pub command_status: CommandStatus,
    /// SMSC identifier echoed on a successful bind.
    pub system_id: String,
}

/// Segmentation metadata attached to one part of a long message
/// (sar_msg_ref_num / sar_total_segments / sar_segment_seqnum TLVs,
/// Sections 5.3.2.22–24).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SarInfo {
    /// Reference shared by every part of one logical message.
    pub ref_num: u16,
    /// Total number of parts.
    pub total_segments: u8,
    /// 1-based index of this part.
    pub segment_seqnum: u8,
}

/// submit_sm request (Section 4.4.1), reduced to the fields this session
/// populates. Omitted protocol fields are encoded as their defaults by the
/// transport codec.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SubmitSm {
    pub sequence_number: u32,
    pub source: Address,
    pub dest: Address,
    pub esm_class: u8,
    pub priority_flag: u8,
    /// Absolute or relative validity period in SMPP time format; empty
    /// string means SMSC default.
    pub validity_period: String,
    pub registered_delivery: u8,
    pub data_coding: DataCoding,
    pub short_message: String,
    pub sar: Option<SarInfo>,
}

/// submit_sm_resp (Section 4.4.2).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmitSmResp {
    pub sequence_number: u32,
    pub command_status: CommandStatus,
    /// SMSC-assigned id for the accepted message, empty on rejection.
    pub message_id: String,
}

/// deliver_sm (Section 4.6.1): mobile-originated message or delivery
/// receipt pushed by the SMSC. The payload stays raw here; receipts are
/// octet strings whose text form is recovered by the report handler.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeliverSm {
    pub sequence_number: u32,
    pub source: Address,
    pub dest: Address,
    pub esm_class: u8,
    pub data_coding: DataCoding,
    pub short_message: Bytes,
    /// receipted_message_id TLV, present on delivery receipts.
    pub receipted_message_id: Option<String>,
}

/// deliver_sm_resp (Section 4.6.2).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeliverSmResp {
    pub sequence_number: u32,
    pub command_status: CommandStatus,
}

/// enquire_link (Section 4.11.1), the liveness probe. Either peer may
/// issue one at any time while the connection is up.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EnquireLink {
    pub sequence_number: u32,
}

/// enquire_link_resp (Section 4.11.2). Always positive; the reply itself
/// is the liveness signal.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EnquireLinkResp {
    pub sequence_number: u32,
}

/// unbind (Section 4.2.1).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Unbind {
    pub sequence_number: u32,
}

/// unbind_resp (Section 4.2.2).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct UnbindResp {
    pub sequence_number: u32,
    pub command_status: CommandStatus,
}

/// generic_nack (Section 4.3.1): the catch-all negative response for
/// requests the receiver cannot act on.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GenericNack {
    pub sequence_number: u32,
    pub command_status: CommandStatus,
}

/// One decoded PDU, as delivered by (or handed to) the transport layer.
///
/// The large submit/deliver bodies are boxed so the enum stays cheap to
/// move through channels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Pdu {
    BindTransceiver(BindTransceiver),
    BindTransceiverResp(BindTransceiverResp),
    SubmitSm(Box<SubmitSm>),
    SubmitSmResp(SubmitSmResp),
    DeliverSm(Box<DeliverSm>),
    DeliverSmResp(DeliverSmResp),
    EnquireLink(EnquireLink),
    EnquireLinkResp(EnquireLinkResp),
    Unbind(Unbind),
    UnbindResp(UnbindResp),
    GenericNack(GenericNack),
}

impl Pdu {
    /// Sequence number correlating this PDU with its counterpart.
    pub fn sequence_number(&self) -> u32 {
        match self {
            Pdu::BindTransceiver(p) => p.sequence_number,
            Pdu::BindTransceiverResp(p) => p.sequence_number,
            Pdu::SubmitSm(p) => p.sequence_number,
            Pdu::SubmitSmResp(p) => p.sequence_number,
            Pdu::DeliverSm(p) => p.sequence_number,
            Pdu::DeliverSmResp(p) => p.sequence_number,
            Pdu::EnquireLink(p) => p.sequence_number,
            Pdu::EnquireLinkResp(p) => p.sequence_number,
            Pdu::Unbind(p) => p.sequence_number,
            Pdu::UnbindResp(p) => p.sequence_number,
            Pdu::GenericNack(p) => p.sequence_number,
        }
    }

    /// Status carried by response PDUs; `None` for requests and for
    /// enquire_link_resp, which has no failure mode.
    pub fn command_status(&self) -> Option<CommandStatus> {
        match self {
            Pdu::BindTransceiverResp(p) => Some(p.command_status),
            Pdu::SubmitSmResp(p) => Some(p.command_status),
            Pdu::DeliverSmResp(p) => Some(p.command_status),
            Pdu::UnbindResp(p) => Some(p.command_status),
            Pdu::GenericNack(p) => Some(p.command_status),
            _ => None,
        }
    }

    /// Whether this PDU answers an earlier request and should be matched
    /// against the outstanding-request table.
    pub fn is_response(&self) -> bool {
        matches!(
            self,
            Pdu::BindTransceiverResp(_)
                | Pdu::SubmitSmResp(_)
                | Pdu::DeliverSmResp(_)
                | Pdu::EnquireLinkResp(_)
                | Pdu::UnbindResp(_)
                | Pdu::GenericNack(_)
        )
    }

    /// Protocol name of the PDU, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Pdu::BindTransceiver(_) => "bind_transceiver",
            Pdu::BindTransceiverResp(_) => "bind_transceiver_resp",
            Pdu::SubmitSm(_) => "submit_sm",
            Pdu::SubmitSmResp(_) => "submit_sm_resp",
            Pdu::DeliverSm(_) => "deliver_sm",
            Pdu::DeliverSmResp(_) => "deliver_sm_resp",
            Pdu::EnquireLink(_) => "enquire_link",
            Pdu::EnquireLinkResp(_) => "enquire_link_resp",
            Pdu::Unbind(_) => "unbind",
            Pdu::UnbindResp(_) => "unbind_resp",
            Pdu::GenericNack(_) => "generic_nack",
        }
    }
}
