// ABOUTME: Typed SMPP v3.4 data model shared by the session core and the transport layer
// ABOUTME: Exports decoded PDU structs plus the enums backing their numeric protocol fields

mod address;
mod command_status;
mod data_coding;
mod pdu;

pub use address::{Address, NumericPlanIndicator, TypeOfNumber};
pub use command_status::CommandStatus;
pub use data_coding::DataCoding;
pub use pdu::{
    BindTransceiver, BindTransceiverResp, DeliverSm, DeliverSmResp, EnquireLink, EnquireLinkResp,
    GenericNack, InterfaceVersion, Pdu, SarInfo, SubmitSm, SubmitSmResp, Unbind, UnbindResp,
    ESM_CLASS_FLASH, ESM_CLASS_UDHI,
};
