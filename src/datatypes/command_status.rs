use num_enum::{IntoPrimitive, TryFromPrimitive};

/// The command_status field of an SMPP response indicates the success or
/// failure of the corresponding request. It is only meaningful in response
/// PDUs; requests carry zero. Values are taken from the SMPP v3.4 error
/// code table.
#[derive(TryFromPrimitive, IntoPrimitive)]
#[repr(u32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CommandStatus {
    /// No Error
    Ok = 0x00000000,

    /// Message Length is invalid
    InvalidMsgLength = 0x00000001,

    /// Command Length is invalid
    InvalidCommandLength = 0x00000002,

    /// Invalid Command ID
    InvalidCommandId = 0x00000003,

    /// Incorrect BIND Status for given command
    IncorrectBindStatus = 0x00000004,

    /// ESME Already in Bound State
    AlreadyBoundState = 0x00000005,

    /// Invalid Priority Flag
    InvalidPriorityFlag = 0x00000006,

    /// Invalid Registered Delivery Flag
    InvalidRegisteredDeliveryFlag = 0x00000007,

    /// System Error
    SystemError = 0x00000008,

    /// Invalid Source Address
    InvalidSourceAddress = 0x0000000A,

    /// Invalid Dest Addr
    InvalidDestinationAddress = 0x0000000B,

    /// Message ID is invalid
    InvalidMessageId = 0x0000000C,

    /// Bind Failed
    BindFailed = 0x0000000D,

    /// Invalid Password
    InvalidPassword = 0x0000000E,

    /// Invalid System ID
    InvalidSystemId = 0x0000000F,

    /// Cancel SM Failed
    CancelSmFailed = 0x00000011,

    /// Replace SM Failed
    ReplacedSmFailed = 0x00000013,

    /// Message Queue Full
    MessageQueueFull = 0x00000014,

    /// Invalid Service Type
    InvalidServiceType = 0x00000015,

    /// Throttling error (ESME has exceeded allowed message limits)
    ThrottlingError = 0x00000058,

    /// Invalid Scheduled Delivery Time
    InvalidScheduledDeliveryTime = 0x00000061,

    /// Invalid message delivery period
    InvalidMessageDeliveryPeriod = 0x00000062,

    /// ESME Receiver Temporary App Error Code
    ReceiverTemporaryError = 0x00000064,

    /// ESME Receiver Permanent App Error Code
    ReceiverPermanentError = 0x00000065,
}

impl CommandStatus {
    /// True for the zero status that every accepted request carries back.
    pub fn is_ok(self) -> bool {
        self == CommandStatus::Ok
    }
}
