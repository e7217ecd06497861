use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Type of Number for source and destination addresses
/// (SMPP v3.4 Section 5.2.5).
#[derive(TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TypeOfNumber {
    Unknown = 0x00,
    International = 0x01,
    National = 0x02,
    NetworkSpecific = 0x03,
    SubscriberNumber = 0x04,
    Alphanumeric = 0x05,
    Abbreviated = 0x06,
}

/// Numbering Plan Indicator for source and destination addresses
/// (SMPP v3.4 Section 5.2.6).
#[derive(TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NumericPlanIndicator {
    Unknown = 0x00,
    Isdn = 0x01,
    Data = 0x03,
    Telex = 0x04,
    LandMobile = 0x06,
    National = 0x08,
    Private = 0x09,
    Ermes = 0x0A,
    Internet = 0x0E,
    WapClientId = 0x12,
}

impl Default for TypeOfNumber {
    fn default() -> Self {
        TypeOfNumber::Unknown
    }
}

impl Default for NumericPlanIndicator {
    fn default() -> Self {
        NumericPlanIndicator::Unknown
    }
}

/// A fully qualified SMPP address: the digits (or alphanumeric tag) plus
/// the numbering metadata the SMSC routes on.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Address {
    pub addr: String,
    pub ton: TypeOfNumber,
    pub npi: NumericPlanIndicator,
}

impl Address {
    pub fn new(addr: impl Into<String>, ton: TypeOfNumber, npi: NumericPlanIndicator) -> Self {
        Self {
            addr: addr.into(),
            ton,
            npi,
        }
    }
}

impl From<&str> for Address {
    /// Address with unknown TON/NPI, the permissive default most test
    /// SMSCs accept.
    fn from(addr: &str) -> Self {
        Self {
            addr: addr.to_string(),
            ..Default::default()
        }
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.addr)
    }
}
