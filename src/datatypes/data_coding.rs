use num_enum::{IntoPrimitive, TryFromPrimitive};

/// The data_coding field of submit_sm and deliver_sm selects the character
/// encoding of the short message payload (SMPP v3.4 Section 5.2.19).
///
/// The encoding determines how many characters fit into a single message
/// part: the default alphabet packs far more characters per part than
/// UCS-2, so segmentation budgets are looked up per coding scheme.
#[derive(TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DataCoding {
    /// SMSC default alphabet (GSM 03.38 7-bit in most deployments)
    SmscDefault = 0x00,

    /// IA5 (CCITT T.50) / ASCII
    Ia5 = 0x01,

    /// Latin 1 (ISO-8859-1)
    Latin1 = 0x03,

    /// UCS-2 (ISO/IEC-10646), used for wide/Unicode messages
    Ucs2 = 0x08,
}

impl Default for DataCoding {
    fn default() -> Self {
        DataCoding::SmscDefault
    }
}

impl DataCoding {
    /// Whether this coding scheme is a two-octet-per-character ("wide")
    /// encoding with the correspondingly smaller per-part budget.
    pub fn is_wide(self) -> bool {
        self == DataCoding::Ucs2
    }
}
