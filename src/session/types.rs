// ABOUTME: Supporting types for session operations including bind credentials and message builders
// ABOUTME: Simplified message interface with sensible defaults over the raw submit_sm fields

use crate::datatypes::{
    DataCoding, InterfaceVersion, NumericPlanIndicator, TypeOfNumber, ESM_CLASS_FLASH,
};

/// Credentials presented in the bind_transceiver request.
#[derive(Debug, Clone)]
pub struct BindCredentials {
    /// System identifier for authentication
    pub system_id: String,
    /// Password for authentication
    pub password: String,
    /// System type (optional, defaults to empty string)
    pub system_type: Option<String>,
    /// SMPP interface version to advertise
    pub interface_version: InterfaceVersion,
}

impl BindCredentials {
    /// Create bind credentials (defaults to SMPP v3.4).
    pub fn new(system_id: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            system_id: system_id.into(),
            password: password.into(),
            system_type: None,
            interface_version: InterfaceVersion::SmppV34,
        }
    }

    /// Set system type.
    pub fn with_system_type(mut self, system_type: impl Into<String>) -> Self {
        self.system_type = Some(system_type.into());
        self
    }
}

/// A logical outbound text message.
///
/// High-level interface over submit_sm with sensible defaults. Text
/// longer than the per-encoding part budget is segmented transparently
/// when the message is sent.
#[derive(Debug, Clone)]
pub struct SmsMessage {
    /// Destination phone number
    pub to: String,
    /// Source phone number
    pub from: String,
    /// Message text content
    pub text: String,
    /// Additional message options
    pub options: SmsOptions,
}

impl SmsMessage {
    /// Create a new SMS message with default options.
    pub fn new(to: impl Into<String>, from: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            from: from.into(),
            text: text.into(),
            options: SmsOptions::default(),
        }
    }

    /// Create a builder for constructing SMS messages.
    pub fn builder() -> SmsMessageBuilder {
        SmsMessageBuilder::default()
    }
}

/// SMS message options with sensible defaults.
#[derive(Debug, Clone)]
pub struct SmsOptions {
    /// Data coding scheme; also selects the segmentation budget
    pub data_coding: DataCoding,
    /// Display as a flash message (shown immediately, not stored)
    pub flash: bool,
    /// Validity period in SMPP time format; empty for SMSC default
    pub validity_period: String,
    /// Request delivery receipt (0 = no, 1 = yes)
    pub registered_delivery: u8,
    /// Message priority level
    pub priority: u8,
    /// Source address type of number
    pub source_ton: TypeOfNumber,
    /// Source address numbering plan indicator
    pub source_npi: NumericPlanIndicator,
    /// Destination address type of number
    pub dest_ton: TypeOfNumber,
    /// Destination address numbering plan indicator
    pub dest_npi: NumericPlanIndicator,
}

impl Default for SmsOptions {
    fn default() -> Self {
        Self {
            data_coding: DataCoding::default(),
            flash: false,
            validity_period: String::new(),
            registered_delivery: 0,
            priority: 0,
            source_ton: TypeOfNumber::Unknown,
            source_npi: NumericPlanIndicator::Unknown,
            dest_ton: TypeOfNumber::Unknown,
            dest_npi: NumericPlanIndicator::Unknown,
        }
    }
}

impl SmsOptions {
    /// esm_class value these options translate to (before any
    /// segmentation bits are added).
    pub(crate) fn esm_class(&self) -> u8 {
        if self.flash {
            ESM_CLASS_FLASH
        } else {
            0
        }
    }
}

/// Builder for constructing SMS messages with a fluent API.
#[derive(Debug, Default)]
pub struct SmsMessageBuilder {
    to: Option<String>,
    from: Option<String>,
    text: Option<String>,
    options: SmsOptions,
}

impl SmsMessageBuilder {
    /// Set destination phone number.
    pub fn to(mut self, to: impl Into<String>) -> Self {
        self.to = Some(to.into());
        self
    }

    /// Set source phone number.
    pub fn from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    /// Set message text.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Set data coding scheme.
    pub fn data_coding(mut self, data_coding: DataCoding) -> Self {
        self.options.data_coding = data_coding;
        self
    }

    /// Mark as a flash message.
    pub fn flash(mut self) -> Self {
        self.options.flash = true;
        self
    }

    /// Set the validity period (SMPP time format).
    pub fn validity_period(mut self, period: impl Into<String>) -> Self {
        self.options.validity_period = period.into();
        self
    }

    /// Request a delivery receipt.
    pub fn with_delivery_receipt(mut self) -> Self {
        self.options.registered_delivery = 1;
        self
    }

    /// Set message priority.
    pub fn priority(mut self, priority: u8) -> Self {
        self.options.priority = priority;
        self
    }

    /// Set source address numbering.
    pub fn source_numbering(mut self, ton: TypeOfNumber, npi: NumericPlanIndicator) -> Self {
        self.options.source_ton = ton;
        self.options.source_npi = npi;
        self
    }

    /// Set destination address numbering.
    pub fn dest_numbering(mut self, ton: TypeOfNumber, npi: NumericPlanIndicator) -> Self {
        self.options.dest_ton = ton;
        self.options.dest_npi = npi;
        self
    }

    /// Build the SMS message.
    pub fn build(self) -> Result<SmsMessage, String> {
        let to = self.to.ok_or("destination phone number is required")?;
        let from = self.from.ok_or("source phone number is required")?;
        let text = self.text.ok_or("message text is required")?;

        Ok(SmsMessage {
            to,
            from,
            text,
            options: self.options,
        })
    }
}
