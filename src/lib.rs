pub mod datatypes;
pub mod session;
pub mod transport;

#[cfg(test)]
mod tests;

// Re-export the main session API for easy access
pub use session::{
    BindCredentials, DeliveryReport, KeepAliveConfig, KeepAliveStatus, MessagePart, SegmentLimits,
    Session, SessionConfig, SessionState, SmppError, SmppResult, SmsMessage,
};

// Re-export the transport contract for implementors
pub use transport::{ChannelTransport, Transport, TransportEvent, TransportPeer};

/// A specialized `Result` type for session operations.
///
/// This is defined as a convenience.
///
/// # Examples
///
/// ## Basic SMS Sending
///
/// This example shows the simplest way to send an SMS message through a
/// bound session:
///
/// ```rust,no_run
/// use smpp_session::{BindCredentials, Session, SessionConfig, SmsMessage};
/// use smpp_session::transport::ChannelTransport;
///
/// # async fn example(transport: ChannelTransport) -> Result<(), Box<dyn std::error::Error>> {
/// // Connect and bind as transceiver
/// let config = SessionConfig::new(
///     "localhost",
///     2775,
///     BindCredentials::new("system_id", "password"),
/// );
/// let session = Session::connect(config, transport).await?;
/// session.bind().await?;
///
/// // Create and send an SMS message; long text is segmented for you
/// let sms = SmsMessage::new("1234567890", "0987654321", "Hello, World!");
/// let message_ids = session.send_sms(&sms).await?;
/// println!("Message sent with ids: {message_ids:?}");
///
/// // Watch for delivery receipts
/// session.on_delivery_report(|report| {
///     println!("delivered: {:?}", report.receipted_message_id);
/// });
///
/// // Clean disconnect: unbind, then tear the transport down
/// session.shutdown().await;
/// # Ok(())
/// # }
/// ```
///
/// ## Advanced Usage with Message Options
///
/// This example demonstrates the message builder with advanced options:
///
/// ```rust,no_run
/// use smpp_session::{Session, SmsMessage};
/// use smpp_session::datatypes::{DataCoding, NumericPlanIndicator, TypeOfNumber};
///
/// # async fn example(session: Session) -> Result<(), Box<dyn std::error::Error>> {
/// let sms = SmsMessage::builder()
///     .to("1234567890")
///     .from("0987654321")
///     .text("你好，世界！")
///     .data_coding(DataCoding::Ucs2)
///     .with_delivery_receipt()
///     .source_numbering(TypeOfNumber::International, NumericPlanIndicator::Isdn)
///     .dest_numbering(TypeOfNumber::International, NumericPlanIndicator::Isdn)
///     .build()?;
///
/// let message_ids = session.send_sms(&sms).await?;
/// println!("Message sent with ids: {message_ids:?}");
/// # Ok(())
/// # }
/// ```
pub type Result<T> = session::SmppResult<T>;
