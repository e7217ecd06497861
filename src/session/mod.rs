// ABOUTME: SMPP session module: state machine, correlation, keepalive, segmentation, delivery
// ABOUTME: Exports the Session handle plus its configuration, message and error types

//! SMPP Session Module
//!
//! An asynchronous SMPP v3.4 transceiver session over a pluggable
//! [`Transport`](crate::transport::Transport):
//!
//! * **Correlated requests** - every bind/submit/unbind registers a
//!   pending entry keyed by sequence number; any number may be in flight
//!   at once and responses resolve them in whatever order they arrive
//! * **Keepalive** - periodic enquire_link probes with failure
//!   accounting, plus an unconditional responder for the peer's probes
//! * **Segmentation** - long text is split into reference-tagged parts
//!   sized to the per-encoding budget and submitted in order
//! * **Delivery reports** - inbound deliver_sm PDUs are acknowledged at
//!   the protocol level and surfaced to a caller-supplied observer
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use smpp_session::session::{BindCredentials, Session, SessionConfig, SmsMessage};
//! use smpp_session::transport::ChannelTransport;
//!
//! # async fn example(transport: ChannelTransport) -> Result<(), Box<dyn std::error::Error>> {
//! let config = SessionConfig::new(
//!     "localhost",
//!     2775,
//!     BindCredentials::new("system_id", "password"),
//! );
//!
//! let session = Session::connect(config, transport).await?;
//! session.bind().await?;
//!
//! let message = SmsMessage::new("1234567890", "TestSender", "Hello!");
//! let message_ids = session.send_sms(&message).await?;
//! println!("accepted as {message_ids:?}");
//!
//! session.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod delivery;
pub mod error;
pub mod keepalive;
pub mod segment;
pub mod state;
pub mod types;

// Re-export the main types for easy access
pub use config::{SegmentLimits, SessionConfig};
pub use self::core::Session;
pub use delivery::{DeliveryObserver, DeliveryReport};
pub use error::{SmppError, SmppResult};
pub use keepalive::{KeepAliveConfig, KeepAliveStatus};
pub use segment::{segment, MessagePart};
pub use state::SessionState;
pub use types::{BindCredentials, SmsMessage, SmsMessageBuilder, SmsOptions};
