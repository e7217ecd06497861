// ABOUTME: Scenario driver exercising the session against a loopback SMSC
// ABOUTME: Runs plain, Unicode, flash, segmented and validity-period sends with clean SIGINT teardown

//! # SMS Sending Scenarios
//!
//! Drives a session through the classic demo scenarios (a plain text
//! message, a UCS-2 message, a flash message, a long message that gets
//! segmented, and a message with a validity period) against an
//! in-process loopback SMSC built on the channel transport.
//!
//! ```bash
//! cargo run --example send_sms -- --system-id test --password secret
//!
//! # with debug logging and delivery receipts
//! cargo run --example send_sms -- -d --with-receipts
//! ```
//!
//! Interrupting with ctrl-c unbinds, closes the transport and exits.

use argh::FromArgs;
use smpp_session::datatypes::{
    BindTransceiverResp, CommandStatus, DataCoding, DeliverSm, EnquireLinkResp, Pdu, SubmitSmResp,
    UnbindResp,
};
use smpp_session::transport::{self, TransportPeer};
use smpp_session::{BindCredentials, KeepAliveConfig, Session, SessionConfig, SmsMessage};
use std::error::Error;
use std::time::Duration;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// SMS sending scenarios against a loopback SMSC
#[derive(FromArgs)]
struct CliArgs {
    /// whether or not to enable debugging
    #[argh(switch, short = 'd')]
    debugging: bool,

    /// the system id (default: test)
    #[argh(option)]
    system_id: Option<String>,

    /// the password (default: secret)
    #[argh(option)]
    password: Option<String>,

    /// the recipient telephone number (default: 1234567890)
    #[argh(option, short = 't')]
    to: Option<String>,

    /// the sender address (default: TestSender)
    #[argh(option, short = 'f')]
    from: Option<String>,

    /// keep-alive interval in seconds (default: 30)
    #[argh(option)]
    keep_alive_interval: Option<u64>,

    /// request delivery receipts for every scenario
    #[argh(switch)]
    with_receipts: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args: CliArgs = argh::from_env();

    let level = if args.debugging {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let credentials = BindCredentials::new(
        args.system_id.unwrap_or_else(|| "test".to_string()),
        args.password.unwrap_or_else(|| "secret".to_string()),
    );
    let keep_alive = KeepAliveConfig::new(Duration::from_secs(
        args.keep_alive_interval.unwrap_or(30),
    ));
    let config = SessionConfig::new("loopback", 2775, credentials).with_keep_alive(keep_alive);

    let (channel, peer) = transport::channel(64);
    tokio::spawn(run_loopback_smsc(peer));

    let session = match Session::connect(config, channel).await {
        Ok(session) => session,
        Err(err) => {
            error!(error = %err, "connect failed");
            std::process::exit(1);
        }
    };

    if let Err(err) = session.bind().await {
        error!(error = %err, "bind failed");
        session.close().await;
        std::process::exit(1);
    }

    session.on_delivery_report(|report| {
        info!(
            message_id = report.receipted_message_id.as_deref().unwrap_or("?"),
            text = %report.text,
            "delivery report"
        );
    });

    let to = args.to.unwrap_or_else(|| "1234567890".to_string());
    let from = args.from.unwrap_or_else(|| "TestSender".to_string());

    tokio::select! {
        result = run_scenarios(&session, &to, &from, args.with_receipts) => {
            if let Err(err) = result {
                error!(error = %err, "scenario failed");
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("interrupt received, shutting down");
        }
    }

    session.shutdown().await;
    info!("session closed");
    Ok(())
}

async fn run_scenarios(
    session: &Session,
    to: &str,
    from: &str,
    with_receipts: bool,
) -> smpp_session::Result<()> {
    let pause = Duration::from_millis(500);

    info!("scenario 1: simple text message");
    let mut builder = SmsMessage::builder()
        .to(to)
        .from(from)
        .text("Hello from the SMPP session client!");
    if with_receipts {
        builder = builder.with_delivery_receipt();
    }
    let ids = session.send_sms(&builder.build().map_err(invalid)?).await?;
    info!(?ids, "accepted");
    tokio::time::sleep(pause).await;

    info!("scenario 2: unicode message");
    let sms = SmsMessage::builder()
        .to(to)
        .from(from)
        .text("你好，世界！")
        .data_coding(DataCoding::Ucs2)
        .build()
        .map_err(invalid)?;
    let ids = session.send_sms(&sms).await?;
    info!(?ids, "accepted");
    tokio::time::sleep(pause).await;

    info!("scenario 3: flash message");
    let sms = SmsMessage::builder()
        .to(to)
        .from(from)
        .text("This is a flash message!")
        .flash()
        .build()
        .map_err(invalid)?;
    let ids = session.send_sms(&sms).await?;
    info!(?ids, "accepted");
    tokio::time::sleep(pause).await;

    info!("scenario 4: long message, segmented automatically");
    let long_text = "This is a very long message that exceeds the standard \
        SMS length. It demonstrates how the session splits messages that \
        need more than one part. The message continues with more text to \
        make sure it goes well beyond the per-part budget for the default \
        alphabet, so the segmenter has real work to do here."
        .to_string();
    let ids = session
        .send_sms(&SmsMessage::new(to, from, long_text))
        .await?;
    info!(parts = ids.len(), ?ids, "accepted");
    tokio::time::sleep(pause).await;

    info!("scenario 5: message with a validity period");
    let sms = SmsMessage::builder()
        .to(to)
        .from(from)
        .text("This message is valid for one hour")
        .validity_period("000000010000000R")
        .build()
        .map_err(invalid)?;
    let ids = session.send_sms(&sms).await?;
    info!(?ids, "accepted");

    info!("all scenarios completed");
    Ok(())
}

fn invalid(message: String) -> smpp_session::SmppError {
    smpp_session::SmppError::InvalidData(message)
}

/// Minimal in-process SMSC: accepts the bind, assigns message ids, echoes
/// liveness probes and emits a delivery receipt for every registered
/// delivery request.
async fn run_loopback_smsc(mut peer: TransportPeer) {
    peer.connected().await;

    let mut next_message_id = 0u32;
    let mut next_sequence = 0u32;

    while let Some(pdu) = peer.sent().await {
        match pdu {
            Pdu::BindTransceiver(bind) => {
                peer.deliver(Pdu::BindTransceiverResp(BindTransceiverResp {
                    sequence_number: bind.sequence_number,
                    command_status: CommandStatus::Ok,
                    system_id: "LOOPBACK".to_string(),
                }))
                .await;
            }
            Pdu::SubmitSm(submit) => {
                next_message_id += 1;
                let message_id = format!("msg-{next_message_id:06}");
                peer.deliver(Pdu::SubmitSmResp(SubmitSmResp {
                    sequence_number: submit.sequence_number,
                    command_status: CommandStatus::Ok,
                    message_id: message_id.clone(),
                }))
                .await;

                if submit.registered_delivery != 0 {
                    next_sequence += 1;
                    let receipt = format!(
                        "id:{message_id} sub:001 dlvrd:001 stat:DELIVRD text:ok"
                    );
                    peer.deliver(Pdu::DeliverSm(Box::new(DeliverSm {
                        sequence_number: next_sequence,
                        source: submit.dest.clone(),
                        dest: submit.source.clone(),
                        short_message: receipt.into(),
                        receipted_message_id: Some(message_id),
                        ..Default::default()
                    })))
                    .await;
                }
            }
            Pdu::EnquireLink(probe) => {
                peer.deliver(Pdu::EnquireLinkResp(EnquireLinkResp {
                    sequence_number: probe.sequence_number,
                }))
                .await;
            }
            Pdu::Unbind(unbind) => {
                peer.deliver(Pdu::UnbindResp(UnbindResp {
                    sequence_number: unbind.sequence_number,
                    command_status: CommandStatus::Ok,
                }))
                .await;
            }
            // acks for receipts and probes we initiated
            Pdu::DeliverSmResp(_) | Pdu::EnquireLinkResp(_) | Pdu::GenericNack(_) => {}
            other => {
                info!(pdu = other.name(), "loopback SMSC ignoring pdu");
            }
        }
    }
}
