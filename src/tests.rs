//! Integration tests driving a session against a scripted peer

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::datatypes::{
    BindTransceiverResp, CommandStatus, DeliverSm, EnquireLink, Pdu, SubmitSmResp, UnbindResp,
    ESM_CLASS_UDHI,
};
use crate::session::{
    BindCredentials, KeepAliveConfig, Session, SessionConfig, SessionState, SmppError, SmsMessage,
};
use crate::transport::{self, TransportPeer};

fn test_config() -> SessionConfig {
    SessionConfig::new("localhost", 2775, BindCredentials::new("test", "secret"))
        .with_connect_timeout(Duration::from_secs(10))
        .with_request_timeout(Duration::from_secs(10))
        .with_keep_alive(KeepAliveConfig::disabled())
}

async fn connected_session(config: SessionConfig) -> (Session, TransportPeer) {
    let (channel, peer) = transport::channel(64);
    // the channel buffers the event until the driver is up
    assert!(peer.connected().await);
    let session = Session::connect(config, channel).await.unwrap();
    (session, peer)
}

async fn bound_session(config: SessionConfig) -> (Session, TransportPeer) {
    let (session, mut peer) = connected_session(config).await;
    let (bind_result, _) = tokio::join!(session.bind(), async {
        let pdu = peer.sent().await.unwrap();
        assert!(matches!(pdu, Pdu::BindTransceiver(_)));
        peer.deliver(Pdu::BindTransceiverResp(BindTransceiverResp {
            sequence_number: pdu.sequence_number(),
            command_status: CommandStatus::Ok,
            system_id: "SMSC".to_string(),
        }))
        .await;
    });
    bind_result.unwrap();
    (session, peer)
}

async fn answer_submit(peer: &mut TransportPeer, message_id: &str) -> u32 {
    let pdu = peer.sent().await.unwrap();
    let seq = pdu.sequence_number();
    assert!(matches!(pdu, Pdu::SubmitSm(_)));
    peer.deliver(Pdu::SubmitSmResp(SubmitSmResp {
        sequence_number: seq,
        command_status: CommandStatus::Ok,
        message_id: message_id.to_string(),
    }))
    .await;
    seq
}

#[cfg(test)]
mod lifecycle {
    use super::*;

    #[tokio::test]
    async fn connect_and_bind_reach_bound() {
        let (session, mut peer) = connected_session(test_config()).await;
        assert_eq!(session.state(), SessionState::Connected);

        let (bind_result, _) = tokio::join!(session.bind(), async {
            let pdu = peer.sent().await.unwrap();
            let Pdu::BindTransceiver(bind) = &pdu else {
                panic!("expected bind_transceiver, got {}", pdu.name());
            };
            assert_eq!(bind.system_id, "test");
            assert_eq!(bind.password, "secret");
            peer.deliver(Pdu::BindTransceiverResp(BindTransceiverResp {
                sequence_number: pdu.sequence_number(),
                command_status: CommandStatus::Ok,
                system_id: "SMSC".to_string(),
            }))
            .await;
        });

        bind_result.unwrap();
        assert_eq!(session.state(), SessionState::Bound);
        session.close().await;
        assert_eq!(session.state(), SessionState::Closed);
    }

    #[tokio::test]
    async fn bind_rejection_carries_the_status() {
        let (session, mut peer) = connected_session(test_config()).await;

        let (bind_result, _) = tokio::join!(session.bind(), async {
            let pdu = peer.sent().await.unwrap();
            peer.deliver(Pdu::BindTransceiverResp(BindTransceiverResp {
                sequence_number: pdu.sequence_number(),
                command_status: CommandStatus::InvalidPassword,
                system_id: String::new(),
            }))
            .await;
        });

        assert!(matches!(
            bind_result,
            Err(SmppError::BindRejected(CommandStatus::InvalidPassword))
        ));
        assert_eq!(session.state(), SessionState::Failed);

        // the failed session refuses further work
        let sms = SmsMessage::new("100", "200", "hi");
        assert!(matches!(
            session.send_sms(&sms).await,
            Err(SmppError::SessionClosed)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn connect_times_out_without_a_connected_event() {
        let (channel, _peer) = transport::channel(8);
        let config = test_config().with_connect_timeout(Duration::from_secs(10));
        let result = Session::connect(config, channel).await;
        assert!(matches!(result, Err(SmppError::ConnectionTimeout)));
    }

    #[tokio::test]
    async fn submit_before_bind_is_refused() {
        let (session, _peer) = connected_session(test_config()).await;
        let sms = SmsMessage::new("100", "200", "hi");
        assert!(matches!(
            session.send_sms(&sms).await,
            Err(SmppError::NotBound)
        ));
    }

    #[tokio::test]
    async fn unbind_then_close_walks_the_lifecycle() {
        let (session, mut peer) = bound_session(test_config()).await;

        let (unbind_result, _) = tokio::join!(session.unbind(), async {
            let pdu = peer.sent().await.unwrap();
            assert!(matches!(pdu, Pdu::Unbind(_)));
            peer.deliver(Pdu::UnbindResp(UnbindResp {
                sequence_number: pdu.sequence_number(),
                command_status: CommandStatus::Ok,
            }))
            .await;
        });

        unbind_result.unwrap();
        assert_eq!(session.state(), SessionState::Unbinding);
        session.close().await;
        assert_eq!(session.state(), SessionState::Closed);
    }

    #[tokio::test]
    async fn peer_close_fails_in_flight_requests() {
        let (session, mut peer) = bound_session(test_config()).await;
        let session = Arc::new(session);

        let submitter = {
            let session = Arc::clone(&session);
            tokio::spawn(async move {
                session
                    .send_sms(&SmsMessage::new("100", "200", "hi"))
                    .await
            })
        };

        // the request is on the wire, then the connection drops
        let pdu = peer.sent().await.unwrap();
        assert!(matches!(pdu, Pdu::SubmitSm(_)));
        peer.closed().await;

        let result = submitter.await.unwrap();
        assert!(matches!(result, Err(SmppError::SessionClosed)));
        assert_eq!(session.state(), SessionState::Closed);
    }
}

#[cfg(test)]
mod correlation {
    use super::*;

    #[tokio::test]
    async fn concurrent_requests_resolve_with_their_own_responses() {
        let (session, mut peer) = bound_session(test_config()).await;
        let session = Arc::new(session);

        let mut tasks = Vec::new();
        for n in 1..=3u32 {
            let session = Arc::clone(&session);
            tasks.push(tokio::spawn(async move {
                let sms = SmsMessage::new("100", "200", format!("m{n}"));
                (n, session.send_sms(&sms).await)
            }));
        }

        // collect the three requests, then answer them in reverse order
        let mut inflight = Vec::new();
        for _ in 0..3 {
            let pdu = peer.sent().await.unwrap();
            let Pdu::SubmitSm(submit) = &pdu else {
                panic!("expected submit_sm, got {}", pdu.name());
            };
            inflight.push((pdu.sequence_number(), submit.short_message.clone()));
        }
        for (seq, text) in inflight.iter().rev() {
            peer.deliver(Pdu::SubmitSmResp(SubmitSmResp {
                sequence_number: *seq,
                command_status: CommandStatus::Ok,
                message_id: format!("{text}-id"),
            }))
            .await;
        }

        for task in tasks {
            let (n, result) = task.await.unwrap();
            assert_eq!(result.unwrap(), vec![format!("m{n}-id")]);
        }
    }

    #[tokio::test]
    async fn close_resolves_every_outstanding_request() {
        let (session, mut peer) = bound_session(test_config()).await;
        let session = Arc::new(session);

        let mut tasks = Vec::new();
        for n in 0..4u32 {
            let session = Arc::clone(&session);
            tasks.push(tokio::spawn(async move {
                session
                    .send_sms(&SmsMessage::new("100", "200", format!("m{n}")))
                    .await
            }));
        }
        // all four are registered once their PDUs reach the peer
        for _ in 0..4 {
            assert!(matches!(peer.sent().await.unwrap(), Pdu::SubmitSm(_)));
        }

        session.close().await;

        for task in tasks {
            let result = task.await.unwrap();
            assert!(matches!(result, Err(SmppError::SessionClosed)));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn request_timeout_releases_the_entry() {
        let (session, mut peer) =
            bound_session(test_config().with_request_timeout(Duration::from_secs(5))).await;

        let result = session
            .send_sms(&SmsMessage::new("100", "200", "hi"))
            .await;
        assert!(matches!(result, Err(SmppError::Timeout)));

        // the response arriving late finds no pending entry and the
        // session keeps working
        let pdu = peer.sent().await.unwrap();
        peer.deliver(Pdu::SubmitSmResp(SubmitSmResp {
            sequence_number: pdu.sequence_number(),
            command_status: CommandStatus::Ok,
            message_id: "late".to_string(),
        }))
        .await;

        let msg = SmsMessage::new("100", "200", "again");
        let (result, _) = tokio::join!(
            session.send_sms(&msg),
            answer_submit(&mut peer, "id-2"),
        );
        assert_eq!(result.unwrap(), vec!["id-2".to_string()]);
    }

    #[tokio::test]
    async fn unmatched_response_is_ignored() {
        let (session, mut peer) = bound_session(test_config()).await;

        peer.deliver(Pdu::SubmitSmResp(SubmitSmResp {
            sequence_number: 9999,
            command_status: CommandStatus::Ok,
            message_id: "ghost".to_string(),
        }))
        .await;

        // session is still healthy afterwards
        let msg = SmsMessage::new("100", "200", "hi");
        let (result, _) = tokio::join!(
            session.send_sms(&msg),
            answer_submit(&mut peer, "id-1"),
        );
        assert_eq!(result.unwrap(), vec!["id-1".to_string()]);
    }
}

#[cfg(test)]
mod keepalive {
    use super::*;

    #[tokio::test]
    async fn inbound_probe_is_answered_with_the_same_sequence() {
        let (_session, mut peer) = bound_session(test_config()).await;

        peer.deliver(Pdu::EnquireLink(EnquireLink { sequence_number: 7 }))
            .await;

        let pdu = peer.sent().await.unwrap();
        assert!(matches!(pdu, Pdu::EnquireLinkResp(_)));
        assert_eq!(pdu.sequence_number(), 7);
    }

    #[tokio::test]
    async fn inbound_probe_is_answered_before_bind_completes() {
        let (_session, mut peer) = connected_session(test_config()).await;

        peer.deliver(Pdu::EnquireLink(EnquireLink { sequence_number: 7 }))
            .await;

        let pdu = peer.sent().await.unwrap();
        assert!(matches!(pdu, Pdu::EnquireLinkResp(_)));
        assert_eq!(pdu.sequence_number(), 7);
    }

    #[tokio::test(start_paused = true)]
    async fn monitor_probes_on_the_interval() {
        let config = test_config().with_keep_alive(
            KeepAliveConfig::new(Duration::from_secs(30)).with_timeout(Duration::from_secs(5)),
        );
        let (session, mut peer) = bound_session(config).await;

        // one interval elapses, one probe goes out
        let pdu = peer.sent().await.unwrap();
        assert!(matches!(pdu, Pdu::EnquireLink(_)));
        peer.deliver(Pdu::EnquireLinkResp(crate::datatypes::EnquireLinkResp {
            sequence_number: pdu.sequence_number(),
        }))
        .await;

        // a second interval, a second probe
        let pdu = peer.sent().await.unwrap();
        assert!(matches!(pdu, Pdu::EnquireLink(_)));
        peer.deliver(Pdu::EnquireLinkResp(crate::datatypes::EnquireLinkResp {
            sequence_number: pdu.sequence_number(),
        }))
        .await;

        // let the monitor record the second pong before sampling
        tokio::time::sleep(Duration::from_millis(1)).await;
        let status = session.keep_alive_status();
        assert!(status.running);
        assert_eq!(status.total_pings, 2);
        assert_eq!(status.total_pongs, 2);
        assert_eq!(status.consecutive_failures, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn probe_failures_are_recorded_without_killing_the_session() {
        let config = test_config().with_keep_alive(
            KeepAliveConfig::new(Duration::from_secs(30))
                .with_timeout(Duration::from_secs(5))
                .with_max_failures(2),
        );
        let (session, mut peer) = bound_session(config).await;

        // two probes go unanswered; their timeouts elapse under paused time
        for _ in 0..2 {
            let pdu = peer.sent().await.unwrap();
            assert!(matches!(pdu, Pdu::EnquireLink(_)));
        }
        tokio::time::sleep(Duration::from_secs(40)).await;

        let status = session.keep_alive_status();
        assert_eq!(status.consecutive_failures, 2);
        assert!(!status.running);

        // the session itself is still bound and usable
        assert_eq!(session.state(), SessionState::Bound);
        let msg = SmsMessage::new("100", "200", "still here");
        let (result, _) = tokio::join!(
            session.send_sms(&msg),
            answer_submit(&mut peer, "id-1"),
        );
        assert_eq!(result.unwrap(), vec!["id-1".to_string()]);
    }
}

#[cfg(test)]
mod delivery {
    use super::*;

    #[tokio::test]
    async fn report_is_acked_then_surfaced() {
        let (session, mut peer) = bound_session(test_config()).await;

        let seen: Arc<Mutex<Vec<crate::session::DeliveryReport>>> =
            Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        session.on_delivery_report(move |report| {
            sink.lock().unwrap().push(report);
        });

        peer.deliver(Pdu::DeliverSm(Box::new(DeliverSm {
            sequence_number: 42,
            source: "1234567890".into(),
            dest: "TestSender".into(),
            short_message: bytes::Bytes::from_static(b"id:abc123 stat:DELIVRD"),
            receipted_message_id: Some("abc123".to_string()),
            ..Default::default()
        })))
        .await;

        // the protocol ack comes first, carrying the inbound sequence
        let pdu = peer.sent().await.unwrap();
        assert!(matches!(pdu, Pdu::DeliverSmResp(_)));
        assert_eq!(pdu.sequence_number(), 42);

        let reports = seen.lock().unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].sequence_number, 42);
        assert_eq!(reports[0].source_addr, "1234567890");
        assert_eq!(reports[0].text, "id:abc123 stat:DELIVRD");
        assert_eq!(reports[0].receipted_message_id.as_deref(), Some("abc123"));
    }

    #[tokio::test]
    async fn panicking_observer_does_not_suppress_the_ack() {
        let (session, mut peer) = bound_session(test_config()).await;
        session.on_delivery_report(|_| panic!("observer blew up"));

        peer.deliver(Pdu::DeliverSm(Box::new(DeliverSm {
            sequence_number: 43,
            ..Default::default()
        })))
        .await;

        let pdu = peer.sent().await.unwrap();
        assert!(matches!(pdu, Pdu::DeliverSmResp(_)));
        assert_eq!(pdu.sequence_number(), 43);

        // and the session carries on
        let msg = SmsMessage::new("100", "200", "hi");
        let (result, _) = tokio::join!(
            session.send_sms(&msg),
            answer_submit(&mut peer, "id-1"),
        );
        assert_eq!(result.unwrap(), vec!["id-1".to_string()]);
    }
}

#[cfg(test)]
mod segmentation {
    use super::*;

    fn long_text(len: usize) -> String {
        "0123456789".chars().cycle().take(len).collect()
    }

    #[tokio::test]
    async fn long_message_goes_out_as_tagged_parts() {
        let (session, mut peer) = bound_session(test_config()).await;
        let session = Arc::new(session);

        let sender = {
            let session = Arc::clone(&session);
            tokio::spawn(async move {
                session
                    .send_sms(&SmsMessage::new("100", "200", long_text(320)))
                    .await
            })
        };

        let mut refs = Vec::new();
        let mut lengths = Vec::new();
        for n in 1..=3u8 {
            let pdu = peer.sent().await.unwrap();
            let seq = pdu.sequence_number();
            let Pdu::SubmitSm(submit) = pdu else {
                panic!("expected submit_sm");
            };
            let sar = submit.sar.expect("part must carry sar fields");
            assert_eq!(sar.segment_seqnum, n);
            assert_eq!(sar.total_segments, 3);
            assert_eq!(submit.esm_class & ESM_CLASS_UDHI, ESM_CLASS_UDHI);
            refs.push(sar.ref_num);
            lengths.push(submit.short_message.chars().count());

            peer.deliver(Pdu::SubmitSmResp(SubmitSmResp {
                sequence_number: seq,
                command_status: CommandStatus::Ok,
                message_id: format!("part-{n}"),
            }))
            .await;
        }

        assert_eq!(lengths, vec![140, 140, 40]);
        assert!(refs.iter().all(|r| *r == refs[0]));
        assert_eq!(
            sender.await.unwrap().unwrap(),
            vec!["part-1", "part-2", "part-3"]
        );
    }

    #[tokio::test]
    async fn part_rejection_reports_what_was_sent() {
        let (session, mut peer) = bound_session(test_config()).await;
        let session = Arc::new(session);

        let sender = {
            let session = Arc::clone(&session);
            tokio::spawn(async move {
                session
                    .send_sms(&SmsMessage::new("100", "200", long_text(320)))
                    .await
            })
        };

        // first part accepted, second rejected
        answer_submit(&mut peer, "part-1").await;
        let pdu = peer.sent().await.unwrap();
        peer.deliver(Pdu::SubmitSmResp(SubmitSmResp {
            sequence_number: pdu.sequence_number(),
            command_status: CommandStatus::MessageQueueFull,
            message_id: String::new(),
        }))
        .await;

        match sender.await.unwrap() {
            Err(SmppError::PartialSend { sent, total, source }) => {
                assert_eq!(sent, vec!["part-1".to_string()]);
                assert_eq!(total, 3);
                assert!(matches!(
                    *source,
                    SmppError::RequestRejected(CommandStatus::MessageQueueFull)
                ));
            }
            other => panic!("expected PartialSend, got {other:?}"),
        }

        // the third part was never submitted
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(peer.try_sent().is_none());
    }

    #[tokio::test]
    async fn wide_encoding_uses_the_smaller_budget() {
        let (session, mut peer) = bound_session(test_config()).await;
        let session = Arc::new(session);

        let text: String = "한".repeat(100);
        let sender = {
            let session = Arc::clone(&session);
            let sms = SmsMessage::builder()
                .to("100")
                .from("200")
                .text(text)
                .data_coding(crate::datatypes::DataCoding::Ucs2)
                .build()
                .unwrap();
            tokio::spawn(async move { session.send_sms(&sms).await })
        };

        // 100 wide characters against a budget of 70 means two parts
        for n in 1..=2u8 {
            let pdu = peer.sent().await.unwrap();
            let seq = pdu.sequence_number();
            let Pdu::SubmitSm(submit) = pdu else {
                panic!("expected submit_sm");
            };
            assert_eq!(submit.sar.unwrap().segment_seqnum, n);
            peer.deliver(Pdu::SubmitSmResp(SubmitSmResp {
                sequence_number: seq,
                command_status: CommandStatus::Ok,
                message_id: format!("p{n}"),
            }))
            .await;
        }

        assert_eq!(sender.await.unwrap().unwrap(), vec!["p1", "p2"]);
    }
}
