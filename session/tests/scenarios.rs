//! Session scenarios against scripted in-memory peers.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, Cursor, Read, Write};
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use message::BetRecord;
use session::{
    BetSource, ClientSession, Connector, MemorySource, Operation, Pacer, SessionConfig,
    SessionError, SessionPhase, SourceResult, UploadMode,
};

const PERIOD: Duration = Duration::from_millis(250);
const ACK: &str = "RESULT=success,MESSAGE=stored";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Event {
    Request(String),
    Pause(Duration),
}

type Log = Rc<RefCell<Vec<Event>>>;

/// How the peer behaves on one connection.
#[derive(Debug, Clone)]
enum Script {
    Reply(&'static str),
    /// Reads the request, then closes without replying.
    Hangup,
    /// Refuses the connection.
    Refuse,
}

#[derive(Debug)]
struct ScriptedConnector {
    script: VecDeque<Script>,
    fallback: &'static str,
    log: Log,
    connects: usize,
}

impl ScriptedConnector {
    fn new(log: &Log, script: impl IntoIterator<Item = Script>) -> Self {
        Self {
            script: script.into_iter().collect(),
            fallback: ACK,
            log: Rc::clone(log),
            connects: 0,
        }
    }
}

impl Connector for ScriptedConnector {
    type Stream = PeerStream;

    fn connect(&mut self) -> io::Result<PeerStream> {
        self.connects += 1;
        let reply = match self.script.pop_front() {
            Some(Script::Refuse) => return Err(io::ErrorKind::ConnectionRefused.into()),
            Some(Script::Hangup) => Vec::new(),
            Some(Script::Reply(reply)) => format!("{reply}\n").into_bytes(),
            None => format!("{}\n", self.fallback).into_bytes(),
        };
        Ok(PeerStream {
            reply: Cursor::new(reply),
            request: Vec::new(),
            log: Rc::clone(&self.log),
        })
    }
}

/// Records the request when the session closes the connection.
#[derive(Debug)]
struct PeerStream {
    reply: Cursor<Vec<u8>>,
    request: Vec<u8>,
    log: Log,
}

impl Read for PeerStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reply.read(buf)
    }
}

impl Write for PeerStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.request.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for PeerStream {
    fn drop(&mut self) {
        let request = String::from_utf8_lossy(&self.request);
        self.log
            .borrow_mut()
            .push(Event::Request(request.trim_end_matches('\n').to_string()));
    }
}

#[derive(Debug)]
struct RecordingPacer {
    log: Log,
}

impl Pacer for RecordingPacer {
    fn pause(&mut self, period: Duration) {
        self.log.borrow_mut().push(Event::Pause(period));
    }
}

fn bets(agency: &str, n: usize) -> Vec<BetRecord> {
    (0..n)
        .map(|i| {
            BetRecord::new(
                agency,
                "Santiago Lionel",
                "Lorca",
                (30_904_465 + i).to_string(),
                "1999-03-17",
                i.to_string(),
            )
        })
        .collect()
}

/// Hands out everything it holds on the first call, whatever `max` is.
#[derive(Debug)]
struct GreedySource(Vec<BetRecord>);

impl BetSource for GreedySource {
    fn next_chunk(&mut self, _max: usize) -> SourceResult<Vec<BetRecord>> {
        Ok(std::mem::take(&mut self.0))
    }
}

fn scripted_session(
    config: SessionConfig,
    script: impl IntoIterator<Item = Script>,
) -> (ClientSession<ScriptedConnector, RecordingPacer>, Log) {
    let log: Log = Rc::default();
    let connector = ScriptedConnector::new(&log, script);
    let pacer = RecordingPacer {
        log: Rc::clone(&log),
    };
    let session = ClientSession::with_pacer(config.with_loop_period(PERIOD), connector, pacer)
        .expect("valid config");
    (session, log)
}

fn requests(log: &Log) -> Vec<String> {
    log.borrow()
        .iter()
        .filter_map(|event| match event {
            Event::Request(request) => Some(request.clone()),
            Event::Pause(_) => None,
        })
        .collect()
}

fn pauses(log: &Log) -> usize {
    log.borrow()
        .iter()
        .filter(|event| matches!(event, Event::Pause(_)))
        .count()
}

fn bets_header(request: &str) -> Option<usize> {
    request
        .split(';')
        .next()?
        .strip_prefix("BETS=")?
        .parse()
        .ok()
}

#[test]
fn single_small_batch() {
    let (mut session, log) = scripted_session(
        SessionConfig::new("7"),
        [
            Script::Reply(ACK),
            Script::Reply("RESULT=success,MESSAGE="),
            Script::Reply("RESULT=success,MESSAGE=2"),
        ],
    );
    let summary = session.run(&mut MemorySource::new(bets("7", 3))).unwrap();

    let sent = requests(&log);
    assert_eq!(sent.len(), 3);
    assert_eq!(bets_header(&sent[0]), Some(3));
    assert_eq!(sent[0].matches(';').count(), 3);
    assert_eq!(sent[1], "END,AGENCY=7");
    assert_eq!(sent[2], "WINNERS,AGENCY=7");
    assert_eq!(pauses(&log), 0);

    assert_eq!(summary.bets_sent, 3);
    assert_eq!(summary.frames_sent, 1);
    assert_eq!(summary.winner_polls, 1);
    assert_eq!(summary.winners.winners_count(), Some(2));
    assert_eq!(session.phase(), SessionPhase::Complete);
}

#[test]
fn exact_multiple_of_cap() {
    let (mut session, log) = scripted_session(SessionConfig::new("1"), []);
    let summary = session.run(&mut MemorySource::new(bets("1", 160))).unwrap();

    let events = log.borrow().clone();
    assert_eq!(events.len(), 5);
    assert!(matches!(&events[0], Event::Request(r) if bets_header(r) == Some(80)));
    assert_eq!(events[1], Event::Pause(PERIOD));
    assert!(matches!(&events[2], Event::Request(r) if bets_header(r) == Some(80)));
    // No pause between the last batch and the completion notice.
    assert_eq!(events[3], Event::Request("END,AGENCY=1".into()));
    assert_eq!(events[4], Event::Request("WINNERS,AGENCY=1".into()));
    assert_eq!(summary.frames_sent, 2);
    assert_eq!(summary.bets_sent, 160);
}

#[test]
fn partial_last_batch() {
    let (mut session, log) = scripted_session(SessionConfig::new("1").with_batch_max_amount(3), []);
    let summary = session.run(&mut MemorySource::new(bets("1", 7))).unwrap();

    let sizes: Vec<_> = requests(&log)
        .iter()
        .filter_map(|r| bets_header(r))
        .collect();
    assert_eq!(sizes, [3, 3, 1]);
    assert_eq!(pauses(&log), 2);
    assert_eq!(summary.frames_sent, 3);
}

#[test]
fn configured_size_above_cap_is_clamped() {
    let (mut session, log) = scripted_session(SessionConfig::new("1").with_batch_max_amount(500), []);
    session.run(&mut MemorySource::new(bets("1", 100))).unwrap();

    let sizes: Vec<_> = requests(&log)
        .iter()
        .filter_map(|r| bets_header(r))
        .collect();
    assert_eq!(sizes, [80, 20]);
}

#[test]
fn oversized_chunk_is_rejected_before_sending() {
    let (mut session, log) = scripted_session(SessionConfig::new("1").with_batch_max_amount(3), []);
    let err = session.run(&mut GreedySource(bets("1", 5))).unwrap_err();

    assert!(matches!(
        err,
        SessionError::ChunkTooLarge {
            operation: Operation::SendBatch { batch: 1 },
            max: 3,
            actual: 5,
        }
    ));
    assert!(requests(&log).is_empty());
    assert_eq!(session.connector().connects, 0);
    assert_eq!(session.phase(), SessionPhase::Failed);
}

#[test]
fn oversized_chunk_above_protocol_cap_is_rejected() {
    let (mut session, log) = scripted_session(SessionConfig::new("1"), []);
    let err = session.run(&mut GreedySource(bets("1", 81))).unwrap_err();

    assert!(matches!(
        err,
        SessionError::ChunkTooLarge {
            max: 80,
            actual: 81,
            ..
        }
    ));
    assert!(requests(&log).is_empty());
}

#[test]
fn single_mode_rejects_multi_record_chunk() {
    let (mut session, log) = scripted_session(
        SessionConfig::new("2").with_upload_mode(UploadMode::Single),
        [],
    );
    let err = session.run(&mut GreedySource(bets("2", 2))).unwrap_err();

    assert!(matches!(
        err,
        SessionError::ChunkTooLarge {
            operation: Operation::SendBet { bet: 1 },
            max: 1,
            actual: 2,
        }
    ));
    assert!(requests(&log).is_empty());
    assert_eq!(session.phase(), SessionPhase::Failed);
}

#[test]
fn connection_drop_mid_batch() {
    let (mut session, log) = scripted_session(
        SessionConfig::new("1"),
        [Script::Reply(ACK), Script::Hangup],
    );
    let err = session.run(&mut MemorySource::new(bets("1", 200))).unwrap_err();

    assert!(matches!(
        err,
        SessionError::ConnectionClosed {
            operation: Operation::SendBatch { batch: 2 },
            received: 0,
        }
    ));
    // The second batch went out, nothing after it.
    let sent = requests(&log);
    assert_eq!(sent.len(), 2);
    assert!(sent.iter().all(|r| r.starts_with("BETS=80;")));
    assert_eq!(session.connector().connects, 2);
    assert_eq!(session.phase(), SessionPhase::Failed);
}

#[test]
fn refused_connection_aborts_upload() {
    let (mut session, log) = scripted_session(
        SessionConfig::new("1").with_batch_max_amount(2),
        [Script::Reply(ACK), Script::Refuse],
    );
    let err = session.run(&mut MemorySource::new(bets("1", 6))).unwrap_err();

    assert!(matches!(
        err,
        SessionError::Connect {
            operation: Operation::SendBatch { batch: 2 },
            ..
        }
    ));
    assert_eq!(requests(&log).len(), 1);
}

#[test]
fn winners_not_ready() {
    const NOT_READY: usize = 3;
    let mut script = vec![Script::Reply(ACK)];
    script.extend(
        std::iter::repeat(Script::Reply("RESULT=fail,MESSAGE=lottery pending")).take(NOT_READY),
    );
    script.push(Script::Reply("RESULT=success,MESSAGE=1"));

    let (mut session, log) = scripted_session(SessionConfig::new("4"), script);
    let summary = session.run(&mut MemorySource::new(Vec::new())).unwrap();

    let queries = requests(&log)
        .iter()
        .filter(|r| r.as_str() == "WINNERS,AGENCY=4")
        .count();
    assert_eq!(queries, NOT_READY + 1);
    assert_eq!(pauses(&log), NOT_READY);
    assert_eq!(summary.winner_polls, NOT_READY + 1);
    assert_eq!(summary.winners.winners_count(), Some(1));

    // Every retry is preceded by a pause.
    let events = log.borrow().clone();
    for pair in events.windows(2).skip(1) {
        if let Event::Pause(_) = pair[0] {
            assert_eq!(pair[1], Event::Request("WINNERS,AGENCY=4".into()));
        }
    }
}

#[test]
fn winners_poll_io_failure_is_fatal() {
    let (mut session, log) = scripted_session(
        SessionConfig::new("1"),
        [
            Script::Reply(ACK),
            Script::Reply("RESULT=fail,MESSAGE=pending"),
            Script::Hangup,
        ],
    );
    let err = session.run(&mut MemorySource::new(Vec::new())).unwrap_err();

    assert_eq!(err.operation(), Some(Operation::GetWinners { attempt: 2 }));
    assert_eq!(requests(&log).len(), 3);
    assert_eq!(session.phase(), SessionPhase::Failed);
}

#[test]
fn zero_records_still_notifies() {
    let (mut session, log) = scripted_session(SessionConfig::new("9"), []);
    let summary = session.run(&mut MemorySource::new(Vec::new())).unwrap();

    assert_eq!(
        requests(&log),
        ["END,AGENCY=9".to_string(), "WINNERS,AGENCY=9".to_string()]
    );
    assert_eq!(summary.bets_sent, 0);
    assert_eq!(summary.frames_sent, 0);
}

#[test]
fn unexpected_reply_during_upload_is_not_fatal() {
    let (mut session, log) = scripted_session(
        SessionConfig::new("1"),
        [Script::Reply("garbage"), Script::Reply("RESULT=fail")],
    );
    session.run(&mut MemorySource::new(bets("1", 1))).unwrap();
    assert_eq!(requests(&log).len(), 3);
}

#[test]
fn single_mode_sends_bare_records() {
    let (mut session, log) = scripted_session(
        SessionConfig::new("2").with_upload_mode(UploadMode::Single),
        [],
    );
    let records = bets("2", 3);
    let summary = session.run(&mut MemorySource::new(records.clone())).unwrap();

    let sent = requests(&log);
    assert_eq!(sent.len(), 5);
    for (request, bet) in sent.iter().zip(&records) {
        assert!(!request.starts_with("BETS="));
        assert!(request.starts_with("AGENCY=2,FIRST_NAME=Santiago Lionel,"));
        assert!(request.ends_with(&format!("NUMBER={}", bet.number)));
    }
    // Pause between records, not after the last one.
    assert_eq!(pauses(&log), 2);
    assert_eq!(summary.frames_sent, 3);
    assert_eq!(summary.bets_sent, 3);
}

#[test]
fn single_mode_failure_names_the_bet() {
    let (mut session, _log) = scripted_session(
        SessionConfig::new("2").with_upload_mode(UploadMode::Single),
        [Script::Reply(ACK), Script::Hangup],
    );
    let err = session.run(&mut MemorySource::new(bets("2", 3))).unwrap_err();
    assert_eq!(err.operation(), Some(Operation::SendBet { bet: 2 }));
}

#[test]
fn oversized_reply_is_a_frame_error() {
    static LONG: &str = "RESULT=success,MESSAGE=0123456789012345678901234567890123456789";
    let mut limits = frame::FrameLimits::for_testing();
    limits.max_frame_bytes = 16;
    let (mut session, _log) = scripted_session(
        SessionConfig::new("1").with_frame_limits(limits),
        [Script::Reply(LONG)],
    );
    let err = session.run(&mut MemorySource::new(Vec::new())).unwrap_err();
    assert!(matches!(
        err,
        SessionError::Frame {
            operation: Operation::NoMoreBets,
            ..
        }
    ));
}

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn events_carry_action_and_client_id() {
    let captured = Captured::default();
    let writer = captured.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(move || writer.clone())
        .finish();

    let (mut session, _log) = scripted_session(SessionConfig::new("42"), []);
    tracing::subscriber::with_default(subscriber, || {
        session.run(&mut MemorySource::new(bets("42", 2))).unwrap();
    });

    let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
    assert!(output.contains("client_id=42"));
    assert!(output.contains("batch_sent"));
    assert!(output.contains("close_connection"));
    assert!(output.contains("winners_query"));
}
