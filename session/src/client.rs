//! Client session state machine.

use std::io::{Read, Write};

use frame::FrameCodec;
use message::{BetBatch, ControlMessage, Encode, ServerResponse};
use tracing::{debug, error, info, info_span};

use crate::config::{SessionConfig, UploadMode};
use crate::connector::Connector;
use crate::error::{Operation, SessionError, SessionResult};
use crate::pacer::{Pacer, ThreadPacer};
use crate::source::BetSource;

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Uploading,
    NotifyingCompletion,
    PollingWinners,
    Complete,
    Failed,
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    /// Records accepted from the source and sent.
    pub bets_sent: usize,
    /// Upload frames sent (batches, or single bets in single mode).
    pub frames_sent: usize,
    /// Winner queries issued, including the successful one.
    pub winner_polls: usize,
    /// The final winners response.
    pub winners: ServerResponse,
}

/// Uploads an agency's bets, announces completion and waits for winners.
///
/// Every exchange opens its own connection through the [`Connector`] and
/// drops it before the call returns.
#[derive(Debug)]
pub struct ClientSession<C, P = ThreadPacer> {
    config: SessionConfig,
    connector: C,
    pacer: P,
    phase: SessionPhase,
    no_more_bets: String,
    get_winners: String,
}

impl<C: Connector> ClientSession<C> {
    /// Creates a session that sleeps the current thread between operations.
    pub fn new(config: SessionConfig, connector: C) -> SessionResult<Self> {
        Self::with_pacer(config, connector, ThreadPacer)
    }
}

impl<C: Connector, P: Pacer> ClientSession<C, P> {
    /// Creates a session with a custom pacer.
    ///
    /// Fails if the client id cannot be carried by control messages.
    pub fn with_pacer(config: SessionConfig, connector: C, pacer: P) -> SessionResult<Self> {
        let no_more_bets = ControlMessage::no_more_bets(config.client_id.as_str())?.encode();
        let get_winners = ControlMessage::get_winners(config.client_id.as_str())?.encode();
        Ok(Self {
            config,
            connector,
            pacer,
            phase: SessionPhase::Idle,
            no_more_bets,
            get_winners,
        })
    }

    /// Current lifecycle phase.
    pub const fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Settings the session was built with.
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The connector that opens each exchange.
    pub const fn connector(&self) -> &C {
        &self.connector
    }

    /// The pacer that performs pauses.
    pub const fn pacer(&self) -> &P {
        &self.pacer
    }

    /// Runs upload, completion notice and winner poll to the end.
    ///
    /// The first connect or I/O failure ends the run and leaves the session in
    /// [`SessionPhase::Failed`]. The winner poll has no retry limit.
    pub fn run<S: BetSource + ?Sized>(&mut self, source: &mut S) -> SessionResult<SessionSummary> {
        let span = info_span!("session", client_id = %self.config.client_id);
        let _enter = span.enter();

        let outcome = self.run_phases(source);
        match &outcome {
            Ok(summary) => {
                self.phase = SessionPhase::Complete;
                info!(
                    action = "session",
                    result = "success",
                    bets = summary.bets_sent,
                    frames = summary.frames_sent,
                    polls = summary.winner_polls
                );
            }
            Err(err) => {
                error!(
                    action = "session",
                    result = "fail",
                    phase = ?self.phase,
                    error = %err
                );
                self.phase = SessionPhase::Failed;
            }
        }
        outcome
    }

    fn run_phases<S: BetSource + ?Sized>(&mut self, source: &mut S) -> SessionResult<SessionSummary> {
        self.phase = SessionPhase::Uploading;
        let (bets_sent, frames_sent) = self.upload(source)?;

        self.phase = SessionPhase::NotifyingCompletion;
        self.notify_completion()?;

        self.phase = SessionPhase::PollingWinners;
        let (winners, winner_polls) = self.poll_winners()?;

        Ok(SessionSummary {
            bets_sent,
            frames_sent,
            winner_polls,
            winners,
        })
    }

    /// Sends every record; returns (bets, frames) sent.
    fn upload<S: BetSource + ?Sized>(&mut self, source: &mut S) -> SessionResult<(usize, usize)> {
        let chunk_size = self.config.chunk_size();
        debug!(
            action = "send_bets",
            mode = ?self.config.upload_mode,
            configured = self.config.batch_max_amount,
            chunk_size
        );

        let mut bets_sent = 0;
        let mut frames_sent = 0;
        let mut previous_full = false;
        loop {
            let chunk = source.next_chunk(chunk_size)?;
            if chunk.is_empty() {
                break;
            }
            frames_sent += 1;
            let operation = match self.config.upload_mode {
                UploadMode::Batch => Operation::SendBatch { batch: frames_sent },
                UploadMode::Single => Operation::SendBet { bet: frames_sent },
            };
            let count = chunk.len();
            if count > chunk_size {
                return Err(SessionError::ChunkTooLarge {
                    operation,
                    max: chunk_size,
                    actual: count,
                });
            }

            // A full chunk means more data was likely pending; space the sends.
            if previous_full {
                self.pause();
            }
            previous_full = count == chunk_size;

            let payload = match self.config.upload_mode {
                UploadMode::Batch => BetBatch::from(chunk).encode(),
                UploadMode::Single => chunk[0].encode(),
            };
            let response = self.exchange(operation, &payload)?;
            bets_sent += count;
            info!(
                action = "batch_sent",
                result = %response.result,
                frame = frames_sent,
                bets = count,
                reply = %response.message
            );
        }

        info!(
            action = "send_bets",
            result = "success",
            bets = bets_sent,
            frames = frames_sent
        );
        Ok((bets_sent, frames_sent))
    }

    fn notify_completion(&mut self) -> SessionResult<()> {
        let payload = self.no_more_bets.clone();
        let response = self.exchange(Operation::NoMoreBets, &payload)?;
        info!(
            action = "no_more_bets",
            result = %response.result,
            reply = %response.message
        );
        Ok(())
    }

    /// Queries until the server reports success. Only non-success replies are
    /// retried; transport failures end the run.
    fn poll_winners(&mut self) -> SessionResult<(ServerResponse, usize)> {
        let payload = self.get_winners.clone();
        let mut attempt = 0;
        loop {
            attempt += 1;
            let response = self.exchange(Operation::GetWinners { attempt }, &payload)?;
            if response.is_success() {
                info!(
                    action = "winners_query",
                    result = "success",
                    attempt,
                    winners = %response.message
                );
                return Ok((response, attempt));
            }
            debug!(
                action = "winners_query",
                result = %response.result,
                attempt,
                reply = %response.message
            );
            self.pause();
        }
    }

    fn pause(&mut self) {
        debug!(action = "pause", period_ms = self.config.loop_period.as_millis());
        self.pacer.pause(self.config.loop_period);
    }

    /// One connect, request, response, close cycle.
    fn exchange(&mut self, operation: Operation, payload: &str) -> SessionResult<ServerResponse> {
        let stream = self.connector.connect().map_err(|source| {
            error!(action = "connect", result = "fail", %operation, error = %source);
            SessionError::Connect { operation, source }
        })?;
        debug!(action = "connect", result = "success", %operation);

        let mut codec = FrameCodec::with_limits(stream, self.config.frame_limits.clone());
        let outcome = round_trip(&mut codec, operation, payload);
        drop(codec);
        debug!(action = "close_connection", result = "success", %operation);
        outcome
    }
}

fn round_trip<S: Read + Write>(
    codec: &mut FrameCodec<S>,
    operation: Operation,
    payload: &str,
) -> SessionResult<ServerResponse> {
    codec.send_frame(payload).map_err(|err| {
        error!(action = "send_message", result = "fail", %operation, error = %err);
        SessionError::from_frame(operation, err)
    })?;

    let reply = codec.receive().map_err(|err| {
        error!(action = "receive_message", result = "fail", %operation, error = %err);
        SessionError::from_frame(operation, err)
    })?;

    let response = ServerResponse::decode(&reply);
    debug!(
        action = "receive_message",
        result = "success",
        %operation,
        response = %response
    );
    Ok(response)
}
