//! Tournament room: owns one tournament and drives its matches from simulation signals.
//!
//! The room is a single-owner actor. The external per-tick loop reports points and
//! departures over an mpsc channel; every state change happens inside [`TournamentRoom::run`]
//! (or the hook methods it calls), so no two handlers for the same room interleave.

use crate::config::TournamentConfig;
use crate::logic;
use crate::models::{EndReason, ParticipantId, Tournament, TournamentError, TournamentLog};
use crate::room::ledger::Ledger;
use crate::room::transport::RoomTransport;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Capacity of the signal channel created by [`TournamentRoom::spawn`].
pub const SIGNAL_BUFFER: usize = 64;

/// Reports from the simulation loop.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RoomSignal {
    PointScored(ParticipantId),
    PlayerLeft(ParticipantId),
}

/// Final state of a room once its task finishes.
#[derive(Debug)]
pub struct RoomReport {
    pub tournament: Tournament,
    /// Ledger submission still running in the background, if one was dispatched.
    pub submission: Option<JoinHandle<()>>,
}

/// Handles to a room running on its own task.
#[derive(Debug)]
pub struct RoomHandle {
    pub signals: mpsc::Sender<RoomSignal>,
    pub state: watch::Receiver<Tournament>,
    pub task: JoinHandle<RoomReport>,
}

pub struct TournamentRoom<T> {
    tournament: Tournament,
    transport: T,
    ledger: Arc<dyn Ledger>,
    config: TournamentConfig,
    state_tx: watch::Sender<Tournament>,
    submission: Option<JoinHandle<()>>,
}

impl<T: RoomTransport> TournamentRoom<T> {
    pub fn new(
        tournament: Tournament,
        transport: T,
        ledger: Arc<dyn Ledger>,
        config: TournamentConfig,
    ) -> Self {
        let (state_tx, _) = watch::channel(tournament.clone());
        Self {
            tournament,
            transport,
            ledger,
            config,
            state_tx,
            submission: None,
        }
    }

    pub fn tournament(&self) -> &Tournament {
        &self.tournament
    }

    /// Snapshot stream, updated after every handled event.
    pub fn subscribe(&self) -> watch::Receiver<Tournament> {
        self.state_tx.subscribe()
    }

    /// Ledger submission dispatched by the last teardown, if any.
    pub fn take_submission(&mut self) -> Option<JoinHandle<()>> {
        self.submission.take()
    }

    /// Round-start hook: pair the next match and re-seed the table.
    pub fn start_round(&mut self) -> Result<(ParticipantId, ParticipantId), TournamentError> {
        let pairing = logic::start_new_match(&mut self.tournament)?;
        self.publish();
        Ok(pairing)
    }

    /// Point-scored hook. Returns true when the point decided the match.
    pub fn on_point(&mut self, scorer: ParticipantId) -> Result<bool, TournamentError> {
        let outcome = logic::award_point(
            &mut self.tournament,
            scorer,
            self.config.end_score,
            |p| self.transport.session(&self.config.namespace, p),
        )?;
        self.transport.emit(&outcome.event);
        self.publish();
        Ok(outcome.match_over)
    }

    /// Match-end hook. Returns false when the tournament had already expired.
    ///
    /// Must be called from within a Tokio runtime: a ledger submission is dispatched onto the
    /// blocking pool and never awaited here.
    pub fn on_match_end(&mut self, reason: EndReason) -> bool {
        let completed_at = chrono::Utc::now().timestamp();
        let Some(end) = logic::end_match(&mut self.tournament, reason, completed_at) else {
            log::debug!("Ignoring {:?} match end on an expired tournament", reason);
            return false;
        };
        self.transport.emit(&end.event);
        if let Some(teardown) = end.teardown {
            if let Some(sealed) = teardown.submission {
                self.submit(sealed);
            }
            self.transport.close_room();
            for participant in teardown.disconnect {
                self.transport.disconnect(participant);
            }
            log::info!(
                "Tournament room closed after round {} ({:?})",
                self.tournament.round,
                reason
            );
        }
        self.publish();
        true
    }

    /// Play matches until the tournament expires.
    pub async fn run(mut self, mut signals: mpsc::Receiver<RoomSignal>) -> RoomReport {
        while !self.tournament.expired {
            let reason = self.play_match(&mut signals).await;
            self.on_match_end(reason);
        }
        RoomReport {
            tournament: self.tournament,
            submission: self.submission,
        }
    }

    async fn play_match(&mut self, signals: &mut mpsc::Receiver<RoomSignal>) -> EndReason {
        if let Err(e) = self.start_round() {
            log::error!("Cannot start round {}: {}", self.tournament.round + 1, e);
            return EndReason::OpponentLeft;
        }
        if let Some(reason) = self.breather(signals).await {
            return reason;
        }
        logic::release_ball(&mut self.tournament);
        self.publish();

        loop {
            let Some(signal) = signals.recv().await else {
                log::warn!("Simulation loop gone during round {}", self.tournament.round);
                return EndReason::OpponentLeft;
            };
            match signal {
                RoomSignal::PointScored(scorer) => match self.on_point(scorer) {
                    Ok(true) => return EndReason::Normal,
                    Ok(false) => {}
                    Err(TournamentError::SessionUnavailable(p)) => {
                        log::error!(
                            "Round {} decided but session of {} is gone; aborting tournament",
                            self.tournament.round,
                            p
                        );
                        return EndReason::OpponentLeft;
                    }
                    Err(e) => log::warn!("Ignoring point from {}: {}", scorer, e),
                },
                RoomSignal::PlayerLeft(p) => {
                    if let Some(reason) = self.departure(p) {
                        return reason;
                    }
                }
            }
        }
    }

    /// Hold the ball before play. Departures still preempt; points are not live yet.
    async fn breather(&mut self, signals: &mut mpsc::Receiver<RoomSignal>) -> Option<EndReason> {
        if self.config.breather.is_zero() {
            return None;
        }
        let pause = tokio::time::sleep(self.config.breather);
        tokio::pin!(pause);
        loop {
            tokio::select! {
                biased;
                _ = &mut pause => return None,
                signal = signals.recv() => match signal {
                    None => return Some(EndReason::OpponentLeft),
                    Some(RoomSignal::PlayerLeft(p)) => {
                        if let Some(reason) = self.departure(p) {
                            return Some(reason);
                        }
                    }
                    Some(RoomSignal::PointScored(p)) => {
                        log::debug!("Ignoring point from {} before the ball is live", p);
                    }
                },
            }
        }
    }

    fn departure(&self, participant: ParticipantId) -> Option<EndReason> {
        if self.tournament.is_participant(participant) {
            log::info!(
                "Participant {} left during round {}",
                participant,
                self.tournament.round
            );
            Some(EndReason::OpponentLeft)
        } else {
            log::debug!("Ignoring departure of non-participant {}", participant);
            None
        }
    }

    fn submit(&mut self, sealed: TournamentLog) {
        let ledger = Arc::clone(&self.ledger);
        self.submission = Some(tokio::task::spawn_blocking(move || {
            if let Err(e) = ledger.record(&sealed) {
                log::error!("Ledger submission failed: {}", e);
            }
        }));
    }

    fn publish(&self) {
        self.state_tx.send_replace(self.tournament.clone());
    }
}

impl<T: RoomTransport + 'static> TournamentRoom<T> {
    /// Run the room on its own task.
    pub fn spawn(self) -> RoomHandle {
        let (signals, rx) = mpsc::channel(SIGNAL_BUFFER);
        let state = self.subscribe();
        let task = tokio::spawn(self.run(rx));
        RoomHandle {
            signals,
            state,
            task,
        }
    }
}
