//! Tournament and TournamentPhase.

use crate::models::game::{Ball, Paddles, Side};
use crate::models::records::{TournamentLog, TOTAL_ROUNDS};
use crate::models::player::ParticipantId;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Instant;
use thiserror::Error;

/// Number of participants in one tournament room.
pub const PLAYERS_PER_TOURNAMENT: usize = 4;

/// Errors that can occur during tournament operations.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum TournamentError {
    /// The tournament already finished or was aborted.
    #[error("tournament is over")]
    Expired,
    /// All three matches have been played; checked before expiry.
    #[error("all rounds have already been played")]
    AllRoundsPlayed,
    /// A match is still running; it must end before the next one starts.
    #[error("a match is already in progress")]
    MatchInProgress,
    /// No match is running, so no point can be scored.
    #[error("no match in progress")]
    NoMatchInProgress,
    /// The current match already has a winner.
    #[error("match for round {0} is already decided")]
    MatchDecided(u32),
    /// The final needs both semifinal winners.
    #[error("final needs two semifinal winners, have {0}")]
    BracketIncomplete(usize),
    /// Rooms are created with exactly four distinct participants.
    #[error("tournament needs 4 distinct players, got {0}")]
    WrongPlayerCount(usize),
    /// The participant is not playing the current match.
    #[error("participant {0} is not in the current match")]
    NotInMatch(ParticipantId),
    /// The participant's display session could not be resolved when a result had to be logged.
    #[error("session for participant {0} is unavailable")]
    SessionUnavailable(ParticipantId),
}

/// Where the tournament is in its lifecycle.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "phase", content = "round", rename_all = "snake_case")]
pub enum TournamentPhase {
    NotStarted,
    /// Match `n` is being played (3 is the final).
    Round(u32),
    /// Match `n` ended normally; the next one has not started yet.
    RoundEnded(u32),
    /// Terminal: final decided or a participant left.
    Complete,
}

/// Full state of one tournament room.
#[derive(Clone, Debug, Serialize)]
pub struct Tournament {
    /// Participants in bracket order: 0-1 play semifinal A, 2-3 semifinal B.
    pub players: Vec<ParticipantId>,
    /// Current match number; 0 before the first match.
    pub round: u32,
    /// Winner of each completed match, in round order.
    pub winners: Vec<ParticipantId>,
    /// Side that won the most recently decided match.
    pub winner_side: Option<Side>,
    pub log: TournamentLog,
    pub score: HashMap<ParticipantId, u32>,
    pub left_player: Option<ParticipantId>,
    pub right_player: Option<ParticipantId>,
    /// Once set, nothing else may happen in this room.
    pub expired: bool,
    pub ready: HashMap<ParticipantId, bool>,
    pub match_in_progress: bool,
    /// Ball held still by the scoring pause or the pre-match breather.
    pub ball_frozen: bool,
    #[serde(skip)]
    pub pause_started_at: Option<Instant>,
    pub paddles: Paddles,
    pub ball: Ball,
}

impl Tournament {
    /// Create a tournament for four distinct participants, in bracket order.
    pub fn new(players: Vec<ParticipantId>) -> Result<Self, TournamentError> {
        let mut distinct = players.clone();
        distinct.sort();
        distinct.dedup();
        if players.len() != PLAYERS_PER_TOURNAMENT || distinct.len() != players.len() {
            return Err(TournamentError::WrongPlayerCount(distinct.len()));
        }
        let ready = players.iter().map(|&p| (p, false)).collect();
        Ok(Self {
            players,
            round: 0,
            winners: Vec::new(),
            winner_side: None,
            log: TournamentLog::new(),
            score: HashMap::new(),
            left_player: None,
            right_player: None,
            expired: false,
            ready,
            match_in_progress: false,
            ball_frozen: true,
            pause_started_at: None,
            paddles: Paddles::default(),
            ball: Ball::default(),
        })
    }

    pub fn phase(&self) -> TournamentPhase {
        if self.expired {
            TournamentPhase::Complete
        } else if self.round == 0 {
            TournamentPhase::NotStarted
        } else if self.match_in_progress {
            TournamentPhase::Round(self.round)
        } else {
            TournamentPhase::RoundEnded(self.round)
        }
    }

    pub fn is_participant(&self, id: ParticipantId) -> bool {
        self.players.contains(&id)
    }

    /// Side the participant plays in the current match, if any.
    pub fn side_of(&self, id: ParticipantId) -> Option<Side> {
        if self.left_player == Some(id) {
            Some(Side::Left)
        } else if self.right_player == Some(id) {
            Some(Side::Right)
        } else {
            None
        }
    }

    pub fn score_of(&self, id: ParticipantId) -> u32 {
        self.score.get(&id).copied().unwrap_or(0)
    }

    /// Scores of the current match as (left, right).
    pub fn score_pair(&self) -> (u32, u32) {
        let left = self.left_player.map_or(0, |p| self.score_of(p));
        let right = self.right_player.map_or(0, |p| self.score_of(p));
        (left, right)
    }

    /// The current round already has its result record.
    pub fn current_match_decided(&self) -> bool {
        self.log
            .records()
            .last()
            .is_some_and(|r| r.game_id == self.round)
    }

    pub fn rounds_remaining(&self) -> u32 {
        TOTAL_ROUNDS.saturating_sub(self.round)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn four() -> Vec<ParticipantId> {
        (0..4).map(|_| Uuid::new_v4()).collect()
    }

    #[test]
    fn new_rejects_wrong_roster() {
        let mut players = four();
        players.pop();
        assert_eq!(
            Tournament::new(players).unwrap_err(),
            TournamentError::WrongPlayerCount(3)
        );

        let mut players = four();
        players[3] = players[0];
        assert!(matches!(
            Tournament::new(players),
            Err(TournamentError::WrongPlayerCount(3))
        ));
    }

    #[test]
    fn fresh_tournament_is_not_started() {
        let t = Tournament::new(four()).unwrap();
        assert_eq!(t.phase(), TournamentPhase::NotStarted);
        assert_eq!(t.rounds_remaining(), 3);
        assert!(t.ready.values().all(|r| !r));
        assert_eq!(t.score_pair(), (0, 0));
    }

    #[test]
    fn phase_serializes_with_round() {
        assert_eq!(
            serde_json::to_value(TournamentPhase::Round(2)).unwrap(),
            serde_json::json!({ "phase": "round", "round": 2 })
        );
        assert_eq!(
            serde_json::to_value(TournamentPhase::Complete).unwrap(),
            serde_json::json!({ "phase": "complete" })
        );
    }
}
