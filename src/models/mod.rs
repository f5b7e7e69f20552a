//! Data structures for a tournament room: participants, match results, tournament state.

mod game;
mod records;
mod player;
mod tournament;

pub use game::{Ball, EndReason, Paddles, RoomEvent, Side, BALL_SPEED};
pub use records::{MatchRecord, PlayerResult, TournamentLog, TOTAL_ROUNDS};
pub use player::{ParticipantId, Session};
pub use tournament::{Tournament, TournamentError, TournamentPhase, PLAYERS_PER_TOURNAMENT};
