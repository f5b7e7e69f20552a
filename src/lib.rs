//! Pong tournament rooms: four players, two semifinals and a final, results sent to a ledger.

pub mod config;
pub mod logic;
pub mod models;
pub mod room;

pub use config::TournamentConfig;
pub use logic::{award_point, end_match, release_ball, start_new_match, MatchEnd, PointOutcome, Teardown};
pub use models::{
    Ball, EndReason, MatchRecord, Paddles, ParticipantId, PlayerResult, RoomEvent, Session, Side,
    Tournament, TournamentError, TournamentLog, TournamentPhase, PLAYERS_PER_TOURNAMENT,
    TOTAL_ROUNDS,
};
pub use room::{
    Ledger, LedgerError, MemoryLedger, MemoryTransport, RoomHandle, RoomReport, RoomSignal,
    RoomTransport, TournamentRoom,
};
