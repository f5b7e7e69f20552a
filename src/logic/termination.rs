//! Match end and tournament teardown.

use crate::models::{EndReason, ParticipantId, RoomEvent, Tournament, TournamentLog, TOTAL_ROUNDS};

/// Work the room must do once the tournament is over.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Teardown {
    /// Sealed log for the ledger, present only when all three matches were decided.
    pub submission: Option<TournamentLog>,
    /// Everyone to disconnect after the room is closed.
    pub disconnect: Vec<ParticipantId>,
}

/// Result of ending a match.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchEnd {
    /// End-of-round notice for the room.
    pub event: RoomEvent,
    /// Set when this match ended the whole tournament.
    pub teardown: Option<Teardown>,
}

/// End the current match.
///
/// Returns `None` when the tournament has already expired. The tournament completes after
/// round 3 or on any `OpponentLeft`; a full log is then sealed with `completed_at`.
pub fn end_match(tournament: &mut Tournament, reason: EndReason, completed_at: i64) -> Option<MatchEnd> {
    if tournament.expired {
        return None;
    }

    let event = RoomEvent::EndGame {
        round: tournament.round,
        reason,
        winner_side: tournament.winner_side,
    };
    tournament.match_in_progress = false;
    for flag in tournament.ready.values_mut() {
        *flag = false;
    }

    if tournament.round < TOTAL_ROUNDS && reason == EndReason::Normal {
        log::debug!("Round {} ended, {} to go", tournament.round, tournament.rounds_remaining());
        return Some(MatchEnd {
            event,
            teardown: None,
        });
    }

    tournament.expired = true;
    tournament.ball_frozen = true;
    let submission = if tournament.log.seal(completed_at) {
        Some(tournament.log.clone())
    } else {
        log::info!(
            "Tournament ended in round {} ({:?}) with {} of {} results, nothing to record",
            tournament.round,
            reason,
            tournament.log.len(),
            TOTAL_ROUNDS
        );
        None
    };
    Some(MatchEnd {
        event,
        teardown: Some(Teardown {
            submission,
            disconnect: tournament.players.clone(),
        }),
    })
}
