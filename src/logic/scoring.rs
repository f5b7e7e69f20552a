//! Scoring: apply one point and decide whether the match is over.

use crate::models::{
    MatchRecord, ParticipantId, PlayerResult, RoomEvent, Session, Side, Tournament,
    TournamentError,
};
use std::time::Instant;

/// What one scored point produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PointOutcome {
    /// The point decided the match; the caller stops driving points.
    pub match_over: bool,
    /// Score broadcast for the room.
    pub event: RoomEvent,
}

/// Award a point to `scorer` in the current match.
///
/// When the point reaches `end_score`, the winner is appended to the bracket and a result
/// record to the log. Display names are resolved through `sessions` at that moment; if
/// either lookup fails nothing is mutated and [`TournamentError::SessionUnavailable`] is
/// returned. The ball is re-centred after every point.
pub fn award_point(
    tournament: &mut Tournament,
    scorer: ParticipantId,
    end_score: u32,
    sessions: impl Fn(ParticipantId) -> Option<Session>,
) -> Result<PointOutcome, TournamentError> {
    if tournament.expired {
        return Err(TournamentError::Expired);
    }
    if !tournament.match_in_progress {
        return Err(TournamentError::NoMatchInProgress);
    }
    if tournament.current_match_decided() {
        return Err(TournamentError::MatchDecided(tournament.round));
    }
    let (Some(left), Some(right)) = (tournament.left_player, tournament.right_player) else {
        return Err(TournamentError::NoMatchInProgress);
    };
    if scorer != left && scorer != right {
        return Err(TournamentError::NotInMatch(scorer));
    }

    let deciding = tournament.score_of(scorer) + 1 >= end_score;
    let names = if deciding {
        let left_session = sessions(left).ok_or(TournamentError::SessionUnavailable(left))?;
        let right_session = sessions(right).ok_or(TournamentError::SessionUnavailable(right))?;
        Some((left_session.display_name, right_session.display_name))
    } else {
        None
    };

    tournament.pause_started_at = Some(Instant::now());
    tournament.ball_frozen = true;
    *tournament.score.entry(scorer).or_insert(0) += 1;
    let (left_score, right_score) = tournament.score_pair();

    if let Some((left_name, right_name)) = names {
        let left_result = PlayerResult {
            name: left_name,
            score: left_score,
        };
        let right_result = PlayerResult {
            name: right_name,
            score: right_score,
        };
        let (side, winner, record) = if left_score > right_score {
            (Side::Left, left, MatchRecord {
                game_id: tournament.round,
                winner: left_result,
                loser: right_result,
            })
        } else {
            (Side::Right, right, MatchRecord {
                game_id: tournament.round,
                winner: right_result,
                loser: left_result,
            })
        };
        log::info!(
            "Round {} won by {} ({}-{})",
            tournament.round,
            record.winner.name,
            record.winner.score,
            record.loser.score
        );
        tournament.winners.push(winner);
        tournament.winner_side = Some(side);
        tournament.log.push(record);
    }

    tournament.ball.reset();

    Ok(PointOutcome {
        match_over: deciding,
        event: RoomEvent::UpdateGameScore {
            left_user_score: left_score,
            right_user_score: right_score,
        },
    })
}
