//! Round orchestration: who plays the next match, and resetting the table for it.

use crate::models::{ParticipantId, Tournament, TournamentError, TOTAL_ROUNDS};

/// Start the next match: advance the round, pick the pairing, reset scores, paddles and ball.
///
/// Round 1 is `players[0]` vs `players[1]`, round 2 is `players[2]` vs `players[3]`,
/// round 3 is the two semifinal winners. The ball stays frozen until [`release_ball`].
pub fn start_new_match(
    tournament: &mut Tournament,
) -> Result<(ParticipantId, ParticipantId), TournamentError> {
    if tournament.round >= TOTAL_ROUNDS {
        return Err(TournamentError::AllRoundsPlayed);
    }
    if tournament.expired {
        return Err(TournamentError::Expired);
    }
    if tournament.match_in_progress {
        return Err(TournamentError::MatchInProgress);
    }

    let next = tournament.round + 1;
    let (left, right) = pairing(tournament, next)?;

    tournament.round = next;
    tournament.left_player = Some(left);
    tournament.right_player = Some(right);
    tournament.score.insert(left, 0);
    tournament.score.insert(right, 0);
    tournament.paddles.reset();
    tournament.ball.reset();
    tournament.ball_frozen = true;
    tournament.pause_started_at = None;
    tournament.match_in_progress = true;
    log::info!("Round {} started: {} vs {}", next, left, right);
    Ok((left, right))
}

fn pairing(
    tournament: &Tournament,
    round: u32,
) -> Result<(ParticipantId, ParticipantId), TournamentError> {
    let &[a, b, c, d] = tournament.players.as_slice() else {
        return Err(TournamentError::WrongPlayerCount(tournament.players.len()));
    };
    match round {
        1 => Ok((a, b)),
        2 => Ok((c, d)),
        _ => match tournament.winners.as_slice() {
            [first, second, ..] => Ok((*first, *second)),
            other => Err(TournamentError::BracketIncomplete(other.len())),
        },
    }
}

/// End the breather: live play begins.
pub fn release_ball(tournament: &mut Tournament) {
    if tournament.match_in_progress && !tournament.expired {
        tournament.ball_frozen = false;
    }
}
