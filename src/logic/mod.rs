//! Tournament state machine: round start, scoring, match end.
//!
//! These operate on a [`Tournament`](crate::models::Tournament) in place and hand back the
//! events they produce; the room decides when to emit them.

mod rounds;
mod scoring;
mod termination;

pub use rounds::{release_ball, start_new_match};
pub use scoring::{award_point, PointOutcome};
pub use termination::{end_match, MatchEnd, Teardown};
