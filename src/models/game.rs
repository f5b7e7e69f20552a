//! Per-match vocabulary: sides, end reasons, emitted events, and the ball/paddle containers.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Which half of the table a player defends.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

/// Why a match stopped.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EndReason {
    /// A player reached the target score.
    Normal,
    /// A participant disconnected; ends the whole tournament.
    OpponentLeft,
}

/// Events broadcast to everyone in the room.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RoomEvent {
    #[serde(rename_all = "camelCase")]
    UpdateGameScore {
        left_user_score: u32,
        right_user_score: u32,
    },
    #[serde(rename_all = "camelCase")]
    EndGame {
        round: u32,
        reason: EndReason,
        winner_side: Option<Side>,
    },
}

impl RoomEvent {
    /// Event name on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            RoomEvent::UpdateGameScore { .. } => "updateGameScore",
            RoomEvent::EndGame { .. } => "endGame",
        }
    }
}

/// Horizontal serve speed, in table units per tick.
pub const BALL_SPEED: f32 = 1.0;

/// Ball position and velocity. The simulation loop owns the physics; the
/// tournament only re-centres it between points and matches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Ball {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
}

impl Ball {
    /// Centre the ball and pick a fresh serve: random side, angle within 45 degrees.
    pub fn reset(&mut self) {
        let mut rng = rand::thread_rng();
        let angle: f32 = rng.gen_range(-std::f32::consts::FRAC_PI_4..=std::f32::consts::FRAC_PI_4);
        let direction = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
        self.x = 0.0;
        self.y = 0.0;
        self.vx = direction * BALL_SPEED * angle.cos();
        self.vy = BALL_SPEED * angle.sin();
    }
}

/// Vertical paddle offsets, 0 is neutral.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Paddles {
    pub left: f32,
    pub right: f32,
}

impl Paddles {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
