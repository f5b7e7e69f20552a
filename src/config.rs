//! Tunable tournament policy: target score, pre-match breather, transport namespace.

use std::time::Duration;

/// Points needed to win a match.
pub const DEFAULT_END_SCORE: u32 = 5;

/// Pause between resetting the table and releasing the ball.
pub const DEFAULT_BREATHER: Duration = Duration::from_millis(500);

pub const DEFAULT_NAMESPACE: &str = "/tournament";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TournamentConfig {
    pub end_score: u32,
    pub breather: Duration,
    /// Channel namespace that scopes session lookups and broadcasts.
    pub namespace: String,
}

impl Default for TournamentConfig {
    fn default() -> Self {
        Self {
            end_score: DEFAULT_END_SCORE,
            breather: DEFAULT_BREATHER,
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}

impl TournamentConfig {
    /// Read `PONG_END_SCORE`, `PONG_BREATHER_MS` and `PONG_NAMESPACE`, keeping defaults for
    /// anything missing or unparsable.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let end_score = lookup("PONG_END_SCORE")
            .and_then(|v| v.parse().ok())
            .filter(|&s: &u32| s > 0)
            .unwrap_or(defaults.end_score);
        let breather = lookup("PONG_BREATHER_MS")
            .and_then(|v| v.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.breather);
        let namespace = lookup("PONG_NAMESPACE")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.namespace);
        Self {
            end_score,
            breather,
            namespace,
        }
    }

    /// Zero is bumped to one; a match must be winnable.
    pub fn with_end_score(mut self, end_score: u32) -> Self {
        self.end_score = end_score.max(1);
        self
    }

    pub fn with_breather(mut self, breather: Duration) -> Self {
        self.breather = breather;
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }
}
