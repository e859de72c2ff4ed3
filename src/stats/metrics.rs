//! Statistics for stream connections

use std::time::{Duration, Instant};

/// Per-connection counters
#[derive(Debug, Clone)]
pub struct ConnectionStats {
    /// When the connection was created
    pub created_at: Instant,
    /// Locks that acquired a front buffer from a bin
    pub frames_locked: u64,
    /// Locks that produced an empty frame
    pub empty_locks: u64,
    /// Front buffers released back to a bin
    pub frames_released: u64,
    /// Frame-ready events forwarded to subscribers
    pub frame_ready_events: u64,
    /// Notifications dropped because they came from a detached bin
    pub stale_notifications: u64,
    /// Result tokens handed out
    pub results_issued: u64,
    /// Results retrieved with a valid token
    pub results_retrieved: u64,
    /// Results discarded without being read
    pub results_discarded: u64,
    /// Invalid tokens presented to `get_result`
    pub invalid_tokens: u64,
    /// Usage errors such as unlocking while unlocked
    pub usage_errors: u64,
}

impl ConnectionStats {
    /// Create a new stats tracker
    pub fn new() -> Self {
        Self {
            created_at: Instant::now(),
            frames_locked: 0,
            empty_locks: 0,
            frames_released: 0,
            frame_ready_events: 0,
            stale_notifications: 0,
            results_issued: 0,
            results_retrieved: 0,
            results_discarded: 0,
            invalid_tokens: 0,
            usage_errors: 0,
        }
    }

    /// Get connection age
    pub fn duration(&self) -> Duration {
        self.created_at.elapsed()
    }

    /// Results currently outstanding (issued but neither retrieved nor discarded)
    pub fn results_outstanding(&self) -> u64 {
        self.results_issued
            .saturating_sub(self.results_retrieved + self.results_discarded)
    }

    /// Frame-ready events per second over the connection lifetime
    pub fn frame_rate(&self) -> f64 {
        let secs = self.duration().as_secs_f64();
        if secs > 0.0 {
            self.frame_ready_events as f64 / secs
        } else {
            0.0
        }
    }
}

impl Default for ConnectionStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_stats_new() {
        let stats = ConnectionStats::new();
        assert_eq!(stats.frames_locked, 0);
        assert_eq!(stats.frames_released, 0);
        assert_eq!(stats.frame_ready_events, 0);
        assert_eq!(stats.results_issued, 0);
        assert_eq!(stats.invalid_tokens, 0);
        assert_eq!(stats.results_outstanding(), 0);
    }

    #[test]
    fn test_results_outstanding() {
        let mut stats = ConnectionStats::new();
        stats.results_issued = 5;
        stats.results_retrieved = 2;
        stats.results_discarded = 2;

        assert_eq!(stats.results_outstanding(), 1);
    }

    #[test]
    fn test_frame_rate_non_negative() {
        let stats = ConnectionStats::new();

        assert!(stats.frame_rate() >= 0.0);
    }
}
