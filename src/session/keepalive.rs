// ABOUTME: Keepalive probe configuration and health accounting for long-running sessions
// ABOUTME: The periodic probe task is spawned by the session once the bind completes

use std::time::Duration;

use tracing::{debug, warn};

/// Configuration for periodic enquire_link probes.
///
/// While the session is bound, a monitor issues an enquire_link on every
/// interval tick and records the outcome. Probe failures are health
/// signals only: the session is never torn down on the monitor's
/// initiative, escalation is left to the caller.
#[derive(Debug, Clone)]
pub struct KeepAliveConfig {
    /// Interval between probes (default: 30 seconds)
    pub interval: Duration,

    /// Deadline for each probe response (default: 10 seconds). Should be
    /// well below the interval.
    pub timeout: Duration,

    /// Consecutive failures after which the monitor stops probing and the
    /// connection is reported unhealthy (default: 3)
    pub max_failures: u32,

    /// Whether probes are sent at all. The inbound responder is always
    /// active regardless.
    pub enabled: bool,
}

impl Default for KeepAliveConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            timeout: Duration::from_secs(10),
            max_failures: 3,
            enabled: true,
        }
    }
}

impl KeepAliveConfig {
    /// Create a keepalive configuration with a custom probe interval.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            ..Default::default()
        }
    }

    /// Set the probe response deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the consecutive-failure ceiling.
    pub fn with_max_failures(mut self, max_failures: u32) -> Self {
        self.max_failures = max_failures;
        self
    }

    /// A configuration with probing switched off.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }
}

/// Snapshot of keepalive health, from
/// [`Session::keep_alive_status`](crate::session::Session::keep_alive_status).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeepAliveStatus {
    /// Whether the probe monitor is active
    pub running: bool,
    /// Probe failures in a row; reset by any success
    pub consecutive_failures: u32,
    /// Probes sent since the session bound
    pub total_pings: u32,
    /// Probe responses received
    pub total_pongs: u32,
}

/// Mutable probe accounting shared between the monitor task and status
/// queries.
#[derive(Debug, Default)]
pub(crate) struct KeepAliveState {
    pub(crate) running: bool,
    consecutive_failures: u32,
    total_pings: u32,
    total_pongs: u32,
}

impl KeepAliveState {
    pub(crate) fn on_ping_sent(&mut self) {
        self.total_pings += 1;
        debug!(total = self.total_pings, "enquire_link probe sent");
    }

    pub(crate) fn on_ping_success(&mut self) {
        self.consecutive_failures = 0;
        self.total_pongs += 1;
        debug!(total = self.total_pongs, "enquire_link probe answered");
    }

    pub(crate) fn on_ping_failure(&mut self) {
        self.consecutive_failures += 1;
        warn!(
            consecutive = self.consecutive_failures,
            "enquire_link probe failed"
        );
    }

    /// Probing stops once the failure ceiling is reached; the session
    /// itself stays up.
    pub(crate) fn is_failed(&self, max_failures: u32) -> bool {
        self.consecutive_failures >= max_failures
    }

    pub(crate) fn status(&self) -> KeepAliveStatus {
        KeepAliveStatus {
            running: self.running,
            consecutive_failures: self.consecutive_failures,
            total_pings: self.total_pings,
            total_pongs: self.total_pongs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = KeepAliveConfig::default();
        assert_eq!(config.interval, Duration::from_secs(30));
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.max_failures, 3);
        assert!(config.enabled);
    }

    #[test]
    fn config_builder() {
        let config = KeepAliveConfig::new(Duration::from_secs(60))
            .with_timeout(Duration::from_secs(5))
            .with_max_failures(5);

        assert_eq!(config.interval, Duration::from_secs(60));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.max_failures, 5);
        assert!(config.enabled);
    }

    #[test]
    fn config_disabled() {
        assert!(!KeepAliveConfig::disabled().enabled);
    }

    #[test]
    fn failure_tracking() {
        let mut state = KeepAliveState::default();
        assert!(!state.is_failed(3));

        state.on_ping_failure();
        state.on_ping_failure();
        assert!(!state.is_failed(3));

        state.on_ping_failure();
        assert!(state.is_failed(3));

        // any success resets the run
        state.on_ping_success();
        assert!(!state.is_failed(3));
        assert_eq!(state.status().consecutive_failures, 0);
    }

    #[test]
    fn statistics_accumulate() {
        let mut state = KeepAliveState::default();
        state.on_ping_sent();
        state.on_ping_success();
        state.on_ping_sent();
        state.on_ping_failure();

        let status = state.status();
        assert_eq!(status.total_pings, 2);
        assert_eq!(status.total_pongs, 1);
        assert_eq!(status.consecutive_failures, 1);
    }
}
