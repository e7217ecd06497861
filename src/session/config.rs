// ABOUTME: Session configuration surface: endpoint, credentials, timeouts and segmentation budgets
// ABOUTME: Builder-style setters with defaults matching common SMSC deployments

use std::time::Duration;

use crate::datatypes::DataCoding;
use crate::session::keepalive::KeepAliveConfig;
use crate::session::types::BindCredentials;

/// Per-encoding message part budgets, in characters.
///
/// The budget is the number of characters that fit into a single
/// message part for the given data coding. Wide encodings carry two
/// octets per character, so their budget is materially smaller. Both
/// values can be overridden for networks with non-standard ceilings.
#[derive(Debug, Clone, Copy)]
pub struct SegmentLimits {
    /// Budget for single-octet encodings (default alphabet, IA5, Latin 1)
    pub default: usize,
    /// Budget for UCS-2 (wide/Unicode) messages
    pub ucs2: usize,
}

impl Default for SegmentLimits {
    fn default() -> Self {
        Self {
            default: 140,
            ucs2: 70,
        }
    }
}

impl SegmentLimits {
    /// Part budget for the given coding scheme.
    pub fn limit_for(&self, coding: DataCoding) -> usize {
        if coding.is_wide() {
            self.ucs2
        } else {
            self.default
        }
    }
}

/// Configuration for one SMPP session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// SMSC hostname or IP address
    pub host: String,
    /// SMSC port
    pub port: u16,
    /// Bind credentials
    pub credentials: BindCredentials,
    /// How long to wait for the transport to come up (default: 10s)
    pub connect_timeout: Duration,
    /// How long to wait for each correlated response (default: 10s)
    pub request_timeout: Duration,
    /// Keepalive probe behavior
    pub keep_alive: KeepAliveConfig,
    /// Per-encoding segmentation budgets
    pub limits: SegmentLimits,
}

impl SessionConfig {
    /// Create a configuration with default timing for the given endpoint
    /// and credentials.
    pub fn new(host: impl Into<String>, port: u16, credentials: BindCredentials) -> Self {
        Self {
            host: host.into(),
            port,
            credentials,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(10),
            keep_alive: KeepAliveConfig::default(),
            limits: SegmentLimits::default(),
        }
    }

    /// Set the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the per-request response timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the keepalive configuration.
    pub fn with_keep_alive(mut self, keep_alive: KeepAliveConfig) -> Self {
        self.keep_alive = keep_alive;
        self
    }

    /// Override the per-encoding segmentation budgets.
    pub fn with_limits(mut self, limits: SegmentLimits) -> Self {
        self.limits = limits;
        self
    }

    /// The endpoint in `host:port` form, for logging.
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
