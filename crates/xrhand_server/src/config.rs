//! Server configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use crate::error::ConfigError;

/// Default UDP port for heartbeats in and telemetry out.
pub const DEFAULT_PORT: u16 = 9001;

/// Default seconds of silence before a client is evicted.
pub const DEFAULT_CLIENT_TIMEOUT_SECS: f64 = 5.0;

/// Default broadcast rate, matching a 50 Hz fixed physics step.
pub const DEFAULT_TICK_RATE: f64 = 50.0;

/// Default cadence of the reaper sweep.
pub const DEFAULT_REAP_INTERVAL: Duration = Duration::from_millis(100);

/// Configuration for a telemetry server.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Local address to bind. Defaults to all IPv4 interfaces.
    pub bind_addr: IpAddr,
    /// UDP port. `0` asks the OS for an ephemeral port.
    pub port: u16,
    /// Seconds without a heartbeat before a client is evicted.
    pub client_timeout_secs: f64,
    /// Broadcast ticks per second.
    pub tick_rate: f64,
    /// How often the reaper sweeps the registry.
    pub reap_interval: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            client_timeout_secs: DEFAULT_CLIENT_TIMEOUT_SECS,
            tick_rate: DEFAULT_TICK_RATE,
            reap_interval: DEFAULT_REAP_INTERVAL,
        }
    }
}

impl ServerConfig {
    /// Override the bind address.
    #[must_use]
    pub fn with_bind_addr(mut self, addr: IpAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Override the port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Override the client timeout.
    #[must_use]
    pub fn with_client_timeout_secs(mut self, secs: f64) -> Self {
        self.client_timeout_secs = secs;
        self
    }

    /// Override the broadcast rate.
    #[must_use]
    pub fn with_tick_rate(mut self, hz: f64) -> Self {
        self.tick_rate = hz;
        self
    }

    /// Override the reaper cadence.
    #[must_use]
    pub fn with_reap_interval(mut self, interval: Duration) -> Self {
        self.reap_interval = interval;
        self
    }

    /// Check every value before anything is started.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // The period must also be a representable, non-zero `Duration`.
        let period_ok = self.tick_rate.is_finite()
            && self.tick_rate > 0.0
            && Duration::try_from_secs_f64(1.0 / self.tick_rate).is_ok_and(|d| !d.is_zero());
        if !period_ok {
            return Err(ConfigError::TickRate(self.tick_rate));
        }
        // Same for the timeout: too small rounds to zero, too large overflows.
        let timeout_ok = self.client_timeout_secs > 0.0
            && Duration::try_from_secs_f64(self.client_timeout_secs).is_ok_and(|d| !d.is_zero());
        if !timeout_ok {
            return Err(ConfigError::ClientTimeout(self.client_timeout_secs));
        }
        if self.reap_interval.is_zero() {
            return Err(ConfigError::ReapInterval);
        }
        Ok(())
    }

    /// The socket address to bind.
    #[must_use]
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }

    /// Client timeout as a `Duration`. Only meaningful after [`validate`](Self::validate).
    #[must_use]
    pub fn client_timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.client_timeout_secs).unwrap_or(Duration::MAX)
    }

    /// Time between broadcast ticks. Only meaningful after [`validate`](Self::validate).
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::try_from_secs_f64(1.0 / self.tick_rate).unwrap_or(Duration::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 9001);
        assert_eq!(config.client_timeout(), Duration::from_secs(5));
        assert_eq!(config.tick_interval(), Duration::from_millis(20));
        assert_eq!(config.listen_addr().to_string(), "0.0.0.0:9001");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_overrides() {
        let config = ServerConfig::default()
            .with_bind_addr(IpAddr::V4(Ipv4Addr::LOCALHOST))
            .with_port(0)
            .with_client_timeout_secs(0.5)
            .with_tick_rate(100.0)
            .with_reap_interval(Duration::from_millis(10));
        assert_eq!(config.listen_addr().to_string(), "127.0.0.1:0");
        assert_eq!(config.client_timeout(), Duration::from_millis(500));
        assert_eq!(config.tick_interval(), Duration::from_millis(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_tick_rate() {
        for rate in [0.0, -50.0, f64::NAN, f64::INFINITY, 1e12] {
            let config = ServerConfig::default().with_tick_rate(rate);
            assert!(matches!(config.validate(), Err(ConfigError::TickRate(_))));
        }
    }

    #[test]
    fn test_rejects_bad_timeout() {
        for secs in [0.0, -1.0, f64::NAN, f64::INFINITY, 1e-12] {
            let config = ServerConfig::default().with_client_timeout_secs(secs);
            assert!(matches!(config.validate(), Err(ConfigError::ClientTimeout(_))));
        }
    }

    #[test]
    fn test_smallest_timeout_is_one_nanosecond() {
        let config = ServerConfig::default().with_client_timeout_secs(1e-9);
        assert!(config.validate().is_ok());
        assert_eq!(config.client_timeout(), Duration::from_nanos(1));
    }

    #[test]
    fn test_rejects_zero_reap_interval() {
        let config = ServerConfig::default().with_reap_interval(Duration::ZERO);
        assert_eq!(config.validate(), Err(ConfigError::ReapInterval));
    }
}
