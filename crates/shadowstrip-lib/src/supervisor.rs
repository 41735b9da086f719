//! Connection supervision: from cold start to a synchronized shadow
//! session, retrying forever.
//!
//! One [`Supervisor::ensure_connected`] call performs one attempt cycle; the
//! runtime re-invokes it every tick while the session is not synchronized,
//! and the call itself sleeps the fixed backoff after a failure. Together
//! that reproduces a blocking retry loop while keeping the machine fully
//! testable with a scripted clock.

use std::fmt;
use std::time::Duration;

use crate::clock::{Clock, MIN_VALID_EPOCH};
use crate::config::Config;
use crate::led::{self, LedStrip};
use crate::shadow::ShadowTopics;
use crate::transport::Transport;
use crate::trust::{TrustMaterial, TrustPaths};

// ── Status colours (supervisor-owned; first pixel only) ──

/// Attempt in flight.
pub const STATUS_CONNECTING: u32 = 0x0000FF;
/// Config or trust material unusable; operator action needed.
pub const STATUS_ERROR: u32 = 0xFF0000;

/// Connection lifecycle. Monotonic within one attempt; any liveness failure
/// resets to `Disconnected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Authenticating,
    Connected,
    Subscribed,
    Synchronized,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Authenticating => "authenticating",
            ConnectionState::Connected => "connected",
            ConnectionState::Subscribed => "subscribed",
            ConnectionState::Synchronized => "synchronized",
        };
        f.write_str(name)
    }
}

/// Drives the connection state machine.
pub struct Supervisor {
    state: ConnectionState,
    topics: ShadowTopics,
    identity: String,
    trust_paths: TrustPaths,
    trust: Option<TrustMaterial>,
    backoff: Duration,
    consecutive_failures: u32,
}

impl Supervisor {
    pub fn new(config: &Config) -> Self {
        Supervisor {
            state: ConnectionState::Disconnected,
            topics: ShadowTopics::new(&config.thing_name),
            identity: config.identity(),
            trust_paths: config.trust_paths(),
            trust: None,
            backoff: config.backoff(),
            consecutive_failures: 0,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_synchronized(&self) -> bool {
        self.state == ConnectionState::Synchronized
    }

    /// Failed attempts since the last synchronized session.
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Record a lost session. The next tick starts a fresh attempt.
    pub fn mark_disconnected(&mut self) {
        if self.state != ConnectionState::Disconnected {
            log::warn!("session lost while {}, reconnecting", self.state);
            self.state = ConnectionState::Disconnected;
        }
    }

    /// Run one attempt cycle: trust, clock, connect, subscribe, shadow get.
    ///
    /// On success the state lands on `Synchronized` and the strip is cleared
    /// (the reconciliation engine owns the pixels from here). On failure the
    /// call sleeps the fixed backoff and lands back on `Disconnected`;
    /// retries are unbounded.
    pub fn ensure_connected(
        &mut self,
        transport: &mut impl Transport,
        strip: &mut impl LedStrip,
        clock: &mut impl Clock,
    ) -> ConnectionState {
        self.state = ConnectionState::Connecting;
        self.indicate(strip, STATUS_CONNECTING);

        // Load trust material on each attempt until it loads. Failure shows
        // the error colour but never stops the attempt: the connect then
        // fails at the TLS layer and stays in the retry loop.
        if self.trust.is_none() {
            match TrustMaterial::load(&self.trust_paths) {
                Ok(material) => self.trust = Some(material),
                Err(e) => {
                    log::warn!("{e}; connecting without client credentials");
                    self.indicate(strip, STATUS_ERROR);
                }
            }
        }

        // TLS cannot judge certificate lifetimes against a bogus clock.
        self.state = ConnectionState::Authenticating;
        if clock.epoch_secs() < MIN_VALID_EPOCH {
            log::warn!(
                "wall clock implausible (epoch {}), forcing time sync",
                clock.epoch_secs()
            );
            if !clock.force_sync() {
                log::warn!("time sync did not land; certificate checks may fail");
            }
        }

        if !transport.connect(&self.identity, self.trust.as_ref()) {
            return self.fail_attempt(clock);
        }
        self.state = ConnectionState::Connected;
        log::info!("session established as {}", self.identity);

        for topic in self.topics.subscriptions() {
            transport.subscribe(topic);
        }
        self.state = ConnectionState::Subscribed;

        // Request the current shadow so a strip that rebooted mid-change
        // still converges.
        if !transport.publish(&self.topics.get, b"") {
            log::warn!("shadow get refused; restarting attempt");
            return self.fail_attempt(clock);
        }

        self.state = ConnectionState::Synchronized;
        self.consecutive_failures = 0;
        log::info!("shadow session synchronized as {}", self.identity);

        // Hand the pixels over to the reconciliation engine.
        if let Err(e) = led::clear(strip) {
            log::warn!("strip clear failed: {e}");
        }
        self.state
    }

    fn fail_attempt(&mut self, clock: &impl Clock) -> ConnectionState {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        log::warn!(
            "connect attempt {} failed, retrying in {:?}",
            self.consecutive_failures,
            self.backoff
        );
        clock.sleep(self.backoff);
        self.state = ConnectionState::Disconnected;
        self.state
    }

    fn indicate(&self, strip: &mut impl LedStrip, color: u32) {
        if let Err(e) = led::show_status(strip, color) {
            log::warn!("status indicator render failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::mock::ManualClock;
    use crate::led::mock::MockStrip;
    use crate::transport::mock::MockTransport;
    use std::fs;
    use tempfile::TempDir;

    const FAKE_PEM: &str = "-----BEGIN THING-----\nabc\n-----END THING-----\n";

    /// Config with real (temp) trust material and a 10-pixel strip.
    fn config_with_trust(dir: &TempDir) -> Config {
        let write = |name: &str| {
            let p = dir.path().join(name);
            fs::write(&p, FAKE_PEM).unwrap();
            p.display().to_string()
        };
        let mut config = Config::default();
        config.endpoint = "example-ats.iot.us-east-1.amazonaws.com".into();
        config.ca_path = write("ca.pem");
        config.cert_path = write("cert.pem");
        config.key_path = write("key.pem");
        config
    }

    fn harness(config: &Config) -> (Supervisor, MockTransport, MockStrip, ManualClock) {
        (
            Supervisor::new(config),
            MockTransport::new(),
            MockStrip::new(config.led_count),
            ManualClock::synced(),
        )
    }

    // ── happy path ──

    #[test]
    fn full_cycle_reaches_synchronized() {
        let dir = TempDir::new().unwrap();
        let config = config_with_trust(&dir);
        let (mut sup, mut transport, mut strip, mut clock) = harness(&config);

        let state = sup.ensure_connected(&mut transport, &mut strip, &mut clock);

        assert_eq!(state, ConnectionState::Synchronized);
        assert!(sup.is_synchronized());
        assert_eq!(sup.consecutive_failures(), 0);

        // Identity and trust made it to the transport.
        assert_eq!(
            transport.connects,
            vec![("led-lightstrip-1".to_string(), true)]
        );

        // All three shadow topics, in order, then the get request.
        assert_eq!(
            transport.subscriptions,
            vec![
                "$aws/things/led-lightstrip-1/shadow/update/delta",
                "$aws/things/led-lightstrip-1/shadow/get/accepted",
                "$aws/things/led-lightstrip-1/shadow/update/accepted",
            ]
        );
        let gets = transport.published_to("$aws/things/led-lightstrip-1/shadow/get");
        assert_eq!(gets, vec![b"".as_slice()]);

        // No backoff on success, strip handed over cleared.
        assert_eq!(clock.sleep_count(), 0);
        assert_eq!(strip.last_frame(), Some(&[0u32; 10][..]));
    }

    #[test]
    fn connecting_status_shows_first() {
        let dir = TempDir::new().unwrap();
        let config = config_with_trust(&dir);
        let (mut sup, mut transport, mut strip, mut clock) = harness(&config);

        sup.ensure_connected(&mut transport, &mut strip, &mut clock);

        let mut expected = vec![0u32; 10];
        expected[0] = STATUS_CONNECTING;
        assert_eq!(strip.frames[0], expected);
    }

    // ── degraded trust ──

    #[test]
    fn missing_trust_still_attempts_connect() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        // Paths inside an empty directory: all three loads fail.
        config.ca_path = dir.path().join("ca.pem").display().to_string();
        config.cert_path = dir.path().join("cert.pem").display().to_string();
        config.key_path = dir.path().join("key.pem").display().to_string();
        let (mut sup, mut transport, mut strip, mut clock) = harness(&config);

        sup.ensure_connected(&mut transport, &mut strip, &mut clock);

        assert_eq!(transport.connects.len(), 1, "connect attempted anyway");
        assert!(!transport.connects[0].1, "no credentials passed");

        // The error colour went up before the attempt.
        let mut error_frame = vec![0u32; 10];
        error_frame[0] = STATUS_ERROR;
        assert!(strip.frames.contains(&error_frame));
    }

    #[test]
    fn trust_loads_once_then_cached() {
        let dir = TempDir::new().unwrap();
        let config = config_with_trust(&dir);
        let (mut sup, mut transport, mut strip, mut clock) = harness(&config);

        sup.ensure_connected(&mut transport, &mut strip, &mut clock);
        // Remove the files; the cached material must keep working.
        fs::remove_file(dir.path().join("ca.pem")).unwrap();
        sup.mark_disconnected();
        transport.drop_session();
        sup.ensure_connected(&mut transport, &mut strip, &mut clock);

        assert_eq!(transport.connects.len(), 2);
        assert!(transport.connects[1].1, "cached trust still passed");
    }

    // ── clock plausibility ──

    #[test]
    fn implausible_clock_forces_sync() {
        let dir = TempDir::new().unwrap();
        let config = config_with_trust(&dir);
        let (mut sup, mut transport, mut strip, _) = harness(&config);
        let mut clock = ManualClock::new(42);
        clock.sync_target = Some(MIN_VALID_EPOCH + 5);

        let state = sup.ensure_connected(&mut transport, &mut strip, &mut clock);

        assert_eq!(clock.force_sync_calls, 1);
        assert_eq!(state, ConnectionState::Synchronized);
    }

    #[test]
    fn plausible_clock_skips_sync() {
        let dir = TempDir::new().unwrap();
        let config = config_with_trust(&dir);
        let (mut sup, mut transport, mut strip, mut clock) = harness(&config);

        sup.ensure_connected(&mut transport, &mut strip, &mut clock);

        assert_eq!(clock.force_sync_calls, 0);
    }

    #[test]
    fn unsynced_clock_still_attempts_connect() {
        let dir = TempDir::new().unwrap();
        let config = config_with_trust(&dir);
        let (mut sup, mut transport, mut strip, _) = harness(&config);
        let mut clock = ManualClock::new(42); // no sync target: stays bogus

        sup.ensure_connected(&mut transport, &mut strip, &mut clock);

        assert_eq!(clock.force_sync_calls, 1);
        assert_eq!(transport.connects.len(), 1);
    }

    // ── failure and retry ──

    #[test]
    fn refused_connect_backs_off_and_resets() {
        let dir = TempDir::new().unwrap();
        let config = config_with_trust(&dir);
        let (mut sup, mut transport, mut strip, mut clock) = harness(&config);
        transport.push_connect_result(false);

        let state = sup.ensure_connected(&mut transport, &mut strip, &mut clock);

        assert_eq!(state, ConnectionState::Disconnected);
        assert_eq!(sup.consecutive_failures(), 1);
        assert_eq!(clock.sleeps.borrow()[..], [Duration::from_secs(5)]);
        assert!(transport.subscriptions.is_empty());
    }

    #[test]
    fn retries_are_unbounded() {
        let dir = TempDir::new().unwrap();
        let config = config_with_trust(&dir);
        let (mut sup, mut transport, mut strip, mut clock) = harness(&config);
        for _ in 0..500 {
            transport.push_connect_result(false);
        }

        for _ in 0..500 {
            let state = sup.ensure_connected(&mut transport, &mut strip, &mut clock);
            assert_eq!(state, ConnectionState::Disconnected);
        }
        assert_eq!(sup.consecutive_failures(), 500);
        assert_eq!(clock.sleep_count(), 500);

        // The 501st attempt is still made, and succeeds.
        let state = sup.ensure_connected(&mut transport, &mut strip, &mut clock);
        assert_eq!(state, ConnectionState::Synchronized);
        assert_eq!(sup.consecutive_failures(), 0);
    }

    #[test]
    fn refused_get_restarts_attempt() {
        let dir = TempDir::new().unwrap();
        let config = config_with_trust(&dir);
        let (mut sup, mut transport, mut strip, mut clock) = harness(&config);
        transport.fail_publish = true;

        let state = sup.ensure_connected(&mut transport, &mut strip, &mut clock);

        assert_eq!(state, ConnectionState::Disconnected);
        assert_eq!(sup.consecutive_failures(), 1);
        assert_eq!(clock.sleep_count(), 1);
        // Subscriptions had already gone out before the get failed.
        assert_eq!(transport.subscriptions.len(), 3);
    }

    #[test]
    fn resync_after_drop_repeats_subscriptions_and_get() {
        let dir = TempDir::new().unwrap();
        let config = config_with_trust(&dir);
        let (mut sup, mut transport, mut strip, mut clock) = harness(&config);

        sup.ensure_connected(&mut transport, &mut strip, &mut clock);
        transport.drop_session();
        sup.mark_disconnected();
        assert_eq!(sup.state(), ConnectionState::Disconnected);

        let state = sup.ensure_connected(&mut transport, &mut strip, &mut clock);

        assert_eq!(state, ConnectionState::Synchronized);
        assert_eq!(transport.subscriptions.len(), 6, "all three re-subscribed");
        let gets = transport.published_to("$aws/things/led-lightstrip-1/shadow/get");
        assert_eq!(gets.len(), 2, "shadow get re-published");
    }

    #[test]
    fn mark_disconnected_is_idempotent() {
        let config = Config::default();
        let mut sup = Supervisor::new(&config);
        assert_eq!(sup.state(), ConnectionState::Disconnected);
        sup.mark_disconnected();
        assert_eq!(sup.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn state_display_names() {
        assert_eq!(ConnectionState::Disconnected.to_string(), "disconnected");
        assert_eq!(ConnectionState::Synchronized.to_string(), "synchronized");
    }
}
